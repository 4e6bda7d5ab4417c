// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalPreferences {
    /// Whether to count operator keyword usage while tokenizing
    pub track_operator_patterns: bool,

    /// Whether to log every produced token at debug level
    pub log_tokens: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            track_operator_patterns: env_flag("ODATA_LEXICAL_TRACK_OPERATORS", false),
            log_tokens: env_flag("ODATA_LEXICAL_LOG_TOKENS", false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserPreferences {
    /// Resolve property and function names regardless of case
    pub case_insensitive: bool,

    /// Accept function calls that are not OData canonical functions
    pub allow_unknown_functions: bool,
}

impl Default for ParserPreferences {
    fn default() -> Self {
        Self {
            case_insensitive: env_flag("ODATA_PARSER_CASE_INSENSITIVE", true),
            allow_unknown_functions: env_flag("ODATA_PARSER_ALLOW_UNKNOWN_FUNCTIONS", false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationPreferences {
    /// Reject names that have no rule entry when rules of that kind exist
    pub deny_unlisted: bool,

    /// Whether to log each violation as a warning
    pub log_violations: bool,
}

impl Default for ValidationPreferences {
    fn default() -> Self {
        Self {
            deny_unlisted: env_flag("ODATA_VALIDATION_DENY_UNLISTED", false),
            log_violations: env_flag("ODATA_VALIDATION_LOG_VIOLATIONS", true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging (user preference)
    pub use_structured_logging: bool,

    /// User preferred minimum log level (within security constraints)
    pub min_log_level: LogLevel,

    /// Whether to tag events with the filter expression being processed
    pub include_filter_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_flag("ODATA_LOGGING_USE_STRUCTURED", false),
            min_log_level: env::var("ODATA_LOGGING_MIN_LEVEL")
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
            include_filter_context: env_flag("ODATA_LOGGING_INCLUDE_FILTER_CONTEXT", true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    /// Convert to the level type used by log events
    pub fn to_events_log_level(self) -> crate::logging::LogLevel {
        match self {
            LogLevel::Error => crate::logging::LogLevel::Error,
            LogLevel::Warning => crate::logging::LogLevel::Warning,
            LogLevel::Info => crate::logging::LogLevel::Info,
            LogLevel::Debug => crate::logging::LogLevel::Debug,
        }
    }
}

/// Parse a log level name (case-insensitive)
pub fn parse_log_level(value: &str) -> Option<LogLevel> {
    match value.trim().to_ascii_lowercase().as_str() {
        "error" => Some(LogLevel::Error),
        "warn" | "warning" => Some(LogLevel::Warning),
        "info" => Some(LogLevel::Info),
        "debug" | "trace" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level(" warn "), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warning);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert_eq!(
            LogLevel::Info.to_events_log_level(),
            crate::logging::LogLevel::Info
        );
    }
}
