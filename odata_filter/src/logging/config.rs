//! Configuration module for logging - using compile-time constants
//!
//! Security boundaries come from the build profile; user preferences can only
//! make logging more verbose, never quieter than the compiled floor.

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

type EventsLogLevel = crate::logging::events::LogLevel;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Initialize runtime preferences
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized".to_string())
}

/// Get runtime preferences (with fallback to environment defaults)
fn get_runtime_preferences() -> &'static LoggingPreferences {
    RUNTIME_PREFERENCES.get_or_init(LoggingPreferences::default)
}

/// Level that can never be filtered out, from the build profile
pub fn get_security_log_level() -> EventsLogLevel {
    match SECURITY_MIN_LOG_LEVEL {
        0 => EventsLogLevel::Error,
        1 => EventsLogLevel::Warning,
        2 => EventsLogLevel::Info,
        _ => EventsLogLevel::Debug,
    }
}

/// Get minimum log level (user preference, raised to the security floor)
pub fn get_min_log_level() -> EventsLogLevel {
    let user_level = get_runtime_preferences().min_log_level.to_events_log_level();
    user_level.max(get_security_log_level())
}

/// Check if structured logging is enabled (user preference)
pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

/// Whether events are tagged with the filter currently being processed
pub fn include_filter_context() -> bool {
    get_runtime_preferences().include_filter_context
}

pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

/// Validate the compiled logging limits
pub fn validate_config() -> Result<(), String> {
    if MAX_LOG_MESSAGE_LENGTH == 0 {
        return Err("max_log_message_length must be greater than zero".to_string());
    }
    if SECURITY_MIN_LOG_LEVEL > 2 {
        return Err(format!(
            "security_min_log_level {} would allow errors to be filtered",
            SECURITY_MIN_LOG_LEVEL
        ));
    }
    Ok(())
}

/// Human-readable configuration summary
pub fn get_config_summary() -> String {
    format!(
        "Logging Configuration ({}):\n  Min level: {}\n  Security level: {}\n  Structured: {}\n  Filter context: {}\n  Max message length: {}",
        crate::config::build_info::source_info(),
        get_min_log_level().as_str(),
        get_security_log_level().as_str(),
        use_structured_logging(),
        include_filter_context(),
        MAX_LOG_MESSAGE_LENGTH,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn test_min_level_respects_security_floor() {
        assert!(get_min_log_level() >= get_security_log_level());
    }

    #[test]
    fn test_config_summary() {
        let summary = get_config_summary();
        assert!(summary.contains("Min level"));
        assert!(summary.contains(".toml"));
    }
}
