use super::classifier::NameKind;
use crate::logging::{codes, Code};

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Cannot deserialize OData filter rules from the JSON string '{input}'")]
    Json {
        input: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot deserialize OData filter rules from the text string '{input}'")]
    Text {
        input: String,
        #[source]
        source: Box<RuleError>,
    },

    #[error("Invalid occurrence count '{value}' in rule '{rule}'")]
    InvalidCount { rule: String, value: String },

    #[error("Rule '{rule}' has no name")]
    EmptyName { rule: String },

    #[error("Duplicate {kind} rule '{name}'")]
    Duplicate { name: String, kind: NameKind },

    #[error("{what} of {actual} exceeds the limit of {limit}")]
    LimitExceeded {
        what: &'static str,
        actual: usize,
        limit: usize,
    },

    #[error("The {kind} name '{name}' cannot be written as a text rule")]
    UnrepresentableName { name: String, kind: NameKind },
}

impl RuleError {
    pub fn error_code(&self) -> Code {
        match self {
            RuleError::Json { .. } => codes::rules::INVALID_RULE_JSON,
            RuleError::Text { .. } => codes::rules::INVALID_RULE_TEXT,
            RuleError::InvalidCount { .. } => codes::rules::INVALID_RULE_COUNT,
            RuleError::EmptyName { .. } => codes::rules::EMPTY_RULE_NAME,
            RuleError::Duplicate { .. } => codes::rules::DUPLICATE_RULE,
            RuleError::LimitExceeded { .. } => codes::rules::RULE_LIMIT_EXCEEDED,
            RuleError::UnrepresentableName { .. } => codes::rules::UNREPRESENTABLE_RULE_NAME,
        }
    }

    /// Innermost error, unwrapping the text grammar wrapper
    pub fn root_cause(&self) -> &RuleError {
        match self {
            RuleError::Text { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
