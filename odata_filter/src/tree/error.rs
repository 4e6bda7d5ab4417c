use crate::logging::{codes, Code};
use crate::model::ModelError;
use crate::syntax::SyntaxError;

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("Filter expression is empty")]
    EmptyExpression,

    #[error("Cannot parse filter expression")]
    Parse {
        expression: String,
        #[source]
        source: SyntaxError,
    },

    #[error("Cannot build entity model for filter expression")]
    Model {
        #[from]
        source: ModelError,
    },
}

impl TreeError {
    pub fn error_code(&self) -> Code {
        match self {
            TreeError::EmptyExpression => codes::syntax::EMPTY_EXPRESSION,
            TreeError::Parse { source, .. } => source.error_code(),
            TreeError::Model { source } => source.error_code(),
        }
    }

    /// Underlying parser failure, if any
    pub fn syntax_error(&self) -> Option<&SyntaxError> {
        match self {
            TreeError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}
