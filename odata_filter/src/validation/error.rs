use crate::logging::Code;
use crate::rules::RuleError;
use crate::tree::TreeError;

/// Failure to build the inputs of a validation; violations are results
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Rules(#[from] RuleError),
}

impl ValidatorError {
    pub fn error_code(&self) -> Code {
        match self {
            ValidatorError::Tree(error) => error.error_code(),
            ValidatorError::Rules(error) => error.error_code(),
        }
    }
}
