//! Entity model errors

use crate::logging::{codes, Code};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid entity model: {message}")]
    InvalidModel { message: String },

    #[error("Entity type '{name}' is not declared in the model")]
    UnknownEntityType { name: String },

    #[error("Cannot parse JSON entity model")]
    Json {
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot parse TOML entity model")]
    Toml {
        #[source]
        source: toml::de::Error,
    },

    #[error("Cannot read entity model file '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ModelError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidModel {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            ModelError::InvalidModel { .. } | ModelError::Json { .. } | ModelError::Toml { .. } => {
                codes::model::INVALID_MODEL
            }
            ModelError::UnknownEntityType { .. } => codes::model::UNKNOWN_ENTITY_TYPE,
            ModelError::Io { .. } => codes::model::MODEL_IO_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ModelError::invalid("x").error_code(),
            codes::model::INVALID_MODEL
        );
        assert_eq!(
            ModelError::UnknownEntityType {
                name: "User".into()
            }
            .error_code(),
            codes::model::UNKNOWN_ENTITY_TYPE
        );
    }
}
