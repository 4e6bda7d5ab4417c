//! Syntax and binding errors for filter expressions

use crate::config::compile_time::syntax::*;
use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::utils::Span;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error(transparent)]
    Lexical(#[from] LexerError),

    #[error("Filter expression is empty")]
    EmptyExpression,

    #[error("Unexpected {found}: expected {expected} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of expression: expected {expected}")]
    UnexpectedEnd { expected: String, span: Span },

    #[error("Unknown function '{name}' at {span}")]
    UnknownFunction { name: String, span: Span },

    #[error("Function '{function}' expects {expected} argument(s), found {found} at {span}")]
    InvalidArguments {
        function: String,
        expected: String,
        found: usize,
        span: Span,
    },

    #[error("Property '{property}' is not declared on type '{type_name}' at {span}")]
    UnknownProperty {
        property: String,
        type_name: String,
        span: Span,
    },

    #[error("Invalid navigation '{path}': {message} at {span}")]
    InvalidNavigation {
        path: String,
        message: String,
        span: Span,
    },

    #[error("Range variable '{name}' is not bound by an enclosing lambda at {span}")]
    UnboundRangeVariable { name: String, span: Span },

    #[error("Range variable '{name}' is already bound at {span}")]
    DuplicateRangeVariable { name: String, span: Span },

    #[error("Maximum nesting depth exceeded at {span} (max {MAX_PARSE_DEPTH} levels, {MAX_LAMBDA_DEPTH} lambdas)")]
    MaxRecursionDepth { span: Span },
}

impl SyntaxError {
    pub fn unexpected_token(expected: &str, found: &str, span: Span) -> Self {
        Self::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn unexpected_end(expected: &str, span: Span) -> Self {
        Self::UnexpectedEnd {
            expected: expected.to_string(),
            span,
        }
    }

    pub fn invalid_navigation(path: &str, message: &str, span: Span) -> Self {
        Self::InvalidNavigation {
            path: path.to_string(),
            message: message.to_string(),
            span,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            SyntaxError::Lexical(error) => error.error_code(),
            SyntaxError::EmptyExpression => codes::syntax::EMPTY_EXPRESSION,
            SyntaxError::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            SyntaxError::UnexpectedEnd { .. } => codes::syntax::UNEXPECTED_END,
            SyntaxError::UnknownFunction { .. } => codes::syntax::UNKNOWN_FUNCTION,
            SyntaxError::InvalidArguments { .. } => codes::syntax::INVALID_ARGUMENTS,
            SyntaxError::UnknownProperty { .. } => codes::model::UNKNOWN_PROPERTY,
            SyntaxError::InvalidNavigation { .. } => codes::model::INVALID_NAVIGATION,
            SyntaxError::UnboundRangeVariable { .. } => codes::model::UNBOUND_RANGE_VARIABLE,
            SyntaxError::DuplicateRangeVariable { .. } => codes::model::DUPLICATE_RANGE_VARIABLE,
            SyntaxError::MaxRecursionDepth { .. } => codes::syntax::MAX_RECURSION_DEPTH,
        }
    }

    /// Location of the failure, when known
    pub fn span(&self) -> Option<Span> {
        match self {
            SyntaxError::Lexical(error) => error.span(),
            SyntaxError::EmptyExpression => None,
            SyntaxError::UnexpectedToken { span, .. }
            | SyntaxError::UnexpectedEnd { span, .. }
            | SyntaxError::UnknownFunction { span, .. }
            | SyntaxError::InvalidArguments { span, .. }
            | SyntaxError::UnknownProperty { span, .. }
            | SyntaxError::InvalidNavigation { span, .. }
            | SyntaxError::UnboundRangeVariable { span, .. }
            | SyntaxError::DuplicateRangeVariable { span, .. }
            | SyntaxError::MaxRecursionDepth { span } => Some(*span),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_errors_keep_their_code() {
        let error: SyntaxError = LexerError::TooManyTokens { count: 10 }.into();
        assert_eq!(error.error_code(), codes::lexical::TOO_MANY_TOKENS);
        assert!(error.span().is_none());
    }

    #[test]
    fn test_binding_error_codes() {
        let error = SyntaxError::UnknownProperty {
            property: "foo".into(),
            type_name: "User".into(),
            span: Span::default(),
        };
        assert_eq!(error.error_code(), codes::model::UNKNOWN_PROPERTY);
        assert!(error.to_string().contains("'foo'"));
    }
}
