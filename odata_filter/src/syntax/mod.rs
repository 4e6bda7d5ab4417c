//! Syntax analysis - filter text to bound expression
//!
//! Parsing and model binding happen in one pass: property paths are
//! resolved against the [`EntityModel`] as they are read, and lambda range
//! variables are replaced by the collection path they range over.

pub mod ast;
mod error;
mod parser;

pub use ast::{BinaryOperator, FilterExpression, LambdaKind, Literal, PropertyPath, UnaryOperator};
pub use error::{SyntaxError, SyntaxResult};
pub use parser::{function_arity, FilterParser, ODataFilterParser};

use crate::logging::codes;
use crate::model::EntityModel;
use crate::{log_error, log_success};

/// Parse `expression` against `model` with the default parser, logging the outcome
pub fn parse_filter(expression: &str, model: &EntityModel) -> SyntaxResult<FilterExpression> {
    parse_filter_with(&ODataFilterParser::new(), expression, model)
}

/// Parse with a specific parser implementation
pub fn parse_filter_with(
    parser: &dyn FilterParser,
    expression: &str,
    model: &EntityModel,
) -> SyntaxResult<FilterExpression> {
    let result = parser.parse_filter(expression, model);

    match &result {
        Ok(_) => {
            log_success!(codes::success::FILTER_PARSED, "Filter expression parsed",
                "entity" => model.entity_type().unwrap_or("(untyped)")
            );
        }
        Err(error) => match error.span() {
            Some(span) => {
                log_error!(error.error_code(), "Filter expression rejected", span = span,
                    "error" => error
                );
            }
            None => {
                log_error!(error.error_code(), "Filter expression rejected",
                    "error" => error
                );
            }
        },
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_filter_untyped() {
        let expression = parse_filter("a eq 1", &EntityModel::untyped()).unwrap();
        assert_matches!(expression, FilterExpression::Binary { operator: BinaryOperator::Eq, .. });
    }

    #[test]
    fn test_parse_filter_reports_error() {
        let error = parse_filter("a eq", &EntityModel::untyped()).unwrap_err();
        assert_eq!(error.error_code(), codes::syntax::UNEXPECTED_END);
        assert!(error.span().is_some());
    }
}
