//! OData `$filter` rule validation
//!
//! Parses a filter expression against an entity model, collects the
//! operators and properties it uses, and checks them against occurrence
//! rules written as JSON or as the pipe-delimited text grammar.
//!
//! ```no_run
//! use odata_filter::{EntityModel, FilterValidator};
//!
//! let model = EntityModel::from_file("user.json")?;
//! let validator = FilterValidator::new(
//!     "type eq 'Employee' and startsWith(name/givenName, 'john')",
//!     "eq|and:1|startsWith|type|name/givenName",
//!     &model,
//! )?;
//! if !validator.passed() {
//!     eprintln!("{}", validator.details());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod model;
pub mod rules;
pub mod syntax;
pub mod tokens;
pub mod tree;
pub mod utils;
pub mod validation;

// Re-export key types for library consumers
pub use model::{EntityModel, ModelError, ODataEntity};
pub use rules::{classify, ClassifiedName, NameKind, OccurrenceBound, RuleError, RuleMap, RuleSet};
pub use syntax::{FilterExpression, FilterParser, ODataFilterParser, SyntaxError};
pub use tree::{FilterExpressionTree, FilterNode, TreeError, TreePrintOptions};
pub use validation::{
    validate, validate_with_mode, FilterValidator, ValidationMode, ValidationResult,
    ValidatorError, Violation, ViolationKind,
};
