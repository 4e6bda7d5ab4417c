//! Consolidated error codes and classification system
//!
//! Single source of truth for all error codes, their metadata, and classification functions.
//! This module combines code constants with their behavioral metadata in one place.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const INVALID_NUMBER: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
    pub const EXPRESSION_TOO_LONG: Code = Code::new("E029");
}

/// Filter syntax error codes
pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_END: Code = Code::new("E040");
    pub const EMPTY_EXPRESSION: Code = Code::new("E041");
    pub const UNEXPECTED_TOKEN: Code = Code::new("E050");
    pub const UNKNOWN_FUNCTION: Code = Code::new("E051");
    pub const INVALID_ARGUMENTS: Code = Code::new("E052");
    pub const MAX_RECURSION_DEPTH: Code = Code::new("E087");
}

/// Entity model and property binding error codes
pub mod model {
    use super::Code;

    pub const UNKNOWN_PROPERTY: Code = Code::new("E060");
    pub const INVALID_NAVIGATION: Code = Code::new("E061");
    pub const UNBOUND_RANGE_VARIABLE: Code = Code::new("E062");
    pub const DUPLICATE_RANGE_VARIABLE: Code = Code::new("E063");
    pub const INVALID_MODEL: Code = Code::new("E064");
    pub const UNKNOWN_ENTITY_TYPE: Code = Code::new("E065");
    pub const MODEL_IO_ERROR: Code = Code::new("E066");
}

/// Filter tree construction error codes
pub mod tree {
    use super::Code;

    pub const TREE_CONSTRUCTION_FAILURE: Code = Code::new("E100");
}

/// Rule grammar error codes
pub mod rules {
    use super::Code;

    pub const INVALID_RULE_JSON: Code = Code::new("E120");
    pub const INVALID_RULE_TEXT: Code = Code::new("E121");
    pub const INVALID_RULE_COUNT: Code = Code::new("E122");
    pub const EMPTY_RULE_NAME: Code = Code::new("E123");
    pub const DUPLICATE_RULE: Code = Code::new("E124");
    pub const RULE_LIMIT_EXCEEDED: Code = Code::new("E125");
    pub const UNREPRESENTABLE_RULE_NAME: Code = Code::new("E126");
}

/// Rule validation codes
pub mod validation {
    use super::Code;

    pub const RULE_VIOLATION: Code = Code::new("W140");
    pub const VALIDATION_FAILED: Code = Code::new("E141");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const FILTER_PARSED: Code = Code::new("I040");
    pub const MODEL_LOADED: Code = Code::new("I060");
    pub const TREE_BUILT: Code = Code::new("I100");
    pub const RULES_PARSED: Code = Code::new("I120");
    pub const VALIDATION_PASSED: Code = Code::new("I140");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        use Severity::*;

        // (code, category, severity, recoverable, requires_halt, description, action)
        let entries = [
            ("ERR001", "System", Critical, false, true,
                "Critical internal error", "File a bug report with the failing input"),
            ("E020", "Lexical", High, false, false,
                "Invalid character in filter expression", "Remove or quote the character"),
            ("E021", "Lexical", High, false, false,
                "Unterminated string literal", "Close the literal with a single quote"),
            ("E022", "Lexical", High, false, false,
                "Malformed numeric literal", "Fix the number format"),
            ("E023", "Lexical", Medium, false, false,
                "Identifier exceeds the maximum length", "Shorten the identifier"),
            ("E024", "Lexical", Medium, false, false,
                "String literal exceeds the maximum size", "Shorten the literal"),
            ("E027", "Lexical", High, false, true,
                "Filter expression produced too many tokens", "Simplify the filter expression"),
            ("E029", "Lexical", High, false, true,
                "Filter expression exceeds the maximum length", "Shorten the filter expression"),
            ("E040", "Syntax", High, false, false,
                "Filter expression ended unexpectedly", "Complete the expression"),
            ("E041", "Syntax", High, false, false,
                "Filter expression is empty", "Provide a non-empty filter expression"),
            ("E050", "Syntax", High, false, false,
                "Unexpected token in filter expression", "Check the OData filter syntax"),
            ("E051", "Syntax", High, false, false,
                "Unknown function", "Use an OData canonical function"),
            ("E052", "Syntax", High, false, false,
                "Wrong number of function arguments", "Check the function signature"),
            ("E087", "Syntax", High, false, true,
                "Filter expression nesting too deep", "Reduce nesting of the filter expression"),
            ("E060", "Model", High, false, false,
                "Property not found on the entity type", "Check the property name against the model"),
            ("E061", "Model", High, false, false,
                "Invalid navigation in property path", "Navigate only through structured properties"),
            ("E062", "Model", High, false, false,
                "Range variable used outside its lambda", "Declare the variable in an any/all lambda"),
            ("E063", "Model", High, false, false,
                "Range variable declared twice", "Use a distinct lambda variable name"),
            ("E064", "Model", High, false, true,
                "Entity model definition is invalid", "Fix the model definition"),
            ("E065", "Model", High, false, true,
                "Entity type not found in model", "Declare the entity type in the model"),
            ("E066", "Model", High, false, true,
                "Entity model file could not be read", "Check the model file path"),
            ("E100", "Tree", High, false, false,
                "Cannot build filter expression tree", "Fix the filter expression"),
            ("E120", "Rules", High, false, true,
                "Rule JSON is malformed", "Fix the JSON rule document"),
            ("E121", "Rules", High, false, true,
                "Rule text is malformed", "Fix the pipe-delimited rule text"),
            ("E122", "Rules", High, false, true,
                "Rule occurrence count is not a number", "Use non-negative integers for min/max"),
            ("E123", "Rules", High, false, true,
                "Rule name is empty", "Provide an operator or property name"),
            ("E124", "Rules", High, false, true,
                "Rule name defined twice", "Remove the duplicate rule"),
            ("E125", "Rules", High, false, true,
                "Rule set exceeds configured limits", "Reduce the number or size of rules"),
            ("E126", "Rules", Medium, true, false,
                "Rule name cannot be written in the text grammar", "Use the JSON format"),
            ("W140", "Validation", Low, true, false,
                "Filter expression violates a rule", "Adjust the filter or the rules"),
            ("E141", "Validation", Medium, true, false,
                "Filter expression failed rule validation", "Review the violation details"),
            ("I004", "Success", Low, true, false,
                "Logging system initialized", "Continue processing"),
            ("I020", "Success", Low, true, false,
                "Tokenization completed", "Continue to parsing"),
            ("I040", "Success", Low, true, false,
                "Filter expression parsed", "Continue to tree construction"),
            ("I060", "Success", Low, true, false,
                "Entity model loaded", "Continue processing"),
            ("I100", "Success", Low, true, false,
                "Filter expression tree built", "Continue to validation"),
            ("I120", "Success", Low, true, false,
                "Rule set parsed", "Continue to validation"),
            ("I140", "Success", Low, true, false,
                "Filter expression passed rule validation", "No action required"),
        ];

        entries
            .into_iter()
            .map(
                |(code, category, severity, recoverable, halt, description, action)| {
                    (
                        code,
                        ErrorMetadata::new(
                            code,
                            category,
                            severity,
                            recoverable,
                            halt,
                            description,
                            action,
                        ),
                    )
                },
            )
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific error code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_declared_code_has_metadata() {
        let declared = [
            system::INTERNAL_ERROR,
            lexical::INVALID_CHARACTER,
            lexical::UNTERMINATED_STRING,
            lexical::INVALID_NUMBER,
            lexical::IDENTIFIER_TOO_LONG,
            lexical::STRING_TOO_LARGE,
            lexical::TOO_MANY_TOKENS,
            lexical::EXPRESSION_TOO_LONG,
            syntax::UNEXPECTED_END,
            syntax::EMPTY_EXPRESSION,
            syntax::UNEXPECTED_TOKEN,
            syntax::UNKNOWN_FUNCTION,
            syntax::INVALID_ARGUMENTS,
            syntax::MAX_RECURSION_DEPTH,
            model::UNKNOWN_PROPERTY,
            model::INVALID_NAVIGATION,
            model::UNBOUND_RANGE_VARIABLE,
            model::DUPLICATE_RANGE_VARIABLE,
            model::INVALID_MODEL,
            model::UNKNOWN_ENTITY_TYPE,
            model::MODEL_IO_ERROR,
            tree::TREE_CONSTRUCTION_FAILURE,
            rules::INVALID_RULE_JSON,
            rules::INVALID_RULE_TEXT,
            rules::INVALID_RULE_COUNT,
            rules::EMPTY_RULE_NAME,
            rules::DUPLICATE_RULE,
            rules::RULE_LIMIT_EXCEEDED,
            rules::UNREPRESENTABLE_RULE_NAME,
            validation::RULE_VIOLATION,
            validation::VALIDATION_FAILED,
            success::SYSTEM_INITIALIZATION_COMPLETED,
            success::TOKENIZATION_COMPLETE,
            success::FILTER_PARSED,
            success::MODEL_LOADED,
            success::TREE_BUILT,
            success::RULES_PARSED,
            success::VALIDATION_PASSED,
        ];

        for code in declared {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("X999"), "Unknown error");
        assert_eq!(get_category("X999"), "Unknown");
        assert_eq!(get_severity("X999"), Severity::Medium);
        assert!(is_recoverable("X999"));
        assert!(!requires_halt("X999"));
    }

    #[test]
    fn test_rule_codes_halt() {
        assert!(requires_halt(rules::DUPLICATE_RULE.as_str()));
        assert_eq!(get_category(rules::DUPLICATE_RULE.as_str()), "Rules");
        assert!(!requires_halt(validation::RULE_VIOLATION.as_str()));
    }
}
