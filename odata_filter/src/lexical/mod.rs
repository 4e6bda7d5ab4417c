//! Lexical analysis module
//!
//! Tokenizes OData filter expressions under the compile-time security limits.

pub mod analyzer;

use crate::config::runtime::LexicalPreferences;
use crate::tokens::TokenStream;

pub use analyzer::{LexerError, LexicalAnalyzer, LexicalMetrics};

/// Tokenize a filter expression with default preferences
pub fn tokenize(expression: &str) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::new().tokenize(expression)
}

/// Tokenize with custom runtime preferences (security limits stay compile-time)
pub fn tokenize_with_preferences(
    expression: &str,
    preferences: LexicalPreferences,
) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::with_preferences(preferences).tokenize(expression)
}
