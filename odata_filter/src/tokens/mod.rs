//! Token system for OData filter lexical analysis
//!
//! - **[`Token`]** - names, literals and punctuation of the filter grammar
//! - **[`TokenStream`]** - Eof-terminated stream with lookahead for the parser
//! - **[`SpannedToken`]** - tokens with their location in the filter text

pub mod token;
pub mod token_stream;

pub use token::{Token, BINARY_OPERATOR_WORDS, UNARY_OPERATOR_WORDS};
pub use token_stream::{SpannedToken, TokenStream};

pub use crate::utils::{Position, Span};
