//! Shared utility types for the filter lexer, parser and tree builder.

pub mod span;

pub use span::{Position, Span};
