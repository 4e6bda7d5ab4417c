//! Token definitions for OData filter expressions
//!
//! Operator words (`eq`, `and`, `not`, ...) are kept as identifiers. The
//! parser decides from position whether a word is an operator or a property,
//! so a model can still declare a property named like an operator.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Word operators recognised by the parser between two operands
pub const BINARY_OPERATOR_WORDS: &[&str] = &[
    "eq", "ne", "gt", "ge", "lt", "le", "and", "or", "has", "in", "add", "sub", "mul", "div",
    "divby", "mod",
];

/// Word operators that prefix an operand
pub const UNARY_OPERATOR_WORDS: &[&str] = &["not"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    // === NAMES ===
    /// Property, function, range variable or operator word
    Identifier(String),

    // === LITERALS ===
    /// Single-quoted string with `''` unescaped
    String(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    Null,
    /// Unquoted `2021-01-02T12:00:00Z` style literal, kept verbatim
    DateTimeOffset(String),
    Date(String),
    TimeOfDay(String),
    Guid(String),
    /// `duration'P1D'` literal, holding the quoted ISO 8601 text
    Duration(String),
    /// `Namespace.Type'Member'` enum literal
    Enum { type_name: String, value: String },

    // === PUNCTUATION ===
    LeftParen,
    RightParen,
    Comma,
    Colon,
    Slash,
    Minus,

    Eof,
}

impl Token {
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::String(_)
                | Self::Integer(_)
                | Self::Decimal(_)
                | Self::Boolean(_)
                | Self::Null
                | Self::DateTimeOffset(_)
                | Self::Date(_)
                | Self::TimeOfDay(_)
                | Self::Guid(_)
                | Self::Duration(_)
                | Self::Enum { .. }
        )
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self, Self::Identifier(_))
    }

    pub fn is_punctuation(&self) -> bool {
        matches!(
            self,
            Self::LeftParen
                | Self::RightParen
                | Self::Comma
                | Self::Colon
                | Self::Slash
                | Self::Minus
        )
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Identifier comparison, optionally ignoring ASCII case
    pub fn is_word(&self, word: &str, case_insensitive: bool) -> bool {
        match self {
            Self::Identifier(name) if case_insensitive => name.eq_ignore_ascii_case(word),
            Self::Identifier(name) => name == word,
            _ => false,
        }
    }

    /// Whether the identifier spells one of the operator words
    pub fn is_operator_word(&self) -> bool {
        self.as_identifier()
            .map(|name| {
                let lower = name.to_ascii_lowercase();
                BINARY_OPERATOR_WORDS.contains(&lower.as_str())
                    || UNARY_OPERATOR_WORDS.contains(&lower.as_str())
            })
            .unwrap_or(false)
    }

    /// Short description used in parse error messages
    pub fn describe(&self) -> String {
        match self {
            Self::Identifier(name) => format!("identifier '{}'", name),
            Self::String(s) => format!("string '{}'", s),
            Self::Integer(i) => format!("number {}", i),
            Self::Decimal(d) => format!("number {}", d),
            Self::Boolean(b) => format!("boolean {}", b),
            Self::Null => "null".to_string(),
            Self::DateTimeOffset(s) | Self::Date(s) | Self::TimeOfDay(s) | Self::Guid(s) => {
                format!("literal {}", s)
            }
            Self::Duration(s) => format!("duration '{}'", s),
            Self::Enum { type_name, value } => format!("enum {}'{}'", type_name, value),
            Self::Eof => "end of expression".to_string(),
            punctuation => format!("'{}'", punctuation),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => write!(f, "{}", name),
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Null => write!(f, "null"),
            Self::DateTimeOffset(s) | Self::Date(s) | Self::TimeOfDay(s) | Self::Guid(s) => {
                write!(f, "{}", s)
            }
            Self::Duration(s) => write!(f, "duration'{}'", s),
            Self::Enum { type_name, value } => write!(f, "{}'{}'", type_name, value),
            Self::LeftParen => write!(f, "("),
            Self::RightParen => write!(f, ")"),
            Self::Comma => write!(f, ","),
            Self::Colon => write!(f, ":"),
            Self::Slash => write!(f, "/"),
            Self::Minus => write!(f, "-"),
            Self::Eof => write!(f, "<eof>"),
        }
    }
}
