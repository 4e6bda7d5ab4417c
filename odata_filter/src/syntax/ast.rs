//! Bound filter expression AST
//!
//! Property paths in the AST are already resolved against the entity model
//! and rewritten to declared names. Range variables are gone: a reference to
//! a lambda variable is replaced by the path of the collection it ranges over.

use std::fmt;

/// Slash-separated property path from the root entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PropertyPath(Vec<String>);

impl PropertyPath {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// Constant values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    String(String),
    DateTimeOffset(String),
    Date(String),
    TimeOfDay(String),
    Guid(String),
    Duration(String),
    Enum { type_name: String, value: String },
    /// Parenthesized list, the right operand of `in`
    List(Vec<Literal>),
}

impl Literal {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Literal::Null => "Null",
            Literal::Boolean(_) => "Boolean",
            Literal::Integer(_) => "Int64",
            Literal::Decimal(_) => "Double",
            Literal::String(_) => "String",
            Literal::DateTimeOffset(_) => "DateTimeOffset",
            Literal::Date(_) => "Date",
            Literal::TimeOfDay(_) => "TimeOfDay",
            Literal::Guid(_) => "Guid",
            Literal::Duration(_) => "Duration",
            Literal::Enum { .. } => "Enum",
            Literal::List(_) => "Collection",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Decimal(d) if d.is_infinite() => {
                write!(f, "{}", if *d > 0.0 { "INF" } else { "-INF" })
            }
            Literal::Decimal(d) if d.is_nan() => write!(f, "NaN"),
            Literal::Decimal(d) => write!(f, "{}", d),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::DateTimeOffset(s)
            | Literal::Date(s)
            | Literal::TimeOfDay(s)
            | Literal::Guid(s) => write!(f, "{}", s),
            Literal::Duration(s) => write!(f, "duration'{}'", s),
            Literal::Enum { type_name, value } => write!(f, "{}'{}'", type_name, value),
            Literal::List(items) => {
                let items: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                write!(f, "({})", items.join(","))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Or,
    And,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Has,
    In,
    Add,
    Sub,
    Mul,
    Div,
    DivBy,
    Mod,
}

impl BinaryOperator {
    pub const ALL: [BinaryOperator; 16] = [
        Self::Or,
        Self::And,
        Self::Eq,
        Self::Ne,
        Self::Gt,
        Self::Ge,
        Self::Lt,
        Self::Le,
        Self::Has,
        Self::In,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::DivBy,
        Self::Mod,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Has => "has",
            Self::In => "in",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::DivBy => "divby",
            Self::Mod => "mod",
        }
    }

    pub fn from_word(word: &str, case_insensitive: bool) -> Option<Self> {
        Self::ALL.into_iter().find(|op| {
            if case_insensitive {
                op.name().eq_ignore_ascii_case(word)
            } else {
                op.name() == word
            }
        })
    }

    /// Binding strength; higher binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::Ne => 3,
            Self::Gt | Self::Ge | Self::Lt | Self::Le => 4,
            Self::Add | Self::Sub => 5,
            Self::Mul | Self::Div | Self::DivBy | Self::Mod => 6,
            Self::Has | Self::In => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    Negate,
}

impl UnaryOperator {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::Negate => "negate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LambdaKind {
    Any,
    All,
}

impl LambdaKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::All => "all",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    Binary {
        operator: BinaryOperator,
        left: Box<FilterExpression>,
        right: Box<FilterExpression>,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<FilterExpression>,
    },
    /// Canonical function call; `name` is lowercase
    Function {
        name: String,
        arguments: Vec<FilterExpression>,
    },
    /// `collection/any(v: body)`; `body` is `None` for `any()`
    Lambda {
        kind: LambdaKind,
        collection: PropertyPath,
        variable: Option<String>,
        body: Option<Box<FilterExpression>>,
    },
    Property(PropertyPath),
    /// `$it`, or a range variable bound to the root entity
    Root,
    Literal(Literal),
}

impl FilterExpression {
    pub fn binary(operator: BinaryOperator, left: Self, right: Self) -> Self {
        Self::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(operator: UnaryOperator, operand: Self) -> Self {
        Self::Unary {
            operator,
            operand: Box::new(operand),
        }
    }

    pub fn property(segments: &[&str]) -> Self {
        Self::Property(PropertyPath::new(
            segments.iter().map(|s| s.to_string()).collect(),
        ))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = PropertyPath::root().child("sponsor").child("name");
        assert_eq!(path.to_string(), "sponsor/name");
        assert!(!path.is_root());
        assert!(PropertyPath::root().is_root());
    }

    #[test]
    fn test_operator_words() {
        assert_eq!(BinaryOperator::from_word("EQ", true), Some(BinaryOperator::Eq));
        assert_eq!(BinaryOperator::from_word("EQ", false), None);
        assert_eq!(BinaryOperator::from_word("divby", false), Some(BinaryOperator::DivBy));
        assert!(BinaryOperator::And.precedence() > BinaryOperator::Or.precedence());
        assert!(BinaryOperator::Mul.precedence() > BinaryOperator::Add.precedence());
    }

    #[test]
    fn test_literal_display() {
        let list = Literal::List(vec![
            Literal::String("john@mail.com".into()),
            Literal::String("o'neil".into()),
        ]);
        assert_eq!(list.to_string(), "('john@mail.com','o''neil')");
        assert_eq!(Literal::Decimal(f64::INFINITY).to_string(), "INF");
        assert_eq!(Literal::Null.kind_name(), "Null");
    }
}
