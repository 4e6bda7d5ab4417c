//! Name classifier for single text rules of the form `{prefix:}name{:counts}`

use super::error::RuleError;
use crate::config::compile_time::rules::MAX_NAME_LENGTH;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Operator names recognised without an `o:` prefix
pub const KNOWN_OPERATORS: &[&str] = &[
    "not", "and", "or", "eq", "ne", "gt", "ge", "lt", "le", "in", "has", "startswith",
    "endswith", "contains", "any", "all",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameKind {
    Operator,
    Property,
}

impl NameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NameKind::Operator => "operator",
            NameKind::Property => "property",
        }
    }

    /// Prefix used when writing the text grammar
    pub fn prefix(&self) -> &'static str {
        match self {
            NameKind::Operator => "o",
            NameKind::Property => "p",
        }
    }
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedName {
    pub name: String,
    pub kind: NameKind,
    pub min: u32,
    pub max: u32,
}

fn counts_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]*[,]{0,1}[0-9]*$").expect("valid counts pattern"))
}

pub(crate) fn looks_like_counts(part: &str) -> bool {
    counts_pattern().is_match(part)
}

/// Classify one text rule.
///
/// With two `:`-separated parts the second is read as counts whenever it
/// looks numeric, so `p:123` names `p` with a count of 123.
pub fn classify(token: &str) -> Result<ClassifiedName, RuleError> {
    let parts: Vec<&str> = token.split(':').map(str::trim).collect();

    let (prefix, name, counts) = match parts.as_slice() {
        [prefix, name, counts, ..] => (Some(*prefix), *name, Some(*counts)),
        [name, second] if looks_like_counts(second) => (None, *name, Some(*second)),
        [prefix, name] => (Some(*prefix), *name, None),
        [name] => (None, *name, None),
        [] => (None, "", None),
    };

    if name.is_empty() {
        return Err(RuleError::EmptyName {
            rule: token.to_string(),
        });
    }
    let length = name.chars().count();
    if length > MAX_NAME_LENGTH {
        return Err(RuleError::LimitExceeded {
            what: "rule name length",
            actual: length,
            limit: MAX_NAME_LENGTH,
        });
    }

    let (min, max) = match counts {
        Some(counts) => parse_counts(token, counts)?,
        None => (0, 0),
    };

    Ok(ClassifiedName {
        name: name.to_string(),
        kind: determine_kind(prefix, name),
        min,
        max,
    })
}

fn parse_counts(rule: &str, counts: &str) -> Result<(u32, u32), RuleError> {
    let segments: Vec<&str> = counts.split(',').map(str::trim).collect();
    match segments.as_slice() {
        [min, max, ..] => Ok((parse_count(rule, min)?, parse_count(rule, max)?)),
        [single] => {
            let value = parse_count(rule, single)?;
            Ok((value, value))
        }
        [] => Ok((0, 0)),
    }
}

fn parse_count(rule: &str, value: &str) -> Result<u32, RuleError> {
    if value.is_empty() {
        return Ok(0);
    }
    value.parse().map_err(|_| RuleError::InvalidCount {
        rule: rule.to_string(),
        value: value.to_string(),
    })
}

fn determine_kind(prefix: Option<&str>, name: &str) -> NameKind {
    match prefix.and_then(|p| p.chars().next()) {
        Some('o') | Some('O') => return NameKind::Operator,
        Some('p') | Some('P') => return NameKind::Property,
        _ => {}
    }

    if name.contains('/') {
        return NameKind::Property;
    }

    if KNOWN_OPERATORS
        .iter()
        .any(|op| op.eq_ignore_ascii_case(name))
    {
        NameKind::Operator
    } else {
        NameKind::Property
    }
}
