//! Validation results

use crate::config::runtime::ValidationPreferences;
use crate::rules::{NameKind, OccurrenceBound};
use serde::Serialize;
use std::fmt;

/// How names without a rule entry are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ValidationMode {
    /// Unlisted names are allowed
    #[default]
    Open,
    /// Unlisted names are violations when rules of their kind exist
    Strict,
}

impl ValidationMode {
    pub fn from_preferences(preferences: &ValidationPreferences) -> Self {
        if preferences.deny_unlisted {
            ValidationMode::Strict
        } else {
            ValidationMode::Open
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ViolationKind {
    /// Required name does not occur
    Missing,
    /// Occurs fewer times than the minimum
    TooFew,
    /// Occurs more times than the maximum
    TooMany,
    /// No rule entry in strict mode
    Unlisted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub name_kind: NameKind,
    pub name: String,
    pub count: usize,
    /// Bound of the matching rule; `None` for unlisted names
    pub bound: Option<OccurrenceBound>,
}

impl Violation {
    pub fn message(&self) -> String {
        let min = self.bound.map(|b| b.min).unwrap_or(0);
        let max = self.bound.map(|b| b.max).unwrap_or(0);
        match self.kind {
            ViolationKind::Missing => format!(
                "Required {} '{}' is missing (expected at least {}).",
                self.name_kind, self.name, min
            ),
            ViolationKind::TooFew => format!(
                "The {} '{}' occurs {} time(s) but at least {} required.",
                self.name_kind, self.name, self.count, min
            ),
            ViolationKind::TooMany => format!(
                "The {} '{}' occurs {} time(s) but at most {} allowed.",
                self.name_kind, self.name, self.count, max
            ),
            ViolationKind::Unlisted => {
                format!("The {} '{}' is not allowed.", self.name_kind, self.name)
            }
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub passed: bool,
    /// Violation messages joined by a space; empty on pass
    pub details: String,
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            passed: true,
            details: String::new(),
            violations: Vec::new(),
        }
    }

    pub fn from_violations(violations: Vec<Violation>) -> Self {
        if violations.is_empty() {
            return Self::success();
        }
        let details = violations
            .iter()
            .map(Violation::message)
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            passed: false,
            details,
            violations,
        }
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn has_violation(&self, kind: ViolationKind, name: &str) -> bool {
        self.violations
            .iter()
            .any(|v| v.kind == kind && v.name.eq_ignore_ascii_case(name))
    }
}
