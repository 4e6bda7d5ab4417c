//! Filter validation
//!
//! Counts the operator and property names of a [`FilterExpressionTree`]
//! against the occurrence bounds of a [`RuleSet`]. Violations are reported
//! in the result; validation itself never fails.

pub mod error;
pub mod types;
mod validator;

pub use error::ValidatorError;
pub use types::{ValidationMode, ValidationResult, Violation, ViolationKind};
pub use validator::FilterValidator;

use crate::config::runtime::ValidationPreferences;
use crate::logging::codes;
use crate::rules::{NameKind, RuleMap, RuleSet};
use crate::tree::FilterExpressionTree;
use crate::{log_debug, log_performance, log_warning};
use std::collections::HashMap;
use std::time::Instant;

/// Validate with the mode selected by the runtime preferences (open by default)
pub fn validate(tree: &FilterExpressionTree, rules: &RuleSet) -> ValidationResult {
    let mode = ValidationMode::from_preferences(&ValidationPreferences::default());
    validate_with_mode(tree, rules, mode)
}

pub fn validate_with_mode(
    tree: &FilterExpressionTree,
    rules: &RuleSet,
    mode: ValidationMode,
) -> ValidationResult {
    let start = Instant::now();
    let preferences = ValidationPreferences::default();

    log_debug!("Validating filter against rules",
        "expression" => tree.expression(),
        "mode" => format!("{:?}", mode),
        "rules" => rules.len()
    );

    let mut violations = Vec::new();
    check_names(NameKind::Operator, rules.operators(), tree.operators(), mode, &mut violations);
    check_names(NameKind::Property, rules.properties(), tree.properties(), mode, &mut violations);

    if preferences.log_violations {
        for violation in &violations {
            log_warning!(code = codes::validation::RULE_VIOLATION, &violation.message(),
                "kind" => format!("{:?}", violation.kind),
                "name" => &violation.name,
                "count" => violation.count
            );
        }
    }

    let result = ValidationResult::from_violations(violations);

    if result.passed {
        log_performance!(codes::success::VALIDATION_PASSED, "Filter validation passed",
            duration = start.elapsed(),
            "operators" => tree.operators().len(),
            "properties" => tree.properties().len()
        );
    } else {
        log_warning!(code = codes::validation::VALIDATION_FAILED, "Filter validation failed",
            "violations" => result.violation_count()
        );
    }

    result
}

/// Occurrences per name ignoring case, in first-seen order with the first spelling
struct NameCounts<'a> {
    counts: Vec<(&'a str, usize)>,
    index: HashMap<String, usize>,
}

impl<'a> NameCounts<'a> {
    fn new(names: &'a [String]) -> Self {
        let mut counts: Vec<(&'a str, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for name in names {
            let key = name.to_lowercase();
            match index.get(&key) {
                Some(&position) => counts[position].1 += 1,
                None => {
                    index.insert(key, counts.len());
                    counts.push((name.as_str(), 1));
                }
            }
        }
        Self { counts, index }
    }

    fn count_of(&self, name: &str) -> usize {
        self.index
            .get(&name.to_lowercase())
            .map(|&position| self.counts[position].1)
            .unwrap_or(0)
    }
}

fn check_names(
    kind: NameKind,
    rules: &RuleMap,
    names: &[String],
    mode: ValidationMode,
    violations: &mut Vec<Violation>,
) {
    let counts = NameCounts::new(names);

    for (name, bound) in rules.iter() {
        if !bound.is_required() {
            continue;
        }
        let count = counts.count_of(name);
        if count < bound.min as usize {
            violations.push(Violation {
                kind: if count == 0 {
                    ViolationKind::Missing
                } else {
                    ViolationKind::TooFew
                },
                name_kind: kind,
                name: name.to_string(),
                count,
                bound: Some(*bound),
            });
        }
    }

    for (name, count) in &counts.counts {
        match rules.get_entry(name) {
            Some((declared, bound)) if bound.is_bounded() && *count > bound.max as usize => {
                violations.push(Violation {
                    kind: ViolationKind::TooMany,
                    name_kind: kind,
                    name: declared.to_string(),
                    count: *count,
                    bound: Some(*bound),
                });
            }
            None if mode == ValidationMode::Strict && !rules.is_empty() => {
                violations.push(Violation {
                    kind: ViolationKind::Unlisted,
                    name_kind: kind,
                    name: name.to_string(),
                    count: *count,
                    bound: None,
                });
            }
            _ => {}
        }
    }
}
