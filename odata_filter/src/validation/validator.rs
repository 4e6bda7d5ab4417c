//! One-call filter validation

use super::error::ValidatorError;
use super::types::{ValidationMode, ValidationResult, Violation};
use super::validate_with_mode;
use crate::config::runtime::ValidationPreferences;
use crate::model::{EntityModel, ODataEntity};
use crate::rules::RuleSet;
use crate::tree::{FilterExpressionTree, TreeError};

/// Builds the expression tree and rule set, then validates the one against
/// the other
#[derive(Debug, Clone)]
pub struct FilterValidator {
    tree: FilterExpressionTree,
    rules: RuleSet,
    result: ValidationResult,
}

impl FilterValidator {
    pub fn new(filter: &str, rules: &str, model: &EntityModel) -> Result<Self, ValidatorError> {
        let mode = ValidationMode::from_preferences(&ValidationPreferences::default());
        Self::with_mode(filter, rules, model, mode)
    }

    pub fn for_entity<T: ODataEntity>(filter: &str, rules: &str) -> Result<Self, ValidatorError> {
        let model = T::entity_model().map_err(TreeError::from)?;
        Self::new(filter, rules, &model)
    }

    pub fn with_mode(
        filter: &str,
        rules: &str,
        model: &EntityModel,
        mode: ValidationMode,
    ) -> Result<Self, ValidatorError> {
        let tree = FilterExpressionTree::new(filter, model)?;
        let rules = RuleSet::deserialize(rules)?;
        Ok(Self::from_parts(tree, rules, mode))
    }

    /// Validate an already built tree and rule set
    pub fn from_parts(tree: FilterExpressionTree, rules: RuleSet, mode: ValidationMode) -> Self {
        let result = validate_with_mode(&tree, &rules, mode);
        Self {
            tree,
            rules,
            result,
        }
    }

    pub fn passed(&self) -> bool {
        self.result.passed
    }

    pub fn details(&self) -> &str {
        &self.result.details
    }

    pub fn violations(&self) -> &[Violation] {
        &self.result.violations
    }

    pub fn result(&self) -> &ValidationResult {
        &self.result
    }

    pub fn tree(&self) -> &FilterExpressionTree {
        &self.tree
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}
