//! Filter expression tree
//!
//! Parses a `$filter` expression against an entity model and flattens it
//! into Operator/Operand nodes. Operator and property names are collected
//! in pre-order with duplicates retained, which is what the validator counts.

mod error;
mod node;

pub use error::TreeError;
pub use node::{FilterNode, NodeKind, OperandNode, OperatorNode};

use crate::logging::{codes, with_filter_context};
use crate::model::{EntityModel, ODataEntity, SchemaElement};
use crate::syntax::{self, FilterParser, ODataFilterParser};
use crate::{log_error, log_performance};
use std::fmt;
use std::time::Instant;

/// Options for [`FilterExpressionTree::format_tree`]
#[derive(Debug, Clone, Copy)]
pub struct TreePrintOptions {
    pub with_labels: bool,
    pub with_node_kind: bool,
    pub with_details: bool,
    pub line_length: usize,
}

impl Default for TreePrintOptions {
    fn default() -> Self {
        Self {
            with_labels: false,
            with_node_kind: false,
            with_details: false,
            line_length: 72,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterExpressionTree {
    expression: String,
    root: FilterNode,
    operators: Vec<String>,
    properties: Vec<String>,
    schema: Vec<SchemaElement>,
}

impl FilterExpressionTree {
    pub fn new(expression: &str, model: &EntityModel) -> Result<Self, TreeError> {
        Self::with_parser(&ODataFilterParser::new(), expression, model)
    }

    /// Build against the model supplied by `T`
    pub fn for_entity<T: ODataEntity>(expression: &str) -> Result<Self, TreeError> {
        let model = T::entity_model().map_err(|error| {
            log_error!(codes::tree::TREE_CONSTRUCTION_FAILURE, "Cannot build entity model",
                "error" => &error
            );
            error
        })?;
        Self::new(expression, &model)
    }

    /// Build without a model; property paths are taken as written
    pub fn untyped(expression: &str) -> Result<Self, TreeError> {
        Self::new(expression, &EntityModel::untyped())
    }

    pub fn with_parser(
        parser: &dyn FilterParser,
        expression: &str,
        model: &EntityModel,
    ) -> Result<Self, TreeError> {
        if expression.trim().is_empty() {
            log_error!(codes::syntax::EMPTY_EXPRESSION, "Filter expression is empty");
            return Err(TreeError::EmptyExpression);
        }

        with_filter_context(expression, model.entity_type(), || {
            let start = Instant::now();

            let parsed = syntax::parse_filter_with(parser, expression, model).map_err(|source| {
                TreeError::Parse {
                    expression: expression.to_string(),
                    source,
                }
            })?;

            let root = FilterNode::from_expression(&parsed);
            let mut operators = Vec::new();
            let mut properties = Vec::new();
            root.walk(&mut |node| {
                if let Some(name) = node.operator_name() {
                    operators.push(name.to_string());
                } else if let Some(path) = node.property_path() {
                    properties.push(path.to_string());
                }
            });

            log_performance!(codes::success::TREE_BUILT, "Filter expression tree built",
                duration = start.elapsed(),
                "operators" => operators.len(),
                "properties" => properties.len()
            );

            Ok(Self {
                expression: expression.to_string(),
                root,
                operators,
                properties,
                schema: model.schema_elements(),
            })
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn root(&self) -> &FilterNode {
        &self.root
    }

    /// Operator names in pre-order, duplicates retained
    pub fn operators(&self) -> &[String] {
        &self.operators
    }

    /// Property paths in pre-order, duplicates retained
    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    pub fn schema_elements(&self) -> &[SchemaElement] {
        &self.schema
    }

    /// Distinct operators and properties, sorted ignoring case
    pub fn format_details(&self) -> String {
        let mut out = format!("OPERATORS : {}", distinct_sorted(&self.operators).join(","));
        if !self.properties.is_empty() {
            out.push('\n');
            out.push_str(&format!(
                "PROPERTIES: {}",
                distinct_sorted(&self.properties).join(",")
            ));
        }
        out
    }

    pub fn format_schema(&self) -> String {
        let mut out = String::from("ODATA SCHEMA ELEMENTS:");
        for element in &self.schema {
            out.push_str(&format!("\n- {}: {}", element.full_name, element.kind));
        }
        out
    }

    pub fn format_tree(&self, options: TreePrintOptions) -> String {
        let rule = "-".repeat(options.line_length);
        let mut out = String::new();

        out.push_str(&rule);
        out.push('\n');
        if options.with_labels {
            out.push_str("EXPRESSION: ");
        }
        out.push_str(&self.expression);
        out.push('\n');
        out.push_str(&rule);
        out.push('\n');

        self.root
            .write_tree(&mut out, 0, options.with_labels, options.with_node_kind);

        if options.with_details {
            out.push('\n');
            out.push_str(&self.format_details());
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for FilterExpressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_tree(TreePrintOptions::default()))
    }
}

fn distinct_sorted(names: &[String]) -> Vec<&str> {
    let mut distinct: Vec<&str> = Vec::new();
    for name in names {
        if !distinct.contains(&name.as_str()) {
            distinct.push(name);
        }
    }
    distinct.sort_by_key(|name| name.to_uppercase());
    distinct
}
