//! Operator/Operand nodes of a filter expression tree

use crate::syntax::{FilterExpression, LambdaKind, Literal};
use std::fmt;

/// Origin of a node in the parsed expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    BinaryOperator,
    UnaryOperator,
    FunctionCall,
    Any,
    All,
    PropertyAccess,
    Constant,
    RangeVariable,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::BinaryOperator => "BinaryOperator",
            NodeKind::UnaryOperator => "UnaryOperator",
            NodeKind::FunctionCall => "FunctionCall",
            NodeKind::Any => "Any",
            NodeKind::All => "All",
            NodeKind::PropertyAccess => "PropertyAccess",
            NodeKind::Constant => "Constant",
            NodeKind::RangeVariable => "RangeVariable",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperatorNode {
    pub name: String,
    pub kind: NodeKind,
    /// Operands in source order; binary operators have exactly two
    pub children: Vec<FilterNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperandNode {
    /// Declared property path such as `sponsor/name/givenName`
    Property(String),
    Literal(Literal),
    /// `$it`
    Root,
}

/// A tree node is exactly one of operator or operand
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Operator(OperatorNode),
    Operand(OperandNode),
}

impl FilterNode {
    pub fn operator(name: impl Into<String>, kind: NodeKind, children: Vec<FilterNode>) -> Self {
        FilterNode::Operator(OperatorNode {
            name: name.into(),
            kind,
            children,
        })
    }

    pub fn property(path: impl Into<String>) -> Self {
        FilterNode::Operand(OperandNode::Property(path.into()))
    }

    pub fn literal(value: Literal) -> Self {
        FilterNode::Operand(OperandNode::Literal(value))
    }

    /// Convert a bound expression; lambda bodies are inlined under the
    /// `any`/`all` operator since range variables already resolve to
    /// collection paths.
    pub fn from_expression(expression: &FilterExpression) -> Self {
        match expression {
            FilterExpression::Binary {
                operator,
                left,
                right,
            } => Self::operator(
                operator.name(),
                NodeKind::BinaryOperator,
                vec![Self::from_expression(left), Self::from_expression(right)],
            ),
            FilterExpression::Unary { operator, operand } => Self::operator(
                operator.name(),
                NodeKind::UnaryOperator,
                vec![Self::from_expression(operand)],
            ),
            FilterExpression::Function { name, arguments } => Self::operator(
                name.clone(),
                NodeKind::FunctionCall,
                arguments.iter().map(Self::from_expression).collect(),
            ),
            FilterExpression::Lambda {
                kind,
                collection,
                body,
                ..
            } => {
                let node_kind = match kind {
                    LambdaKind::Any => NodeKind::Any,
                    LambdaKind::All => NodeKind::All,
                };
                let child = match body {
                    Some(body) => Self::from_expression(body),
                    None => Self::property(collection.to_string()),
                };
                Self::operator(kind.name(), node_kind, vec![child])
            }
            FilterExpression::Property(path) => Self::property(path.to_string()),
            FilterExpression::Root => FilterNode::Operand(OperandNode::Root),
            FilterExpression::Literal(value) => Self::literal(value.clone()),
        }
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, FilterNode::Operator(_))
    }

    pub fn is_operand(&self) -> bool {
        matches!(self, FilterNode::Operand(_))
    }

    pub fn operator_name(&self) -> Option<&str> {
        match self {
            FilterNode::Operator(op) => Some(&op.name),
            FilterNode::Operand(_) => None,
        }
    }

    pub fn property_path(&self) -> Option<&str> {
        match self {
            FilterNode::Operand(OperandNode::Property(path)) => Some(path),
            _ => None,
        }
    }

    pub fn literal_value(&self) -> Option<&Literal> {
        match self {
            FilterNode::Operand(OperandNode::Literal(value)) => Some(value),
            _ => None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            FilterNode::Operator(op) => op.kind,
            FilterNode::Operand(OperandNode::Property(_)) => NodeKind::PropertyAccess,
            FilterNode::Operand(OperandNode::Literal(_)) => NodeKind::Constant,
            FilterNode::Operand(OperandNode::Root) => NodeKind::RangeVariable,
        }
    }

    pub fn children(&self) -> &[FilterNode] {
        match self {
            FilterNode::Operator(op) => &op.children,
            FilterNode::Operand(_) => &[],
        }
    }

    pub fn left(&self) -> Option<&FilterNode> {
        self.children().first()
    }

    pub fn right(&self) -> Option<&FilterNode> {
        self.children().get(1)
    }

    /// Pre-order walk, children left to right
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a FilterNode),
    {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Node text without indentation, as printed in a tree listing
    pub fn label(&self, with_labels: bool, with_node_kind: bool) -> String {
        let (label, text) = match self {
            FilterNode::Operator(op) => ("OPERATOR", op.name.clone()),
            FilterNode::Operand(OperandNode::Property(path)) => ("PROPERTY", path.clone()),
            FilterNode::Operand(OperandNode::Literal(value)) => ("VALUE", value.to_string()),
            FilterNode::Operand(OperandNode::Root) => ("PROPERTY", "$it".to_string()),
        };

        let mut line = if with_labels {
            format!("{}: {}", label, text)
        } else {
            text
        };
        if with_node_kind {
            line.push_str(&format!(" ({})", self.kind()));
        }
        line
    }

    /// Indented listing of this node and its subtree
    pub fn write_tree(
        &self,
        out: &mut String,
        depth: usize,
        with_labels: bool,
        with_node_kind: bool,
    ) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&self.label(with_labels, with_node_kind));
        out.push('\n');
        for child in self.children() {
            child.write_tree(out, depth + 1, with_labels, with_node_kind);
        }
    }
}
