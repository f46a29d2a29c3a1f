//! Selector terms
//!
//! A term is one `field operator value` condition produced by the selector
//! parser. Terms nest: a group is an ordered sequence of nodes that must all
//! hold.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Term value: the parser hands over either text or a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermValue {
    Number(Number),
    Text(String),
}

impl TermValue {
    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        TermValue::Text(value.into())
    }

    /// Create a numeric value. Non-finite numbers have no JSON form and become text.
    pub fn number(value: f64) -> Self {
        match Number::from_f64(value) {
            Some(n) => TermValue::Number(n),
            None => TermValue::Text(value.to_string()),
        }
    }

    /// Returns the value as a JSON literal, unmodified
    pub fn to_json(&self) -> Value {
        match self {
            TermValue::Number(n) => Value::Number(n.clone()),
            TermValue::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for TermValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermValue::Number(n) => write!(f, "{}", n),
            TermValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for TermValue {
    fn from(value: &str) -> Self {
        TermValue::text(value)
    }
}

impl From<String> for TermValue {
    fn from(value: String) -> Self {
        TermValue::Text(value)
    }
}

impl From<i64> for TermValue {
    fn from(value: i64) -> Self {
        TermValue::Number(Number::from(value))
    }
}

impl From<i32> for TermValue {
    fn from(value: i32) -> Self {
        TermValue::Number(Number::from(value))
    }
}

impl From<f64> for TermValue {
    fn from(value: f64) -> Self {
        TermValue::number(value)
    }
}

/// A single selector condition
///
/// The operator is kept as the raw symbol the parser produced; whether it is
/// supported is decided by the operator registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    /// Field path, dotted for nested fields (e.g. `_digger.left`)
    pub field: String,
    /// Operator symbol, e.g. `=`, `^=`, `<=`
    pub operator: String,
    /// Comparison value
    pub value: TermValue,
}

impl Term {
    /// Creates a term
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<TermValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}{}{}]", self.field, self.operator, self.value)
    }
}

/// A term or an AND-group of term nodes
///
/// On the wire a leaf is a term object and a group is a JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermNode {
    Leaf(Term),
    Group(Vec<TermNode>),
}

impl TermNode {
    /// Shorthand for a leaf node
    pub fn leaf(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<TermValue>,
    ) -> Self {
        TermNode::Leaf(Term::new(field, operator, value))
    }

    /// Shorthand for a group node
    pub fn group(nodes: impl IntoIterator<Item = TermNode>) -> Self {
        TermNode::Group(nodes.into_iter().collect())
    }

    /// Number of leaves under this node
    pub fn leaf_count(&self) -> usize {
        match self {
            TermNode::Leaf(_) => 1,
            TermNode::Group(nodes) => nodes.iter().map(TermNode::leaf_count).sum(),
        }
    }
}

impl From<Term> for TermNode {
    fn from(term: Term) -> Self {
        TermNode::Leaf(term)
    }
}
