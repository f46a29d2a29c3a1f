//! Compiled predicate tree
//!
//! The executable form of a selector: single-field conditions composed with
//! AND/OR groups. `to_document` renders it in the document-store query
//! language so a driver can forward it verbatim.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde_json::{json, Map, Value};

/// Case-insensitive regular expression used by the string-match operators
///
/// The source is what the store receives. The local matcher only serves
/// in-process evaluation; a source it cannot compile (e.g. one over the
/// regex size limit) still constrains the query and matches nothing here.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Option<Regex>,
}

impl Pattern {
    /// Compiles `source` case-insensitively
    pub fn case_insensitive(source: impl Into<String>) -> Self {
        let source = source.into();
        let regex = match RegexBuilder::new(&source).case_insensitive(true).build() {
            Ok(regex) => Some(regex),
            Err(err) => {
                tracing::debug!(
                    source_len = source.len(),
                    error = %err,
                    "pattern not compiled locally"
                );
                None
            }
        };
        Self { source, regex }
    }

    /// Returns the regex source
    pub fn source(&self) -> &str {
        &self.source
    }

    /// True when the local matcher compiled
    pub fn is_compiled(&self) -> bool {
        self.regex.is_some()
    }

    /// Tests a string against the pattern. An uncompiled pattern matches
    /// nothing.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.as_ref().map_or(false, |regex| regex.is_match(text))
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/i", self.source)
    }
}

/// Condition applied to one field
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Equality: field = value
    Eq(Value),
    /// Inequality: field != value
    Ne(Value),
    /// Greater than: field > value
    Gt(Value),
    /// Greater than or equal: field >= value
    Gte(Value),
    /// Less than: field < value
    Lt(Value),
    /// Less than or equal: field <= value
    Lte(Value),
    /// Case-insensitive regular expression match
    Regex(Pattern),
}

impl Condition {
    /// Returns the store operator name, `None` for plain equality
    pub fn op_name(&self) -> Option<&'static str> {
        match self {
            Condition::Eq(_) => None,
            Condition::Ne(_) => Some("$ne"),
            Condition::Gt(_) => Some("$gt"),
            Condition::Gte(_) => Some("$gte"),
            Condition::Lt(_) => Some("$lt"),
            Condition::Lte(_) => Some("$lte"),
            Condition::Regex(_) => Some("$regex"),
        }
    }

    fn to_document(&self) -> Value {
        match self {
            Condition::Eq(value) => value.clone(),
            Condition::Ne(value) => json!({ "$ne": value }),
            Condition::Gt(value) => json!({ "$gt": value }),
            Condition::Gte(value) => json!({ "$gte": value }),
            Condition::Lt(value) => json!({ "$lt": value }),
            Condition::Lte(value) => json!({ "$lte": value }),
            Condition::Regex(pattern) => json!({
                "$regex": pattern.source(),
                "$options": "i",
            }),
        }
    }
}

/// A boolean predicate tree
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Single-field condition
    Field {
        field: String,
        condition: Condition,
    },
    /// Every child must hold
    And(Vec<Predicate>),
    /// At least one child must hold
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Creates a single-field predicate
    pub fn field(field: impl Into<String>, condition: Condition) -> Self {
        Predicate::Field {
            field: field.into(),
            condition,
        }
    }

    /// Renders the predicate as a store query document
    pub fn to_document(&self) -> Value {
        match self {
            Predicate::Field { field, condition } => {
                let mut doc = Map::new();
                doc.insert(field.clone(), condition.to_document());
                Value::Object(doc)
            }
            Predicate::And(children) => json!({
                "$and": children.iter().map(Predicate::to_document).collect::<Vec<_>>()
            }),
            Predicate::Or(children) => json!({
                "$or": children.iter().map(Predicate::to_document).collect::<Vec<_>>()
            }),
        }
    }

    /// Number of single-field conditions in the tree
    pub fn condition_count(&self) -> usize {
        match self {
            Predicate::Field { .. } => 1,
            Predicate::And(children) | Predicate::Or(children) => {
                children.iter().map(Predicate::condition_count).sum()
            }
        }
    }
}
