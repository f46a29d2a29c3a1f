//! Skeleton: the hierarchy metadata embedded in every stored document
//!
//! Hierarchy is nested-set encoded. A document `d` is a descendant of `a`
//! exactly when `a.left < d.left` and `d.right < a.right`.

use serde_json::Value;

use crate::config::SelectConfig;

/// Per-record hierarchy metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    /// Unique record id
    pub id: String,
    /// Id of the parent record, absent for roots
    pub parent_id: Option<String>,
    /// Left nested-set bound
    pub left: f64,
    /// Right nested-set bound
    pub right: f64,
}

impl Skeleton {
    /// Creates a skeleton
    pub fn new(
        id: impl Into<String>,
        parent_id: Option<&str>,
        left: f64,
        right: f64,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.map(str::to_string),
            left,
            right,
        }
    }

    /// Reads the skeleton sub-object out of a stored document.
    ///
    /// Returns None when the sub-object, the id or either bound is missing.
    /// Ids may be stored as strings or numbers; both are normalized to text.
    pub fn from_document(document: &Value, config: &SelectConfig) -> Option<Self> {
        let skeleton = document.get(&config.skeleton_key)?;

        let id = id_text(skeleton.get(&config.id_key)?)?;
        let parent_id = skeleton.get(&config.parent_key).and_then(id_text);
        let left = skeleton.get(&config.left_key)?.as_f64()?;
        let right = skeleton.get(&config.right_key)?.as_f64()?;

        Some(Self {
            id,
            parent_id,
            left,
            right,
        })
    }

    /// True when `left < right`
    pub fn is_well_formed(&self) -> bool {
        self.left < self.right
    }

    /// True when `other` lies strictly inside this skeleton's interval
    pub fn contains(&self, other: &Skeleton) -> bool {
        self.left < other.left && other.right < self.right
    }

    /// True when the record declares itself as its own parent
    pub fn is_self_parented(&self) -> bool {
        self.parent_id.as_deref() == Some(self.id.as_str())
    }
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A fetched document together with its decoded skeleton
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    skeleton: Skeleton,
    document: Value,
}

impl Record {
    /// Wraps a stored document. Returns None if it has no usable skeleton.
    pub fn from_document(document: Value, config: &SelectConfig) -> Option<Self> {
        let skeleton = Skeleton::from_document(&document, config)?;
        Some(Self { skeleton, document })
    }

    /// Returns the decoded skeleton
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Returns the record id
    pub fn id(&self) -> &str {
        &self.skeleton.id
    }

    /// Returns the declared parent id
    pub fn parent_id(&self) -> Option<&str> {
        self.skeleton.parent_id.as_deref()
    }

    /// Returns the stored document
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Consumes the record, returning the stored document
    pub fn into_document(self) -> Value {
        self.document
    }
}
