//! Executable query plan

use serde_json::{json, Value};

use crate::compiler::Predicate;

/// Which fields the store returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Whole records
    Full,
    /// Only the skeleton sub-object stored under `key`
    Skeleton { key: String },
}

impl Projection {
    /// Returns true when full records are fetched
    pub fn is_full(&self) -> bool {
        matches!(self, Projection::Full)
    }

    /// Renders the projection as a store field document, None for full records
    pub fn to_document(&self) -> Option<Value> {
        match self {
            Projection::Full => None,
            Projection::Skeleton { key } => {
                let mut fields = serde_json::Map::new();
                fields.insert(key.clone(), Value::Bool(true));
                Some(Value::Object(fields))
            }
        }
    }
}

/// Find options handed to the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Maximum number of results
    pub limit: Option<u64>,
}

impl FindOptions {
    /// Options with no limit
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Options with the given limit
    pub fn with_limit(limit: u64) -> Self {
        Self { limit: Some(limit) }
    }
}

/// Immutable plan for the primary query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Combined search and skeleton predicate
    pub filter: Predicate,
    /// Returned fields
    pub projection: Projection,
    /// Limit
    pub options: FindOptions,
    /// Whether descendants are loaded after the primary query
    pub include_children: bool,
}

impl QueryPlan {
    /// Explain output for diagnostics
    pub fn explain(&self) -> Value {
        json!({
            "filter": self.filter.to_document(),
            "projection": self.projection.to_document(),
            "limit": self.options.limit,
            "tree": self.include_children,
        })
    }
}

/// Result of assembling a select query
#[derive(Debug, Clone, PartialEq)]
pub enum Assembly {
    /// No usable search term; resolves to no results without a store query
    Empty {
        /// Search and skeleton leaves dropped for unregistered operators
        dropped_terms: usize,
    },
    /// A query to run
    Plan {
        plan: QueryPlan,
        /// Search and skeleton leaves dropped for unregistered operators
        dropped_terms: usize,
    },
}

impl Assembly {
    /// Returns the plan, if any
    pub fn plan(&self) -> Option<&QueryPlan> {
        match self {
            Assembly::Empty { .. } => None,
            Assembly::Plan { plan, .. } => Some(plan),
        }
    }

    /// Number of dropped leaves
    pub fn dropped_terms(&self) -> usize {
        match self {
            Assembly::Empty { dropped_terms } | Assembly::Plan { dropped_terms, .. } => {
                *dropped_terms
            }
        }
    }
}
