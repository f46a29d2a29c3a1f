//! Select request context
//!
//! Context handed to the collection factory when a store handle is
//! acquired. Carries the request id used in log spans and free-form
//! metadata the factory may use to pick a collection.

use std::collections::HashMap;
use std::time::Instant;

use serde_json::Value;
use uuid::Uuid;

/// Context carried through one select call
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Id recorded on the select span
    pub request_id: Uuid,

    /// Target collection, when the caller names one
    pub collection: Option<String>,

    /// Metadata for the collection factory
    pub metadata: HashMap<String, Value>,

    /// When the select call began
    started_at: Instant,
}

impl RequestContext {
    /// Create a context with a fresh request id
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            collection: None,
            metadata: HashMap::new(),
            started_at: Instant::now(),
        }
    }

    /// Create a context targeting a named collection
    pub fn for_collection(collection: impl Into<String>) -> Self {
        Self {
            collection: Some(collection.into()),
            ..Self::new()
        }
    }

    /// Milliseconds since the select call began
    pub fn elapsed_ms(&self) -> u128 {
        self.started_at.elapsed().as_millis()
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_unique() {
        let a = RequestContext::new();
        let b = RequestContext::new();
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn test_for_collection() {
        let ctx = RequestContext::for_collection("warehouse")
            .with_metadata("tenant", Value::String("acme".into()));
        assert_eq!(ctx.collection.as_deref(), Some("warehouse"));
        assert_eq!(ctx.metadata["tenant"], "acme");
    }
}
