//! # Store Handle Traits
//!
//! The document store is an external collaborator. A factory yields a
//! collection handle per request; a collection answers `find` with a cursor
//! that drains into an array. Every suspension point returns a boxed future
//! so the traits stay object safe.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::compiler::Predicate;
use crate::planner::{FindOptions, Projection};

use super::context::RequestContext;
use super::errors::StoreResult;

/// Boxed future returned by store operations
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// Yields a collection handle for a request
pub trait CollectionFactory: Send + Sync {
    /// Acquire the collection for this request
    fn collection<'a>(&'a self, ctx: &'a RequestContext) -> StoreFuture<'a, Arc<dyn Collection>>;
}

/// A queryable collection of documents
pub trait Collection: Send + Sync {
    /// Start a find. Errors surface when the cursor is drained.
    fn find(
        &self,
        filter: &Predicate,
        projection: &Projection,
        options: FindOptions,
    ) -> Box<dyn Cursor>;
}

/// Result cursor of a find
pub trait Cursor: Send {
    /// Drain every remaining document
    fn to_array(self: Box<Self>) -> StoreFuture<'static, Vec<Value>>;
}

/// Cursor over an already-computed result
pub struct VecCursor {
    result: StoreResult<Vec<Value>>,
}

impl VecCursor {
    /// Wrap a computed result
    pub fn new(result: StoreResult<Vec<Value>>) -> Self {
        Self { result }
    }
}

impl Cursor for VecCursor {
    fn to_array(self: Box<Self>) -> StoreFuture<'static, Vec<Value>> {
        Box::pin(async move { self.result })
    }
}
