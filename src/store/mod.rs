//! # Store Interfaces
//!
//! Contract between the select pipeline and the document store, plus an
//! in-memory implementation of it.

mod backend;
mod context;
mod errors;
mod memory;

pub use backend::{Collection, CollectionFactory, Cursor, StoreFuture, VecCursor};
pub use context::RequestContext;
pub use errors::{StoreError, StoreResult};
pub use memory::{InMemoryCollection, InMemoryFactory};
