//! # In-Memory Store
//!
//! A `Collection` over a vector of JSON documents. Evaluates compiled
//! predicates with `PredicateFilter`, honours projection and limit, and can
//! be told to fail acquisition or a given query for failure-path testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use serde_json::{Map, Value};

use crate::compiler::{Predicate, PredicateFilter};
use crate::planner::{FindOptions, Projection};

use super::backend::{Collection, CollectionFactory, Cursor, StoreFuture, VecCursor};
use super::context::RequestContext;
use super::errors::{StoreError, StoreResult};

/// In-memory collection
#[derive(Debug, Default)]
pub struct InMemoryCollection {
    documents: RwLock<Vec<Value>>,
    finds: AtomicUsize,
    fail_on_find: RwLock<Option<usize>>,
}

impl InMemoryCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collection holding `documents`, in insertion order
    pub fn with_documents(documents: impl IntoIterator<Item = Value>) -> Self {
        Self {
            documents: RwLock::new(documents.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Append a document
    pub fn insert(&self, document: Value) -> StoreResult<()> {
        let mut documents = self
            .documents
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        documents.push(document);
        Ok(())
    }

    /// Make the find with this zero-based sequence number fail
    pub fn fail_find(&self, sequence: usize) -> StoreResult<()> {
        let mut fail_on = self
            .fail_on_find
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        *fail_on = Some(sequence);
        Ok(())
    }

    /// Number of finds issued so far
    pub fn find_count(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    fn run(
        &self,
        sequence: usize,
        filter: &Predicate,
        projection: &Projection,
        options: FindOptions,
    ) -> StoreResult<Vec<Value>> {
        let fail_on = *self
            .fail_on_find
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        if fail_on == Some(sequence) {
            return Err(StoreError::Query(format!("find #{} failed", sequence)));
        }

        let documents = self
            .documents
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        let limit = options
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(documents
            .iter()
            .filter(|doc| PredicateFilter::matches(doc, filter))
            .take(limit)
            .map(|doc| project(doc, projection))
            .collect())
    }
}

impl Collection for InMemoryCollection {
    fn find(
        &self,
        filter: &Predicate,
        projection: &Projection,
        options: FindOptions,
    ) -> Box<dyn Cursor> {
        let sequence = self.finds.fetch_add(1, Ordering::SeqCst);
        Box::new(VecCursor::new(self.run(sequence, filter, projection, options)))
    }
}

fn project(document: &Value, projection: &Projection) -> Value {
    match projection {
        Projection::Full => document.clone(),
        Projection::Skeleton { key } => {
            let mut projected = Map::new();
            if let Some(skeleton) = document.get(key) {
                projected.insert(key.clone(), skeleton.clone());
            }
            Value::Object(projected)
        }
    }
}

/// Factory handing out one shared in-memory collection
#[derive(Debug, Clone)]
pub struct InMemoryFactory {
    collection: Arc<InMemoryCollection>,
    unavailable: Option<String>,
    acquisitions: Arc<AtomicUsize>,
}

impl InMemoryFactory {
    /// Create a factory over `collection`
    pub fn new(collection: Arc<InMemoryCollection>) -> Self {
        Self {
            collection,
            unavailable: None,
            acquisitions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a factory whose acquisitions always fail
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            unavailable: Some(reason.into()),
            ..Self::new(Arc::new(InMemoryCollection::new()))
        }
    }

    /// Returns the shared collection
    pub fn inner(&self) -> &Arc<InMemoryCollection> {
        &self.collection
    }

    /// Number of acquisitions attempted
    pub fn acquisition_count(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }
}

impl CollectionFactory for InMemoryFactory {
    fn collection<'a>(&'a self, _ctx: &'a RequestContext) -> StoreFuture<'a, Arc<dyn Collection>> {
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            match &self.unavailable {
                Some(reason) => Err(StoreError::Unavailable(reason.clone())),
                None => Ok(Arc::clone(&self.collection) as Arc<dyn Collection>),
            }
        })
    }
}
