//! Result materializer
//!
//! Runs a query plan against a collection handle and drains the cursor.
//! Failure is immediate and total: no partial output.

use serde_json::Value;

use crate::compiler::Predicate;
use crate::planner::{FindOptions, Projection, QueryPlan};
use crate::store::{Collection, StoreResult};

/// Executes plans against a store handle
pub struct ResultMaterializer<'a> {
    collection: &'a dyn Collection,
}

impl<'a> ResultMaterializer<'a> {
    /// Creates a materializer over a collection handle
    pub fn new(collection: &'a dyn Collection) -> Self {
        Self { collection }
    }

    /// Runs the primary query of a plan
    pub async fn primary(&self, plan: &QueryPlan) -> StoreResult<Vec<Value>> {
        self.fetch(&plan.filter, &plan.projection, plan.options).await
    }

    /// Runs a descendant query: full records, no limit
    pub async fn descendants(&self, filter: &Predicate) -> StoreResult<Vec<Value>> {
        self.fetch(filter, &Projection::Full, FindOptions::unlimited())
            .await
    }

    async fn fetch(
        &self,
        filter: &Predicate,
        projection: &Projection,
        options: FindOptions,
    ) -> StoreResult<Vec<Value>> {
        let cursor = self.collection.find(filter, projection, options);
        cursor.to_array().await
    }
}
