//! Select executor subsystem
//!
//! Runs assembled plans against the store and returns the result forest.
//!
//! # Execution Flow (strict order)
//!
//! 1. Assemble the plan; resolve empty without touching the store
//! 2. Acquire the collection handle
//! 3. Run the primary query
//! 4. Tree selects: run the descendant query and link the forest
//! 5. Return primary results in store order
//!
//! # Guarantees
//!
//! - Stages never overlap within one call
//! - Any store failure fails the whole call; no partial results
//! - Calls share no mutable state beyond the metrics counters

mod errors;
mod executor;
mod materializer;
mod result;

pub use errors::{SelectError, SelectErrorCode, SelectResult};
pub use executor::Selector;
pub use materializer::ResultMaterializer;
pub use result::{forest_to_documents, ResultNode, CHILDREN_KEY};
