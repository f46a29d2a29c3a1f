//! Tree reconstruction subsystem
//!
//! Turns a flat, nested-set encoded result list into a forest: the
//! generator describes where descendants live, the reconstructor compiles
//! that into a descendant query and links what comes back.

mod generator;
mod reconstruct;

pub use generator::{NestedSetTreeQuery, TreeQueryGenerator};
pub use reconstruct::{LinkedForest, TreeReconstructor};
