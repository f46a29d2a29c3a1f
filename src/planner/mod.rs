//! Query assembly
//!
//! Combines compiled predicates and selector modifiers into one executable
//! plan: filter, projection and find options.
//!
//! # Design Principles
//!
//! - Deterministic: same select query, same plan
//! - Store-free: a select with no usable search term never reaches the store
//! - Lean: a single predicate is never wrapped in a redundant AND

mod assembler;
mod plan;

pub use assembler::QueryAssembler;
pub use plan::{Assembly, FindOptions, Projection, QueryPlan};
