//! Selector data model
//!
//! The structures the selector parser produces and this crate consumes:
//! terms, term groups and the per-step modifiers.

mod query;
mod term;

pub use query::{Modifier, SelectQuery, SelectorTerms};
pub use term::{Term, TermNode, TermValue};
