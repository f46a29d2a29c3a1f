//! nestsel - selector terms to document-store queries, with nested-set
//! tree reconstruction
//!
//! A select call compiles parsed selector terms into one store predicate,
//! runs it, and for tree selects fetches every descendant of the results in
//! a second query and links them into a forest.
//!
//! ```text
//! SelectQuery -> compiler -> planner -> store -> tree -> Vec<ResultNode>
//! ```

pub mod compiler;
pub mod config;
pub mod executor;
pub mod observability;
pub mod planner;
pub mod selector;
pub mod skeleton;
pub mod store;
pub mod tree;

pub use config::SelectConfig;
pub use executor::{ResultNode, SelectError, SelectErrorCode, SelectResult, Selector};
pub use selector::{Modifier, SelectQuery, Term, TermNode, TermValue};
