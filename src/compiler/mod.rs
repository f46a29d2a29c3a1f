//! Selector compiler
//!
//! Turns selector terms into executable store predicates.
//!
//! # Flow
//!
//! 1. `OperatorRegistry` maps each term to a single-field predicate
//! 2. `TermCompiler` composes nested term groups into AND groups
//! 3. `PredicateFilter` evaluates compiled predicates against documents
//!
//! Compilation is pure: no store access, same terms in, same predicates out.

mod compile;
mod filters;
mod operators;
mod predicate;

pub use compile::{CompiledTerms, TermCompiler};
pub use filters::PredicateFilter;
pub use operators::{parse_float, Operator, OperatorRegistry};
pub use predicate::{Condition, Pattern, Predicate};
