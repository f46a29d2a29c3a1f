//! Query assembler
//!
//! Combines compiled search and skeleton predicates with the selector
//! modifiers into one query plan.
//!
//! Assembly order (strict):
//! 1. Compile search terms, dropping leaves with unregistered operators
//! 2. Compile skeleton terms the same way
//! 3. No usable search term: empty assembly, the store is never contacted
//! 4. Skeleton predicates present: append one OR group of all of them
//! 5. One predicate is used as-is, several are AND-wrapped
//! 6. Limit from the modifier; `first` forces a limit of one
//! 7. Skeleton-only projection unless this is the last step

use crate::compiler::{Predicate, TermCompiler};
use crate::config::SelectConfig;
use crate::selector::SelectQuery;

use super::plan::{Assembly, FindOptions, Projection, QueryPlan};

/// Builds query plans from select queries
#[derive(Debug, Clone)]
pub struct QueryAssembler {
    compiler: TermCompiler,
    skeleton_key: String,
}

impl QueryAssembler {
    /// Creates an assembler
    pub fn new(compiler: TermCompiler, config: &SelectConfig) -> Self {
        Self {
            compiler,
            skeleton_key: config.skeleton_key.clone(),
        }
    }

    /// Returns the term compiler
    pub fn compiler(&self) -> &TermCompiler {
        &self.compiler
    }

    /// Assembles a select query. Deterministic and store-free.
    pub fn assemble(&self, query: &SelectQuery) -> Assembly {
        let search = self.compiler.compile_all(&query.query.search);
        let skeleton = self.compiler.compile_all(&query.query.skeleton);
        let dropped_terms = search.dropped + skeleton.dropped;

        if search.is_empty() {
            return Assembly::Empty { dropped_terms };
        }

        let mut predicates = search.predicates;
        if !skeleton.is_empty() {
            predicates.push(Predicate::Or(skeleton.predicates));
        }

        let filter = combine(predicates);

        let options = match query.modifier.effective_limit() {
            Some(limit) => FindOptions::with_limit(limit),
            None => FindOptions::unlimited(),
        };

        let projection = if query.modifier.laststep {
            Projection::Full
        } else {
            Projection::Skeleton {
                key: self.skeleton_key.clone(),
            }
        };

        Assembly::Plan {
            plan: QueryPlan {
                filter,
                projection,
                options,
                include_children: query.modifier.includes_children(),
            },
            dropped_terms,
        }
    }
}

/// A lone predicate is used directly; downstream consumers rely on not
/// seeing a one-element AND.
fn combine(mut predicates: Vec<Predicate>) -> Predicate {
    if predicates.len() == 1 {
        predicates.remove(0)
    } else {
        Predicate::And(predicates)
    }
}
