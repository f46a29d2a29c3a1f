//! Tree query generation
//!
//! Turns the skeletons of a result set into term groups that select every
//! descendant. The reconstructor treats the output as opaque terms and
//! compiles it like any other selector.

use crate::config::SelectConfig;
use crate::selector::{TermNode, TermValue};
use crate::skeleton::Skeleton;

/// Produces descendant interval terms for a set of skeletons
pub trait TreeQueryGenerator: Send + Sync {
    /// One term node per interval; each node selects the descendants of one
    /// or more of `skeletons`. Field paths are prefixed with `prefix`.
    fn descendant_terms(&self, prefix: &str, skeletons: &[Skeleton]) -> Vec<TermNode>;
}

/// Nested-set interval generator: one `left > l AND right < r` group per
/// skeleton
#[derive(Debug, Clone)]
pub struct NestedSetTreeQuery {
    left_field: String,
    right_field: String,
}

impl NestedSetTreeQuery {
    /// Creates a generator over the boundary fields of `config`
    pub fn new(config: &SelectConfig) -> Self {
        Self {
            left_field: config.left_field(),
            right_field: config.right_field(),
        }
    }
}

impl Default for NestedSetTreeQuery {
    fn default() -> Self {
        Self::new(&SelectConfig::default())
    }
}

impl TreeQueryGenerator for NestedSetTreeQuery {
    fn descendant_terms(&self, prefix: &str, skeletons: &[Skeleton]) -> Vec<TermNode> {
        skeletons
            .iter()
            .filter(|s| s.is_well_formed())
            .map(|s| {
                TermNode::group([
                    TermNode::leaf(
                        format!("{}{}", prefix, self.left_field),
                        ">",
                        TermValue::number(s.left),
                    ),
                    TermNode::leaf(
                        format!("{}{}", prefix, self.right_field),
                        "<",
                        TermValue::number(s.right),
                    ),
                ])
            })
            .collect()
    }
}
