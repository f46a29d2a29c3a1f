//! Term compiler
//!
//! Recursive descent from term nodes to predicates. Leaves go through the
//! operator registry; groups become AND groups of their compiled children.
//! Compilation never touches the store and is deterministic.

use crate::selector::TermNode;

use super::operators::OperatorRegistry;
use super::predicate::Predicate;

/// Outcome of compiling a term sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledTerms {
    /// One predicate per usable input node, in input order
    pub predicates: Vec<Predicate>,
    /// Leaves dropped because their operator is not registered
    pub dropped: usize,
}

impl CompiledTerms {
    /// True when no usable predicate remains
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// Compiles term nodes into predicates
#[derive(Debug, Clone, Default)]
pub struct TermCompiler {
    registry: OperatorRegistry,
}

impl TermCompiler {
    /// Creates a compiler over the given registry
    pub fn new(registry: OperatorRegistry) -> Self {
        Self { registry }
    }

    /// Returns the operator registry
    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    /// Compiles one node.
    ///
    /// Unusable leaves are skipped; a group with no usable child compiles to
    /// None rather than to an empty AND.
    pub fn compile(&self, node: &TermNode) -> Option<Predicate> {
        match node {
            TermNode::Leaf(term) => self.registry.build(term),
            TermNode::Group(children) => {
                let compiled: Vec<Predicate> =
                    children.iter().filter_map(|c| self.compile(c)).collect();
                if compiled.is_empty() {
                    None
                } else {
                    Some(Predicate::And(compiled))
                }
            }
        }
    }

    /// Compiles a sequence of nodes, keeping order and counting drops
    pub fn compile_all(&self, nodes: &[TermNode]) -> CompiledTerms {
        let mut out = CompiledTerms::default();

        for node in nodes {
            let before = node.leaf_count();
            match self.compile(node) {
                Some(predicate) => {
                    out.dropped += before - predicate.condition_count();
                    out.predicates.push(predicate);
                }
                None => out.dropped += before,
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compiler() -> TermCompiler {
        TermCompiler::default()
    }

    #[test]
    fn test_leaf_delegates_to_registry() {
        let pred = compiler().compile(&TermNode::leaf("tag", "=", "folder")).unwrap();
        assert_eq!(pred.to_document(), json!({"tag": "folder"}));
    }

    #[test]
    fn test_group_becomes_and() {
        let node = TermNode::group([
            TermNode::leaf("_digger.left", ">", 2),
            TermNode::leaf("_digger.right", "<", 9),
        ]);

        assert_eq!(
            compiler().compile(&node).unwrap().to_document(),
            json!({"$and": [
                {"_digger.left": {"$gt": 2}},
                {"_digger.right": {"$lt": 9}}
            ]})
        );
    }

    #[test]
    fn test_single_child_group_still_wrapped() {
        let node = TermNode::group([TermNode::leaf("a", "=", "1")]);
        assert_eq!(
            compiler().compile(&node).unwrap().to_document(),
            json!({"$and": [{"a": "1"}]})
        );
    }

    #[test]
    fn test_deep_nesting() {
        let mut node = TermNode::leaf("depth", "=", "0");
        for _ in 0..50 {
            node = TermNode::group([node]);
        }

        let mut pred = compiler().compile(&node).unwrap();
        let mut depth = 0;
        while let Predicate::And(mut children) = pred {
            assert_eq!(children.len(), 1);
            pred = children.remove(0);
            depth += 1;
        }
        assert_eq!(depth, 50);
    }

    #[test]
    fn test_unregistered_leaves_dropped_from_group() {
        let node = TermNode::group([
            TermNode::leaf("a", "=", "1"),
            TermNode::leaf("b", "??", "2"),
        ]);

        let compiled = compiler().compile_all(&[node]);
        assert_eq!(compiled.predicates.len(), 1);
        assert_eq!(compiled.dropped, 1);
        assert_eq!(compiled.predicates[0].condition_count(), 1);
    }

    #[test]
    fn test_empty_group_compiles_to_none() {
        let node = TermNode::group([TermNode::leaf("b", "??", "2")]);
        assert!(compiler().compile(&node).is_none());
        assert!(compiler().compile(&TermNode::group([])).is_none());
    }

    #[test]
    fn test_compile_is_deterministic() {
        let nodes = vec![
            TermNode::leaf("name", "*=", "a+b"),
            TermNode::leaf("price", ">=", "3"),
        ];
        let first = compiler().compile_all(&nodes);
        let second = compiler().compile_all(&nodes);
        assert_eq!(first, second);
    }
}
