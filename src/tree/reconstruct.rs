//! Tree reconstruction
//!
//! Second pass of a tree select: derive the descendant query from the
//! primary results, then link the fetched descendants to their ancestors.
//!
//! Linking protocol:
//! 1. Index descendants by declared parent id, in arrival order, so every
//!    ancestor's children are known before any node is built (multi-level
//!    trees resolve in a single pass)
//! 2. Rebuild the forest from the primary records, walking each subtree
//!    with an explicit work stack; depth is bounded by memory, not the
//!    call stack
//! 3. A descendant not reachable from a primary record (its parent is
//!    absent, or it names itself) is fetched but never surfaces

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::compiler::{Predicate, TermCompiler};
use crate::config::SelectConfig;
use crate::executor::ResultNode;
use crate::skeleton::{Record, Skeleton};

use super::generator::{NestedSetTreeQuery, TreeQueryGenerator};

/// Forest built from primary and descendant records
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedForest {
    /// One node per primary record, in primary order
    pub forest: Vec<ResultNode>,
    /// Distinct descendants that surface somewhere in the forest
    pub attached: usize,
    /// Descendants that surface nowhere
    pub orphaned: usize,
}

/// Derives descendant queries and links descendants to ancestors
#[derive(Clone)]
pub struct TreeReconstructor {
    compiler: TermCompiler,
    generator: Arc<dyn TreeQueryGenerator>,
    prefix: String,
}

impl TreeReconstructor {
    /// Creates a reconstructor with an injected tree query generator
    pub fn new(
        compiler: TermCompiler,
        generator: Arc<dyn TreeQueryGenerator>,
        config: &SelectConfig,
    ) -> Self {
        Self {
            compiler,
            generator,
            prefix: config.tree_prefix.clone(),
        }
    }

    /// Creates a reconstructor using the nested-set generator
    pub fn nested_set(compiler: TermCompiler, config: &SelectConfig) -> Self {
        Self::new(compiler, Arc::new(NestedSetTreeQuery::new(config)), config)
    }

    /// Builds the descendant query for the primary records.
    ///
    /// Several interval predicates are OR-ed; a single one is AND-wrapped.
    /// Returns None when the generator yields nothing compilable, in which
    /// case there are no descendants to fetch.
    pub fn descendant_filter(&self, primary: &[Record]) -> Option<Predicate> {
        let skeletons: Vec<Skeleton> = primary.iter().map(|r| r.skeleton().clone()).collect();
        let terms = self.generator.descendant_terms(&self.prefix, &skeletons);
        let compiled = self.compiler.compile_all(&terms);

        match compiled.predicates.len() {
            0 => None,
            1 => Some(Predicate::And(compiled.predicates)),
            _ => Some(Predicate::Or(compiled.predicates)),
        }
    }

    /// Links descendants under their parents and rebuilds the forest.
    ///
    /// Ids are unique across one result set. When a store breaks that and
    /// returns a record both as a primary result and as a descendant, each
    /// copy is built independently and both carry the record's children.
    pub fn link(&self, primary: &[Record], descendants: &[Record]) -> LinkedForest {
        let mut children_of: HashMap<&str, Vec<usize>> = HashMap::new();
        for (index, descendant) in descendants.iter().enumerate() {
            if descendant.skeleton().is_self_parented() {
                continue;
            }
            if let Some(parent) = descendant.parent_id() {
                children_of.entry(parent).or_default().push(index);
            }
        }

        let linker = Linker {
            descendants,
            children_of: &children_of,
        };
        let mut surfaced = HashSet::new();
        let forest = primary
            .iter()
            .map(|record| linker.build(record, &mut surfaced))
            .collect();

        LinkedForest {
            forest,
            attached: surfaced.len(),
            orphaned: descendants.len() - surfaced.len(),
        }
    }
}

struct Linker<'a> {
    descendants: &'a [Record],
    children_of: &'a HashMap<&'a str, Vec<usize>>,
}

/// One node under construction: its record, the child indexes still to
/// visit and the children already built
struct Frame<'a> {
    record: &'a Record,
    pending: &'a [usize],
    built: Vec<ResultNode>,
}

impl<'a> Linker<'a> {
    fn frame(&self, record: &'a Record) -> Frame<'a> {
        let children_of = self.children_of;
        let pending = children_of
            .get(record.id())
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        Frame {
            record,
            pending,
            built: Vec::with_capacity(pending.len()),
        }
    }

    /// Builds the subtree under `root` bottom-up, recording the index of
    /// every descendant placed in it.
    fn build(&self, root: &'a Record, surfaced: &mut HashSet<usize>) -> ResultNode {
        // Ids on the current root-to-node path; only a store returning
        // duplicate ids can make a child repeat one.
        let mut path: HashSet<&str> = HashSet::new();
        path.insert(root.id());
        let mut stack = vec![self.frame(root)];
        let descendants = self.descendants;
        let mut finished = None;

        while let Some(frame) = stack.last_mut() {
            if let Some((&index, rest)) = frame.pending.split_first() {
                frame.pending = rest;
                let child = &descendants[index];
                surfaced.insert(index);
                if path.insert(child.id()) {
                    stack.push(self.frame(child));
                } else {
                    frame.built.push(ResultNode::leaf(child.document().clone()));
                }
                continue;
            }

            let Some(done) = stack.pop() else { break };
            path.remove(done.record.id());
            let node = ResultNode::with_children(done.record.document().clone(), done.built);
            match stack.last_mut() {
                Some(parent) => parent.built.push(node),
                None => finished = Some(node),
            }
        }

        finished.unwrap_or_else(|| ResultNode::leaf(root.document().clone()))
    }
}
