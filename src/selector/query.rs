//! Select query as handed over by the selector parser

use serde::{Deserialize, Serialize};

use super::term::TermNode;

/// Selector modifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    /// Maximum number of results. Zero means no limit.
    #[serde(default)]
    pub limit: Option<u64>,
    /// Return at most one result; overrides `limit`
    #[serde(default)]
    pub first: bool,
    /// Final step of a selector chain: fetch full records instead of skeletons
    #[serde(default)]
    pub laststep: bool,
    /// Load descendants and return a forest
    #[serde(default)]
    pub tree: bool,
}

impl Modifier {
    /// Modifier for a final step fetching full records
    pub fn laststep() -> Self {
        Self {
            laststep: true,
            ..Self::default()
        }
    }

    /// Modifier for a final step that also loads descendants
    pub fn tree() -> Self {
        Self {
            laststep: true,
            tree: true,
            ..Self::default()
        }
    }

    /// Sets the limit
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the first flag
    pub fn with_first(mut self) -> Self {
        self.first = true;
        self
    }

    /// Effective result limit; `first` wins over an explicit limit
    pub fn effective_limit(&self) -> Option<u64> {
        if self.first {
            return Some(1);
        }
        self.limit.filter(|limit| *limit > 0)
    }

    /// True when descendants should be loaded and linked
    pub fn includes_children(&self) -> bool {
        self.laststep && self.tree
    }
}

/// Search and skeleton terms of one selector step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectorTerms {
    /// Terms every result must satisfy
    #[serde(default)]
    pub search: Vec<TermNode>,
    /// Context constraints from the previous step; any one of them must hold
    #[serde(default)]
    pub skeleton: Vec<TermNode>,
}

/// One select request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectQuery {
    /// Compiled selector terms
    pub query: SelectorTerms,
    /// Selector modifiers
    #[serde(default)]
    pub modifier: Modifier,
}

impl SelectQuery {
    /// Creates a select query with the given search terms
    pub fn new(search: impl IntoIterator<Item = TermNode>) -> Self {
        Self {
            query: SelectorTerms {
                search: search.into_iter().collect(),
                skeleton: Vec::new(),
            },
            modifier: Modifier::default(),
        }
    }

    /// Adds skeleton terms
    pub fn with_skeleton(mut self, skeleton: impl IntoIterator<Item = TermNode>) -> Self {
        self.query.skeleton.extend(skeleton);
        self
    }

    /// Sets the modifier
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = modifier;
        self
    }
}
