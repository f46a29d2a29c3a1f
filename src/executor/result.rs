//! Result types for select execution

use serde_json::Value;

/// Key under which rendered children are embedded
pub const CHILDREN_KEY: &str = "_children";

/// One record in the result forest
///
/// Fetched documents are never modified; children are carried alongside.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultNode {
    /// The fetched document (or its skeleton, for skeleton projections)
    pub document: Value,
    /// Linked descendants, in arrival order
    pub children: Vec<ResultNode>,
}

impl ResultNode {
    /// Creates a node with no children
    pub fn leaf(document: Value) -> Self {
        Self {
            document,
            children: Vec::new(),
        }
    }

    /// Creates a node with children
    pub fn with_children(document: Value, children: Vec<ResultNode>) -> Self {
        Self { document, children }
    }

    /// Returns the document
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Returns true if no descendant was linked under this node
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, the node itself included
    pub fn subtree_size(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.iter());
        }
        count
    }

    /// Renders the node as its document with children embedded under
    /// `_children`. Leaves are rendered without the key.
    pub fn to_document(&self) -> Value {
        render(std::slice::from_ref(self))
            .pop()
            .unwrap_or_default()
    }
}

// Children are released level by level so dropping a deep tree never
// recurses.
impl Drop for ResultNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Renders a whole forest
pub fn forest_to_documents(forest: &[ResultNode]) -> Vec<Value> {
    render(forest)
}

struct RenderFrame<'a> {
    node: Option<&'a ResultNode>,
    pending: std::slice::Iter<'a, ResultNode>,
    rendered: Vec<Value>,
}

/// Post-order rendering with an explicit stack. The bottom frame stands for
/// the forest itself and carries no document.
fn render(forest: &[ResultNode]) -> Vec<Value> {
    let mut stack = vec![RenderFrame {
        node: None,
        pending: forest.iter(),
        rendered: Vec::with_capacity(forest.len()),
    }];

    while let Some(frame) = stack.last_mut() {
        if let Some(child) = frame.pending.next() {
            stack.push(RenderFrame {
                node: Some(child),
                pending: child.children.iter(),
                rendered: Vec::with_capacity(child.children.len()),
            });
            continue;
        }

        let Some(done) = stack.pop() else { break };
        match (done.node, stack.last_mut()) {
            (Some(node), Some(parent)) => parent
                .rendered
                .push(embed(node.document.clone(), done.rendered)),
            _ => return done.rendered,
        }
    }

    Vec::new()
}

fn embed(mut document: Value, children: Vec<Value>) -> Value {
    if children.is_empty() {
        return document;
    }

    let children = Value::Array(children);
    if let Value::Object(map) = &mut document {
        map.insert(CHILDREN_KEY.to_string(), children);
        return document;
    }

    // Scalar documents only arise from custom stores; wrap them
    let mut map = serde_json::Map::new();
    map.insert("value".to_string(), document);
    map.insert(CHILDREN_KEY.to_string(), children);
    Value::Object(map)
}
