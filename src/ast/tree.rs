use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Index of a node inside a [`SyntaxTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Zero-indexed row and column, as reported by the grammar runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub row: u32,
    pub column: u32,
}

impl Position {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// Everything needed to append a node to the arena.
#[derive(Clone, Debug)]
pub struct NodeInit {
    pub kind: &'static str,
    pub field: Option<&'static str>,
    pub start: Position,
    pub end: Position,
    pub bytes: Range<usize>,
    pub is_error: bool,
    pub is_missing: bool,
}

impl NodeInit {
    pub fn new(kind: &'static str, start: Position, end: Position, bytes: Range<usize>) -> Self {
        Self {
            kind,
            field: None,
            start,
            end,
            bytes,
            is_error: false,
            is_missing: false,
        }
    }

    pub fn with_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }
}

#[derive(Clone, Debug)]
pub struct SyntaxNode {
    kind: &'static str,
    field: Option<&'static str>,
    start: Position,
    end: Position,
    bytes: Range<usize>,
    is_error: bool,
    is_missing: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SyntaxNode {
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// 1-indexed first line.
    pub fn start_line(&self) -> u32 {
        self.start.row + 1
    }

    /// 1-indexed last line, inclusive.
    pub fn end_line(&self) -> u32 {
        self.end.row + 1
    }
}

/// Read-only arena holding one parse of one source text.
#[derive(Clone, Debug)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.0]
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Source text covered by the node. Empty if the byte range does not land
    /// on character boundaries.
    pub fn text(&self, id: NodeId) -> &str {
        self.source
            .get(self.node(id).bytes.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn kind(&self, id: NodeId) -> &'static str {
        self.node(id).kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child_by_field_name(&self, id: NodeId, field: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.node(*child).field == Some(field))
    }

    /// First direct child of the given kind.
    pub fn child_of_kind(&self, id: NodeId, kind: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.node(*child).kind == kind)
    }

    /// First error or missing node below `id` (inclusive), in pre-order.
    pub fn first_error(&self, id: NodeId) -> Option<NodeId> {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node(current);
            if node.is_error || node.is_missing {
                return Some(current);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Pre-order walk. `visit` returns `false` to skip the node's children.
    pub fn walk_pre_order<F>(&self, mut visit: F)
    where
        F: FnMut(NodeId, &SyntaxNode) -> bool,
    {
        let mut stack = vec![self.root()];
        while let Some(current) = stack.pop() {
            let node = self.node(current);
            if visit(current, node) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }
}

/// Appends nodes parent-first. The root is created up front so a finished
/// tree is never empty.
#[derive(Debug)]
pub struct SyntaxTreeBuilder {
    source: String,
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTreeBuilder {
    pub fn new(source: impl Into<String>, root: NodeInit) -> Self {
        let mut builder = Self {
            source: source.into(),
            nodes: Vec::new(),
        };
        builder.insert(None, root);
        builder
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn push(&mut self, parent: NodeId, init: NodeInit) -> NodeId {
        self.insert(Some(parent), init)
    }

    pub fn finish(self) -> SyntaxTree {
        SyntaxTree {
            source: self.source,
            nodes: self.nodes,
        }
    }

    fn insert(&mut self, parent: Option<NodeId>, init: NodeInit) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SyntaxNode {
            kind: init.kind,
            field: init.field,
            start: init.start,
            end: init.end,
            bytes: init.bytes,
            is_error: init.is_error,
            is_missing: init.is_missing,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start_row: u32, end_row: u32, bytes: Range<usize>) -> (Position, Position, Range<usize>) {
        (Position::new(start_row, 0), Position::new(end_row, 0), bytes)
    }

    fn sample_tree() -> SyntaxTree {
        let source = "def f():\n    pass";
        let (start, end, bytes) = span(0, 1, 0..source.len());
        let mut builder = SyntaxTreeBuilder::new(source, NodeInit::new("module", start, end, bytes));
        let root = builder.root();
        let (start, end, bytes) = span(0, 1, 0..source.len());
        let function = builder.push(root, NodeInit::new("function_definition", start, end, bytes));
        let (start, end, bytes) = span(0, 0, 4..5);
        builder.push(function, NodeInit::new("identifier", start, end, bytes).with_field("name"));
        let (start, end, bytes) = span(1, 1, 13..17);
        let block = builder.push(function, NodeInit::new("block", start, end, bytes).with_field("body"));
        let (start, end, bytes) = span(1, 1, 13..17);
        builder.push(block, NodeInit::new("pass_statement", start, end, bytes));
        builder.finish()
    }

    #[test]
    fn links_parents_and_fields() {
        let tree = sample_tree();
        let function = tree.children(tree.root())[0];
        let name = tree.child_by_field_name(function, "name").expect("name field");
        assert_eq!(tree.text(name), "f");
        assert_eq!(tree.parent(name), Some(function));
        assert_eq!(tree.node(function).start_line(), 1);
        assert_eq!(tree.node(function).end_line(), 2);
        assert!(tree.child_by_field_name(function, "parameters").is_none());
    }

    #[test]
    fn walks_in_pre_order() {
        let tree = sample_tree();
        let mut kinds = Vec::new();
        tree.walk_pre_order(|_, node| {
            kinds.push(node.kind());
            true
        });
        assert_eq!(
            kinds,
            vec!["module", "function_definition", "identifier", "block", "pass_statement"]
        );
    }

    #[test]
    fn pruned_nodes_hide_descendants() {
        let tree = sample_tree();
        let mut kinds = Vec::new();
        tree.walk_pre_order(|_, node| {
            kinds.push(node.kind());
            node.kind() != "function_definition"
        });
        assert_eq!(kinds, vec!["module", "function_definition"]);
    }

    #[test]
    fn clean_tree_has_no_error() {
        let tree = sample_tree();
        assert!(tree.first_error(tree.root()).is_none());
    }
}
