use crate::arena::{Node, NodeArena, NodeId};

/// A parsed SKC document: the source text and the node arena built over it.
///
/// The tree is immutable once built. Top-level keys have no parent; the first
/// of them is node 0 and serves as the traversal root.
#[derive(Debug)]
pub struct Tree {
    source: Box<str>,
    arena: NodeArena,
}

impl Tree {
    pub(crate) fn from_parts(source: String, arena: NodeArena) -> Self {
        Self {
            source: source.into_boxed_str(),
            arena,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    pub fn root(&self) -> Option<NodeId> {
        if self.arena.is_empty() {
            None
        } else {
            Some(NodeId::new(0))
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.arena.iter()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.child
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.next
    }

    /// Text of a node. A node whose span falls outside the source yields
    /// `None`; this never happens for trees built by the parser.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        let node = self.node(id)?;
        let text = node.text.resolve(&self.source);
        if text.is_none() {
            tracing::warn!(
                node = id.index(),
                source_len = self.source.len(),
                "node text is out of range"
            );
        }
        text
    }

    pub fn is_key(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(Node::is_key)
    }

    pub fn is_value(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(Node::is_value)
    }

    /// A value node followed by more values.
    pub fn is_array(&self, id: NodeId) -> bool {
        self.node(id)
            .is_some_and(|node| node.is_value() && node.next.is_some())
    }

    /// A key without subkeys: no child at all, or a value child.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        match self.node(id) {
            Some(node) if node.is_key() => match node.child {
                None => true,
                Some(child) => self.is_value(child),
            },
            _ => false,
        }
    }

    /// Children of `parent`, or the top-level keys when `parent` is `None`.
    pub fn children(&self, parent: Option<NodeId>) -> Siblings<'_> {
        let first = match parent {
            Some(parent) => self.child(parent),
            None => self.root(),
        };
        Siblings {
            tree: self,
            cur: first,
        }
    }

    /// The value chain owned by `key`, empty for a key-only leaf or a scope.
    pub fn values(&self, key: NodeId) -> Siblings<'_> {
        let first = self.child(key).filter(|&child| self.is_value(child));
        Siblings {
            tree: self,
            cur: first,
        }
    }

    /// `node` and every sibling after it.
    pub fn siblings(&self, node: NodeId) -> Siblings<'_> {
        Siblings {
            tree: self,
            cur: Some(node),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Siblings<'a> {
    tree: &'a Tree,
    cur: Option<NodeId>,
}

impl Iterator for Siblings<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.cur?;
        self.cur = self.tree.next(cur);
        Some(cur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{NodeKind, Span, StringRef};

    fn manual_tree() -> Tree {
        // a = x, y;
        let source = "a = x, y;".to_string();
        let mut arena = NodeArena::with_capacity(8);
        let a = arena
            .allocate(StringRef::Span(Span::new(0, 1)), NodeKind::Key, None)
            .unwrap();
        let x = arena
            .allocate(StringRef::Span(Span::new(4, 5)), NodeKind::Value, Some(a))
            .unwrap();
        let y = arena
            .allocate(StringRef::Span(Span::new(7, 8)), NodeKind::Value, Some(a))
            .unwrap();
        arena.get_mut(a).unwrap().child = Some(x);
        arena.get_mut(x).unwrap().next = Some(y);
        Tree::from_parts(source, arena)
    }

    #[rstest::rstest]
    fn test_accessors() {
        let tree = manual_tree();
        let root = tree.root().unwrap();
        assert_eq!(tree.text(root), Some("a"));
        assert!(tree.is_key(root));
        assert!(tree.is_leaf(root));
        let first = tree.child(root).unwrap();
        assert!(tree.is_value(first));
        assert!(tree.is_array(first));
        assert_eq!(tree.parent(first), Some(root));
        let values: Vec<_> = tree.values(root).filter_map(|v| tree.text(v)).collect();
        assert_eq!(values, vec!["x", "y"]);
        let last = tree.next(first).unwrap();
        assert!(!tree.is_array(last));
    }

    #[rstest::rstest]
    fn test_text_out_of_range_is_none() {
        let source = "ab".to_string();
        let mut arena = NodeArena::with_capacity(1);
        let id = arena
            .allocate(StringRef::Span(Span::new(1, 9)), NodeKind::Key, None)
            .unwrap();
        let tree = Tree::from_parts(source, arena);
        assert_eq!(tree.text(id), None);
    }

    #[rstest::rstest]
    fn test_empty_tree_has_no_root() {
        let tree = Tree::from_parts(String::new(), NodeArena::with_capacity(4));
        assert!(tree.root().is_none());
        assert_eq!(tree.children(None).count(), 0);
    }
}
