use smol_str::SmolStr;

use crate::{Error, Result};

/// Typed handle of a node inside a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize);
        NodeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Key,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Node text: a span of the source, or an owned copy when unescaping changed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringRef {
    Span(Span),
    Owned(SmolStr),
}

impl StringRef {
    pub fn resolve<'a>(&'a self, source: &'a str) -> Option<&'a str> {
        match self {
            StringRef::Span(span) => source.get(span.start..span.end),
            StringRef::Owned(value) => Some(value.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub next: Option<NodeId>,
    pub child: Option<NodeId>,
    pub parent: Option<NodeId>,
    pub text: StringRef,
}

impl Node {
    pub fn is_key(&self) -> bool {
        self.kind == NodeKind::Key
    }

    pub fn is_value(&self) -> bool {
        self.kind == NodeKind::Value
    }
}

/// Fixed-capacity node storage. Nodes are never freed or moved, so a
/// [`NodeId`] stays valid for the lifetime of the arena.
#[derive(Debug)]
pub struct NodeArena {
    nodes: Vec<Node>,
    capacity: usize,
}

impl NodeArena {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(u32::MAX as usize);
        Self {
            nodes: Vec::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    pub fn allocate(
        &mut self,
        text: StringRef,
        kind: NodeKind,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        if self.nodes.len() >= self.capacity {
            return Err(Error::TooManyNodes { max: self.capacity });
        }
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node {
            kind,
            next: None,
            child: None,
            parent,
            text,
        });
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId::new(index), node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> StringRef {
        StringRef::Span(Span::new(start, end))
    }

    #[rstest::rstest]
    fn test_allocate_assigns_sequential_ids() {
        let mut arena = NodeArena::with_capacity(4);
        let a = arena.allocate(span(0, 1), NodeKind::Key, None).unwrap();
        let b = arena.allocate(span(2, 3), NodeKind::Value, Some(a)).unwrap();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(b).unwrap().parent, Some(a));
        assert!(arena.get(b).unwrap().is_value());
        assert!(arena.get(b).unwrap().next.is_none());
    }

    #[rstest::rstest]
    fn test_allocate_fails_when_full() {
        let mut arena = NodeArena::with_capacity(2);
        arena.allocate(span(0, 1), NodeKind::Key, None).unwrap();
        arena.allocate(span(1, 2), NodeKind::Key, None).unwrap();
        let err = arena.allocate(span(2, 3), NodeKind::Key, None).unwrap_err();
        assert_eq!(err, Error::TooManyNodes { max: 2 });
        assert_eq!(arena.len(), 2);
    }

    #[rstest::rstest]
    fn test_get_out_of_range() {
        let arena = NodeArena::with_capacity(2);
        assert!(arena.get(NodeId::new(0)).is_none());
        assert!(arena.is_empty());
    }
}
