mod prefix;

use smallvec::SmallVec;

use crate::arena::NodeId;
use crate::constants::KEYLEN_MAX;
use crate::tree::{Siblings, Tree};
use crate::{Error, Result};

pub use prefix::PrefixIter;

impl Tree {
    /// If `node` is the first word of `key`, returns the rest of the key
    /// after the separating dot (empty when the whole key matched).
    pub(crate) fn match_word<'k>(&self, node: NodeId, key: &'k str) -> Option<&'k str> {
        let word = self.text(node)?;
        let rest = key.strip_prefix(word)?;
        if rest.is_empty() {
            Some(rest)
        } else {
            rest.strip_prefix('.')
        }
    }

    /// Finds the key node for a dotted `key` below `parent`, or below the
    /// top level when `parent` is `None`.
    pub fn find_node(&self, parent: Option<NodeId>, key: &str) -> Option<NodeId> {
        let mut cur = match parent {
            Some(parent) => self.child(parent),
            None => self.root(),
        };
        let mut key = key;
        while let Some(id) = cur {
            if !self.is_key(id) {
                return None;
            }
            match self.match_word(id, key) {
                None => cur = self.next(id),
                Some("") => return Some(id),
                Some(rest) => {
                    key = rest;
                    cur = self.child(id);
                }
            }
        }
        None
    }

    /// Looks up the value of a dotted `key`.
    ///
    /// Returns `None` when the key is absent or has subkeys, `("", None)` for
    /// a key without value, and the first value with its node otherwise. Use
    /// [`Tree::is_array`] on the node to tell an array from a single value.
    pub fn find_value(&self, parent: Option<NodeId>, key: &str) -> Option<(&str, Option<NodeId>)> {
        let node = self.find_node(parent, key)?;
        match self.child(node) {
            None => Some(("", None)),
            Some(child) if self.is_value(child) => Some((self.text(child)?, Some(child))),
            Some(_) => None,
        }
    }

    /// All values of a dotted `key`, in order. Empty for a key without value.
    pub fn find_values(&self, parent: Option<NodeId>, key: &str) -> Option<Siblings<'_>> {
        let node = self.find_node(parent, key)?;
        if self.is_leaf(node) {
            Some(self.values(node))
        } else {
            None
        }
    }

    /// Full dotted key of `node`. A value node composes its owning key.
    pub fn compose_key(&self, node: NodeId) -> Result<String> {
        self.compose_key_with_limit(None, node, KEYLEN_MAX)
    }

    /// Dotted key of `node` relative to its ancestor `root`.
    pub fn compose_key_after(&self, root: Option<NodeId>, node: NodeId) -> Result<String> {
        self.compose_key_with_limit(root, node, KEYLEN_MAX)
    }

    /// Composes the key like [`Tree::compose_key_after`], failing with
    /// [`Error::KeyTooLong`] unless the key and a terminator fit in `limit`
    /// bytes.
    pub fn compose_key_with_limit(
        &self,
        root: Option<NodeId>,
        node: NodeId,
        limit: usize,
    ) -> Result<String> {
        if self.node(node).is_none() {
            return Err(Error::Internal("node index out of range"));
        }
        let mut cur = if self.is_value(node) {
            self.parent(node)
        } else {
            Some(node)
        };

        let mut words: SmallVec<[&str; 16]> = SmallVec::new();
        while let Some(id) = cur {
            if Some(id) == root {
                break;
            }
            words.push(
                self.text(id)
                    .ok_or(Error::Internal("node text out of range"))?,
            );
            cur = self.parent(id);
        }

        let len = words.iter().map(|word| word.len()).sum::<usize>() + words.len().saturating_sub(1);
        if len >= limit {
            return Err(Error::KeyTooLong { limit });
        }
        let mut key = String::with_capacity(len);
        for (idx, word) in words.iter().rev().enumerate() {
            if idx > 0 {
                key.push('.');
            }
            key.push_str(word);
        }
        Ok(key)
    }

    /// Depth-first next leaf under `root` after `node`. Pass `None` as
    /// `node` to get the first leaf; `root == None` walks the whole tree.
    pub fn find_next_leaf(&self, root: Option<NodeId>, node: Option<NodeId>) -> Option<NodeId> {
        let mut cur = match node {
            None => match root {
                Some(root) => root,
                None => self.root()?,
            },
            Some(mut node) => {
                if self.is_value(node) {
                    node = self.parent(node)?;
                }
                if Some(node) == root {
                    return None;
                }
                while self.next(node).is_none() {
                    let parent = self.parent(node);
                    if parent == root {
                        return None;
                    }
                    node = parent?;
                }
                self.next(node)?
            }
        };

        while !self.is_leaf(cur) {
            cur = self.child(cur)?;
        }
        Some(cur)
    }

    /// Advances `leaf` to the next leaf under `root` and returns its first
    /// value, or `""` for a key without value.
    pub fn find_next_key_value(&self, root: Option<NodeId>, leaf: &mut Option<NodeId>) -> Option<&str> {
        *leaf = self.find_next_leaf(root, *leaf);
        let id = (*leaf)?;
        match self.child(id) {
            Some(value) => self.text(value),
            None => Some(""),
        }
    }

    /// Every leaf under `root` with its first value.
    pub fn key_values(&self, root: Option<NodeId>) -> KeyValues<'_> {
        KeyValues {
            tree: self,
            root,
            leaf: None,
            done: false,
        }
    }

    /// Every value whose key starts with the dotted `prefix`.
    pub fn iter_prefix(&self, prefix: &str) -> PrefixIter<'_> {
        PrefixIter::start(self, prefix)
    }
}

#[derive(Debug, Clone)]
pub struct KeyValues<'a> {
    tree: &'a Tree,
    root: Option<NodeId>,
    leaf: Option<NodeId>,
    done: bool,
}

impl<'a> Iterator for KeyValues<'a> {
    type Item = (NodeId, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let tree = self.tree;
        match tree.find_next_key_value(self.root, &mut self.leaf) {
            Some(value) => Some((self.leaf?, value)),
            None => {
                self.done = true;
                None
            }
        }
    }
}
