use smol_str::SmolStr;

use crate::arena::NodeId;
use crate::tree::Tree;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Yielding,
    Done,
}

/// Cursor over every value whose dotted key starts with a prefix.
///
/// Prefix words match whole key words: `net` matches `net.a` but not
/// `network`. Array elements are yielded one by one; a key without value
/// yields `""`. Once exhausted the iterator stays exhausted; start a new one
/// to iterate again.
///
/// ```
/// let tree = skc::parse("net.a = 1; net.b = 2, 3; other.c = 4;").unwrap();
/// let values: Vec<_> = tree.iter_prefix("net").collect();
/// assert_eq!(values, vec!["1", "2", "3"]);
/// ```
#[derive(Debug, Clone)]
pub struct PrefixIter<'a> {
    tree: &'a Tree,
    prefix: SmolStr,
    /// Bytes of `prefix` consumed by matched key words.
    matched: usize,
    /// Deepest key matched by the whole prefix; `None` for an empty prefix.
    scope: Option<NodeId>,
    leaf: Option<NodeId>,
    value: Option<NodeId>,
    state: State,
}

impl<'a> PrefixIter<'a> {
    /// Descends from the top level while prefix words match. When a word
    /// finds no sibling the iterator is created already exhausted.
    pub fn start(tree: &'a Tree, prefix: &str) -> Self {
        let mut iter = Self {
            tree,
            prefix: SmolStr::new(prefix),
            matched: 0,
            scope: None,
            leaf: None,
            value: None,
            state: State::Done,
        };
        if prefix.is_empty() {
            iter.state = State::Yielding;
            return iter;
        }

        let mut cur = tree.root();
        while let Some(id) = cur {
            if !tree.is_key(id) {
                break;
            }
            let rest = &prefix[iter.matched..];
            match tree.match_word(id, rest) {
                None => cur = tree.next(id),
                Some(after) => {
                    iter.matched = prefix.len() - after.len();
                    if after.is_empty() {
                        iter.scope = Some(id);
                        iter.state = State::Yielding;
                        break;
                    }
                    cur = tree.child(id);
                }
            }
        }
        iter
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Length of the prefix matched against key words so far.
    pub fn matched_len(&self) -> usize {
        self.matched
    }

    /// Key node of the last yielded value.
    pub fn key_node(&self) -> Option<NodeId> {
        self.leaf
    }

    /// Last yielded value node; `None` for a key without value.
    pub fn value_node(&self) -> Option<NodeId> {
        self.value
    }

    /// The current key with the matched prefix removed, e.g. `b` for key
    /// `net.b` under prefix `net`.
    pub fn unmatched_key(&self) -> Result<String> {
        match self.leaf {
            Some(leaf) => self.tree.compose_key_after(self.scope, leaf),
            None => Ok(String::new()),
        }
    }

    fn finish(&mut self) -> Option<&'a str> {
        self.state = State::Done;
        self.leaf = None;
        self.value = None;
        None
    }
}

impl<'a> Iterator for PrefixIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.state == State::Done {
            return None;
        }
        let tree = self.tree;

        if let Some(next) = self.value.and_then(|value| tree.next(value)) {
            self.value = Some(next);
            return tree.text(next).or_else(|| self.finish());
        }

        let Some(leaf) = tree.find_next_leaf(self.scope, self.leaf) else {
            return self.finish();
        };
        self.leaf = Some(leaf);
        self.value = tree.child(leaf);
        match self.value {
            Some(value) => tree.text(value).or_else(|| self.finish()),
            None => Some(""),
        }
    }
}
