use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::arena::NodeId;
use crate::tree::Tree;

/// Serializes as nested maps: a key with subkeys becomes a map, a single
/// value a string, an array a sequence of strings, and a key without value
/// an empty string.
impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Scope {
            tree: self,
            first: self.root(),
        }
        .serialize(serializer)
    }
}

struct Scope<'a> {
    tree: &'a Tree,
    first: Option<NodeId>,
}

impl Serialize for Scope<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(first) = self.first {
            for key in self.tree.siblings(first) {
                let word = self.tree.text(key).unwrap_or_default();
                map.serialize_entry(word, &Entry { tree: self.tree, key })?;
            }
        }
        map.end()
    }
}

struct Entry<'a> {
    tree: &'a Tree,
    key: NodeId,
}

impl Serialize for Entry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tree = self.tree;
        match tree.child(self.key) {
            None => serializer.serialize_str(""),
            Some(child) if tree.is_key(child) => Scope {
                tree,
                first: Some(child),
            }
            .serialize(serializer),
            Some(child) if tree.is_array(child) => {
                let mut seq = serializer.serialize_seq(None)?;
                for value in tree.siblings(child) {
                    seq.serialize_element(tree.text(value).unwrap_or_default())?;
                }
                seq.end()
            }
            Some(child) => serializer.serialize_str(tree.text(child).unwrap_or_default()),
        }
    }
}
