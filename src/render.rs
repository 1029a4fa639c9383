//! Text renderings of a parsed tree.
//!
//! [`show_tree`] prints nested brace blocks; for a tree built by the parser
//! they parse back into the same tree under the same options.
//! [`show_kvlist`] prints one fully-qualified `key = "value";` line per leaf
//! and [`dump`] lists the raw node arena.

use std::fmt::{self, Write};

use crate::arena::NodeId;
use crate::tree::Tree;

pub fn show_tree(tree: &Tree) -> String {
    render(tree, write_tree)
}

pub fn show_kvlist(tree: &Tree) -> String {
    render(tree, write_kvlist)
}

pub fn dump(tree: &Tree) -> String {
    render(tree, write_dump)
}

fn render(tree: &Tree, write: fn(&Tree, &mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write(tree, &mut out);
    out
}

pub fn write_tree<W: Write>(tree: &Tree, out: &mut W) -> fmt::Result {
    let mut depth = 0usize;
    let mut cur = tree.root();
    while let Some(node) = cur {
        if !tree.is_key(node) {
            break;
        }
        write_indent(out, depth)?;
        let word = tree.text(node).unwrap_or_default();
        match tree.child(node) {
            Some(child) if tree.is_key(child) => {
                writeln!(out, "{word} {{")?;
                depth += 1;
                cur = Some(child);
                continue;
            }
            Some(child) => {
                write!(out, "{word} = ")?;
                write_values(tree, child, out)?;
                out.write_str(";\n")?;
            }
            None => writeln!(out, "{word};")?,
        }

        let mut node = node;
        cur = loop {
            if let Some(next) = tree.next(node) {
                break Some(next);
            }
            let Some(parent) = tree.parent(node) else {
                break None;
            };
            depth = depth.saturating_sub(1);
            write_indent(out, depth)?;
            out.write_str("}\n")?;
            node = parent;
        };
    }
    Ok(())
}

pub fn write_kvlist<W: Write>(tree: &Tree, out: &mut W) -> fmt::Result {
    for (leaf, _) in tree.key_values(None) {
        // No length limit, and leaves come from this tree: composing cannot fail.
        let key = tree
            .compose_key_with_limit(None, leaf, usize::MAX)
            .map_err(|_| fmt::Error)?;
        match tree.child(leaf) {
            Some(first) => {
                write!(out, "{key} = ")?;
                write_values(tree, first, out)?;
                out.write_str(";\n")?;
            }
            None => writeln!(out, "{key};")?,
        }
    }
    Ok(())
}

pub fn write_dump<W: Write>(tree: &Tree, out: &mut W) -> fmt::Result {
    let mut index = itoa::Buffer::new();
    for (id, node) in tree.nodes() {
        out.write_char('[')?;
        out.write_str(index.format(id.index()))?;
        out.write_str("] ")?;
        out.write_str(tree.text(id).unwrap_or("<invalid>"))?;
        out.write_str(if node.is_key() { " (key)" } else { " (value)" })?;
        for (label, link) in [
            (" .next=", node.next),
            (" .child=", node.child),
            (" .parent=", node.parent),
        ] {
            out.write_str(label)?;
            match link {
                Some(link) => out.write_str(index.format(link.index()))?,
                None => out.write_char('-')?,
            }
        }
        out.write_char('\n')?;
    }
    Ok(())
}

/// Writes `"a", "b"` for the value chain starting at `first`.
pub fn write_values<W: Write>(tree: &Tree, first: NodeId, out: &mut W) -> fmt::Result {
    for (idx, value) in tree.siblings(first).enumerate() {
        if idx > 0 {
            out.write_str(", ")?;
        }
        write_quoted(tree.text(value).unwrap_or_default(), out)?;
    }
    Ok(())
}

/// Quotes `value`, escaping `"`. A value ending in `\` is written bare: quoted,
/// its last backslash would escape the closing quote. Only bare values can
/// end that way, and they hold no value delimiter.
fn write_quoted<W: Write>(value: &str, out: &mut W) -> fmt::Result {
    if value.ends_with('\\') {
        return out.write_str(value);
    }
    out.write_char('"')?;
    let mut rest = value;
    while let Some(idx) = memchr::memchr(b'"', rest.as_bytes()) {
        out.write_str(&rest[..idx])?;
        out.write_str("\\\"")?;
        rest = &rest[idx + 1..];
    }
    out.write_str(rest)?;
    out.write_char('"')
}

fn write_indent<W: Write>(out: &mut W, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_char('\t')?;
    }
    Ok(())
}
