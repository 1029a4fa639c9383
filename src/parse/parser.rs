use memchr::memchr_iter;
use smallvec::SmallVec;

use crate::arena::{Node, NodeArena, NodeId, NodeKind, Span, StringRef};
use crate::constants::{is_key_byte, COMMENT, DEPTH_MAX, QUOTE};
use crate::error::SyntaxError;
use crate::{Error, ParseOptions, Result};

use super::scan::{
    find_closing_quote, skip_blanks, skip_comment, skip_space_and_comments, trim_span,
    unescape_quotes, DelimiterSet, STATEMENT, STATEMENT_WITH_COMMENT, VALUE, VALUE_WITH_COMMENT,
};

pub(crate) fn parse_into(source: &str, options: &ParseOptions) -> Result<NodeArena> {
    let mut parser = Parser::new(source, options);
    parser.parse_document()?;
    Ok(parser.arena)
}

struct ParsedValue {
    text: StringRef,
    delimiter: u8,
    next: usize,
}

struct Parser<'a> {
    source: &'a str,
    bytes: &'a [u8],
    arena: NodeArena,
    comments: bool,
    allow_hyphen: bool,
    max_depth: usize,
    statement_delimiters: &'static DelimiterSet,
    value_delimiters: &'static DelimiterSet,
    /// Key the next key word is resolved under; `None` at top level.
    last_parent: Option<NodeId>,
    open_braces: SmallVec<[NodeId; DEPTH_MAX]>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, options: &ParseOptions) -> Self {
        let (statement_delimiters, value_delimiters) = if options.comments {
            (&STATEMENT_WITH_COMMENT, &VALUE_WITH_COMMENT)
        } else {
            (&STATEMENT, &VALUE)
        };
        Self {
            source,
            bytes: source.as_bytes(),
            arena: NodeArena::with_capacity(options.max_nodes),
            comments: options.comments,
            allow_hyphen: options.key_charset.allows_hyphen(),
            max_depth: options.max_depth,
            statement_delimiters,
            value_delimiters,
            last_parent: None,
            open_braces: SmallVec::new(),
        }
    }

    fn parse_document(&mut self) -> Result<()> {
        let mut pos = 0;
        while let Some(delim) = self.statement_delimiters.find(self.bytes, pos) {
            pos = match self.bytes[delim] {
                b'=' => self.parse_kv(pos, delim)?,
                b'{' => self.open_brace(pos, delim)?,
                b'}' => self.close_brace(pos, delim)?,
                COMMENT => {
                    self.parse_key(pos, delim)?;
                    skip_comment(self.bytes, delim + 1)
                }
                _ => {
                    self.parse_key(pos, delim)?;
                    delim + 1
                }
            };
        }

        let (start, end) = trim_span(self.bytes, pos, self.bytes.len());
        if start < end {
            return Err(self.error(SyntaxError::TrailingText, start));
        }
        self.verify_tree()
    }

    fn error(&self, error: SyntaxError, offset: usize) -> Error {
        Error::syntax(error, self.source, offset)
    }

    fn node_offset(&self, id: NodeId) -> usize {
        match self.arena.get(id).map(|node| &node.text) {
            Some(StringRef::Span(span)) => span.start,
            _ => 0,
        }
    }

    // key = value[, value...] terminated by ; \n } or a comment
    fn parse_kv(&mut self, start: usize, eq: usize) -> Result<usize> {
        let prev_parent = self.last_parent;
        let key = self.parse_keys(start, eq)?;
        if let Some(child) = self.arena.get(key).and_then(|node| node.child) {
            if self.arena.get(child).is_some_and(|node| node.is_key()) {
                return Err(self.error(SyntaxError::MixedValue, eq));
            }
        }

        let (delimiter, next) = self.parse_array(key, eq + 1)?;
        self.last_parent = prev_parent;
        if delimiter == b'}' {
            self.close_scope(next - 1)?;
        }
        Ok(next)
    }

    /// Parses the value list of `key`, replacing any earlier values.
    /// Returns the terminating delimiter and the position after it.
    fn parse_array(&mut self, key: NodeId, from: usize) -> Result<(u8, usize)> {
        let mut pos = from;
        let mut first = None;
        let mut last: Option<NodeId> = None;
        loop {
            let value = self.parse_value(pos, first.is_some())?;
            let id = self
                .arena
                .allocate(value.text, NodeKind::Value, Some(key))?;
            match last {
                Some(prev) => self.node_mut(prev)?.next = Some(id),
                None => first = Some(id),
            }
            last = Some(id);
            pos = value.next;
            if value.delimiter != b',' {
                self.node_mut(key)?.child = first;
                return Ok((value.delimiter, pos));
            }
        }
    }

    fn parse_value(&self, from: usize, continuation: bool) -> Result<ParsedValue> {
        // Array elements may continue on the next line; a first value may not.
        let start = if continuation {
            skip_space_and_comments(self.bytes, from, self.comments)
        } else {
            skip_blanks(self.bytes, from)
        };

        if self.bytes.get(start) == Some(&QUOTE) {
            let body = start + 1;
            let close = find_closing_quote(self.bytes, body)
                .ok_or_else(|| self.error(SyntaxError::NoClosingQuote, start))?;
            let after = skip_blanks(self.bytes, close + 1);
            let delimiter = match self.bytes.get(after) {
                Some(&byte) if self.value_delimiters.contains(byte) => byte,
                _ => return Err(self.error(SyntaxError::NoDelimiter, after)),
            };
            let text = match unescape_quotes(&self.source[body..close]) {
                Some(owned) => StringRef::Owned(owned),
                None => StringRef::Span(Span::new(body, close)),
            };
            return Ok(self.finish_value(text, delimiter, after));
        }

        let delim = self
            .value_delimiters
            .find(self.bytes, start)
            .ok_or_else(|| self.error(SyntaxError::NoDelimiter, start))?;
        let (value_start, value_end) = trim_span(self.bytes, start, delim);
        let text = StringRef::Span(Span::new(value_start, value_end));
        Ok(self.finish_value(text, self.bytes[delim], delim))
    }

    fn finish_value(&self, text: StringRef, delimiter: u8, at: usize) -> ParsedValue {
        if delimiter == COMMENT {
            return ParsedValue {
                text,
                delimiter: b'\n',
                next: skip_comment(self.bytes, at + 1),
            };
        }
        ParsedValue {
            text,
            delimiter,
            next: at + 1,
        }
    }

    /// A key without value, e.g. a boolean flag. Empty text is skipped.
    fn parse_key(&mut self, start: usize, end: usize) -> Result<()> {
        let (start, end) = trim_span(self.bytes, start, end);
        if start == end {
            return Ok(());
        }
        let prev_parent = self.last_parent;
        self.parse_keys(start, end)?;
        self.last_parent = prev_parent;
        Ok(())
    }

    fn open_brace(&mut self, start: usize, brace: usize) -> Result<usize> {
        let key = self.parse_keys(start, brace)?;
        if self.open_braces.len() >= self.max_depth {
            return Err(self.error(SyntaxError::TooDeep, brace));
        }
        self.open_braces.push(key);
        Ok(brace + 1)
    }

    fn close_brace(&mut self, start: usize, brace: usize) -> Result<usize> {
        self.parse_key(start, brace)?;
        self.close_scope(brace)?;
        Ok(brace + 1)
    }

    fn close_scope(&mut self, brace: usize) -> Result<()> {
        if self.open_braces.pop().is_none() {
            return Err(self.error(SyntaxError::UnexpectedClosingBrace, brace));
        }
        self.last_parent = self.open_braces.last().copied();
        Ok(())
    }

    /// Resolves a dotted key path under the current parent, merging words
    /// with existing sibling keys. Leaves `last_parent` at the deepest key.
    fn parse_keys(&mut self, start: usize, end: usize) -> Result<NodeId> {
        let (start, end) = trim_span(self.bytes, start, end);
        if start == end {
            return Err(self.error(SyntaxError::InvalidKey, start));
        }

        let mut word_start = start;
        for dot in memchr_iter(b'.', &self.bytes[start..end]) {
            let dot = start + dot;
            self.add_key(word_start, dot)?;
            word_start = dot + 1;
        }
        self.add_key(word_start, end)
    }

    fn add_key(&mut self, start: usize, end: usize) -> Result<NodeId> {
        if start == end {
            return Err(self.error(SyntaxError::InvalidKey, start));
        }
        if let Some(bad) = self.bytes[start..end]
            .iter()
            .position(|&byte| !is_key_byte(byte, self.allow_hyphen))
        {
            return Err(self.error(SyntaxError::InvalidKey, start + bad));
        }

        let word = &self.source[start..end];
        if let Some(found) = self.find_key(self.last_parent, word) {
            self.last_parent = Some(found);
            return Ok(found);
        }

        if let Some(parent) = self.last_parent {
            let child = self.arena.get(parent).and_then(|node| node.child);
            if child.is_some_and(|child| self.arena.get(child).is_some_and(|node| node.is_value())) {
                return Err(self.error(SyntaxError::MixedValue, start));
            }
        }

        let id = self.add_child(StringRef::Span(Span::new(start, end)))?;
        self.last_parent = Some(id);
        Ok(id)
    }

    fn find_key(&self, parent: Option<NodeId>, word: &str) -> Option<NodeId> {
        let mut cur = match parent {
            Some(parent) => self.arena.get(parent)?.child,
            None if self.arena.is_empty() => None,
            None => Some(NodeId::new(0)),
        };
        while let Some(id) = cur {
            let node = self.arena.get(id)?;
            if node.is_key() && node.text.resolve(self.source) == Some(word) {
                return Some(id);
            }
            cur = node.next;
        }
        None
    }

    /// Appends a key node as the last child of `last_parent`, or as the last
    /// top-level key.
    fn add_child(&mut self, text: StringRef) -> Result<NodeId> {
        let parent = self.last_parent;
        let first = match parent {
            Some(parent) => self.arena.get(parent).and_then(|node| node.child),
            None if self.arena.is_empty() => None,
            None => Some(NodeId::new(0)),
        };
        let id = self.arena.allocate(text, NodeKind::Key, parent)?;

        match first {
            Some(first) => {
                let mut last = first;
                while let Some(next) = self.arena.get(last).and_then(|node| node.next) {
                    last = next;
                }
                self.node_mut(last)?.next = Some(id);
            }
            None => {
                if let Some(parent) = parent {
                    self.node_mut(parent)?.child = Some(id);
                }
            }
        }
        Ok(id)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.arena
            .get_mut(id)
            .ok_or(Error::Internal("node index out of range"))
    }

    fn verify_tree(&self) -> Result<()> {
        if let Some(&open) = self.open_braces.last() {
            return Err(self.error(SyntaxError::UnclosedBrace, self.node_offset(open)));
        }
        if self.last_parent.is_some() {
            return Err(Error::Internal("scope left open without a brace"));
        }

        let len = self.arena.len();
        let in_range = |link: Option<NodeId>| link.is_none_or(|id| id.index() < len);
        for (_, node) in self.arena.iter() {
            if !in_range(node.next) || !in_range(node.child) || !in_range(node.parent) {
                return Err(Error::Internal("node link out of range"));
            }
            if let StringRef::Span(span) = node.text {
                if span.end > self.bytes.len() {
                    return Err(Error::Internal("node text out of range"));
                }
            }
        }
        Ok(())
    }
}
