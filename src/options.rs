use crate::constants::{DATA_MAX, DEPTH_MAX, NODE_MAX};

/// Characters accepted inside a key word, besides ASCII alphanumerics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyCharset {
    /// `-` and `_`.
    #[default]
    Standard,
    /// `_` only.
    Legacy,
}

impl KeyCharset {
    pub fn allows_hyphen(self) -> bool {
        matches!(self, KeyCharset::Standard)
    }
}

/// What [`crate::Context::init`] does when a tree is already loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reinit {
    #[default]
    Reject,
    Replace,
}

#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub max_nodes: usize,
    pub max_size: usize,
    pub max_depth: usize,
    pub key_charset: KeyCharset,
    pub comments: bool,
    pub reinit: Reinit,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_key_charset(mut self, key_charset: KeyCharset) -> Self {
        self.key_charset = key_charset;
        self
    }

    pub fn with_comments(mut self, comments: bool) -> Self {
        self.comments = comments;
        self
    }

    pub fn with_reinit(mut self, reinit: Reinit) -> Self {
        self.reinit = reinit;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_nodes: NODE_MAX,
            max_size: DATA_MAX,
            max_depth: DEPTH_MAX,
            key_charset: KeyCharset::default(),
            comments: true,
            reinit: Reinit::default(),
        }
    }
}
