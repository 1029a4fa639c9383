use std::fmt;

use memchr::memchr_iter;
use thiserror::Error;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A fixed bound was hit: node capacity, text size or composed key length.
    Capacity,
    /// The document is malformed; carries a [`Location`].
    Syntax,
    /// The text could not be read or is not UTF-8.
    Input,
    /// Lifecycle misuse: initializing twice, querying before init.
    State,
    /// Tree bookkeeping went wrong. Indicates a parser bug, not bad input.
    Internal,
}

/// Position of a syntax error inside the source text. `line` and `column`
/// are 1-based, `offset` is a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let offset = offset.min(text.len());
        let head = &text.as_bytes()[..offset];
        let mut line = 1;
        let mut line_start = 0;
        for idx in memchr_iter(b'\n', head) {
            line += 1;
            line_start = idx + 1;
        }
        Self {
            offset,
            line,
            column: offset - line_start + 1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("invalid character in key")]
    InvalidKey,
    #[error("no closing quotation")]
    NoClosingQuote,
    #[error("no delimiter for value")]
    NoDelimiter,
    #[error("unexpected closing brace")]
    UnexpectedClosingBrace,
    #[error("brace is not closed")]
    UnclosedBrace,
    #[error("too many nested braces")]
    TooDeep,
    #[error("value is mixed with subkey")]
    MixedValue,
    #[error("unexpected trailing text")]
    TrailingText,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("parse error at {location}: {error}")]
    Syntax {
        error: SyntaxError,
        location: Location,
    },

    #[error("too many nodes (max {max})")]
    TooManyNodes { max: usize },

    #[error("config text is too large ({size} bytes, must be less than {max})")]
    TooLarge { size: usize, max: usize },

    #[error("composed key is too long (limit {limit} bytes)")]
    KeyTooLong { limit: usize },

    #[error("config data is already initialized")]
    Busy,

    #[error("config data is not initialized")]
    NotInitialized,

    #[error("invalid utf-8: {0}")]
    Utf8(String),

    #[error("read failed: {0}")]
    Io(String),

    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl Error {
    pub fn syntax(error: SyntaxError, text: &str, offset: usize) -> Self {
        Error::Syntax {
            error,
            location: Location::from_offset(text, offset),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Syntax { .. } => ErrorKind::Syntax,
            Error::Utf8(_) | Error::Io(_) => ErrorKind::Input,
            Error::TooManyNodes { .. } | Error::TooLarge { .. } | Error::KeyTooLong { .. } => {
                ErrorKind::Capacity
            }
            Error::Busy | Error::NotInitialized => ErrorKind::State,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Syntax { location, .. } => Some(*location),
            _ => None,
        }
    }

    pub fn syntax_error(&self) -> Option<SyntaxError> {
        match self {
            Error::Syntax { error, .. } => Some(*error),
            _ => None,
        }
    }
}
