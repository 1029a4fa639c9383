//! Parser and query engine for SKC (structured kernel commandline) documents.
//!
//! ```
//! let tree = skc::parse("net { addr = 10.0.0.1; dns = a, b; }\nquiet;").unwrap();
//! assert_eq!(tree.find_value(None, "net.addr").map(|(v, _)| v), Some("10.0.0.1"));
//! assert_eq!(tree.find_value(None, "quiet"), Some(("", None)));
//! assert!(tree.find_value(None, "missing").is_none());
//! ```

pub mod arena;
pub mod constants;
pub mod context;
pub mod error;
pub mod options;
pub mod parse;
pub mod query;
pub mod render;
mod ser;
pub mod tree;

use std::io::Read;

pub use crate::arena::{Node, NodeId, NodeKind};
pub use crate::context::Context;
pub use crate::error::{Error, ErrorKind, Location, SyntaxError};
pub use crate::options::{KeyCharset, ParseOptions, Reinit};
pub use crate::query::{KeyValues, PrefixIter};
pub use crate::render::{dump, show_kvlist, show_tree};
pub use crate::tree::{Siblings, Tree};

pub type Result<T> = std::result::Result<T, Error>;

pub fn parse(text: &str) -> Result<Tree> {
    parse_with_options(text, &ParseOptions::default())
}

pub fn parse_with_options(text: &str, options: &ParseOptions) -> Result<Tree> {
    parse::from_str(text, options)
}

pub fn parse_owned(text: String, options: &ParseOptions) -> Result<Tree> {
    parse::from_string(text, options)
}

pub fn from_slice(input: &[u8]) -> Result<Tree> {
    from_slice_with_options(input, &ParseOptions::default())
}

pub fn from_slice_with_options(input: &[u8], options: &ParseOptions) -> Result<Tree> {
    parse::from_slice(input, options)
}

pub fn from_reader<R: Read>(reader: R) -> Result<Tree> {
    from_reader_with_options(reader, &ParseOptions::default())
}

pub fn from_reader_with_options<R: Read>(reader: R, options: &ParseOptions) -> Result<Tree> {
    parse::from_reader(reader, options)
}
