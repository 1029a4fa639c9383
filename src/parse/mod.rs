mod parser;
mod scan;

use std::io::Read;

use crate::tree::Tree;
use crate::{Error, ParseOptions, Result};

pub fn from_string(source: String, options: &ParseOptions) -> Result<Tree> {
    if source.len() >= options.max_size {
        return Err(Error::TooLarge {
            size: source.len(),
            max: options.max_size,
        });
    }
    let arena = parser::parse_into(&source, options)?;
    tracing::debug!(
        nodes = arena.len(),
        bytes = source.len(),
        "parsed skc document"
    );
    Ok(Tree::from_parts(source, arena))
}

pub fn from_str(source: &str, options: &ParseOptions) -> Result<Tree> {
    if source.len() >= options.max_size {
        return Err(Error::TooLarge {
            size: source.len(),
            max: options.max_size,
        });
    }
    from_string(source.to_owned(), options)
}

pub fn from_slice(input: &[u8], options: &ParseOptions) -> Result<Tree> {
    let text = std::str::from_utf8(input).map_err(|err| Error::Utf8(err.to_string()))?;
    from_str(text, options)
}

pub fn from_reader<R: Read>(mut reader: R, options: &ParseOptions) -> Result<Tree> {
    let mut buf = String::new();
    reader
        .read_to_string(&mut buf)
        .map_err(|err| Error::Io(err.to_string()))?;
    from_string(buf, options)
}
