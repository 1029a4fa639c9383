//! SKC document embedded at the tail of an initrd image.
//!
//! Layout: `text NUL | size: u32 LE | checksum: u32 LE`, where `size` counts
//! the text and its NUL and `checksum` is the wrapping byte sum of those
//! `size` bytes.

use std::error::Error;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

const FOOTER_LEN: usize = 8;

pub fn checksum(data: &[u8]) -> u32 {
    data.iter()
        .fold(0u32, |sum, &byte| sum.wrapping_add(u32::from(byte)))
}

/// Byte range of an embedded document inside `image`, NUL included.
/// `None` when the tail does not hold a valid footer. A zero size or data
/// not ending in NUL is no footer, so zero padding is never mistaken for one.
pub fn locate(image: &[u8]) -> Option<std::ops::Range<usize>> {
    let footer_start = image.len().checked_sub(FOOTER_LEN)?;
    let footer = &image[footer_start..];
    let size = u32::from_le_bytes(footer[..4].try_into().ok()?) as usize;
    let expected = u32::from_le_bytes(footer[4..].try_into().ok()?);
    if size == 0 {
        return None;
    }

    let start = footer_start.checked_sub(size)?;
    let data = &image[start..footer_start];
    if data.last() != Some(&0) {
        return None;
    }
    let actual = checksum(data);
    if actual != expected {
        tracing::debug!(expected, actual, "initrd footer checksum mismatch");
        return None;
    }
    Some(start..footer_start)
}

/// Text of the embedded document, without its terminating NUL.
pub fn read(image: &[u8]) -> Result<Option<&str>, Box<dyn Error>> {
    let Some(range) = locate(image) else {
        return Ok(None);
    };
    let data = &image[range];
    let end = data.iter().position(|&byte| byte == 0).unwrap_or(data.len());
    let text = &data[..end];
    Ok(Some(std::str::from_utf8(text)?))
}

/// Serialized footer block for `text`.
pub fn encode(text: &str) -> Result<Vec<u8>, Box<dyn Error>> {
    if text.as_bytes().contains(&0) {
        return Err("config text contains a NUL byte".into());
    }
    let mut data = Vec::with_capacity(text.len() + 1 + FOOTER_LEN);
    data.extend_from_slice(text.as_bytes());
    data.push(0);
    let size = u32::try_from(data.len())?;
    let sum = checksum(&data);
    data.extend_from_slice(&size.to_le_bytes());
    data.extend_from_slice(&sum.to_le_bytes());
    Ok(data)
}

/// Removes the embedded document, if any. Returns whether one was found.
pub fn delete(path: &Path) -> Result<bool, Box<dyn Error>> {
    let image = fs::read(path)?;
    let Some(range) = locate(&image) else {
        return Ok(false);
    };
    let file = OpenOptions::new().write(true).open(path)?;
    file.set_len(range.start as u64)?;
    tracing::debug!(path = %path.display(), removed = image.len() - range.start, "deleted skc footer");
    Ok(true)
}

/// Replaces the embedded document with `text`. The text must parse with
/// `options`; an invalid document leaves the image untouched.
pub fn append(path: &Path, text: &str, options: &skc::ParseOptions) -> Result<(), Box<dyn Error>> {
    skc::parse_with_options(text, options)?;
    let block = encode(text)?;
    delete(path)?;
    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(&block)?;
    tracing::debug!(path = %path.display(), bytes = block.len(), "appended skc footer");
    Ok(())
}
