use memchr::{memchr, memmem};
use smol_str::SmolStr;

use crate::constants::{is_blank, COMMENT};

/// Byte lookup table for a set of ASCII delimiters.
#[derive(Clone, Copy)]
pub(crate) struct DelimiterSet([bool; 256]);

impl DelimiterSet {
    const fn new(bytes: &[u8]) -> Self {
        let mut table = [false; 256];
        let mut idx = 0;
        while idx < bytes.len() {
            table[bytes[idx] as usize] = true;
            idx += 1;
        }
        DelimiterSet(table)
    }

    #[inline]
    pub(crate) fn contains(&self, byte: u8) -> bool {
        self.0[byte as usize]
    }

    pub(crate) fn find(&self, bytes: &[u8], from: usize) -> Option<usize> {
        bytes
            .get(from..)?
            .iter()
            .position(|&byte| self.contains(byte))
            .map(|idx| from + idx)
    }
}

pub(crate) const STATEMENT: DelimiterSet = DelimiterSet::new(b"{}=;\n");
pub(crate) const STATEMENT_WITH_COMMENT: DelimiterSet = DelimiterSet::new(b"{}=;\n#");
pub(crate) const VALUE: DelimiterSet = DelimiterSet::new(b",;\n}");
pub(crate) const VALUE_WITH_COMMENT: DelimiterSet = DelimiterSet::new(b",;\n}#");

/// Skips blanks, stopping at a newline.
pub(crate) fn skip_blanks(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && is_blank(bytes[pos]) {
        pos += 1;
    }
    pos
}

/// Skips whitespace including newlines, and comments when enabled.
pub(crate) fn skip_space_and_comments(bytes: &[u8], mut pos: usize, comments: bool) -> usize {
    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if comments && bytes.get(pos) == Some(&COMMENT) {
            pos = skip_comment(bytes, pos + 1);
            continue;
        }
        return pos;
    }
}

/// Position just past the newline ending the comment, or the end of input.
pub(crate) fn skip_comment(bytes: &[u8], from: usize) -> usize {
    match bytes.get(from..).and_then(|rest| memchr(b'\n', rest)) {
        Some(idx) => from + idx + 1,
        None => bytes.len(),
    }
}

/// Narrows `start..end` to exclude surrounding ASCII whitespace.
pub(crate) fn trim_span(bytes: &[u8], mut start: usize, mut end: usize) -> (usize, usize) {
    while start < end && bytes[start].is_ascii_whitespace() {
        start += 1;
    }
    while end > start && bytes[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    (start, end)
}

/// Finds the first `"` at or after `from` that is not escaped by a backslash.
pub(crate) fn find_closing_quote(bytes: &[u8], from: usize) -> Option<usize> {
    let mut pos = from;
    loop {
        let idx = pos + memchr(b'"', bytes.get(pos..)?)?;
        if idx > from && bytes[idx - 1] == b'\\' {
            pos = idx + 1;
            continue;
        }
        return Some(idx);
    }
}

/// Replaces `\"` with `"`. Returns `None` when the text has nothing to unescape.
pub(crate) fn unescape_quotes(raw: &str) -> Option<SmolStr> {
    memmem::find(raw.as_bytes(), b"\\\"")?;
    Some(SmolStr::from(raw.replace("\\\"", "\"")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_delimiter_sets() {
        assert!(STATEMENT.contains(b'='));
        assert!(!STATEMENT.contains(b'#'));
        assert!(STATEMENT_WITH_COMMENT.contains(b'#'));
        assert!(VALUE.contains(b','));
        assert!(!VALUE.contains(b'='));
        assert_eq!(STATEMENT.find(b"abc = 1", 0), Some(4));
        assert_eq!(STATEMENT.find(b"abc", 0), None);
        assert_eq!(STATEMENT.find(b"a;b;", 2), Some(3));
        assert_eq!(STATEMENT.find(b"a;", 9), None);
    }

    #[rstest::rstest]
    #[case(br#"abc" x"#, 0, Some(3))]
    #[case(br#"a\"b" x"#, 0, Some(4))]
    #[case(br#"" x"#, 0, Some(0))]
    #[case(br#"abc"#, 0, None)]
    #[case(br#"a\""#, 0, None)]
    fn test_find_closing_quote(#[case] input: &[u8], #[case] from: usize, #[case] expected: Option<usize>) {
        assert_eq!(find_closing_quote(input, from), expected);
    }

    #[rstest::rstest]
    fn test_unescape_quotes() {
        assert_eq!(unescape_quotes("plain"), None);
        assert_eq!(unescape_quotes(r#"a\"b"#).as_deref(), Some("a\"b"));
        assert_eq!(unescape_quotes(r"a\nb"), None);
    }

    #[rstest::rstest]
    fn test_trim_and_skip() {
        assert_eq!(trim_span(b"  ab \n", 0, 6), (2, 4));
        assert_eq!(trim_span(b"   ", 0, 3), (3, 3));
        assert_eq!(skip_blanks(b" \t\nx", 0), 2);
        assert_eq!(skip_comment(b"# c\nx", 1), 4);
        assert_eq!(skip_comment(b"# c", 1), 3);
        assert_eq!(skip_space_and_comments(b" \n# c\n  x", 0, true), 8);
        assert_eq!(skip_space_and_comments(b" \n# c\n  x", 0, false), 2);
    }
}
