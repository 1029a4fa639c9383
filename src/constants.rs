/// Default node capacity of a tree.
pub const NODE_MAX: usize = 512;

/// Source text must be strictly shorter than this. Offsets were packed next to
/// a key/value tag bit in 16 bits, which leaves 15 bits of offset.
pub const DATA_MAX: usize = (1 << 15) - 1;

/// Default buffer size for composed keys, terminator included.
pub const KEYLEN_MAX: usize = 256;

/// Default limit of nested open braces.
pub const DEPTH_MAX: usize = 16;

pub(crate) const COMMENT: u8 = b'#';
pub(crate) const QUOTE: u8 = b'"';

#[inline]
pub fn is_key_byte(byte: u8, allow_hyphen: bool) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || (allow_hyphen && byte == b'-')
}

/// Blank characters that never end a statement.
#[inline]
pub(crate) fn is_blank(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\x0b' | b'\x0c')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_is_key_byte() {
        assert!(is_key_byte(b'a', true));
        assert!(is_key_byte(b'Z', false));
        assert!(is_key_byte(b'7', false));
        assert!(is_key_byte(b'_', false));
        assert!(is_key_byte(b'-', true));
        assert!(!is_key_byte(b'-', false));
        assert!(!is_key_byte(b'.', true));
        assert!(!is_key_byte(b' ', true));
    }

    #[rstest::rstest]
    fn test_data_max_fits_offset_bits() {
        assert_eq!(DATA_MAX, 32767);
        assert!(!is_blank(b'\n'));
        assert!(is_blank(b'\t'));
    }
}
