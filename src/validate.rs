//! Byte-pattern validators.
//!
//! A validator only answers whether a buffer obeys an encoding's grammar.
//! Passing says nothing about intent: every buffer is valid ISO-8859-1, and
//! most even-length buffers are valid UTF-16.

use crate::Encoding;
use crate::multibyte::{self, Step};

/// Check that `data` is entirely well-formed in `encoding`
pub fn validate(data: &[u8], encoding: Encoding) -> bool {
    check(data, encoding, false)
}

/// Like [`validate`], but tolerate a truncated final sequence
///
/// Used on samples cut from a longer buffer, where the cut may fall inside a
/// multi-byte character.
pub fn validate_prefix(data: &[u8], encoding: Encoding) -> bool {
    check(data, encoding, true)
}

fn check(data: &[u8], encoding: Encoding, allow_truncated: bool) -> bool {
    if let Some(page) = encoding.code_page() {
        return data.iter().all(|&b| page.is_mappable(b));
    }

    let mut pos = 0;
    while pos < data.len() {
        match multibyte::next_unit(encoding, &data[pos..]) {
            Some(Step::Char(_, len)) => pos += len,
            Some(Step::Incomplete(_)) => return allow_truncated,
            Some(Step::Invalid(_)) | None => return false,
        }
    }
    true
}

/// Decode `data` as a Unicode encoding, stopping at the first malformed unit
///
/// A truncated tail is ignored. Used by the detector to inspect the text a
/// structurally valid sample stands for.
pub(crate) fn decode_valid_prefix(data: &[u8], encoding: Encoding) -> Vec<char> {
    let mut chars = Vec::with_capacity(data.len());
    let mut pos = 0;
    while pos < data.len() {
        match multibyte::next_unit(encoding, &data[pos..]) {
            Some(Step::Char(ch, len)) => {
                chars.push(ch);
                pos += len;
            }
            _ => break,
        }
    }
    chars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_validation() {
        assert!(validate("Hello 世界! 🌍".as_bytes(), Encoding::UTF8));
        assert!(validate(b"", Encoding::UTF8));
        assert!(!validate(b"caf\xE9", Encoding::UTF8));
        assert!(!validate(&[0xC0, 0xAF], Encoding::UTF8));
        assert!(!validate(&[0xED, 0xA0, 0x80], Encoding::UTF8));
    }

    #[test]
    fn test_truncated_utf8_prefix() {
        let data = "abc€".as_bytes();
        let cut = &data[..data.len() - 1];
        assert!(!validate(cut, Encoding::UTF8));
        assert!(validate_prefix(cut, Encoding::UTF8));
        // Truncation does not excuse a real error
        assert!(!validate_prefix(b"\xFFabc", Encoding::UTF8));
    }

    #[test]
    fn test_utf16_validation() {
        assert!(validate(&[0x48, 0x00, 0x69, 0x00], Encoding::UTF16LE));
        assert!(validate(&[0x00, 0x48, 0x00, 0x69], Encoding::UTF16BE));
        // Odd length
        assert!(!validate(&[0x48, 0x00, 0x69], Encoding::UTF16LE));
        assert!(validate_prefix(&[0x48, 0x00, 0x69], Encoding::UTF16LE));
        // Unpaired surrogates
        assert!(!validate(&[0x00, 0xD8, 0x41, 0x00], Encoding::UTF16LE));
        assert!(!validate(&[0x00, 0xDC], Encoding::UTF16LE));
    }

    #[test]
    fn test_utf32_validation() {
        assert!(validate(&[0x41, 0, 0, 0, 0x0D, 0xF3, 0x01, 0], Encoding::UTF32LE));
        assert!(!validate(&[0, 0, 0xD8, 0x00], Encoding::UTF32BE));
        assert!(!validate(&[0, 0x11, 0, 0], Encoding::UTF32BE));
    }

    #[test]
    fn test_single_byte_table_legality() {
        assert!(validate(&[0x00, 0x81, 0xFF], Encoding::ISO_8859_1));
        assert!(validate(&[0x80, 0x99], Encoding::WINDOWS_1252));
        assert!(!validate(&[0x81], Encoding::WINDOWS_1252));
        assert!(validate(b"plain", Encoding::ASCII));
        assert!(!validate(&[0xE9], Encoding::ASCII));
    }

    #[test]
    fn test_decode_valid_prefix() {
        let chars = decode_valid_prefix(&[0x48, 0x00, 0x69, 0x00, 0x21], Encoding::UTF16LE);
        assert_eq!(chars, vec!['H', 'i']);
        assert_eq!(decode_valid_prefix(b"ok\xFFno", Encoding::UTF8), vec!['o', 'k']);
    }
}
