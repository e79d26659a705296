//! Decode tables for the supported single-byte code pages.
//!
//! Every table maps all 256 byte values either to a character or to `None`
//! for bytes the code page leaves undefined. Tables are `static` and built at
//! compile time.

use crate::Encoding;

/// A single-byte code page: one optional character per byte value
#[derive(Debug)]
pub struct CodePage {
    encoding: Encoding,
    chars: [Option<char>; 256],
}

impl CodePage {
    /// ISO-8859-1 maps every byte to the code point of the same value
    const fn latin1(encoding: Encoding) -> Self {
        let mut chars = [None; 256];
        let mut i = 0;
        while i < 256 {
            chars[i] = char::from_u32(i as u32);
            i += 1;
        }
        Self { encoding, chars }
    }

    const fn ascii() -> Self {
        let mut page = Self::latin1(Encoding::ASCII);
        let mut i = 0x80;
        while i < 256 {
            page.chars[i] = None;
            i += 1;
        }
        page
    }

    const fn with_overrides(mut self, overrides: &[(u8, Option<char>)]) -> Self {
        let mut i = 0;
        while i < overrides.len() {
            let (byte, ch) = overrides[i];
            self.chars[byte as usize] = ch;
            i += 1;
        }
        self
    }

    /// The encoding this table belongs to
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Decode a single byte
    #[inline]
    pub fn decode(&self, byte: u8) -> Option<char> {
        self.chars[byte as usize]
    }

    /// Check if a byte is defined by this code page
    #[inline]
    pub fn is_mappable(&self, byte: u8) -> bool {
        self.chars[byte as usize].is_some()
    }

    /// Reverse lookup: the byte representing `ch`, if any
    pub fn encode(&self, ch: char) -> Option<u8> {
        if ch.is_ascii() {
            return self.decode(ch as u8).map(|_| ch as u8);
        }
        self.chars[0x80..]
            .iter()
            .position(|&c| c == Some(ch))
            .map(|pos| (pos + 0x80) as u8)
    }
}

const WINDOWS_1252_OVERRIDES: [(u8, Option<char>); 32] = [
    (0x80, Some('\u{20AC}')), // €
    (0x81, None),
    (0x82, Some('\u{201A}')), // ‚
    (0x83, Some('\u{0192}')), // ƒ
    (0x84, Some('\u{201E}')), // „
    (0x85, Some('\u{2026}')), // …
    (0x86, Some('\u{2020}')), // †
    (0x87, Some('\u{2021}')), // ‡
    (0x88, Some('\u{02C6}')), // ˆ
    (0x89, Some('\u{2030}')), // ‰
    (0x8A, Some('\u{0160}')), // Š
    (0x8B, Some('\u{2039}')), // ‹
    (0x8C, Some('\u{0152}')), // Œ
    (0x8D, None),
    (0x8E, Some('\u{017D}')), // Ž
    (0x8F, None),
    (0x90, None),
    (0x91, Some('\u{2018}')), // ‘
    (0x92, Some('\u{2019}')), // ’
    (0x93, Some('\u{201C}')), // “
    (0x94, Some('\u{201D}')), // ”
    (0x95, Some('\u{2022}')), // •
    (0x96, Some('\u{2013}')), // –
    (0x97, Some('\u{2014}')), // —
    (0x98, Some('\u{02DC}')), // ˜
    (0x99, Some('\u{2122}')), // ™
    (0x9A, Some('\u{0161}')), // š
    (0x9B, Some('\u{203A}')), // ›
    (0x9C, Some('\u{0153}')), // œ
    (0x9D, None),
    (0x9E, Some('\u{017E}')), // ž
    (0x9F, Some('\u{0178}')), // Ÿ
];

// Latin-9 replaces eight Latin-1 symbols
const ISO_8859_15_OVERRIDES: [(u8, Option<char>); 8] = [
    (0xA4, Some('\u{20AC}')), // €
    (0xA6, Some('\u{0160}')), // Š
    (0xA8, Some('\u{0161}')), // š
    (0xB4, Some('\u{017D}')), // Ž
    (0xB8, Some('\u{017E}')), // ž
    (0xBC, Some('\u{0152}')), // Œ
    (0xBD, Some('\u{0153}')), // œ
    (0xBE, Some('\u{0178}')), // Ÿ
];

static ISO_8859_1: CodePage = CodePage::latin1(Encoding::ISO_8859_1);
static ISO_8859_15: CodePage =
    CodePage::latin1(Encoding::ISO_8859_15).with_overrides(&ISO_8859_15_OVERRIDES);
static WINDOWS_1252: CodePage =
    CodePage::latin1(Encoding::WINDOWS_1252).with_overrides(&WINDOWS_1252_OVERRIDES);
static ASCII: CodePage = CodePage::ascii();

/// Get the decode table of a single-byte encoding
pub fn code_page(encoding: Encoding) -> Option<&'static CodePage> {
    match encoding {
        Encoding::ISO_8859_1 => Some(&ISO_8859_1),
        Encoding::ISO_8859_15 => Some(&ISO_8859_15),
        Encoding::WINDOWS_1252 => Some(&WINDOWS_1252),
        Encoding::ASCII => Some(&ASCII),
        _ => None,
    }
}

/// Best-effort decoding of a byte the source encoding cannot represent
///
/// Undefined Windows-1252 bytes become the C1 control of the same value,
/// high bytes in US-ASCII or malformed UTF-8 are read as Windows-1252 with the
/// same Latin-1 fallback. UTF-16 and UTF-32 have no byte-level fallback.
pub fn fallback(encoding: Encoding, byte: u8) -> Option<char> {
    match encoding {
        Encoding::UTF8 | Encoding::ASCII | Encoding::WINDOWS_1252 => {
            WINDOWS_1252.decode(byte).or_else(|| ISO_8859_1.decode(byte))
        }
        Encoding::ISO_8859_1 | Encoding::ISO_8859_15 => ISO_8859_1.decode(byte),
        Encoding::UTF16LE | Encoding::UTF16BE | Encoding::UTF32LE | Encoding::UTF32BE => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_identity() {
        let page = code_page(Encoding::ISO_8859_1).unwrap();
        for byte in 0..=255u8 {
            assert_eq!(page.decode(byte), Some(byte as char));
        }
    }

    #[test]
    fn test_windows_1252_special_chars() {
        let page = code_page(Encoding::WINDOWS_1252).unwrap();
        assert_eq!(page.decode(0x80), Some('€'));
        assert_eq!(page.decode(0x99), Some('™'));
        assert_eq!(page.decode(0x93), Some('“'));
        assert_eq!(page.decode(0xE9), Some('é'));
        for undefined in [0x81, 0x8D, 0x8F, 0x90, 0x9D] {
            assert!(!page.is_mappable(undefined));
        }
    }

    #[test]
    fn test_iso_8859_15_euro_support() {
        let page = code_page(Encoding::ISO_8859_15).unwrap();
        assert_eq!(page.decode(0xA4), Some('€'));
        assert_eq!(page.decode(0xA3), Some('£'));
        assert_eq!(page.encode('œ'), Some(0xBD));
        assert_eq!(page.encode('¤'), None);
    }

    #[test]
    fn test_ascii_rejects_high_bytes() {
        let page = code_page(Encoding::ASCII).unwrap();
        assert_eq!(page.decode(b'A'), Some('A'));
        assert_eq!(page.decode(0x80), None);
        assert_eq!(page.encode('é'), None);
    }

    #[test]
    fn test_unicode_has_no_code_page() {
        assert!(code_page(Encoding::UTF8).is_none());
        assert!(code_page(Encoding::UTF16LE).is_none());
    }

    #[test]
    fn test_fallback() {
        assert_eq!(fallback(Encoding::WINDOWS_1252, 0x81), Some('\u{81}'));
        assert_eq!(fallback(Encoding::ASCII, 0xE9), Some('é'));
        assert_eq!(fallback(Encoding::ASCII, 0x80), Some('€'));
        assert_eq!(fallback(Encoding::UTF8, 0x92), Some('’'));
        assert_eq!(fallback(Encoding::UTF16LE, 0x41), None);
    }
}
