//! Unit-at-a-time decoding for UTF-8, UTF-16 and UTF-32.
//!
//! The validators and the transcoder share these step functions so both agree
//! on exactly what counts as one invalid unit.

use crate::Encoding;

/// Outcome of decoding the unit at the start of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// A complete character spanning `len` bytes
    Char(char, usize),
    /// A malformed unit spanning `len` bytes
    Invalid(usize),
    /// The buffer ends in the middle of a unit; `len` is the remaining length
    Incomplete(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endian {
    Little,
    Big,
}

impl Endian {
    fn u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            Endian::Little => u16::from_le_bytes(bytes),
            Endian::Big => u16::from_be_bytes(bytes),
        }
    }

    fn u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            Endian::Little => u32::from_le_bytes(bytes),
            Endian::Big => u32::from_be_bytes(bytes),
        }
    }
}

/// Decode the next unit of a Unicode encoding; `None` for single-byte encodings
pub(crate) fn next_unit(encoding: Encoding, input: &[u8]) -> Option<Step> {
    let step = match encoding {
        Encoding::UTF8 => next_utf8(input),
        Encoding::UTF16LE => next_utf16(input, Endian::Little),
        Encoding::UTF16BE => next_utf16(input, Endian::Big),
        Encoding::UTF32LE => next_utf32(input, Endian::Little),
        Encoding::UTF32BE => next_utf32(input, Endian::Big),
        _ => return None,
    };
    Some(step)
}

/// Decode one UTF-8 sequence
///
/// A malformed sequence is reported as its maximal invalid subpart, so
/// `E2 82 41` yields `Invalid(2)` and the `41` is decoded on the next step.
pub(crate) fn next_utf8(input: &[u8]) -> Step {
    let Some(&lead) = input.first() else {
        return Step::Incomplete(0);
    };

    if lead < 0x80 {
        return Step::Char(lead as char, 1);
    }

    // Allowed range of the second byte rules out overlongs, surrogates and
    // values above U+10FFFF
    let (len, second) = match lead {
        0xC2..=0xDF => (2, 0x80..=0xBF),
        0xE0 => (3, 0xA0..=0xBF),
        0xE1..=0xEC | 0xEE..=0xEF => (3, 0x80..=0xBF),
        0xED => (3, 0x80..=0x9F),
        0xF0 => (4, 0x90..=0xBF),
        0xF1..=0xF3 => (4, 0x80..=0xBF),
        0xF4 => (4, 0x80..=0x8F),
        _ => return Step::Invalid(1),
    };

    let mut code_point = u32::from(lead) & (0x7F >> len);
    for i in 1..len {
        let Some(&byte) = input.get(i) else {
            return Step::Incomplete(input.len());
        };
        let in_range = if i == 1 {
            second.contains(&byte)
        } else {
            (0x80..=0xBF).contains(&byte)
        };
        if !in_range {
            return Step::Invalid(i);
        }
        code_point = (code_point << 6) | u32::from(byte & 0x3F);
    }

    match char::from_u32(code_point) {
        Some(ch) => Step::Char(ch, len),
        None => Step::Invalid(len),
    }
}

/// Decode one UTF-16 code unit or surrogate pair
pub(crate) fn next_utf16(input: &[u8], endian: Endian) -> Step {
    if input.len() < 2 {
        return Step::Incomplete(input.len());
    }

    let unit = endian.u16([input[0], input[1]]);
    match unit {
        0xD800..=0xDBFF => {
            if input.len() < 4 {
                return Step::Incomplete(input.len());
            }
            let low = endian.u16([input[2], input[3]]);
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Step::Invalid(2);
            }
            let code_point = 0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
            match char::from_u32(code_point) {
                Some(ch) => Step::Char(ch, 4),
                None => Step::Invalid(4),
            }
        }
        0xDC00..=0xDFFF => Step::Invalid(2),
        _ => match char::from_u32(u32::from(unit)) {
            Some(ch) => Step::Char(ch, 2),
            None => Step::Invalid(2),
        },
    }
}

/// Decode one UTF-32 code unit
pub(crate) fn next_utf32(input: &[u8], endian: Endian) -> Step {
    if input.len() < 4 {
        return Step::Incomplete(input.len());
    }

    let value = endian.u32([input[0], input[1], input[2], input[3]]);
    match char::from_u32(value) {
        Some(ch) => Step::Char(ch, 4),
        None => Step::Invalid(4),
    }
}

/// Append the encoded form of `ch` in a Unicode encoding to `output`
pub(crate) fn encode_char(encoding: Encoding, ch: char, output: &mut Vec<u8>) -> bool {
    match encoding {
        Encoding::UTF8 => {
            let mut buf = [0u8; 4];
            output.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        }
        Encoding::UTF16LE | Encoding::UTF16BE => {
            let mut buf = [0u16; 2];
            for unit in ch.encode_utf16(&mut buf).iter() {
                if encoding == Encoding::UTF16LE {
                    output.extend_from_slice(&unit.to_le_bytes());
                } else {
                    output.extend_from_slice(&unit.to_be_bytes());
                }
            }
        }
        Encoding::UTF32LE => output.extend_from_slice(&(ch as u32).to_le_bytes()),
        Encoding::UTF32BE => output.extend_from_slice(&(ch as u32).to_be_bytes()),
        _ => return false,
    }
    true
}
