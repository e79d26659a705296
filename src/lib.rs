//! # charsniff - Character Encoding Detection and Transcoding
//!
//! Given a byte buffer of unknown origin, charsniff estimates its most probable
//! source encoding and converts it to canonical Unicode (a Rust `String`).
//!
//! ## Features
//!
//! - **BOM sniffing** for UTF-8, UTF-16 and UTF-32
//! - **Exact structural validation** of the Unicode transformation formats
//! - **Statistical scoring** of legacy single-byte code pages against
//!   reference language models
//! - **Ranked, deterministic results** that never fail
//! - **Policy-driven transcoding** that always yields valid Unicode
//!
//! ## Quick Start
//!
//! ```rust
//! use charsniff::{TranscodePolicy, detect, transcode};
//!
//! // UTF-16LE BOM followed by "Hi"
//! let data = [0xFF, 0xFE, 0x48, 0x00, 0x69, 0x00];
//!
//! let detection = detect(&data);
//! assert_eq!(detection.best().name(), "UTF-16LE");
//! assert_eq!(detection.best().confidence, 1.0);
//!
//! let decoded = transcode(&data, "UTF-16LE", TranscodePolicy::Fail).unwrap();
//! assert_eq!(decoded.text, "Hi");
//! assert!(decoded.valid);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

pub mod bom;
pub mod detection;
pub mod error;
pub mod models;
mod multibyte;
pub mod report;
pub mod scorer;
pub mod tables;
pub mod transcode;
pub mod validate;

pub use detection::{
    DecodedText, DetectionResult, Detector, DetectorConfig, EncodingCandidate, EncodingDetector,
    Strategy,
};
pub use error::{Error, Result};
pub use models::{LanguageModel, ReferenceModels};
pub use report::Format;
pub use transcode::{TranscodePolicy, TranscodeResult, Transcoder, encode};

/// Supported character encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(non_camel_case_types)]
pub enum Encoding {
    // Unicode encodings
    /// UTF-8 Unicode encoding (variable length, 1-4 bytes)
    UTF8,
    /// UTF-16LE Unicode encoding (little endian)
    UTF16LE,
    /// UTF-16BE Unicode encoding (big endian)
    UTF16BE,
    /// UTF-32LE Unicode encoding (little endian)
    UTF32LE,
    /// UTF-32BE Unicode encoding (big endian)
    UTF32BE,

    // Legacy single-byte encodings
    /// ISO-8859-1 (Latin-1) - Western European
    ISO_8859_1,
    /// Windows-1252 (Western European)
    WINDOWS_1252,
    /// ISO-8859-15 (Latin-9) - Western European with Euro
    ISO_8859_15,
    /// ASCII (7-bit, 0-127)
    ASCII,
}

impl Encoding {
    /// Every supported encoding, in fixed detection priority order
    pub const ALL: [Encoding; 9] = [
        Encoding::UTF8,
        Encoding::UTF16LE,
        Encoding::UTF16BE,
        Encoding::UTF32LE,
        Encoding::UTF32BE,
        Encoding::ISO_8859_1,
        Encoding::WINDOWS_1252,
        Encoding::ISO_8859_15,
        Encoding::ASCII,
    ];

    /// Encodings considered by a default [`Detector`]
    pub const DEFAULT_DETECTION: [Encoding; 5] = [
        Encoding::UTF8,
        Encoding::UTF16LE,
        Encoding::UTF16BE,
        Encoding::ISO_8859_1,
        Encoding::WINDOWS_1252,
    ];

    /// Get the canonical name of this encoding
    pub fn name(self) -> &'static str {
        match self {
            Encoding::UTF8 => "UTF-8",
            Encoding::UTF16LE => "UTF-16LE",
            Encoding::UTF16BE => "UTF-16BE",
            Encoding::UTF32LE => "UTF-32LE",
            Encoding::UTF32BE => "UTF-32BE",
            Encoding::ISO_8859_1 => "ISO-8859-1",
            Encoding::WINDOWS_1252 => "Windows-1252",
            Encoding::ISO_8859_15 => "ISO-8859-15",
            Encoding::ASCII => "US-ASCII",
        }
    }

    /// Position in the fixed tie-break order (lower wins)
    pub fn priority(self) -> usize {
        // ALL is declared in priority order
        Self::ALL
            .iter()
            .position(|&e| e == self)
            .unwrap_or(Self::ALL.len())
    }

    /// Check if this is one of the Unicode transformation formats
    pub fn is_unicode(self) -> bool {
        matches!(
            self,
            Encoding::UTF8
                | Encoding::UTF16LE
                | Encoding::UTF16BE
                | Encoding::UTF32LE
                | Encoding::UTF32BE
        )
    }

    /// Check if this encoding maps every character to exactly one byte
    pub fn is_single_byte(self) -> bool {
        !self.is_unicode()
    }

    /// Check if this encoding is ASCII-compatible (ASCII bytes 0-127 have same meaning)
    pub fn is_ascii_compatible(self) -> bool {
        !matches!(
            self,
            Encoding::UTF16LE | Encoding::UTF16BE | Encoding::UTF32LE | Encoding::UTF32BE
        )
    }

    /// Get the byte order mark (BOM) for this encoding if it has one
    pub fn bom(self) -> Option<&'static [u8]> {
        match self {
            Encoding::UTF8 => Some(&bom::UTF8_BOM),
            Encoding::UTF16LE => Some(&bom::UTF16_LE_BOM),
            Encoding::UTF16BE => Some(&bom::UTF16_BE_BOM),
            Encoding::UTF32LE => Some(&bom::UTF32_LE_BOM),
            Encoding::UTF32BE => Some(&bom::UTF32_BE_BOM),
            _ => None,
        }
    }

    /// Get the decode table for single-byte encodings
    pub fn code_page(self) -> Option<&'static tables::CodePage> {
        tables::code_page(self)
    }

    /// Resolve an encoding label such as `latin1` or `cp1252`
    pub fn from_label(label: &str) -> Result<Self> {
        let normalized: String = label
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let encoding = match normalized.as_str() {
            "UTF8" => Encoding::UTF8,
            "UTF16LE" => Encoding::UTF16LE,
            "UTF16BE" => Encoding::UTF16BE,
            "UTF32LE" => Encoding::UTF32LE,
            "UTF32BE" => Encoding::UTF32BE,
            "ASCII" | "USASCII" => Encoding::ASCII,
            "ISO88591" | "LATIN1" | "L1" => Encoding::ISO_8859_1,
            "ISO885915" | "LATIN9" | "L9" => Encoding::ISO_8859_15,
            "WINDOWS1252" | "WIN1252" | "CP1252" => Encoding::WINDOWS_1252,
            _ => return Err(Error::unsupported(label)),
        };

        Ok(encoding)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s)
    }
}

impl Serialize for Encoding {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Detect the encoding of `data` with the default configuration
pub fn detect(data: &[u8]) -> DetectionResult {
    Detector::new().detect(data)
}

/// Transcode `data` from the encoding named `encoding` to a Unicode string
///
/// Fails only when `encoding` is not a supported label; malformed input is
/// handled according to `policy`.
pub fn transcode(data: &[u8], encoding: &str, policy: TranscodePolicy) -> Result<TranscodeResult> {
    let encoding = Encoding::from_label(encoding)?;
    Ok(Transcoder::new(encoding).policy(policy).transcode(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encoding_properties() {
        assert_eq!(Encoding::UTF8.name(), "UTF-8");
        assert_eq!(Encoding::WINDOWS_1252.name(), "Windows-1252");
        assert!(Encoding::UTF8.is_ascii_compatible());
        assert!(!Encoding::UTF16LE.is_ascii_compatible());
        assert!(Encoding::UTF32BE.is_unicode());
        assert!(Encoding::ISO_8859_15.is_single_byte());
    }

    #[test]
    fn test_bom_bytes() {
        assert_eq!(Encoding::UTF8.bom(), Some([0xEF, 0xBB, 0xBF].as_slice()));
        assert_eq!(Encoding::UTF16LE.bom(), Some([0xFF, 0xFE].as_slice()));
        assert_eq!(
            Encoding::UTF32BE.bom(),
            Some([0x00, 0x00, 0xFE, 0xFF].as_slice())
        );
        assert_eq!(Encoding::WINDOWS_1252.bom(), None);
    }

    #[test]
    fn test_priority_order() {
        assert!(Encoding::UTF8.priority() < Encoding::UTF16LE.priority());
        assert!(Encoding::UTF16BE.priority() < Encoding::UTF32LE.priority());
        assert!(Encoding::UTF32BE.priority() < Encoding::ISO_8859_1.priority());
        assert!(Encoding::ISO_8859_1.priority() < Encoding::WINDOWS_1252.priority());
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!("utf-8".parse::<Encoding>().unwrap(), Encoding::UTF8);
        assert_eq!("UTF_16le".parse::<Encoding>().unwrap(), Encoding::UTF16LE);
        assert_eq!("latin1".parse::<Encoding>().unwrap(), Encoding::ISO_8859_1);
        assert_eq!("cp1252".parse::<Encoding>().unwrap(), Encoding::WINDOWS_1252);
        assert_eq!("Latin-9".parse::<Encoding>().unwrap(), Encoding::ISO_8859_15);

        let err = "Shift_JIS".parse::<Encoding>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedEncoding { ref name } if name == "Shift_JIS"));
    }

    #[test]
    fn test_transcode_unknown_label() {
        let err = transcode(b"abc", "EBCDIC-037", TranscodePolicy::Replace).unwrap_err();
        assert!(matches!(err, Error::UnsupportedEncoding { .. }));
    }

    #[test]
    fn test_utf16le_bom_example() {
        let data = [0xFF, 0xFE, 0x48, 0x00, 0x69, 0x00];

        let detection = detect(&data);
        assert_eq!(detection.best().encoding, Some(Encoding::UTF16LE));
        assert_eq!(detection.best().confidence, 1.0);

        let result = transcode(&data, "UTF-16LE", TranscodePolicy::Fail).unwrap();
        assert_eq!(result.text, "Hi");
        assert!(result.valid);
        assert_eq!(result.invalid_count, 0);
    }

    #[test]
    fn test_empty_buffer_example() {
        let detection = detect(&[]);
        assert_eq!(detection.candidates().len(), 1);
        assert_eq!(detection.best().name(), "unknown");
        assert_eq!(detection.best().confidence, 0.0);
    }
}
