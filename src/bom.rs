//! Byte Order Mark (BOM) sniffing.
//!
//! A BOM is the only evidence that identifies an encoding with certainty, so
//! the detector consults it before any other strategy.

use crate::Encoding;
use crate::detection::{EncodingCandidate, Strategy};

/// UTF-8 BOM bytes.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
/// UTF-16 little-endian BOM bytes.
pub const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
/// UTF-16 big-endian BOM bytes.
pub const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];
/// UTF-32 little-endian BOM bytes.
pub const UTF32_LE_BOM: [u8; 4] = [0xFF, 0xFE, 0x00, 0x00];
/// UTF-32 big-endian BOM bytes.
pub const UTF32_BE_BOM: [u8; 4] = [0x00, 0x00, 0xFE, 0xFF];

// Four-byte signatures first: the UTF-32LE BOM starts with the UTF-16LE one.
const SIGNATURES: [(Encoding, &[u8]); 5] = [
    (Encoding::UTF32LE, &UTF32_LE_BOM),
    (Encoding::UTF32BE, &UTF32_BE_BOM),
    (Encoding::UTF8, &UTF8_BOM),
    (Encoding::UTF16LE, &UTF16_LE_BOM),
    (Encoding::UTF16BE, &UTF16_BE_BOM),
];

/// Detect a BOM at the start of `data`, returning its encoding and length
pub fn sniff_bom(data: &[u8]) -> Option<(Encoding, usize)> {
    SIGNATURES
        .iter()
        .find(|(_, signature)| data.starts_with(signature))
        .map(|&(encoding, signature)| (encoding, signature.len()))
}

/// Detect a BOM and report it as a certain candidate
pub fn sniff(data: &[u8]) -> Option<EncodingCandidate> {
    sniff_bom(data).map(|(encoding, _)| EncodingCandidate::new(encoding, 1.0, Strategy::Bom))
}

/// Strip the BOM of `encoding` from `data` if present
pub fn strip_bom(data: &[u8], encoding: Encoding) -> (&[u8], bool) {
    match encoding.bom() {
        Some(bom) if data.starts_with(bom) => (&data[bom.len()..], true),
        _ => (data, false),
    }
}
