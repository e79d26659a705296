//! Transcoding between supported encodings and canonical Unicode.
//!
//! Decoding never aborts with an error: malformed or unmappable units are
//! handled by the active [`TranscodePolicy`] and counted, and the produced
//! `String` is valid Unicode by construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::multibyte::{self, Step};
use crate::{Encoding, bom, tables};

/// Handling of invalid or unmappable input units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscodePolicy {
    /// Stop at the first invalid unit and return the text decoded so far
    Fail,
    /// Emit the replacement character for each invalid unit
    #[default]
    Replace,
    /// Drop invalid units
    Skip,
    /// Try a nearest-equivalent mapping, then fall back to replacement
    BestEffort,
}

impl TranscodePolicy {
    /// Every policy
    pub const ALL: [TranscodePolicy; 4] = [
        TranscodePolicy::Fail,
        TranscodePolicy::Replace,
        TranscodePolicy::Skip,
        TranscodePolicy::BestEffort,
    ];

    /// Policy name as accepted by [`FromStr`]
    pub fn name(self) -> &'static str {
        match self {
            TranscodePolicy::Fail => "fail",
            TranscodePolicy::Replace => "replace",
            TranscodePolicy::Skip => "skip",
            TranscodePolicy::BestEffort => "best_effort",
        }
    }
}

impl fmt::Display for TranscodePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TranscodePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "fail" | "strict" => Ok(TranscodePolicy::Fail),
            "replace" => Ok(TranscodePolicy::Replace),
            "skip" | "ignore" => Ok(TranscodePolicy::Skip),
            "best_effort" | "best_effort_transcode" | "transcode" => {
                Ok(TranscodePolicy::BestEffort)
            }
            other => Err(format!("unknown transcode policy '{other}'")),
        }
    }
}

/// Output of a transcode call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscodeResult {
    /// Decoded text
    pub text: String,
    /// `true` when no invalid unit was encountered
    pub valid: bool,
    /// Number of invalid units encountered
    pub invalid_count: usize,
    /// Byte offset of the first invalid unit in the input
    pub first_invalid: Option<usize>,
    /// Source encoding
    pub encoding: Encoding,
    /// Whether a leading BOM was removed
    pub bom_removed: bool,
}

/// Decoder from one source encoding to Unicode
#[derive(Debug, Clone, Copy)]
pub struct Transcoder {
    encoding: Encoding,
    policy: TranscodePolicy,
    replacement: char,
}

impl Transcoder {
    /// Create a transcoder with the default `Replace` policy
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            policy: TranscodePolicy::default(),
            replacement: char::REPLACEMENT_CHARACTER,
        }
    }

    /// Set the invalid-unit policy
    pub fn policy(mut self, policy: TranscodePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the character emitted for invalid units (default U+FFFD)
    pub fn replacement(mut self, replacement: char) -> Self {
        self.replacement = replacement;
        self
    }

    /// Get source encoding
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Decode `input` to a Unicode string
    pub fn transcode(&self, input: &[u8]) -> TranscodeResult {
        let (payload, bom_removed) = bom::strip_bom(input, self.encoding);
        let offset = input.len() - payload.len();

        let mut out = Output {
            text: String::with_capacity(payload.len()),
            invalid_count: 0,
            first_invalid: None,
        };

        if let Some(page) = self.encoding.code_page() {
            for (pos, &byte) in payload.iter().enumerate() {
                match page.decode(byte) {
                    Some(ch) => out.text.push(ch),
                    None => {
                        if !self.invalid(&mut out, &payload[pos..pos + 1], offset + pos) {
                            break;
                        }
                    }
                }
            }
        } else {
            let mut pos = 0;
            while pos < payload.len() {
                let step = multibyte::next_unit(self.encoding, &payload[pos..])
                    .unwrap_or(Step::Invalid(1));
                match step {
                    Step::Char(ch, len) => {
                        out.text.push(ch);
                        pos += len;
                    }
                    Step::Invalid(len) | Step::Incomplete(len) => {
                        let len = len.max(1);
                        if !self.invalid(&mut out, &payload[pos..pos + len], offset + pos) {
                            break;
                        }
                        pos += len;
                    }
                }
            }
        }

        if out.invalid_count > 0 {
            debug!(
                encoding = self.encoding.name(),
                policy = self.policy.name(),
                invalid_count = out.invalid_count,
                first_invalid = out.first_invalid,
                "lossy transcode"
            );
        }

        TranscodeResult {
            text: out.text,
            valid: out.invalid_count == 0,
            invalid_count: out.invalid_count,
            first_invalid: out.first_invalid,
            encoding: self.encoding,
            bom_removed,
        }
    }

    /// Apply the policy to one invalid unit; `false` means stop decoding
    fn invalid(&self, out: &mut Output, unit: &[u8], position: usize) -> bool {
        out.invalid_count += 1;
        if out.first_invalid.is_none() {
            out.first_invalid = Some(position);
        }

        match self.policy {
            TranscodePolicy::Fail => return false,
            TranscodePolicy::Replace => out.text.push(self.replacement),
            TranscodePolicy::Skip => {}
            TranscodePolicy::BestEffort => {
                let mapped: Option<String> = unit
                    .iter()
                    .map(|&b| tables::fallback(self.encoding, b))
                    .collect();
                match mapped {
                    Some(s) => out.text.push_str(&s),
                    None => out.text.push(self.replacement),
                }
            }
        }
        true
    }
}

struct Output {
    text: String,
    invalid_count: usize,
    first_invalid: Option<usize>,
}

/// Encode canonical text into `encoding`, optionally prefixed with its BOM
///
/// Fails with [`Error::Unmappable`] on the first character the target cannot
/// represent.
pub fn encode(text: &str, encoding: Encoding, with_bom: bool) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(text.len());
    if with_bom {
        if let Some(bom) = encoding.bom() {
            output.extend_from_slice(bom);
        }
    }

    if let Some(page) = encoding.code_page() {
        for (position, character) in text.char_indices() {
            let byte = page.encode(character).ok_or(Error::Unmappable {
                character,
                position,
                encoding: encoding.name(),
            })?;
            output.push(byte);
        }
    } else {
        encode_unicode(text, encoding, &mut output)?;
    }

    Ok(output)
}

fn encode_unicode(text: &str, encoding: Encoding, output: &mut Vec<u8>) -> Result<()> {
    for (position, character) in text.char_indices() {
        if !multibyte::encode_char(encoding, character, output) {
            return Err(Error::Unmappable {
                character,
                position,
                encoding: encoding.name(),
            });
        }
    }
    Ok(())
}
