//! Rendering of detection and transcoding results.
//!
//! The reporter only formats: plain text through `Display`, JSON through
//! serde when the `json` feature is enabled.

use std::fmt;
use std::str::FromStr;

use crate::detection::{DetectionResult, EncodingCandidate};
use crate::error::Result;
use crate::transcode::TranscodeResult;

/// Output representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    #[cfg(feature = "json")]
    Json,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Format::Text),
            #[cfg(feature = "json")]
            "json" => Ok(Format::Json),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

impl fmt::Display for EncodingCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.1}%", self.name(), self.confidence * 100.0)?;
        if let Some(language) = &self.language_hint {
            write!(f, " [{language}]")?;
        }
        Ok(())
    }
}

impl fmt::Display for DetectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let best = self.best();
        writeln!(f, "Detected encoding: {}", best.name())?;
        writeln!(f, "Confidence: {:.1}%", best.confidence * 100.0)?;
        if let Some(language) = &best.language_hint {
            writeln!(f, "Language: {language}")?;
        }
        if self.bom_detected() {
            writeln!(f, "BOM detected: Yes")?;
        }
        if !self.is_reliable() {
            writeln!(f, "Reliable: No")?;
        }
        write!(f, "Sample size: {} bytes", self.sample_size())
    }
}

impl fmt::Display for TranscodeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Render a detection result; `all` lists every candidate in text mode
pub fn render_detection(result: &DetectionResult, format: Format, all: bool) -> Result<String> {
    match format {
        Format::Text => {
            let mut out = result.to_string();
            if all && result.candidates().len() > 1 {
                out.push_str("\n\nAll candidates:");
                for candidate in result.candidates() {
                    out.push_str(&format!("\n  {candidate}"));
                }
            }
            Ok(out)
        }
        #[cfg(feature = "json")]
        Format::Json => Ok(serde_json::to_string_pretty(result)?),
    }
}

/// Render a transcode summary (everything except the text itself)
pub fn render_transcode_summary(result: &TranscodeResult, format: Format) -> Result<String> {
    match format {
        Format::Text => {
            let mut out = format!(
                "Source encoding: {}\nValid: {}\nInvalid units: {}",
                result.encoding,
                if result.valid { "Yes" } else { "No" },
                result.invalid_count
            );
            if let Some(position) = result.first_invalid {
                out.push_str(&format!("\nFirst invalid unit at byte {position}"));
            }
            Ok(out)
        }
        #[cfg(feature = "json")]
        Format::Json => Ok(serde_json::to_string_pretty(result)?),
    }
}
