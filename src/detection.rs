//! Encoding detection coordinator.
//!
//! The detector runs a closed set of strategies in fixed order:
//!
//! 1. [`Strategy::Bom`]: a byte order mark settles the question outright.
//! 2. [`Strategy::Structural`]: exact grammar checks for the Unicode forms.
//! 3. [`Strategy::Statistical`]: language scoring for legacy code pages.
//!
//! Candidates are merged and ranked by confidence. When nothing reaches the
//! configured threshold an `unknown` candidate ([`Strategy::Fallback`]) is
//! appended, so a result is never empty and detection never fails.

use std::sync::Arc;

use serde::{Serialize, Serializer};
use tracing::{debug, trace};

use crate::models::ReferenceModels;
use crate::multibyte::Endian;
use crate::scorer::{self, is_control};
use crate::transcode::{TranscodePolicy, TranscodeResult, Transcoder};
use crate::validate::{self, decode_valid_prefix};
use crate::{Encoding, bom};

/// Confidence of a structurally valid Unicode candidate without a BOM
///
/// Validity does not prove intent, so even perfect evidence stays below the
/// certainty of a BOM.
pub const STRUCTURAL_CONFIDENCE: f64 = 0.9;

/// The strategy that produced a candidate, in tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Byte order mark at the start of the buffer
    Bom,
    /// Exact grammar validation of a Unicode encoding
    Structural,
    /// Language-model scoring of a single-byte code page
    Statistical,
    /// The `unknown` placeholder
    Fallback,
}

/// One possible source encoding with its confidence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodingCandidate {
    /// The encoding, or `None` for the `unknown` fallback
    #[serde(rename = "name", serialize_with = "serialize_name")]
    pub encoding: Option<Encoding>,
    /// Estimated probability in `[0, 1]`
    pub confidence: f64,
    /// Closest reference language of the decoded text
    pub language_hint: Option<String>,
    /// How the candidate was found
    pub strategy: Strategy,
}

fn serialize_name<S: Serializer>(
    encoding: &Option<Encoding>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(encoding.map_or(UNKNOWN, Encoding::name))
}

/// Name reported for the fallback candidate
pub const UNKNOWN: &str = "unknown";

impl EncodingCandidate {
    /// Create a candidate without a language hint
    pub fn new(encoding: Encoding, confidence: f64, strategy: Strategy) -> Self {
        Self {
            encoding: Some(encoding),
            confidence,
            language_hint: None,
            strategy,
        }
    }

    /// The `unknown/binary` fallback candidate
    pub fn unknown() -> Self {
        Self {
            encoding: None,
            confidence: 0.0,
            language_hint: None,
            strategy: Strategy::Fallback,
        }
    }

    /// Attach a language hint
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language_hint = language;
        self
    }

    /// Canonical encoding name, or `"unknown"`
    pub fn name(&self) -> &'static str {
        self.encoding.map_or(UNKNOWN, Encoding::name)
    }

    /// Check if this is the `unknown` fallback
    pub fn is_unknown(&self) -> bool {
        self.encoding.is_none()
    }

    fn priority(&self) -> usize {
        self.encoding.map_or(usize::MAX, Encoding::priority)
    }
}

/// Ranked detection output, most likely encoding first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    candidates: Vec<EncodingCandidate>,
    bom_detected: bool,
    sample_size: usize,
    reliable: bool,
}

impl DetectionResult {
    fn unknown(sample_size: usize) -> Self {
        Self {
            candidates: vec![EncodingCandidate::unknown()],
            bom_detected: false,
            sample_size,
            reliable: false,
        }
    }

    /// The highest ranked candidate
    pub fn best(&self) -> &EncodingCandidate {
        // Never empty: every constructor ends with at least one candidate
        &self.candidates[0]
    }

    /// The highest ranked candidate that names a real encoding
    pub fn best_known(&self) -> Option<&EncodingCandidate> {
        self.candidates.iter().find(|c| !c.is_unknown())
    }

    /// All candidates, sorted by confidence descending
    pub fn candidates(&self) -> &[EncodingCandidate] {
        &self.candidates
    }

    /// Consume the result, returning its candidates
    pub fn into_candidates(self) -> Vec<EncodingCandidate> {
        self.candidates
    }

    /// Whether the decision came from a byte order mark
    pub fn bom_detected(&self) -> bool {
        self.bom_detected
    }

    /// Number of bytes analysed
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Whether the best candidate reached the configured minimum confidence
    pub fn is_reliable(&self) -> bool {
        self.reliable
    }
}

/// Configuration for the detector
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Encodings scored without a byte order mark
    pub encodings: Vec<Encoding>,
    /// Best confidence below which the result is marked unreliable
    pub min_confidence: f64,
    /// Maximum bytes to analyse (0 = whole buffer)
    pub max_sample_size: usize,
    /// Reference language models for statistical scoring
    pub models: Arc<ReferenceModels>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            encodings: Encoding::DEFAULT_DETECTION.to_vec(),
            min_confidence: 0.5,
            max_sample_size: 8192,
            models: Arc::new(ReferenceModels::builtin()),
        }
    }
}

impl DetectorConfig {
    /// Creates a new detector config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the encodings scored by the structural and statistical strategies
    ///
    /// A byte order mark is always honoured, even for an encoding that is not
    /// in this set: the mark names its encoding outright.
    pub fn encodings(mut self, encodings: impl IntoIterator<Item = Encoding>) -> Self {
        self.encodings = encodings.into_iter().collect();
        self
    }

    /// Sets the minimum confidence, clamped to `[0, 1]`
    pub fn min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = if min_confidence.is_nan() {
            0.0
        } else {
            min_confidence.clamp(0.0, 1.0)
        };
        self
    }

    /// Sets the maximum number of bytes analysed
    pub fn max_sample_size(mut self, size: usize) -> Self {
        self.max_sample_size = size;
        self
    }

    /// Sets the shared reference models
    pub fn models(mut self, models: Arc<ReferenceModels>) -> Self {
        self.models = models;
        self
    }

    fn is_enabled(&self, encoding: Encoding) -> bool {
        self.encodings.contains(&encoding)
    }
}

/// Text decoded with the detector's best guess
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedText {
    /// The ranking the choice was made from
    pub detection: DetectionResult,
    /// The transcoded text
    pub result: TranscodeResult,
}

/// Encoding detector combining BOM, structural and statistical evidence
#[derive(Debug, Clone, Default)]
pub struct EncodingDetector {
    config: DetectorConfig,
}

/// Short alias used throughout the crate
pub type Detector = EncodingDetector;

impl EncodingDetector {
    /// Create a new encoding detector
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector from an explicit configuration
    pub fn with_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Create detector with custom sample size
    pub fn with_sample_size(max_sample_size: usize) -> Self {
        Self::with_config(DetectorConfig::default().max_sample_size(max_sample_size))
    }

    /// The active configuration
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect encoding of the given data
    pub fn detect(&self, data: &[u8]) -> DetectionResult {
        if data.is_empty() {
            debug!("empty buffer, reporting unknown");
            return DetectionResult::unknown(0);
        }

        let limit = self.config.max_sample_size;
        let sample = if limit > 0 && data.len() > limit {
            &data[..limit]
        } else {
            data
        };
        let truncated = sample.len() < data.len();

        // Check for BOM first (highest confidence)
        if let Some((encoding, bom_len)) = bom::sniff_bom(sample) {
            let chars = decode_valid_prefix(&sample[bom_len..], encoding);
            let candidate = EncodingCandidate::new(encoding, 1.0, Strategy::Bom)
                .with_language(scorer::language_hint(&chars, &self.config.models));
            debug!(encoding = encoding.name(), "byte order mark found");
            return DetectionResult {
                candidates: vec![candidate, EncodingCandidate::unknown()],
                bom_detected: true,
                sample_size: sample.len(),
                reliable: true,
            };
        }

        let mut candidates = Vec::new();
        for encoding in Encoding::ALL {
            if !self.config.is_enabled(encoding) {
                continue;
            }
            let candidate = if encoding.is_unicode() {
                self.structural(sample, encoding, truncated)
            } else {
                self.statistical(sample, encoding)
            };
            if let Some(candidate) = candidate {
                trace!(
                    encoding = candidate.name(),
                    confidence = candidate.confidence,
                    strategy = ?candidate.strategy,
                    "candidate"
                );
                candidates.push(candidate);
            }
        }

        sort_candidates(&mut candidates);

        let top = candidates.first().map_or(0.0, |c| c.confidence);
        let reliable = top >= self.config.min_confidence && !candidates.is_empty();
        if !reliable {
            candidates.push(EncodingCandidate::unknown());
        }

        debug!(
            best = candidates[0].name(),
            confidence = candidates[0].confidence,
            reliable,
            sample_size = sample.len(),
            "detection complete"
        );

        DetectionResult {
            candidates,
            bom_detected: false,
            sample_size: sample.len(),
            reliable,
        }
    }

    /// Detect the encoding of `data` and transcode it with the best guess
    ///
    /// When no real encoding is suggested at all (empty or binary input) the
    /// data is decoded as UTF-8, so the policy still accounts for every byte.
    pub fn decode(&self, data: &[u8], policy: TranscodePolicy) -> DecodedText {
        self.decode_with(data, policy, char::REPLACEMENT_CHARACTER)
    }

    /// [`decode`](Self::decode) with a custom replacement character
    pub fn decode_with(
        &self,
        data: &[u8],
        policy: TranscodePolicy,
        replacement: char,
    ) -> DecodedText {
        let detection = self.detect(data);
        let encoding = detection
            .best_known()
            .and_then(|c| c.encoding)
            .unwrap_or(Encoding::UTF8);
        let result = Transcoder::new(encoding)
            .policy(policy)
            .replacement(replacement)
            .transcode(data);
        DecodedText { detection, result }
    }

    fn structural(
        &self,
        sample: &[u8],
        encoding: Encoding,
        truncated: bool,
    ) -> Option<EncodingCandidate> {
        let valid = if truncated {
            validate::validate_prefix(sample, encoding)
        } else {
            validate::validate(sample, encoding)
        };
        if !valid {
            return None;
        }

        let chars = decode_valid_prefix(sample, encoding);
        let evidence = match encoding {
            Encoding::UTF8 => utf8_evidence(sample),
            _ => wide_evidence(sample, encoding, &chars),
        };
        let confidence = STRUCTURAL_CONFIDENCE * evidence;
        if confidence <= 0.0 {
            return None;
        }

        Some(
            EncodingCandidate::new(encoding, confidence, Strategy::Structural)
                .with_language(scorer::language_hint(&chars, &self.config.models)),
        )
    }

    fn statistical(&self, sample: &[u8], encoding: Encoding) -> Option<EncodingCandidate> {
        let page = encoding.code_page()?;
        let score = scorer::score(sample, page, &self.config.models);
        if score.confidence <= 0.0 {
            return None;
        }
        Some(
            EncodingCandidate::new(encoding, score.confidence, Strategy::Statistical)
                .with_language(score.language),
        )
    }
}

/// Sort by confidence descending, then strategy, then encoding priority
fn sort_candidates(candidates: &mut [EncodingCandidate]) {
    candidates.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.strategy.cmp(&b.strategy))
            .then_with(|| a.priority().cmp(&b.priority()))
    });
}

/// Largest share of UTF-8 evidence the UTF-16 byte pattern can take away
///
/// `STRUCTURAL_CONFIDENCE * (1 - UTF16_PATTERN_PENALTY)` stays above
/// [`scorer::LEGACY_CEILING`], so valid UTF-8 still outranks legacy readings.
const UTF16_PATTERN_PENALTY: f64 = 0.1;

/// Share of bytes that are not stray ASCII controls, discounted by the
/// UTF-16 zero-byte alternation
///
/// NUL-heavy buffers are valid UTF-8 but are far more likely UTF-16/32 or
/// binary.
fn utf8_evidence(sample: &[u8]) -> f64 {
    let controls = sample
        .iter()
        .filter(|&&b| b < 0x80 && is_control(b as char))
        .count();

    let (mut even, mut odd) = (0usize, 0usize);
    for (i, &b) in sample.iter().enumerate() {
        if b == 0 {
            if i % 2 == 0 {
                even += 1;
            } else {
                odd += 1;
            }
        }
    }
    let pairs = (sample.len() / 2).max(1);
    let alternation = (even.abs_diff(odd) as f64 / pairs as f64).min(1.0);

    (1.0 - controls as f64 / sample.len() as f64) * (1.0 - UTF16_PATTERN_PENALTY * alternation)
}

/// Fewest 16-bit units from which the byte order can be told without a BOM
const MIN_UTF16_UNITS: usize = 16;

/// Evidence that a valid UTF-16/UTF-32 reading is the intended one
///
/// Script independent: the share of decoded code points usable as text, and
/// for UTF-16 the byte statistics of [`UnitStats`]. Short samples are capped
/// like legacy scores.
fn wide_evidence(sample: &[u8], encoding: Encoding, chars: &[char]) -> f64 {
    if chars.is_empty() {
        return 0.0;
    }
    let usable = chars.iter().filter(|&&ch| !is_implausible(ch)).count();
    let plausibility = usable as f64 / chars.len() as f64;

    let layout = match encoding {
        Encoding::UTF16LE | Encoding::UTF16BE if sample.len() / 2 < MIN_UTF16_UNITS => 0.0,
        Encoding::UTF16LE => UnitStats::utf16(sample, Endian::Little).evidence(),
        Encoding::UTF16BE => UnitStats::utf16(sample, Endian::Big).evidence(),
        _ => 1.0,
    };

    plausibility * layout * scorer::sample_cap(sample.len())
}

/// Code points that do not occur in interchanged text
fn is_implausible(ch: char) -> bool {
    let cp = ch as u32;
    is_control(ch)
        || (0xE000..=0xF8FF).contains(&cp)
        || cp >= 0xF_0000
        || (0xFDD0..=0xFDEF).contains(&cp)
        || cp & 0xFFFE == 0xFFFE
}

/// Byte statistics of a buffer split into 16-bit units
struct UnitStats {
    high: [u32; 256],
    low: [u32; 256],
    ascii_pairs: usize,
    units: usize,
}

impl UnitStats {
    fn utf16(sample: &[u8], endian: Endian) -> Self {
        let mut stats = Self {
            high: [0; 256],
            low: [0; 256],
            ascii_pairs: 0,
            units: 0,
        };
        for pair in sample.chunks_exact(2) {
            let (high, low) = match endian {
                Endian::Little => (pair[1], pair[0]),
                Endian::Big => (pair[0], pair[1]),
            };
            stats.high[high as usize] += 1;
            stats.low[low as usize] += 1;
            if is_printable_ascii(high) && is_printable_ascii(low) {
                stats.ascii_pairs += 1;
            }
            stats.units += 1;
        }
        stats
    }

    /// Byte-order and pairing evidence in `[0, 1]`
    fn evidence(&self) -> f64 {
        if self.units == 0 {
            return 0.0;
        }
        // In the intended byte order the high byte (script block) varies
        // less than the low byte
        let high = entropy(&self.high, self.units);
        let low = entropy(&self.low, self.units);
        let order = if high <= low { 1.0 } else { low / high };

        // Units of two printable ASCII bytes are single-byte text read in pairs
        let ascii = self.ascii_pairs as f64 / self.units as f64;
        let pairing = (4.0 * (1.0 - ascii)).min(1.0);

        order * pairing
    }
}

fn is_printable_ascii(byte: u8) -> bool {
    (0x20..0x7F).contains(&byte)
}

/// Shannon entropy in bits of a byte histogram
fn entropy(counts: &[u32; 256], total: usize) -> f64 {
    let total = total as f64;
    counts
        .iter()
        .filter(|&&n| n > 0)
        .map(|&n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}
