//! Statistical scoring for legacy single-byte encodings.
//!
//! Single-byte code pages accept (almost) every byte, so the only evidence is
//! how much the decoded text looks like language. The score combines four
//! signals:
//!
//! 1. **Plausibility**: the share of bytes that decode to a mapped,
//!    non-control character.
//! 2. **Language similarity**: cosine similarity between the decoded letter
//!    distribution and the closest [`LanguageModel`](crate::LanguageModel).
//! 3. **Bigram anomalies**: character pairs that rarely occur in real text but
//!    are typical of multi-byte text misread byte by byte (`Ã©` for `é`).
//! 4. **Sample cap**: short buffers cannot earn full confidence.

use tracing::trace;

use crate::models::{LetterProfile, ReferenceModels};
use crate::tables::CodePage;

/// Sample length from which a score is no longer capped
pub const MIN_RELIABLE_SAMPLE: usize = 256;

/// Highest confidence a statistical score can reach
///
/// Kept below the structural factor so a valid UTF-8 buffer always outranks a
/// legacy reading of the same bytes.
pub const LEGACY_CEILING: f64 = 0.8;

/// Letters needed before a language hint is reported
const MIN_HINT_LETTERS: u64 = 8;

/// Similarity needed before a language hint is reported
const MIN_HINT_SIMILARITY: f64 = 0.6;

/// Result of scoring a buffer against one code page
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    /// Confidence in `[0, LEGACY_CEILING]`
    pub confidence: f64,
    /// Closest reference language, when the evidence is strong enough
    pub language: Option<String>,
}

impl Score {
    fn zero() -> Self {
        Self {
            confidence: 0.0,
            language: None,
        }
    }
}

/// Score how plausible it is that `data` is text in `page`'s encoding
pub fn score(data: &[u8], page: &CodePage, models: &ReferenceModels) -> Score {
    if data.is_empty() {
        return Score::zero();
    }

    let mut good = 0usize;
    let mut profile = LetterProfile::new();
    let mut pairs = PairStats::default();
    let mut prev: Option<char> = None;

    for &byte in data {
        let decoded = page.decode(byte);
        match decoded {
            Some(ch) if !is_control(ch) => good += 1,
            _ => {}
        }
        if let Some(ch) = decoded {
            profile.observe(ch);
            pairs.observe(prev, ch);
        }
        prev = decoded;
    }

    let plausibility = good as f64 / data.len() as f64;
    let best = models.best_match(&profile);
    let similarity = best.map_or(0.0, |(_, s)| s);
    let anomaly = pairs.rate();
    let cap = sample_cap(data.len());

    let confidence =
        LEGACY_CEILING * plausibility * (0.5 + 0.5 * similarity) * (1.0 - anomaly) * cap;

    let language = best
        .filter(|&(_, s)| profile.letters() >= MIN_HINT_LETTERS && s >= MIN_HINT_SIMILARITY)
        .map(|(lang, _)| lang.to_string());

    trace!(
        encoding = page.encoding().name(),
        plausibility,
        similarity,
        anomaly,
        cap,
        confidence,
        "scored legacy candidate"
    );

    Score {
        confidence: confidence.clamp(0.0, LEGACY_CEILING),
        language,
    }
}

/// Closest language of already-decoded text, if the evidence is strong enough
pub fn language_hint(chars: &[char], models: &ReferenceModels) -> Option<String> {
    let profile = LetterProfile::from_chars(chars.iter().copied());
    if profile.letters() < MIN_HINT_LETTERS {
        return None;
    }
    models
        .best_match(&profile)
        .filter(|&(_, s)| s >= MIN_HINT_SIMILARITY)
        .map(|(lang, _)| lang.to_string())
}

/// Confidence multiplier for a sample of `len` bytes
pub fn sample_cap(len: usize) -> f64 {
    (len as f64 / MIN_RELIABLE_SAMPLE as f64).min(1.0)
}

/// Characters that never appear in running text
///
/// TAB, LF, FF and CR are text; every other C0 control, DEL and the C1
/// controls are not.
pub(crate) fn is_control(ch: char) -> bool {
    ch.is_control() && !matches!(ch, '\t' | '\n' | '\x0C' | '\r')
}

#[derive(Debug, Default)]
struct PairStats {
    non_ascii: usize,
    anomalies: usize,
}

impl PairStats {
    fn observe(&mut self, prev: Option<char>, ch: char) {
        if ch.is_ascii() {
            return;
        }
        self.non_ascii += 1;
        if let Some(prev) = prev {
            if is_anomalous_pair(prev, ch) {
                self.anomalies += 1;
            }
        }
    }

    fn rate(&self) -> f64 {
        if self.non_ascii == 0 {
            0.0
        } else {
            (self.anomalies as f64 / self.non_ascii as f64).min(1.0)
        }
    }
}

fn is_anomalous_pair(prev: char, ch: char) -> bool {
    // A letter followed by a Latin-1 symbol: `Ã©`, `Ã¨`, `Ã¼`
    let letter_then_symbol =
        prev.is_alphabetic() && ('\u{A0}'..='\u{BF}').contains(&ch) && !matches!(ch, '«' | '»');
    // Case flipping inside a word: `Ã‰` after a lower-case letter
    let lower_then_upper = prev.is_lowercase() && ch.is_uppercase();
    letter_then_symbol || lower_then_upper
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Encoding;

    fn page(encoding: Encoding) -> &'static CodePage {
        encoding.code_page().unwrap()
    }

    fn latin1(text: &str) -> Vec<u8> {
        text.chars().map(|c| c as u32 as u8).collect()
    }

    const FRENCH: &str = "Le château se dresse au sommet de la colline depuis des siècles. \
        Les habitants du village racontent qu'un trésor y est caché, mais personne n'a \
        jamais réussi à le trouver malgré des années de recherches acharnées. Chaque été, \
        des touristes viennent admirer la façade et flâner dans le jardin où poussent \
        des roses très anciennes.";

    #[test]
    fn test_empty_scores_zero() {
        let models = ReferenceModels::builtin();
        assert_eq!(score(&[], page(Encoding::ISO_8859_1), &models), Score::zero());
    }

    #[test]
    fn test_sample_cap() {
        assert_eq!(sample_cap(0), 0.0);
        assert_eq!(sample_cap(128), 0.5);
        assert_eq!(sample_cap(256), 1.0);
        assert_eq!(sample_cap(10_000), 1.0);
    }

    #[test]
    fn test_latin1_french_text() {
        let models = ReferenceModels::builtin();
        let data = latin1(FRENCH);
        assert!(data.len() >= MIN_RELIABLE_SAMPLE);

        let score = score(&data, page(Encoding::ISO_8859_1), &models);
        assert!(score.confidence > 0.6, "confidence was {}", score.confidence);
        assert!(score.confidence <= LEGACY_CEILING);
        assert_eq!(score.language.as_deref(), Some("fr"));
    }

    #[test]
    fn test_short_sample_is_capped() {
        let models = ReferenceModels::builtin();
        let short = latin1("Bonjour, ça va très bien");
        let score = score(&short, page(Encoding::ISO_8859_1), &models);
        assert!(score.confidence <= LEGACY_CEILING * sample_cap(short.len()));
    }

    #[test]
    fn test_smart_quotes_favor_windows_1252() {
        let models = ReferenceModels::builtin();
        let mut data = Vec::new();
        for _ in 0..8 {
            data.extend_from_slice(b"He said \x93hello\x94 and it\x92s fine \x96 really. ");
        }

        let cp1252 = score(&data, page(Encoding::WINDOWS_1252), &models);
        let latin1 = score(&data, page(Encoding::ISO_8859_1), &models);
        assert!(cp1252.confidence > latin1.confidence);
    }

    #[test]
    fn test_misread_utf8_is_penalized() {
        let models = ReferenceModels::builtin();
        let as_latin1 = score(&latin1(FRENCH), page(Encoding::ISO_8859_1), &models);
        let misread = score(FRENCH.as_bytes(), page(Encoding::ISO_8859_1), &models);
        assert!(misread.confidence < as_latin1.confidence);
    }

    #[test]
    fn test_control_bytes_are_implausible() {
        let models = ReferenceModels::builtin();
        let binary: Vec<u8> = (0..512).map(|i| (i % 32) as u8).collect();
        let score = score(&binary, page(Encoding::ISO_8859_1), &models);
        assert!(score.confidence < 0.1);
        assert_eq!(score.language, None);
    }

    #[test]
    fn test_is_control() {
        assert!(!is_control('\t'));
        assert!(!is_control('\n'));
        assert!(!is_control('a'));
        assert!(is_control('\0'));
        assert!(is_control('\x7F'));
        assert!(is_control('\u{85}'));
    }

    #[test]
    fn test_language_hint_from_chars() {
        let models = ReferenceModels::builtin();
        let chars: Vec<char> = FRENCH.chars().collect();
        assert_eq!(language_hint(&chars, &models).as_deref(), Some("fr"));
        assert_eq!(language_hint(&['a', 'b'], &models), None);
    }
}
