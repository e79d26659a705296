//! Reference language models for statistical scoring.
//!
//! A model is a letter frequency table for one language. Models are immutable
//! once built; a [`ReferenceModels`] set is constructed once and shared by
//! every detector through an `Arc`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Letter frequencies of one language
///
/// Deserialization goes through [`LanguageModel::new`], so a loaded model is
/// always validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLanguageModel")]
pub struct LanguageModel {
    /// Language tag reported as the candidate's language hint (e.g. `"fr"`)
    pub language: String,
    /// Relative frequency of each lower-case letter
    pub frequencies: BTreeMap<char, f64>,
    #[serde(skip)]
    norm: f64,
}

#[derive(Deserialize)]
struct RawLanguageModel {
    language: String,
    frequencies: BTreeMap<char, f64>,
}

impl TryFrom<RawLanguageModel> for LanguageModel {
    type Error = Error;

    fn try_from(raw: RawLanguageModel) -> Result<Self> {
        Self::new(raw.language, raw.frequencies)
    }
}

impl LanguageModel {
    /// Build a model, rejecting empty or non-finite tables
    pub fn new(language: impl Into<String>, frequencies: BTreeMap<char, f64>) -> Result<Self> {
        let language = language.into();
        if language.is_empty() {
            return Err(Error::invalid_model("language tag is empty"));
        }
        if frequencies.is_empty() {
            return Err(Error::invalid_model(format!("'{language}' has no letters")));
        }
        if let Some((ch, f)) = frequencies.iter().find(|(_, f)| !f.is_finite() || **f < 0.0) {
            return Err(Error::invalid_model(format!(
                "'{language}' has invalid frequency {f} for {ch:?}"
            )));
        }

        let norm = frequencies.values().map(|f| f * f).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Err(Error::invalid_model(format!("'{language}' has all-zero frequencies")));
        }

        Ok(Self {
            language,
            frequencies,
            norm,
        })
    }

    fn from_table(language: &str, table: &[(char, f64)]) -> Self {
        let frequencies = table.iter().copied().collect::<BTreeMap<_, _>>();
        let norm = frequencies.values().map(|f| f * f).sum::<f64>().sqrt();
        Self {
            language: language.to_string(),
            frequencies,
            norm,
        }
    }

    /// Cosine similarity between observed letter counts and this model
    pub fn similarity(&self, profile: &LetterProfile) -> f64 {
        if profile.total == 0 {
            return 0.0;
        }
        let dot: f64 = profile
            .counts
            .iter()
            .filter_map(|(ch, &n)| self.frequencies.get(ch).map(|f| f * n as f64))
            .sum();
        let similarity = dot / (self.norm * profile.norm());
        if similarity.is_finite() {
            similarity.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// The set of language models a detector scores against
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceModels {
    models: Vec<LanguageModel>,
}

impl ReferenceModels {
    /// Build a model set; at least one model is required
    pub fn new(models: Vec<LanguageModel>) -> Result<Self> {
        if models.is_empty() {
            return Err(Error::invalid_model("no language models supplied"));
        }
        Ok(Self { models })
    }

    /// The built-in Western European set: English, French, German, Spanish
    pub fn builtin() -> Self {
        Self {
            models: vec![
                LanguageModel::from_table("en", &ENGLISH),
                LanguageModel::from_table("fr", &FRENCH),
                LanguageModel::from_table("de", &GERMAN),
                LanguageModel::from_table("es", &SPANISH),
            ],
        }
    }

    /// Load a model set from JSON: `[{"language": "en", "frequencies": {"e": 12.7, ...}}]`
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> Result<Self> {
        let models: Vec<LanguageModel> = serde_json::from_str(json)?;
        Self::new(models)
    }

    /// The models in this set
    pub fn models(&self) -> &[LanguageModel] {
        &self.models
    }

    /// Best matching language and its similarity
    ///
    /// Ties keep the model listed first.
    pub fn best_match(&self, profile: &LetterProfile) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for model in &self.models {
            let sim = model.similarity(profile);
            if best.is_none_or(|(_, s)| sim > s) {
                best = Some((model.language.as_str(), sim));
            }
        }
        best
    }
}

impl Default for ReferenceModels {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Lower-case letter counts observed in a piece of text
#[derive(Debug, Clone, Default)]
pub struct LetterProfile {
    counts: BTreeMap<char, u64>,
    total: u64,
}

impl LetterProfile {
    /// Create an empty profile
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a profile from decoded characters
    pub fn from_chars(chars: impl IntoIterator<Item = char>) -> Self {
        let mut profile = Self::new();
        for ch in chars {
            profile.observe(ch);
        }
        profile
    }

    /// Count `ch` if it is a letter
    pub fn observe(&mut self, ch: char) {
        if !ch.is_alphabetic() {
            return;
        }
        // Single-char lowercase mappings only; 'İ' and friends stay as-is
        let mut lower = ch.to_lowercase();
        let folded = match (lower.next(), lower.next()) {
            (Some(l), None) => l,
            _ => ch,
        };
        *self.counts.entry(folded).or_insert(0) += 1;
        self.total += 1;
    }

    /// Number of letters observed
    pub fn letters(&self) -> u64 {
        self.total
    }

    fn norm(&self) -> f64 {
        self.counts
            .values()
            .map(|&n| (n as f64) * (n as f64))
            .sum::<f64>()
            .sqrt()
    }
}

// Percent frequencies from large text corpora
#[rustfmt::skip]
const ENGLISH: [(char, f64); 26] = [
    ('a', 8.17), ('b', 1.29), ('c', 2.78), ('d', 4.25), ('e', 12.70), ('f', 2.23),
    ('g', 2.02), ('h', 6.09), ('i', 6.97), ('j', 0.15), ('k', 0.77), ('l', 4.03),
    ('m', 2.41), ('n', 6.75), ('o', 7.51), ('p', 1.93), ('q', 0.10), ('r', 5.99),
    ('s', 6.33), ('t', 9.06), ('u', 2.76), ('v', 0.98), ('w', 2.36), ('x', 0.15),
    ('y', 1.97), ('z', 0.07),
];

#[rustfmt::skip]
const FRENCH: [(char, f64); 40] = [
    ('a', 7.64), ('b', 0.90), ('c', 3.26), ('d', 3.67), ('e', 14.72), ('f', 1.07),
    ('g', 0.87), ('h', 0.74), ('i', 7.53), ('j', 0.61), ('k', 0.05), ('l', 5.46),
    ('m', 2.97), ('n', 7.10), ('o', 5.80), ('p', 3.02), ('q', 1.36), ('r', 6.69),
    ('s', 7.95), ('t', 7.24), ('u', 6.31), ('v', 1.84), ('w', 0.11), ('x', 0.43),
    ('y', 0.13), ('z', 0.33), ('à', 0.49), ('â', 0.05), ('ç', 0.09), ('è', 0.27),
    ('é', 1.90), ('ê', 0.22), ('ë', 0.01), ('î', 0.05), ('ï', 0.01), ('ô', 0.02),
    ('ù', 0.06), ('û', 0.06), ('œ', 0.02), ('ÿ', 0.01),
];

#[rustfmt::skip]
const GERMAN: [(char, f64); 30] = [
    ('a', 6.52), ('b', 1.89), ('c', 2.73), ('d', 5.08), ('e', 16.40), ('f', 1.66),
    ('g', 3.01), ('h', 4.58), ('i', 6.55), ('j', 0.27), ('k', 1.42), ('l', 3.44),
    ('m', 2.53), ('n', 9.78), ('o', 2.59), ('p', 0.67), ('q', 0.02), ('r', 7.00),
    ('s', 7.27), ('t', 6.15), ('u', 4.17), ('v', 0.85), ('w', 1.92), ('x', 0.03),
    ('y', 0.04), ('z', 1.13), ('ä', 0.58), ('ö', 0.44), ('ü', 0.99), ('ß', 0.31),
];

#[rustfmt::skip]
const SPANISH: [(char, f64); 33] = [
    ('a', 12.53), ('b', 1.42), ('c', 4.68), ('d', 5.86), ('e', 13.68), ('f', 0.69),
    ('g', 1.01), ('h', 0.70), ('i', 6.25), ('j', 0.44), ('k', 0.01), ('l', 4.97),
    ('m', 3.16), ('n', 6.71), ('o', 8.68), ('p', 2.51), ('q', 0.88), ('r', 6.87),
    ('s', 7.98), ('t', 4.63), ('u', 3.93), ('v', 0.90), ('w', 0.02), ('x', 0.22),
    ('y', 0.90), ('z', 0.47), ('á', 0.50), ('é', 0.43), ('í', 0.73), ('ñ', 0.31),
    ('ó', 0.83), ('ú', 0.17), ('ü', 0.01),
];

#[cfg(test)]
mod tests {
    use super::*;

    const ENGLISH_SAMPLE: &str = "The quick brown fox jumps over the lazy dog while the \
        other animals watch from the edge of the forest and wonder what is going on there";

    const GERMAN_SAMPLE: &str = "Die Größe der Städte in Deutschland wächst seit Jahren, \
        während viele Dörfer auf dem Land über den Verlust ihrer Einwohner klagen müssen";

    #[test]
    fn test_profile_counts_letters_only() {
        let profile = LetterProfile::from_chars("Ab, c1!".chars());
        assert_eq!(profile.letters(), 3);
    }

    #[test]
    fn test_english_matches_english() {
        let models = ReferenceModels::builtin();
        let profile = LetterProfile::from_chars(ENGLISH_SAMPLE.chars());
        let (language, similarity) = models.best_match(&profile).unwrap();
        assert_eq!(language, "en");
        assert!(similarity > 0.8, "similarity was {similarity}");
    }

    #[test]
    fn test_umlauts_favor_german() {
        let models = ReferenceModels::builtin();
        let profile = LetterProfile::from_chars(GERMAN_SAMPLE.chars());
        let (language, _) = models.best_match(&profile).unwrap();
        assert_eq!(language, "de");
    }

    #[test]
    fn test_empty_profile_has_zero_similarity() {
        let models = ReferenceModels::builtin();
        let (_, similarity) = models.best_match(&LetterProfile::new()).unwrap();
        assert_eq!(similarity, 0.0);
    }

    #[test]
    fn test_model_validation() {
        assert!(LanguageModel::new("xx", BTreeMap::new()).is_err());
        assert!(LanguageModel::new("", BTreeMap::from([('a', 1.0)])).is_err());
        assert!(LanguageModel::new("xx", BTreeMap::from([('a', -1.0)])).is_err());
        assert!(LanguageModel::new("xx", BTreeMap::from([('a', f64::NAN)])).is_err());
        assert!(LanguageModel::new("xx", BTreeMap::from([('a', 0.0)])).is_err());
        assert!(ReferenceModels::new(Vec::new()).is_err());
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_load_from_json() {
        let json = r#"[{"language": "xx", "frequencies": {"a": 2.0, "b": 1.0}}]"#;
        let models = ReferenceModels::from_json(json).unwrap();
        assert_eq!(models.models().len(), 1);
        assert_eq!(models.models()[0].language, "xx");

        let profile = LetterProfile::from_chars("aab".chars());
        let (_, similarity) = models.best_match(&profile).unwrap();
        assert!((similarity - 1.0).abs() < 1e-9);

        assert!(ReferenceModels::from_json("[]").is_err());
        assert!(ReferenceModels::from_json("not json").is_err());
        assert!(ReferenceModels::from_json(r#"[{"language": "xx", "frequencies": {"a": 0.0}}]"#).is_err());
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_deserialized_model_is_validated() {
        let json = r#"[{"language": "xx", "frequencies": {"a": 1.0}}]"#;
        let models: Vec<LanguageModel> = serde_json::from_str(json).unwrap();
        let models = ReferenceModels::new(models).unwrap();

        let profile = LetterProfile::from_chars("a b".chars());
        let (_, similarity) = models.best_match(&profile).unwrap();
        assert!(similarity.is_finite());
        assert!((0.0..=1.0).contains(&similarity));

        let detector = crate::Detector::with_config(
            crate::DetectorConfig::new().models(std::sync::Arc::new(models)),
        );
        let data = b"xyz qwerty ".repeat(40);
        for candidate in detector.detect(&data).candidates() {
            assert!((0.0..=1.0).contains(&candidate.confidence), "{candidate:?}");
        }

        let invalid = r#"[{"language": "xx", "frequencies": {"a": -1.0}}]"#;
        assert!(serde_json::from_str::<Vec<LanguageModel>>(invalid).is_err());
    }
}
