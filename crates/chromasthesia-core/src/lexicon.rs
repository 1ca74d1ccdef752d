//! Built-in affect lexicon and the default emotion classifier.
//!
//! Provides word-level affect analysis using a lexicon-based approach: each
//! lexicon entry maps a word to a six-dimension weight vector. This keeps
//! the pipeline runnable without a remote classification service and gives
//! tests a deterministic engine.
//!
//! # Algorithm
//!
//! 1. Tokenize the text (lowercase, alphabetic runs)
//! 2. Look up each token, falling back to a light suffix strip
//! 3. Accumulate per-dimension weights; dominant = strongest dimension
//! 4. Intensity = average matched loading, boosted by exclamation marks and
//!    shouting (uppercase ratio), clamped to `[0, 1]`

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::trace;

use crate::error::BackendError;
use crate::traits::EmotionClassifier;
use crate::types::{AffectWord, Emotion, EmotionVector, EmotionWeights, NUM_DIMENSIONS};

/// Minimum accumulated weight for a dimension to count as dominant.
const DOMINANCE_THRESHOLD: f32 = 0.1;

/// Intensity boost per exclamation mark, capped at [`MAX_EXCLAIM_BOOST`].
const EXCLAIM_BOOST: f32 = 0.1;
const MAX_EXCLAIM_BOOST: f32 = 0.3;

/// Intensity boost applied when a large share of the letters is uppercase.
const SHOUTING_BOOST: f32 = 0.2;
const SHOUTING_RATIO: f32 = 0.3;

/// Built-in lexicon entries.
///
/// Weight order: happiness, sadness, anger, fear, disgust, surprise.
#[rustfmt::skip]
const LEXICON: &[(&str, [f32; NUM_DIMENSIONS])] = &[
    // happiness
    ("happy",      [0.9, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ("joy",        [0.9, 0.0, 0.0, 0.0, 0.0, 0.1]),
    ("love",       [0.8, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ("wonderful",  [0.8, 0.0, 0.0, 0.0, 0.0, 0.2]),
    ("delight",    [0.8, 0.0, 0.0, 0.0, 0.0, 0.2]),
    ("smile",      [0.7, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ("laugh",      [0.7, 0.0, 0.0, 0.0, 0.0, 0.1]),
    ("bright",     [0.6, 0.0, 0.0, 0.0, 0.0, 0.1]),
    ("warm",       [0.5, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ("sunny",      [0.6, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ("glad",       [0.6, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ("peace",      [0.5, 0.0, 0.0, 0.0, 0.0, 0.0]),
    // sadness
    ("sad",        [0.0, 0.9, 0.0, 0.0, 0.0, 0.0]),
    ("cry",        [0.0, 0.8, 0.0, 0.1, 0.0, 0.0]),
    ("grief",      [0.0, 0.9, 0.0, 0.1, 0.0, 0.0]),
    ("lonely",     [0.0, 0.8, 0.0, 0.1, 0.0, 0.0]),
    ("tears",      [0.0, 0.8, 0.0, 0.0, 0.0, 0.0]),
    ("miss",       [0.0, 0.6, 0.0, 0.0, 0.0, 0.0]),
    ("lost",       [0.0, 0.7, 0.0, 0.2, 0.0, 0.0]),
    ("gloomy",     [0.0, 0.7, 0.0, 0.0, 0.0, 0.0]),
    ("mourn",      [0.0, 0.9, 0.0, 0.0, 0.0, 0.0]),
    ("dark",       [0.0, 0.5, 0.0, 0.3, 0.0, 0.0]),
    ("rain",       [0.0, 0.4, 0.0, 0.0, 0.0, 0.0]),
    // anger
    ("angry",      [0.0, 0.0, 0.9, 0.0, 0.0, 0.0]),
    ("rage",       [0.0, 0.0, 1.0, 0.1, 0.0, 0.0]),
    ("hate",       [0.0, 0.1, 0.9, 0.0, 0.2, 0.0]),
    ("furious",    [0.0, 0.0, 0.9, 0.0, 0.0, 0.1]),
    ("mad",        [0.0, 0.0, 0.8, 0.0, 0.0, 0.0]),
    ("fight",      [0.0, 0.0, 0.7, 0.2, 0.0, 0.0]),
    ("burn",       [0.0, 0.0, 0.6, 0.2, 0.0, 0.0]),
    ("storm",      [0.0, 0.1, 0.5, 0.3, 0.0, 0.0]),
    ("annoyed",    [0.0, 0.0, 0.6, 0.0, 0.1, 0.0]),
    // fear
    ("fear",       [0.0, 0.0, 0.0, 0.9, 0.0, 0.0]),
    ("afraid",     [0.0, 0.1, 0.0, 0.9, 0.0, 0.0]),
    ("terror",     [0.0, 0.0, 0.0, 1.0, 0.0, 0.2]),
    ("scared",     [0.0, 0.0, 0.0, 0.9, 0.0, 0.1]),
    ("panic",      [0.0, 0.0, 0.0, 0.9, 0.0, 0.2]),
    ("dread",      [0.0, 0.2, 0.0, 0.8, 0.0, 0.0]),
    ("nightmare",  [0.0, 0.2, 0.0, 0.8, 0.1, 0.0]),
    ("shadow",     [0.0, 0.2, 0.0, 0.5, 0.0, 0.0]),
    ("worry",      [0.0, 0.2, 0.0, 0.6, 0.0, 0.0]),
    // disgust
    ("disgust",    [0.0, 0.0, 0.1, 0.0, 0.9, 0.0]),
    ("gross",      [0.0, 0.0, 0.0, 0.0, 0.8, 0.1]),
    ("rotten",     [0.0, 0.1, 0.0, 0.0, 0.8, 0.0]),
    ("filthy",     [0.0, 0.0, 0.1, 0.0, 0.8, 0.0]),
    ("sick",       [0.0, 0.2, 0.0, 0.1, 0.7, 0.0]),
    ("vile",       [0.0, 0.0, 0.2, 0.0, 0.8, 0.0]),
    ("slime",      [0.0, 0.0, 0.0, 0.1, 0.6, 0.0]),
    // surprise
    ("surprise",   [0.1, 0.0, 0.0, 0.0, 0.0, 0.9]),
    ("sudden",     [0.0, 0.0, 0.0, 0.2, 0.0, 0.7]),
    ("amazing",    [0.3, 0.0, 0.0, 0.0, 0.0, 0.8]),
    ("astonish",   [0.0, 0.0, 0.0, 0.1, 0.0, 0.9]),
    ("shock",      [0.0, 0.1, 0.0, 0.3, 0.0, 0.8]),
    ("unexpected", [0.0, 0.0, 0.0, 0.1, 0.0, 0.7]),
    ("wow",        [0.2, 0.0, 0.0, 0.0, 0.0, 0.8]),
];

/// Suffixes tried, longest first, when a token misses the lexicon.
const STEM_SUFFIXES: &[&str] = &["ing", "ed", "es", "s"];

/// The built-in lexicon-based emotion classifier.
///
/// Deterministic: the same text always yields the same [`EmotionVector`].
///
/// # Example
///
/// ```
/// use chromasthesia_core::lexicon::AffectLexicon;
/// use chromasthesia_core::types::Emotion;
///
/// let lexicon = AffectLexicon::default();
/// let vector = lexicon.analyze("the rain and the grief and the tears");
/// assert_eq!(vector.dominant, Emotion::Sadness);
/// assert!(!vector.words.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct AffectLexicon {
    words: HashMap<String, EmotionWeights>,
}

impl Default for AffectLexicon {
    fn default() -> Self {
        let words = LEXICON
            .iter()
            .map(|(word, weights)| ((*word).to_string(), EmotionWeights::new(*weights)))
            .collect();
        Self { words }
    }
}

impl AffectLexicon {
    /// An empty lexicon; every analysis comes back neutral.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            words: HashMap::new(),
        }
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, word: &str, weights: EmotionWeights) {
        self.words.insert(word.to_lowercase(), weights);
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the lexicon has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Look up a token, falling back to a light suffix strip so that
    /// "storms" and "burning" still hit "storm" and "burn".
    fn lookup(&self, token: &str) -> Option<(&str, EmotionWeights)> {
        if let Some((word, weights)) = self.words.get_key_value(token) {
            return Some((word.as_str(), *weights));
        }
        for suffix in STEM_SUFFIXES {
            if let Some(stem) = token.strip_suffix(suffix) {
                if stem.len() >= 3 {
                    if let Some((word, weights)) = self.words.get_key_value(stem) {
                        return Some((word.as_str(), *weights));
                    }
                }
            }
        }
        None
    }

    /// Analyze `text` into an [`EmotionVector`].
    #[must_use]
    pub fn analyze(&self, text: &str) -> EmotionVector {
        let mut totals = EmotionWeights::default();
        let mut words: Vec<AffectWord> = Vec::new();

        for token in tokenize(text) {
            if let Some((word, weights)) = self.lookup(&token) {
                totals.accumulate(&weights);
                if !words.iter().any(|w| w.word == word) {
                    words.push(AffectWord {
                        word: word.to_string(),
                        weights,
                    });
                }
            }
        }

        let Some((dominant, max_total)) = totals.max_dimension() else {
            return EmotionVector::neutral();
        };
        if max_total < DOMINANCE_THRESHOLD {
            return EmotionVector {
                dominant: Emotion::Neutral,
                intensity: 0.0,
                words,
            };
        }

        let base = (max_total / words.len() as f32).clamp(0.0, 1.0);
        let intensity = (base + exclaim_boost(text) + shouting_boost(text)).clamp(0.0, 1.0);
        trace!(%dominant, intensity, matches = words.len(), "lexicon analysis");

        EmotionVector {
            dominant,
            intensity,
            words,
        }
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn exclaim_boost(text: &str) -> f32 {
    let count = text.chars().filter(|&c| c == '!').count() as f32;
    (count * EXCLAIM_BOOST).min(MAX_EXCLAIM_BOOST)
}

fn shouting_boost(text: &str) -> f32 {
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.is_empty() {
        return 0.0;
    }
    let upper = letters.iter().filter(|c| c.is_uppercase()).count() as f32;
    if upper / letters.len() as f32 > SHOUTING_RATIO {
        SHOUTING_BOOST
    } else {
        0.0
    }
}

/// [`EmotionClassifier`] over the built-in lexicon.
///
/// The default classification engine; swap in a remote implementation by
/// providing another [`EmotionClassifier`] to the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct LexiconClassifier {
    lexicon: AffectLexicon,
}

impl LexiconClassifier {
    /// Classifier over the built-in lexicon.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifier over a custom lexicon.
    #[must_use]
    pub fn with_lexicon(lexicon: AffectLexicon) -> Self {
        Self { lexicon }
    }
}

#[async_trait]
impl EmotionClassifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<EmotionVector, BackendError> {
        Ok(self.lexicon.analyze(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_neutral() {
        let lexicon = AffectLexicon::default();
        let vector = lexicon.analyze("");
        assert_eq!(vector.dominant, Emotion::Neutral);
        assert_eq!(vector.intensity, 0.0);
        assert!(vector.words.is_empty());
    }

    #[test]
    fn test_unmatched_text_is_neutral() {
        let lexicon = AffectLexicon::default();
        let vector = lexicon.analyze("the quick brown fox");
        assert!(vector.is_neutral());
    }

    #[test]
    fn test_dominant_dimension_wins() {
        let lexicon = AffectLexicon::default();
        let vector = lexicon.analyze("rage and fury, hate and fight");
        assert_eq!(vector.dominant, Emotion::Anger);
        assert!(vector.intensity > 0.0);
    }

    #[test]
    fn test_exclamation_raises_intensity() {
        let lexicon = AffectLexicon::default();
        let calm = lexicon.analyze("I am happy");
        let loud = lexicon.analyze("I am happy!!!");
        assert!(loud.intensity > calm.intensity);
    }

    #[test]
    fn test_shouting_raises_intensity() {
        let lexicon = AffectLexicon::default();
        let calm = lexicon.analyze("so much rage");
        let loud = lexicon.analyze("SO MUCH RAGE");
        assert!(loud.intensity > calm.intensity);
    }

    #[test]
    fn test_suffix_fallback_matches_stem() {
        let lexicon = AffectLexicon::default();
        let vector = lexicon.analyze("burning storms");
        let found: Vec<&str> = vector.words.iter().map(|w| w.word.as_str()).collect();
        assert!(found.contains(&"burn"));
        assert!(found.contains(&"storm"));
    }

    #[test]
    fn test_affect_words_deduplicated() {
        let lexicon = AffectLexicon::default();
        let vector = lexicon.analyze("sad sad sad");
        assert_eq!(vector.words.len(), 1);
    }

    #[tokio::test]
    async fn test_classifier_is_deterministic() {
        let classifier = LexiconClassifier::new();
        let a = classifier.classify("lonely rain").await.unwrap();
        let b = classifier.classify("lonely rain").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.dominant, Emotion::Sadness);
    }
}
