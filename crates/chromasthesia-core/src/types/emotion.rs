//! Emotion classification types.
//!
//! An [`EmotionVector`] is produced once per submitted text by an
//! [`EmotionClassifier`](crate::traits::EmotionClassifier) and is immutable
//! afterwards. The six affect dimensions follow the Ekman basic emotions;
//! `Neutral` is the absence of a dominant dimension, not a dimension itself.

use serde::{Deserialize, Serialize};

/// Number of affect dimensions (everything except `Neutral`).
pub const NUM_DIMENSIONS: usize = 6;

/// A basic emotion category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    /// No dominant affect detected.
    #[default]
    Neutral,
    Happiness,
    Sadness,
    Anger,
    Fear,
    Disgust,
    Surprise,
}

impl Emotion {
    /// The six affect dimensions, in weight-vector order.
    pub const DIMENSIONS: [Emotion; NUM_DIMENSIONS] = [
        Emotion::Happiness,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Disgust,
        Emotion::Surprise,
    ];

    /// Lowercase name, matching the serde representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Happiness => "happiness",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Disgust => "disgust",
            Emotion::Surprise => "surprise",
        }
    }

    /// Index into an [`EmotionWeights`] vector, `None` for `Neutral`.
    #[must_use]
    pub fn dimension_index(&self) -> Option<usize> {
        Self::DIMENSIONS.iter().position(|d| d == self)
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-dimension affect weight vector.
///
/// Weights are non-negative; a zero vector means "no affect". The ranking
/// key used for keyword selection is [`EmotionWeights::squared_sum`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EmotionWeights([f32; NUM_DIMENSIONS]);

impl EmotionWeights {
    /// Build from raw per-dimension weights (order of [`Emotion::DIMENSIONS`]).
    #[must_use]
    pub fn new(weights: [f32; NUM_DIMENSIONS]) -> Self {
        Self(weights)
    }

    /// Weight for a single dimension. `Neutral` always reads as `0.0`.
    #[must_use]
    pub fn get(&self, emotion: Emotion) -> f32 {
        emotion.dimension_index().map_or(0.0, |i| self.0[i])
    }

    /// Sum of squared per-dimension weights.
    ///
    /// This is the descending ranking key for affect-word selection: a word
    /// strongly loaded on one dimension outranks a word weakly loaded on
    /// several.
    #[must_use]
    pub fn squared_sum(&self) -> f32 {
        self.0.iter().map(|w| w * w).sum()
    }

    /// Strongest dimension and its weight, `None` for the zero vector.
    #[must_use]
    pub fn max_dimension(&self) -> Option<(Emotion, f32)> {
        let (idx, &weight) = self
            .0
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))?;
        if weight <= 0.0 {
            return None;
        }
        Some((Emotion::DIMENSIONS[idx], weight))
    }

    /// Element-wise accumulation.
    pub fn accumulate(&mut self, other: &EmotionWeights) {
        for (acc, w) in self.0.iter_mut().zip(other.0.iter()) {
            *acc += w;
        }
    }
}

/// A word with its affect loading, as found in a classified text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectWord {
    /// The word as it appears in the lexicon (lowercase).
    pub word: String,
    /// Per-dimension affect weights for this word.
    pub weights: EmotionWeights,
}

/// Result of classifying one text: the strongest emotion, an overall
/// intensity in `[0, 1]`, and the ranked affect words the classifier found.
///
/// Owned by the orchestration run that created it; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionVector {
    /// Strongest classified emotion (`Neutral` when nothing dominates).
    pub dominant: Emotion,
    /// Overall intensity in `[0, 1]`.
    pub intensity: f32,
    /// Affect words found in the text, in order of appearance.
    pub words: Vec<AffectWord>,
}

impl EmotionVector {
    /// A neutral classification with no affect words.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            dominant: Emotion::Neutral,
            intensity: 0.0,
            words: Vec::new(),
        }
    }

    /// Whether the dominant emotion is `Neutral`.
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        self.dominant == Emotion::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_index_roundtrip() {
        for (i, dim) in Emotion::DIMENSIONS.iter().enumerate() {
            assert_eq!(dim.dimension_index(), Some(i));
        }
        assert_eq!(Emotion::Neutral.dimension_index(), None);
    }

    #[test]
    fn test_squared_sum_ranks_concentrated_loadings_higher() {
        let concentrated = EmotionWeights::new([0.9, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let diffuse = EmotionWeights::new([0.3, 0.3, 0.3, 0.0, 0.0, 0.0]);
        assert!(concentrated.squared_sum() > diffuse.squared_sum());
    }

    #[test]
    fn test_max_dimension() {
        let weights = EmotionWeights::new([0.1, 0.8, 0.0, 0.2, 0.0, 0.0]);
        assert_eq!(weights.max_dimension(), Some((Emotion::Sadness, 0.8)));
        assert_eq!(EmotionWeights::default().max_dimension(), None);
    }

    #[test]
    fn test_neutral_reads_zero_weight() {
        let weights = EmotionWeights::new([0.5; NUM_DIMENSIONS]);
        assert_eq!(weights.get(Emotion::Neutral), 0.0);
        assert_eq!(weights.get(Emotion::Fear), 0.5);
    }
}
