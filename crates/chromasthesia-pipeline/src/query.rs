//! Query building: emotion vector → weighted search query.
//!
//! Palette order is shuffled with an RNG seeded from a hash of the input
//! text, so the same text always yields the same color terms while
//! different texts spread across the palette. The neutral-page offset is
//! the one place a non-seeded RNG is used, so repeated neutral submissions
//! don't always return the same page.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use chromasthesia_core::config::QuerySettings;
use chromasthesia_core::error::CoreResult;
use chromasthesia_core::traits::PaletteSource;
use chromasthesia_core::types::{AffectWord, EmotionVector, QueryTerm, SearchQuery};

/// Floor of the color-term weight before division by `max_colors`.
const MIN_COLOR_WEIGHT: f32 = 0.1;

/// Builds one [`SearchQuery`] per submission from an emotion vector.
pub struct QueryBuilder<P> {
    palette: Arc<P>,
    settings: QuerySettings,
}

impl<P: PaletteSource> QueryBuilder<P> {
    pub fn new(palette: Arc<P>, settings: QuerySettings) -> Self {
        Self { palette, settings }
    }

    /// The settings this builder was constructed with.
    #[must_use]
    pub fn settings(&self) -> &QuerySettings {
        &self.settings
    }

    /// Build the query for one submission.
    ///
    /// - Non-empty `explicit_keywords` are used verbatim and affect-word
    ///   selection is skipped.
    /// - A neutral classification yields empty keywords; otherwise the top
    ///   `max_keywords` affect words ranked by squared weight sum.
    /// - Up to `max_colors` distinct palette colors become weighted terms;
    ///   a named palette group adds one `colorgroup:` term.
    ///
    /// # Errors
    ///
    /// `CoreError::Validation` if the color weights break the 1.0 budget,
    /// which the weight formula makes impossible for a valid configuration.
    pub fn build(
        &self,
        vector: &EmotionVector,
        text: &str,
        explicit_keywords: &[String],
    ) -> CoreResult<SearchQuery> {
        let keywords = if !explicit_keywords.is_empty() {
            explicit_keywords.join(" ")
        } else if vector.is_neutral() {
            String::new()
        } else {
            self.select_keywords(&vector.words)
        };

        let terms = self.color_terms(vector, text);

        let page_size = self.settings.page_size;
        let mut start = 0;
        if keywords.is_empty()
            && vector.is_neutral()
            && self.settings.neutral_pool_hint > page_size as u64
        {
            start = neutral_start_offset(
                &mut rand::thread_rng(),
                self.settings.neutral_pool_hint,
                page_size as u64,
            );
        }

        let query = SearchQuery::new(start, page_size, keywords, terms)?;
        debug!(q = %query.to_query_string(), start = query.start, "built search query");
        Ok(query)
    }

    /// Top `max_keywords` affect words, ranked by the sum of squared
    /// per-dimension weights, descending.
    fn select_keywords(&self, words: &[AffectWord]) -> String {
        let mut ranked: Vec<&AffectWord> = words.iter().collect();
        ranked.sort_by(|a, b| {
            b.weights
                .squared_sum()
                .total_cmp(&a.weights.squared_sum())
        });
        ranked
            .iter()
            .take(self.settings.max_keywords)
            .map(|w| w.word.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn color_terms(&self, vector: &EmotionVector, text: &str) -> Vec<QueryTerm> {
        let palette = self.palette.palette(vector.dominant);
        let mut colors = palette.colors;
        let mut rng = ChaCha8Rng::seed_from_u64(text_seed(text));
        colors.shuffle(&mut rng);

        let weight =
            (vector.intensity.sqrt() * 0.5).max(MIN_COLOR_WEIGHT) / self.settings.max_colors as f32;

        let mut seen = HashSet::new();
        let mut terms = Vec::new();
        for color in colors {
            if !seen.insert(color) {
                continue;
            }
            terms.push(QueryTerm::Color { color, weight });
            if terms.len() == self.settings.max_colors {
                break;
            }
        }
        if let Some(name) = palette.group {
            terms.push(QueryTerm::ColorGroup { name, weight });
        }
        terms
    }
}

/// Deterministic seed for palette shuffling, derived from the input text.
fn text_seed(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Uniform page offset in `[0, pool - page]` for neutral queries whose
/// expected result pool exceeds the page size.
pub fn neutral_start_offset(rng: &mut impl Rng, pool: u64, page: u64) -> u64 {
    if pool <= page {
        return 0;
    }
    rng.gen_range(0..=pool - page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromasthesia_core::palette::StaticPalette;
    use chromasthesia_core::types::{Emotion, EmotionWeights};

    fn builder() -> QueryBuilder<StaticPalette> {
        QueryBuilder::new(Arc::new(StaticPalette::new()), QuerySettings::default())
    }

    fn word(text: &str, weights: [f32; 6]) -> AffectWord {
        AffectWord {
            word: text.to_string(),
            weights: EmotionWeights::new(weights),
        }
    }

    fn sad_vector() -> EmotionVector {
        EmotionVector {
            dominant: Emotion::Sadness,
            intensity: 0.64,
            words: vec![
                word("rain", [0.0, 0.4, 0.0, 0.0, 0.0, 0.0]),
                word("grief", [0.0, 0.9, 0.0, 0.1, 0.0, 0.0]),
                word("lonely", [0.0, 0.8, 0.0, 0.1, 0.0, 0.0]),
            ],
        }
    }

    #[test]
    fn test_keywords_ranked_by_squared_sum() {
        let query = builder().build(&sad_vector(), "some text", &[]).unwrap();
        // grief (0.82) > lonely (0.65) > rain (0.16)
        assert_eq!(query.keywords, "grief lonely rain");
    }

    #[test]
    fn test_max_keywords_truncates() {
        let mut settings = QuerySettings::default();
        settings.max_keywords = 2;
        let builder = QueryBuilder::new(Arc::new(StaticPalette::new()), settings);
        let query = builder.build(&sad_vector(), "some text", &[]).unwrap();
        assert_eq!(query.keywords, "grief lonely");
    }

    #[test]
    fn test_explicit_keywords_skip_affect_selection() {
        let query = builder()
            .build(
                &sad_vector(),
                "some text",
                &["red".to_string(), "sad".to_string()],
            )
            .unwrap();
        assert_eq!(query.keywords, "red sad");
    }

    #[test]
    fn test_neutral_has_empty_keywords() {
        let query = builder()
            .build(&EmotionVector::neutral(), "plain text", &[])
            .unwrap();
        assert_eq!(query.keywords, "");
    }

    #[test]
    fn test_color_terms_deterministic_per_text() {
        let a = builder().build(&sad_vector(), "same text", &[]).unwrap();
        let b = builder().build(&sad_vector(), "same text", &[]).unwrap();
        assert_eq!(a.terms(), b.terms());
    }

    #[test]
    fn test_color_weight_formula() {
        let query = builder().build(&sad_vector(), "t", &[]).unwrap();
        // max(sqrt(0.64) * 0.5, 0.1) / 3 = 0.4 / 3
        let expected = 0.4 / 3.0;
        for term in query.terms() {
            let weight = term.color_weight();
            assert!((weight - expected).abs() < 1e-6, "weight {weight}");
        }
    }

    #[test]
    fn test_low_intensity_uses_weight_floor() {
        let mut vector = sad_vector();
        vector.intensity = 0.01;
        let query = builder().build(&vector, "t", &[]).unwrap();
        // sqrt(0.01) * 0.5 = 0.05 < 0.1 floor
        let expected = 0.1 / 3.0;
        assert!((query.terms()[0].color_weight() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_group_term_emitted_for_grouped_palette() {
        let query = builder().build(&sad_vector(), "t", &[]).unwrap();
        assert_eq!(
            query
                .terms()
                .iter()
                .filter(|t| matches!(t, QueryTerm::ColorGroup { .. }))
                .count(),
            1
        );
        assert_eq!(
            query
                .terms()
                .iter()
                .filter(|t| matches!(t, QueryTerm::Color { .. }))
                .count(),
            3
        );
    }

    #[test]
    fn test_neutral_palette_has_no_group_term() {
        let query = builder()
            .build(&EmotionVector::neutral(), "t", &[])
            .unwrap();
        assert!(query
            .terms()
            .iter()
            .all(|t| matches!(t, QueryTerm::Color { .. })));
    }

    #[test]
    fn test_neutral_start_offset_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let offset = neutral_start_offset(&mut rng, 2000, 24);
            assert!(offset <= 2000 - 24);
        }
    }

    #[test]
    fn test_neutral_start_offset_zero_for_small_pool() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(neutral_start_offset(&mut rng, 24, 24), 0);
        assert_eq!(neutral_start_offset(&mut rng, 10, 24), 0);
    }

    #[test]
    fn test_non_neutral_query_starts_at_zero() {
        let query = builder().build(&sad_vector(), "t", &[]).unwrap();
        assert_eq!(query.start, 0);
    }

    #[test]
    fn test_explicit_keywords_on_neutral_disable_offset() {
        // Keywords are non-empty, so the neutral randomized page does not
        // apply even though the classification is neutral.
        let query = builder()
            .build(&EmotionVector::neutral(), "t", &["sky".to_string()])
            .unwrap();
        assert_eq!(query.start, 0);
    }
}
