//! Built-in emotion color palettes.
//!
//! The static palette is the default [`PaletteSource`]: a fixed table of
//! colors per emotion, with a named color group where the search service's
//! group vocabulary has a good match.

use crate::traits::PaletteSource;
use crate::types::{ColorPalette, ColorValue, Emotion};

/// Static per-emotion palette table.
///
/// # Example
///
/// ```
/// use chromasthesia_core::palette::StaticPalette;
/// use chromasthesia_core::traits::PaletteSource;
/// use chromasthesia_core::types::Emotion;
///
/// let palette = StaticPalette::new();
/// assert!(!palette.palette(Emotion::Anger).colors.is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticPalette;

impl StaticPalette {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PaletteSource for StaticPalette {
    fn palette(&self, emotion: Emotion) -> ColorPalette {
        let (colors, group): (&[u32], Option<&str>) = match emotion {
            Emotion::Neutral => (&[0xf5f5f5, 0xc0c0c0, 0x808080, 0xe8e4d8], None),
            Emotion::Happiness => (
                &[0xffd700, 0xffa500, 0xffe135, 0xff8c69, 0xfff8dc],
                Some("warm"),
            ),
            Emotion::Sadness => (
                &[0x4a6fa5, 0x2c3e6b, 0x7b9bd1, 0x37474f, 0x90a4ae],
                Some("cool"),
            ),
            Emotion::Anger => (
                &[0xb71c1c, 0xd32f2f, 0xff5722, 0x8b0000, 0x4a0e0e],
                Some("warm"),
            ),
            Emotion::Fear => (&[0x1a1a2e, 0x16213e, 0x4b0082, 0x2d2d44], Some("dark")),
            Emotion::Disgust => (&[0x556b2f, 0x6b8e23, 0x808000, 0x3d4f1f], None),
            Emotion::Surprise => (
                &[0x00e5ff, 0xff00ff, 0xffea00, 0x76ff03, 0xff4081],
                Some("vivid"),
            ),
        };
        ColorPalette {
            colors: colors.iter().map(|&rgb| ColorValue::new(rgb)).collect(),
            group: group.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_emotion_has_colors() {
        let palette = StaticPalette::new();
        let mut emotions = vec![Emotion::Neutral];
        emotions.extend(Emotion::DIMENSIONS);
        for emotion in emotions {
            assert!(
                !palette.palette(emotion).colors.is_empty(),
                "no colors for {emotion}"
            );
        }
    }

    #[test]
    fn test_neutral_has_no_group() {
        let palette = StaticPalette::new();
        assert!(palette.palette(Emotion::Neutral).group.is_none());
        assert_eq!(
            palette.palette(Emotion::Sadness).group.as_deref(),
            Some("cool")
        );
    }

    #[test]
    fn test_palettes_are_distinct() {
        let palette = StaticPalette::new();
        assert_ne!(
            palette.palette(Emotion::Anger).colors,
            palette.palette(Emotion::Sadness).colors
        );
    }
}
