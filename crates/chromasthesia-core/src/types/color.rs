//! Color values and per-emotion palettes.

use serde::{Deserialize, Serialize};

/// A 24-bit RGB color.
///
/// Stored as `0xRRGGBB`; formats as a six-digit lowercase hex string for
/// the search query wire format.
///
/// # Example
///
/// ```
/// use chromasthesia_core::types::ColorValue;
///
/// let gold = ColorValue::new(0xffd700);
/// assert_eq!(gold.hex(), "ffd700");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorValue(u32);

impl ColorValue {
    /// Build from a packed `0xRRGGBB` value. Bits above 24 are masked off.
    #[must_use]
    pub const fn new(rgb: u32) -> Self {
        Self(rgb & 0x00ff_ffff)
    }

    /// Build from separate channel values.
    #[must_use]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    /// The packed `0xRRGGBB` value.
    #[must_use]
    pub const fn rgb(&self) -> u32 {
        self.0
    }

    /// Six-digit lowercase hex, without a leading `#`.
    #[must_use]
    pub fn hex(&self) -> String {
        format!("{:06x}", self.0)
    }
}

impl std::fmt::Display for ColorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// The colors associated with one emotion, plus an optional named color
/// group the search service understands (e.g. "warm").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPalette {
    /// Candidate colors, most characteristic first.
    pub colors: Vec<ColorValue>,
    /// Optional named color group for a `colorgroup:` query term.
    pub group: Option<String>,
}

impl ColorPalette {
    /// An empty palette (no color terms will be emitted).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            colors: Vec::new(),
            group: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_is_zero_padded() {
        assert_eq!(ColorValue::new(0x00000f).hex(), "00000f");
        assert_eq!(ColorValue::from_rgb(255, 0, 128).hex(), "ff0080");
    }

    #[test]
    fn test_high_bits_masked() {
        assert_eq!(ColorValue::new(0xff123456).rgb(), 0x123456);
    }

    #[test]
    fn test_display_has_hash_prefix() {
        assert_eq!(ColorValue::new(0xabcdef).to_string(), "#abcdef");
    }
}
