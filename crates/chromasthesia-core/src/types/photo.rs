//! Search results, photos and resolved images.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Opaque photo identifier assigned by the search service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(String);

impl PhotoId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhotoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PhotoId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One entry of a search result page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    /// Photo identifier for the size lookup.
    pub photo_id: PhotoId,
    /// Owning account/source on the photo service.
    pub owner: String,
    /// Thumbnail URI returned inline with the search result.
    pub thumbnail: String,
    /// Result title, often empty.
    #[serde(default)]
    pub title: String,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchPage {
    /// Total matching results the service claims to have, when reported.
    pub total: Option<u64>,
    /// The items of this page, in service ranking order.
    pub items: Vec<ResultItem>,
}

/// One available resolution of a photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSize {
    /// Size label as reported by the service (e.g. "Large 2048").
    pub label: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Downloadable URI for this resolution.
    pub source: String,
}

impl PhotoSize {
    /// Pixel area, the ordering key for "largest available size".
    #[must_use]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// The largest size by pixel area, `None` for an empty table.
    #[must_use]
    pub fn largest(sizes: &[PhotoSize]) -> Option<&PhotoSize> {
        sizes.iter().max_by_key(|s| s.area())
    }
}

/// A photo with its resolved size table.
///
/// Sizes are resolved once per submission and cached on the value for the
/// lifetime of that submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Photo identifier.
    pub id: PhotoId,
    /// Owning account/source.
    pub owner: String,
    /// Resolved size table, largest not necessarily last.
    pub sizes: Vec<PhotoSize>,
}

impl Photo {
    /// The largest resolved size.
    #[must_use]
    pub fn largest_size(&self) -> Option<&PhotoSize> {
        PhotoSize::largest(&self.sizes)
    }
}

/// A downloaded image together with its photo metadata.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    /// The photo this image belongs to.
    pub photo: Photo,
    /// Raw image bytes.
    pub bytes: Bytes,
    /// Content type reported by the download response, when present.
    pub content_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(label: &str, w: u32, h: u32) -> PhotoSize {
        PhotoSize {
            label: label.to_string(),
            width: w,
            height: h,
            source: format!("https://img.example/{label}"),
        }
    }

    #[test]
    fn test_largest_by_area_not_by_single_edge() {
        // 1000x10 has a longer edge but a smaller area than 500x500.
        let sizes = vec![size("wide", 1000, 10), size("square", 500, 500)];
        assert_eq!(PhotoSize::largest(&sizes).unwrap().label, "square");
    }

    #[test]
    fn test_largest_of_empty_table() {
        assert!(PhotoSize::largest(&[]).is_none());
    }

    #[test]
    fn test_result_item_title_defaults_empty() {
        let item: ResultItem =
            serde_json::from_str(r#"{"photo_id":"42","owner":"a","thumbnail":"t"}"#).unwrap();
        assert_eq!(item.title, "");
    }
}
