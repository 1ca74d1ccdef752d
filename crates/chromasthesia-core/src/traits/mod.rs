//! Boundary trait definitions for the chromasthetiation pipeline.
//!
//! These traits are the seams between the pipeline and its external
//! collaborators: the emotion classification engine, the color palette
//! source, the image search service, the photo size lookup and the image
//! download backend. The pipeline crate provides HTTP implementations;
//! the stubs module provides scripted test doubles.
//!
//! Every remote boundary returns [`BackendError`] so the orchestrator can
//! classify failures (benign "gone" versus fatal) without knowing which
//! service produced them.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::types::{
    ColorPalette, Emotion, EmotionVector, PhotoId, PhotoSize, SearchPage, SearchQuery,
};

/// Text-to-emotion classification engine.
///
/// Pure from the pipeline's point of view: one call per submission, the
/// returned vector is immutable afterwards.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Classify `text` into a dominant emotion, intensity and affect words.
    ///
    /// # Errors
    ///
    /// Any [`BackendError`] here is fatal to the submission.
    async fn classify(&self, text: &str) -> Result<EmotionVector, BackendError>;
}

/// Source of per-emotion color palettes.
///
/// A pure lookup, hence synchronous.
pub trait PaletteSource: Send + Sync {
    /// The palette associated with `emotion`. May be empty.
    fn palette(&self, emotion: Emotion) -> ColorPalette;
}

/// The image search service.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Issue `query` and return one page of results.
    ///
    /// A zero-item page is a normal outcome (it drives keyword relaxation),
    /// not an error.
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, BackendError>;
}

/// The photo size lookup service.
#[async_trait]
pub trait PhotoResolver: Send + Sync {
    /// Available resolutions for the photo `id`.
    ///
    /// # Errors
    ///
    /// `NotFound` and `Forbidden` are the service's equivalents of "gone"
    /// and are treated as benign by the pipeline; anything else is a
    /// per-item failure.
    async fn sizes_for(&self, id: &PhotoId) -> Result<Vec<PhotoSize>, BackendError>;
}

/// The binary image download backend.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Download the image at `url`, returning the body and the reported
    /// content type.
    async fn download(
        &self,
        url: &str,
    ) -> Result<(bytes::Bytes, Option<String>), BackendError>;
}
