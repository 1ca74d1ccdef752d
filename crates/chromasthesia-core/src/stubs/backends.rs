//! Scripted stub backends.
//!
//! Deterministic by default; outcomes and latency are scriptable per input.
//! Interior mutability keeps the trait signatures identical to production
//! implementations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use crate::error::BackendError;
use crate::traits::{EmotionClassifier, ImageFetcher, PhotoResolver, SearchBackend};
use crate::types::{EmotionVector, PhotoId, PhotoSize, SearchPage, SearchQuery};

// ============================================================================
// CLASSIFIER
// ============================================================================

/// Stub [`EmotionClassifier`] returning one scripted outcome.
pub struct StubClassifier {
    outcome: Mutex<Result<EmotionVector, BackendError>>,
    calls: Mutex<Vec<String>>,
}

impl StubClassifier {
    /// Always return `vector`.
    #[must_use]
    pub fn returning(vector: EmotionVector) -> Self {
        Self {
            outcome: Mutex::new(Ok(vector)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always return a neutral classification.
    #[must_use]
    pub fn neutral() -> Self {
        Self::returning(EmotionVector::neutral())
    }

    /// Always fail with `error`.
    #[must_use]
    pub fn failing(error: BackendError) -> Self {
        Self {
            outcome: Mutex::new(Err(error)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Texts passed to `classify`, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl EmotionClassifier for StubClassifier {
    async fn classify(&self, text: &str) -> Result<EmotionVector, BackendError> {
        self.calls.lock().push(text.to_string());
        self.outcome.lock().clone()
    }
}

// ============================================================================
// SEARCH
// ============================================================================

/// Stub [`SearchBackend`] with pages scripted per keyword string.
///
/// Unscripted keyword strings return an empty page, which is what drives
/// keyword-relaxation tests.
#[derive(Default)]
pub struct StubSearchBackend {
    pages: Mutex<HashMap<String, SearchPage>>,
    failure: Mutex<Option<BackendError>>,
    queries: Mutex<Vec<SearchQuery>>,
}

impl StubSearchBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the page returned for an exact keyword string.
    pub fn script_page(&self, keywords: &str, page: SearchPage) {
        self.pages.lock().insert(keywords.to_string(), page);
    }

    /// Make every search fail with `error`.
    pub fn fail_with(&self, error: BackendError) {
        *self.failure.lock() = Some(error);
    }

    /// Queries issued so far, in call order.
    #[must_use]
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl SearchBackend for StubSearchBackend {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, BackendError> {
        self.queries.lock().push(query.clone());
        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }
        Ok(self
            .pages
            .lock()
            .get(&query.keywords)
            .cloned()
            .unwrap_or_default())
    }
}

// ============================================================================
// PHOTO RESOLVER
// ============================================================================

/// Stub [`PhotoResolver`] with per-id outcomes and optional latency.
///
/// Unscripted ids resolve to a deterministic two-entry size table derived
/// from the id.
#[derive(Default)]
pub struct StubPhotoResolver {
    outcomes: Mutex<HashMap<PhotoId, Result<Vec<PhotoSize>, BackendError>>>,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl StubPhotoResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `latency` on every lookup.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Script the outcome for one photo id.
    pub fn script(&self, id: PhotoId, outcome: Result<Vec<PhotoSize>, BackendError>) {
        self.outcomes.lock().insert(id, outcome);
    }

    /// Number of lookups so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The deterministic default size table for `id`.
    #[must_use]
    pub fn default_sizes(id: &PhotoId) -> Vec<PhotoSize> {
        vec![
            PhotoSize {
                label: "Small".to_string(),
                width: 240,
                height: 180,
                source: format!("https://img.stub/{id}/small"),
            },
            PhotoSize {
                label: "Large".to_string(),
                width: 1024,
                height: 768,
                source: format!("https://img.stub/{id}/large"),
            },
        ]
    }
}

#[async_trait]
impl PhotoResolver for StubPhotoResolver {
    async fn sizes_for(&self, id: &PhotoId) -> Result<Vec<PhotoSize>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(outcome) = self.outcomes.lock().get(id) {
            return outcome.clone();
        }
        Ok(Self::default_sizes(id))
    }
}

// ============================================================================
// IMAGE FETCHER
// ============================================================================

/// Stub [`ImageFetcher`] with scripted bodies, per-url latency, and an
/// in-flight gauge with a high-water mark.
///
/// The high-water mark is what admission-bound tests assert on: at no point
/// may more downloads be in flight than the completion queue admitted.
#[derive(Default)]
pub struct StubImageFetcher {
    bodies: Mutex<HashMap<String, Result<Bytes, BackendError>>>,
    url_latency: Mutex<HashMap<String, Duration>>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    high_water: AtomicUsize,
    calls: AtomicUsize,
}

impl StubImageFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `latency` on every download.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Script the outcome for one url.
    pub fn script(&self, url: &str, outcome: Result<Bytes, BackendError>) {
        self.bodies.lock().insert(url.to_string(), outcome);
    }

    /// Override the latency for one url.
    pub fn script_latency(&self, url: &str, latency: Duration) {
        self.url_latency.lock().insert(url.to_string(), latency);
    }

    /// Highest number of downloads ever in flight simultaneously.
    #[must_use]
    pub fn high_water_mark(&self) -> usize {
        self.high_water.load(Ordering::SeqCst)
    }

    /// Number of downloads so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for StubImageFetcher {
    async fn download(&self, url: &str) -> Result<(Bytes, Option<String>), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(current, Ordering::SeqCst);

        let latency = self.url_latency.lock().get(url).copied().or(self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let outcome = self
            .bodies
            .lock()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Ok(Bytes::from_static(b"stub-image-bytes")));

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome.map(|bytes| (bytes, Some("image/jpeg".to_string())))
    }
}
