//! Chromasthesia Core Library
//!
//! Domain types, boundary traits and configuration for the chromasthetiation
//! retrieval pipeline: the component that turns a text string into a stream
//! of downloaded images via emotion classification, a weighted image search
//! and bounded concurrent resolution/download.
//!
//! # Architecture
//!
//! This crate defines:
//! - Domain types (`EmotionVector`, `SearchQuery`, `Photo`, etc.)
//! - Boundary traits (`EmotionClassifier`, `SearchBackend`, `PhotoResolver`,
//!   `ImageFetcher`, `PaletteSource`)
//! - Error types and result aliases
//! - Configuration structures
//! - A built-in affect lexicon classifier and emotion color palette
//!
//! The pipeline itself (query building, admission control, orchestration,
//! HTTP backends) lives in `chromasthesia-pipeline`.
//!
//! # Example
//!
//! ```
//! use chromasthesia_core::types::{Emotion, SearchQuery};
//!
//! let query = SearchQuery::new(0, 24, "storm ocean".to_string(), vec![]).unwrap();
//! assert_eq!(query.to_query_string(), "storm ocean");
//! assert_eq!(Emotion::Sadness.as_str(), "sadness");
//! ```

pub mod config;
pub mod error;
pub mod lexicon;
pub mod palette;
pub mod stubs;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use config::ChromaConfig;
pub use error::{BackendError, CoreError, CoreResult};
