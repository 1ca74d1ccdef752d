//! Core domain types for the chromasthetiation pipeline.
//!
//! Everything here is a plain value: produced once, passed by reference or
//! cheaply cloned. The only shared-mutable structure in the system (the
//! bounded completion queue) lives in `chromasthesia-pipeline`.

mod color;
mod emotion;
mod photo;
mod query;
mod submission;

pub use color::{ColorPalette, ColorValue};
pub use emotion::{AffectWord, Emotion, EmotionVector, EmotionWeights, NUM_DIMENSIONS};
pub use photo::{FetchedImage, Photo, PhotoId, PhotoSize, ResultItem, SearchPage};
pub use query::{QueryTerm, SearchQuery};
pub use submission::SubmissionRequest;
