//! Submission request type.

use serde::{Deserialize, Serialize};

/// The top-level unit of work: one text to chromasthetiate.
///
/// `target_count == 0` is legal and short-circuits the whole submission
/// (completion fires immediately with an empty result set; no search is
/// issued).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    /// The input text to classify and search for.
    pub text: String,
    /// Number of successfully downloaded images to aim for.
    pub target_count: usize,
    /// When non-empty, used verbatim as keywords instead of affect words.
    #[serde(default)]
    pub explicit_keywords: Vec<String>,
}

impl SubmissionRequest {
    /// A plain submission with no explicit keywords.
    #[must_use]
    pub fn new(text: impl Into<String>, target_count: usize) -> Self {
        Self {
            text: text.into(),
            target_count,
            explicit_keywords: Vec::new(),
        }
    }

    /// Override the affect-word keyword selection with explicit keywords.
    #[must_use]
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.explicit_keywords = keywords;
        self
    }
}
