//! Pipeline error taxonomy.
//!
//! Submission-level failures (classification, initial search) are surfaced
//! exactly once to the caller. Per-item failures never propagate to sibling
//! items or abort the submission. Queue consistency errors are programming
//! invariant violations, fatal and never retried.

use thiserror::Error;

use chromasthesia_core::error::{BackendError, CoreError};
use chromasthesia_core::types::PhotoId;

/// Internal-consistency errors of the bounded completion queue.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueueError {
    /// `completed` was driven past the target. Programming error, not a
    /// retry case.
    #[error("completion count {completed} exceeds target {target}")]
    Exceeded {
        /// Completion count after the offending increment
        completed: usize,
        /// The submission's target count
        target: usize,
    },
}

/// Submission-level error taxonomy.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Emotion classification failed; fatal to the submission.
    #[error("classification failed: {0}")]
    Classification(#[source] BackendError),

    /// The search service failed; fatal to the submission.
    #[error("search failed: {0}")]
    Search(#[source] BackendError),

    /// Size lookup for one photo failed; per-item, never aborts the
    /// submission.
    #[error("size resolution failed for photo {photo_id}: {source}")]
    Resolve {
        photo_id: PhotoId,
        #[source]
        source: BackendError,
    },

    /// Download of one resolved image failed; per-item.
    #[error("download failed for photo {photo_id}: {source}")]
    Download {
        photo_id: PhotoId,
        #[source]
        source: BackendError,
    },

    /// The submission was cancelled before this work finished.
    #[error("submission cancelled")]
    Cancelled,

    /// Queue bookkeeping invariant violation.
    #[error("queue invariant violated: {0}")]
    Queue(#[from] QueueError),

    /// Local validation/configuration failure.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl PipelineError {
    /// Whether this is a benign per-item failure (the remote equivalent of
    /// "gone"), recovered by skipping the slot.
    #[must_use]
    pub fn is_benign(&self) -> bool {
        match self {
            PipelineError::Resolve { source, .. } => source.is_benign(),
            _ => false,
        }
    }

    /// Whether this failure was transport-level. Network failures are
    /// logged at higher severity than generic per-item failures.
    #[must_use]
    pub fn is_network(&self) -> bool {
        match self {
            PipelineError::Classification(source)
            | PipelineError::Search(source)
            | PipelineError::Resolve { source, .. }
            | PipelineError::Download { source, .. } => source.is_network(),
            _ => false,
        }
    }
}

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_not_found_is_benign() {
        let err = PipelineError::Resolve {
            photo_id: PhotoId::from("p1"),
            source: BackendError::NotFound {
                resource: "p1".into(),
            },
        };
        assert!(err.is_benign());
    }

    #[test]
    fn test_download_not_found_is_not_benign() {
        // Only size-resolution "gone" is the benign skip; a dead image URL
        // surfaces as a per-item failure.
        let err = PipelineError::Download {
            photo_id: PhotoId::from("p1"),
            source: BackendError::NotFound {
                resource: "url".into(),
            },
        };
        assert!(!err.is_benign());
    }

    #[test]
    fn test_network_classification() {
        let err = PipelineError::Download {
            photo_id: PhotoId::from("p1"),
            source: BackendError::Network("timeout".into()),
        };
        assert!(err.is_network());
        assert!(!PipelineError::Cancelled.is_network());
    }

    #[test]
    fn test_queue_error_display() {
        let err = QueueError::Exceeded {
            completed: 4,
            target: 3,
        };
        assert!(err.to_string().contains('4'));
        assert!(err.to_string().contains('3'));
    }
}
