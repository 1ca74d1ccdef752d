//! Observer surface of the submission API.
//!
//! The pipeline never blocks a caller; per-image results and the single
//! completion signal are delivered through a [`SubmissionObserver`]. A
//! submission's completion report is additionally delivered through its
//! [`SubmissionHandle`](crate::orchestrator::SubmissionHandle).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use chromasthesia_core::types::{FetchedImage, Photo};

use crate::error::PipelineError;

/// Per-image event delivered while a submission runs.
#[derive(Debug, Clone)]
pub enum ImageEvent {
    /// An image finished downloading.
    Ready {
        /// The downloaded image with its photo metadata.
        image: FetchedImage,
        /// Round-robin output index: strictly increasing in completion
        /// order, wrapped modulo the number of display slots.
        slot: usize,
    },
    /// One item failed (or the whole submission failed before dispatch).
    Failed {
        /// The failure; shared because the same error may also appear in
        /// the completion report.
        error: Arc<PipelineError>,
    },
    /// The submission was cancelled while this item was in flight; its
    /// outcome has been discarded.
    Cancelled,
}

/// Final report of one submission.
///
/// Fires exactly once per non-cancelled submission, regardless of how many
/// items succeeded versus failed.
#[derive(Debug, Clone)]
pub struct CompletionReport {
    /// The submission this report belongs to.
    pub submission_id: Uuid,
    /// The originally submitted text.
    pub text: String,
    /// Successfully downloaded photos, in completion order. May hold fewer
    /// than the target count when the backlog was exhausted first.
    pub photos: Vec<Photo>,
    /// Present when the submission failed at classification or search.
    pub error: Option<Arc<PipelineError>>,
    /// When the submission finished.
    pub finished_at: DateTime<Utc>,
}

impl CompletionReport {
    /// Whether the submission ended without a submission-level error.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Callback surface for submissions.
///
/// Implementations must be cheap and non-blocking; they are invoked from
/// within the pipeline's worker tasks.
pub trait SubmissionObserver: Send + Sync {
    /// Called once per terminal per-item outcome (success, failure or
    /// cancellation notice). Benign skips produce no event.
    fn on_image(&self, submission: Uuid, event: ImageEvent);

    /// Called exactly once when the submission completes (never for a
    /// cancelled submission).
    fn on_complete(&self, report: CompletionReport);
}

/// Observer that ignores everything; for callers that only use
/// [`SubmissionHandle::wait`](crate::orchestrator::SubmissionHandle::wait).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl SubmissionObserver for NullObserver {
    fn on_image(&self, _submission: Uuid, _event: ImageEvent) {}
    fn on_complete(&self, _report: CompletionReport) {}
}
