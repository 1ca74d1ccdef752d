//! Shared test fixtures: a recording observer and stub-backed engines.

use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use chromasthesia_core::types::PhotoId;
use chromasthesia_pipeline::{CompletionReport, ImageEvent, SubmissionObserver};

/// One recorded observer callback, in invocation order.
#[derive(Debug, Clone)]
pub enum Entry {
    Image(Uuid, ImageEvent),
    Complete(CompletionReport),
}

/// Observer that records every callback for later assertions.
#[derive(Default)]
pub struct RecordingObserver {
    log: Mutex<Vec<Entry>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.log.lock().clone()
    }

    /// `(photo id, slot)` pairs of `Ready` events, in delivery order.
    pub fn ready(&self) -> Vec<(PhotoId, usize)> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::Image(_, ImageEvent::Ready { image, slot }) => {
                    Some((image.photo.id.clone(), slot))
                }
                _ => None,
            })
            .collect()
    }

    pub fn failed_count(&self) -> usize {
        self.entries()
            .iter()
            .filter(|entry| matches!(entry, Entry::Image(_, ImageEvent::Failed { .. })))
            .count()
    }

    pub fn cancelled_count(&self) -> usize {
        self.entries()
            .iter()
            .filter(|entry| matches!(entry, Entry::Image(_, ImageEvent::Cancelled)))
            .count()
    }

    pub fn completions(&self) -> Vec<CompletionReport> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::Complete(report) => Some(report),
                _ => None,
            })
            .collect()
    }

    /// Whether the final recorded entry is the completion report. Every
    /// per-image event must precede it.
    pub fn completion_is_last(&self) -> bool {
        matches!(self.entries().last(), Some(Entry::Complete(_)))
    }
}

impl SubmissionObserver for RecordingObserver {
    fn on_image(&self, submission: Uuid, event: ImageEvent) {
        self.log.lock().push(Entry::Image(submission, event));
    }

    fn on_complete(&self, report: CompletionReport) {
        self.log.lock().push(Entry::Complete(report));
    }
}
