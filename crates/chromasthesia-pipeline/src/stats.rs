//! Pipeline statistics.
//!
//! All fields use atomics for thread-safe concurrent updates; `snapshot()`
//! produces a consistent-enough copy for monitoring and tests.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters updated across all submissions of one orchestrator.
#[derive(Debug, Default)]
pub struct PipelineStats {
    submissions_started: AtomicU64,
    submissions_completed: AtomicU64,
    submissions_failed: AtomicU64,
    submissions_cancelled: AtomicU64,
    images_completed: AtomicU64,
    item_failures: AtomicU64,
    benign_skips: AtomicU64,
    relaxation_retries: AtomicU64,
}

impl PipelineStats {
    pub(crate) fn record_started(&self) {
        self.submissions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.submissions_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.submissions_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cancelled(&self) {
        self.submissions_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_image(&self) {
        self.images_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_item_failure(&self) {
        self.item_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_benign_skip(&self) {
        self.benign_skips.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_relaxation(&self) {
        self.relaxation_retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> PipelineStatsSnapshot {
        PipelineStatsSnapshot {
            submissions_started: self.submissions_started.load(Ordering::Relaxed),
            submissions_completed: self.submissions_completed.load(Ordering::Relaxed),
            submissions_failed: self.submissions_failed.load(Ordering::Relaxed),
            submissions_cancelled: self.submissions_cancelled.load(Ordering::Relaxed),
            images_completed: self.images_completed.load(Ordering::Relaxed),
            item_failures: self.item_failures.load(Ordering::Relaxed),
            benign_skips: self.benign_skips.load(Ordering::Relaxed),
            relaxation_retries: self.relaxation_retries.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PipelineStatsSnapshot {
    /// Submissions accepted by `submit` (including zero-target ones).
    pub submissions_started: u64,
    /// Submissions whose completion report fired without an error.
    pub submissions_completed: u64,
    /// Submissions that failed at classification or search.
    pub submissions_failed: u64,
    /// Submissions cancelled before completion.
    pub submissions_cancelled: u64,
    /// Successfully downloaded images across all submissions.
    pub images_completed: u64,
    /// Per-item failures surfaced to observers.
    pub item_failures: u64,
    /// Benign "photo gone" skips.
    pub benign_skips: u64,
    /// Keyword-relaxation retries issued.
    pub relaxation_retries: u64,
}
