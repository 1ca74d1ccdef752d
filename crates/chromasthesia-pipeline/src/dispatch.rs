//! Per-item dispatch: the `Resolving → Downloading` leg of the state
//! machine, one spawned task per admitted item.
//!
//! Items newly admitted by a permit release are spawned from within the
//! finishing task (continuation-passing); the orchestrator never tracks
//! in-flight counts itself, the queue does.
//!
//! # Error classification
//!
//! - Benign resolution failure ("gone"/"forbidden"): `debug!` log, permit
//!   released, slot skipped, no observer event.
//! - Other resolution/download failure: one `ImageEvent::Failed`, permit
//!   released, submission continues. Network failures log `warn!`, the
//!   rest `debug!`.
//! - Cancellation observed at any step: `ImageEvent::Cancelled`, permit
//!   released, outcome discarded (in-flight network calls are not aborted).

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, error, warn};
use uuid::Uuid;

use chromasthesia_core::traits::{ImageFetcher, PhotoResolver};
use chromasthesia_core::types::{FetchedImage, Photo, PhotoSize, ResultItem};

use crate::error::PipelineError;
use crate::events::{ImageEvent, SubmissionObserver};
use crate::queue::CompletionQueue;
use crate::stats::PipelineStats;

/// Everything one item task needs, shared by `Arc` across all items of a
/// submission.
pub(crate) struct ItemContext {
    pub id: Uuid,
    pub resolver: Arc<dyn PhotoResolver>,
    pub fetcher: Arc<dyn ImageFetcher>,
    pub queue: Arc<CompletionQueue<ResultItem, Photo>>,
    pub observer: Arc<dyn SubmissionObserver>,
    pub cancelled: Arc<AtomicBool>,
    /// Shared across all submissions writing to the same display sink.
    pub slot_counter: Arc<AtomicUsize>,
    pub display_slots: usize,
    pub semaphore: Option<Arc<Semaphore>>,
    pub stats: Arc<PipelineStats>,
}

impl ItemContext {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Acquire the optional global remote-call permit.
pub(crate) async fn acquire_remote_permit(
    semaphore: &Option<Arc<Semaphore>>,
) -> Option<OwnedSemaphorePermit> {
    match semaphore {
        Some(s) => s.clone().acquire_owned().await.ok(),
        None => None,
    }
}

/// Spawn the task for one admitted item.
pub(crate) fn spawn_item(ctx: Arc<ItemContext>, item: ResultItem) {
    tokio::spawn(run_item(ctx, item));
}

async fn run_item(ctx: Arc<ItemContext>, item: ResultItem) {
    if ctx.is_cancelled() {
        ctx.observer.on_image(ctx.id, ImageEvent::Cancelled);
        finish(&ctx);
        return;
    }

    // Resolving
    let sizes = {
        let _permit = acquire_remote_permit(&ctx.semaphore).await;
        ctx.resolver.sizes_for(&item.photo_id).await
    };
    if ctx.is_cancelled() {
        ctx.observer.on_image(ctx.id, ImageEvent::Cancelled);
        finish(&ctx);
        return;
    }
    let sizes = match sizes {
        Ok(sizes) => sizes,
        Err(source) if source.is_benign() => {
            debug!(
                submission = %ctx.id,
                photo_id = %item.photo_id,
                error = %source,
                "photo gone, skipping slot"
            );
            ctx.stats.record_benign_skip();
            finish(&ctx);
            return;
        }
        Err(source) => {
            fail_item(
                &ctx,
                PipelineError::Resolve {
                    photo_id: item.photo_id.clone(),
                    source,
                },
            );
            finish(&ctx);
            return;
        }
    };

    let Some(largest) = PhotoSize::largest(&sizes).cloned() else {
        debug!(
            submission = %ctx.id,
            photo_id = %item.photo_id,
            "empty size table, skipping slot"
        );
        ctx.stats.record_benign_skip();
        finish(&ctx);
        return;
    };
    let photo = Photo {
        id: item.photo_id.clone(),
        owner: item.owner.clone(),
        sizes,
    };

    // Downloading
    let downloaded = {
        let _permit = acquire_remote_permit(&ctx.semaphore).await;
        ctx.fetcher.download(&largest.source).await
    };
    if ctx.is_cancelled() {
        ctx.observer.on_image(ctx.id, ImageEvent::Cancelled);
        finish(&ctx);
        return;
    }
    match downloaded {
        Ok((bytes, content_type)) => {
            // Completion order, not admission order: the index is assigned
            // only once the download has finished.
            let slot = ctx.slot_counter.fetch_add(1, Ordering::SeqCst) % ctx.display_slots;
            ctx.stats.record_image();
            ctx.observer.on_image(
                ctx.id,
                ImageEvent::Ready {
                    image: FetchedImage {
                        photo: photo.clone(),
                        bytes,
                        content_type,
                    },
                    slot,
                },
            );
            if let Err(err) = ctx.queue.complete_with(photo) {
                error!(submission = %ctx.id, error = %err, "completion accounting violated");
            }
        }
        Err(source) => {
            fail_item(
                &ctx,
                PipelineError::Download {
                    photo_id: item.photo_id.clone(),
                    source,
                },
            );
        }
    }
    finish(&ctx);
}

fn fail_item(ctx: &Arc<ItemContext>, err: PipelineError) {
    if err.is_network() {
        warn!(submission = %ctx.id, error = %err, "item failed with network error");
    } else {
        debug!(submission = %ctx.id, error = %err, "item failed");
    }
    ctx.stats.record_item_failure();
    ctx.observer
        .on_image(ctx.id, ImageEvent::Failed { error: Arc::new(err) });
}

/// Release this item's permit and spawn whatever the queue now admits.
fn finish(ctx: &Arc<ItemContext>) {
    for next in ctx.queue.release() {
        spawn_item(ctx.clone(), next);
    }
}
