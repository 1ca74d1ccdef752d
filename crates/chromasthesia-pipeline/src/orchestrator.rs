//! Retrieval orchestrator: one state machine per submission.
//!
//! States: `Classifying → Querying → Dispatching → (per item) Resolving →
//! Downloading → Completed | Aborted`. Every state transition is triggered
//! from within the callbacks/continuations of the remote calls; nothing
//! blocks a caller's thread.
//!
//! Submissions are fully independent; the only cross-submission state is
//! the round-robin output index counter, the optional global remote-call
//! semaphore and the statistics.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::{oneshot, Semaphore};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use chromasthesia_core::config::ChromaConfig;
use chromasthesia_core::traits::{
    EmotionClassifier, ImageFetcher, PaletteSource, PhotoResolver, SearchBackend,
};
use chromasthesia_core::types::{Photo, ResultItem, SubmissionRequest};

use crate::dispatch::{acquire_remote_permit, spawn_item, ItemContext};
use crate::error::{PipelineError, PipelineResult};
use crate::events::{CompletionReport, ImageEvent, SubmissionObserver};
use crate::query::QueryBuilder;
use crate::queue::CompletionQueue;
use crate::stats::{PipelineStats, PipelineStatsSnapshot};

// ============================================================================
// SUBMISSION STATE
// ============================================================================

/// State shared between a running submission, its handle and the registry.
pub(crate) struct SubmissionShared {
    cancelled: Arc<AtomicBool>,
    queue: Mutex<Option<Arc<CompletionQueue<ResultItem, Photo>>>>,
}

impl SubmissionShared {
    fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            queue: Mutex::new(None),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Flip the flag and cancel the queue if one exists yet. In-flight
    /// network calls are not aborted; their outcomes are discarded.
    fn mark_cancelled(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(queue) = self.queue.lock().take() {
            queue.cancel();
        }
    }
}

#[derive(Default)]
struct Registry {
    active: Mutex<HashMap<Uuid, Arc<SubmissionShared>>>,
}

impl Registry {
    fn remove(&self, id: &Uuid) -> Option<Arc<SubmissionShared>> {
        self.active.lock().remove(id)
    }
}

/// Handle to one submission.
///
/// `wait` resolves to the completion report, or `None` when the submission
/// was cancelled before completing.
pub struct SubmissionHandle {
    id: Uuid,
    shared: Arc<SubmissionShared>,
    registry: Arc<Registry>,
    stats: Arc<PipelineStats>,
    report_rx: oneshot::Receiver<CompletionReport>,
}

impl SubmissionHandle {
    /// The submission's id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Cancel the submission. Returns `false` when it already finished or
    /// was already cancelled.
    pub fn cancel(&self) -> bool {
        if self.registry.remove(&self.id).is_none() {
            return false;
        }
        self.shared.mark_cancelled();
        self.stats.record_cancelled();
        true
    }

    /// Wait for the completion report; `None` for a cancelled submission.
    pub async fn wait(self) -> Option<CompletionReport> {
        self.report_rx.await.ok()
    }
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

/// The chromasthetiation engine, generic over its five boundary traits.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use chromasthesia_core::config::ChromaConfig;
/// use chromasthesia_core::lexicon::LexiconClassifier;
/// use chromasthesia_core::palette::StaticPalette;
/// use chromasthesia_core::types::SubmissionRequest;
/// use chromasthesia_pipeline::events::NullObserver;
/// use chromasthesia_pipeline::orchestrator::Chromasthetiator;
/// use chromasthesia_pipeline::remote::{HttpImageFetcher, HttpPhotoResolver, HttpSearchBackend};
///
/// # async fn demo() -> chromasthesia_pipeline::PipelineResult<()> {
/// let config = ChromaConfig::default();
/// let client = chromasthesia_pipeline::remote::build_client(&config.retrieval)?;
/// let engine = Arc::new(Chromasthetiator::new(
///     Arc::new(LexiconClassifier::new()),
///     Arc::new(StaticPalette::new()),
///     Arc::new(HttpSearchBackend::new(client.clone(), config.search.clone())?),
///     Arc::new(HttpPhotoResolver::new(client.clone(), config.photos.clone())?),
///     Arc::new(HttpImageFetcher::new(client)),
///     config,
/// )?);
/// let handle = engine.submit(
///     SubmissionRequest::new("a gathering storm", 3),
///     Arc::new(NullObserver),
/// );
/// let _report = handle.wait().await;
/// # Ok(())
/// # }
/// ```
pub struct Chromasthetiator<C, P, S, R, F> {
    classifier: Arc<C>,
    builder: QueryBuilder<P>,
    search: Arc<S>,
    resolver: Arc<R>,
    fetcher: Arc<F>,
    display_slots: usize,
    semaphore: Option<Arc<Semaphore>>,
    slot_counter: Arc<AtomicUsize>,
    registry: Arc<Registry>,
    stats: Arc<PipelineStats>,
}

impl<C, P, S, R, F> Chromasthetiator<C, P, S, R, F>
where
    C: EmotionClassifier + 'static,
    P: PaletteSource + 'static,
    S: SearchBackend + 'static,
    R: PhotoResolver + 'static,
    F: ImageFetcher + 'static,
{
    /// Build an orchestrator from its collaborators and configuration.
    ///
    /// # Errors
    ///
    /// `CoreError::Config` (wrapped) when `config` fails validation.
    pub fn new(
        classifier: Arc<C>,
        palette: Arc<P>,
        search: Arc<S>,
        resolver: Arc<R>,
        fetcher: Arc<F>,
        config: ChromaConfig,
    ) -> PipelineResult<Self> {
        config.validate()?;
        let semaphore = match config.retrieval.max_concurrent_requests {
            0 => None,
            n => Some(Arc::new(Semaphore::new(n))),
        };
        Ok(Self {
            classifier,
            builder: QueryBuilder::new(palette, config.query),
            search,
            resolver,
            fetcher,
            display_slots: config.retrieval.display_slots,
            semaphore,
            slot_counter: Arc::new(AtomicUsize::new(0)),
            registry: Arc::new(Registry::default()),
            stats: Arc::new(PipelineStats::default()),
        })
    }

    /// Submit one text for chromasthetiation. Never blocks on remote work.
    ///
    /// `target_count == 0` is legal and short-circuits: the completion
    /// report fires immediately with an empty result set and no search is
    /// issued.
    pub fn submit(
        self: &Arc<Self>,
        request: SubmissionRequest,
        observer: Arc<dyn SubmissionObserver>,
    ) -> SubmissionHandle {
        let id = Uuid::new_v4();
        let (report_tx, report_rx) = oneshot::channel();
        let shared = Arc::new(SubmissionShared::new());
        self.stats.record_started();

        if request.target_count == 0 {
            debug!(submission = %id, "zero target count, completing immediately");
            self.stats.record_completed();
            let report = CompletionReport {
                submission_id: id,
                text: request.text,
                photos: Vec::new(),
                error: None,
                finished_at: Utc::now(),
            };
            observer.on_complete(report.clone());
            let _ = report_tx.send(report);
        } else {
            self.registry.active.lock().insert(id, shared.clone());
            let this = self.clone();
            let shared_run = shared.clone();
            tokio::spawn(async move {
                this.run_submission(id, shared_run, request, observer, report_tx)
                    .await;
            });
        }

        SubmissionHandle {
            id,
            shared,
            registry: self.registry.clone(),
            stats: self.stats.clone(),
            report_rx,
        }
    }

    /// Cancel a submission by id. Returns `false` for unknown or already
    /// finished submissions.
    pub fn cancel(&self, id: Uuid) -> bool {
        let Some(shared) = self.registry.remove(&id) else {
            return false;
        };
        shared.mark_cancelled();
        self.stats.record_cancelled();
        info!(submission = %id, "submission cancelled");
        true
    }

    /// Cancel every active submission; returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<_> = {
            let mut active = self.registry.active.lock();
            active.drain().collect()
        };
        for (id, shared) in &drained {
            shared.mark_cancelled();
            self.stats.record_cancelled();
            debug!(submission = %id, "submission cancelled");
        }
        drained.len()
    }

    /// Number of submissions currently running.
    #[must_use]
    pub fn active_submissions(&self) -> usize {
        self.registry.active.lock().len()
    }

    /// Snapshot of the pipeline counters.
    #[must_use]
    pub fn stats(&self) -> PipelineStatsSnapshot {
        self.stats.snapshot()
    }

    #[instrument(skip_all, fields(submission = %id))]
    async fn run_submission(
        self: Arc<Self>,
        id: Uuid,
        shared: Arc<SubmissionShared>,
        request: SubmissionRequest,
        observer: Arc<dyn SubmissionObserver>,
        report_tx: oneshot::Sender<CompletionReport>,
    ) {
        // Classifying
        let classified = {
            let _permit = acquire_remote_permit(&self.semaphore).await;
            self.classifier.classify(&request.text).await
        };
        if shared.is_cancelled() {
            return;
        }
        let vector = match classified {
            Ok(vector) => vector,
            Err(source) => {
                self.abort_submission(
                    id,
                    request.text,
                    PipelineError::Classification(source),
                    &observer,
                    report_tx,
                );
                return;
            }
        };
        debug!(dominant = %vector.dominant, intensity = vector.intensity, "classified");

        // Querying, with bounded keyword relaxation
        let mut query =
            match self
                .builder
                .build(&vector, &request.text, &request.explicit_keywords)
            {
                Ok(query) => query,
                Err(err) => {
                    self.abort_submission(
                        id,
                        request.text,
                        PipelineError::Core(err),
                        &observer,
                        report_tx,
                    );
                    return;
                }
            };
        let page = loop {
            let result = {
                let _permit = acquire_remote_permit(&self.semaphore).await;
                self.search.search(&query).await
            };
            if shared.is_cancelled() {
                return;
            }
            match result {
                Err(source) => {
                    self.abort_submission(
                        id,
                        request.text,
                        PipelineError::Search(source),
                        &observer,
                        report_tx,
                    );
                    return;
                }
                Ok(page) if page.items.is_empty() => {
                    if query.relax_keywords() {
                        self.stats.record_relaxation();
                        debug!(keywords = %query.keywords, "zero results, relaxing keywords");
                        continue;
                    }
                    // Nothing left to relax: completed with an empty set,
                    // not an error.
                    debug!("no results for fully relaxed query");
                    self.finish_empty(id, request.text, &observer, report_tx);
                    return;
                }
                Ok(page) => break page,
            }
        };
        debug!(results = page.items.len(), "search returned");

        // Dispatching: the queue mediates all further concurrency.
        let registry = self.registry.clone();
        let stats = self.stats.clone();
        let observer_done = observer.clone();
        let text = request.text.clone();
        let queue = Arc::new(CompletionQueue::new(
            request.target_count,
            page.items,
            Box::new(move |photos| {
                registry.remove(&id);
                stats.record_completed();
                let report = CompletionReport {
                    submission_id: id,
                    text,
                    photos,
                    error: None,
                    finished_at: Utc::now(),
                };
                observer_done.on_complete(report.clone());
                let _ = report_tx.send(report);
            }),
        ));
        *shared.queue.lock() = Some(queue.clone());
        if shared.is_cancelled() {
            // Raced with cancel() before the queue was registered.
            queue.cancel();
            return;
        }

        let resolver: Arc<dyn PhotoResolver> = self.resolver.clone();
        let fetcher: Arc<dyn ImageFetcher> = self.fetcher.clone();
        let ctx = Arc::new(ItemContext {
            id,
            resolver,
            fetcher,
            queue: queue.clone(),
            observer,
            cancelled: shared.cancelled.clone(),
            slot_counter: self.slot_counter.clone(),
            display_slots: self.display_slots,
            semaphore: self.semaphore.clone(),
            stats: self.stats.clone(),
        });
        while let Some(item) = queue.poll() {
            spawn_item(ctx.clone(), item);
        }
    }

    /// `Aborted`: surface a submission-level failure exactly once, through
    /// both callback surfaces.
    fn abort_submission(
        &self,
        id: Uuid,
        text: String,
        err: PipelineError,
        observer: &Arc<dyn SubmissionObserver>,
        report_tx: oneshot::Sender<CompletionReport>,
    ) {
        warn!(submission = %id, error = %err, "submission aborted");
        self.registry.remove(&id);
        self.stats.record_failed();
        let err = Arc::new(err);
        observer.on_image(id, ImageEvent::Failed { error: err.clone() });
        let report = CompletionReport {
            submission_id: id,
            text,
            photos: Vec::new(),
            error: Some(err),
            finished_at: Utc::now(),
        };
        observer.on_complete(report.clone());
        let _ = report_tx.send(report);
    }

    /// Zero eligible results and nothing left to relax: `Completed` with an
    /// empty set.
    fn finish_empty(
        &self,
        id: Uuid,
        text: String,
        observer: &Arc<dyn SubmissionObserver>,
        report_tx: oneshot::Sender<CompletionReport>,
    ) {
        self.registry.remove(&id);
        self.stats.record_completed();
        let report = CompletionReport {
            submission_id: id,
            text,
            photos: Vec::new(),
            error: None,
            finished_at: Utc::now(),
        };
        observer.on_complete(report.clone());
        let _ = report_tx.send(report);
    }
}
