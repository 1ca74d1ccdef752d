//! Chromasthetiation retrieval pipeline.
//!
//! Given a text string, this crate (a) obtains an emotion classification,
//! (b) builds a weighted search query, (c) issues it against the image
//! search service, (d) resolves each result to a concrete downloadable
//! image, (e) downloads a bounded number of images concurrently, and
//! (f) reports completion exactly once all admitted work has finished or
//! failed.
//!
//! # Components
//!
//! - [`query::QueryBuilder`]: emotion vector → weighted search query,
//!   including the keyword-relaxation retry strategy
//! - [`queue::CompletionQueue`]: admission control plus a single definitive
//!   completion signal
//! - [`orchestrator::Chromasthetiator`]: the per-submission state machine
//!   wiring the boundary traits together
//! - [`remote`]: HTTP implementations of the search, size-lookup and
//!   download boundaries over one shared `reqwest` client
//!
//! # Concurrency model
//!
//! Every remote call is an independent unit of work; nothing blocks a
//! caller's thread. The completion queue's counters are the only state
//! mutated from multiple concurrent call sites; everything else is either
//! exclusively owned or immutable.

pub mod dispatch;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod query;
pub mod queue;
pub mod remote;
pub mod stats;

pub use error::{PipelineError, PipelineResult, QueueError};
pub use events::{CompletionReport, ImageEvent, SubmissionObserver};
pub use orchestrator::{Chromasthetiator, SubmissionHandle};
pub use query::QueryBuilder;
pub use queue::CompletionQueue;
pub use stats::{PipelineStats, PipelineStatsSnapshot};
