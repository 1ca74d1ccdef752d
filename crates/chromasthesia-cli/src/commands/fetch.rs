//! Fetch command: run the full pipeline against the configured services and
//! save every downloaded image to disk.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use clap::Args;
use tracing::{error, warn};
use uuid::Uuid;

use chromasthesia_core::lexicon::LexiconClassifier;
use chromasthesia_core::palette::StaticPalette;
use chromasthesia_core::types::{FetchedImage, SubmissionRequest};
use chromasthesia_pipeline::orchestrator::Chromasthetiator;
use chromasthesia_pipeline::remote::{
    build_client, HttpImageFetcher, HttpPhotoResolver, HttpSearchBackend,
};
use chromasthesia_pipeline::{ImageEvent, PipelineResult, SubmissionObserver};

use super::load_config;

/// Arguments for the fetch command.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// The text to chromasthetiate
    pub text: String,

    /// Number of images to aim for
    #[arg(long, default_value = "3")]
    pub count: usize,

    /// Explicit keyword, overriding affect-word selection (repeatable)
    #[arg(long = "keyword")]
    pub keywords: Vec<String>,

    /// Directory the images are written into
    #[arg(long, default_value = "./images")]
    pub out_dir: PathBuf,
}

/// Observer that writes every finished image into the output directory.
struct SavingObserver {
    out_dir: PathBuf,
    failures: AtomicUsize,
}

impl SavingObserver {
    fn save(&self, image: &FetchedImage, slot: usize) -> std::io::Result<PathBuf> {
        let ext = match image.content_type.as_deref() {
            Some("image/png") => "png",
            Some("image/gif") => "gif",
            _ => "jpg",
        };
        let path = self
            .out_dir
            .join(format!("slot{slot:02}_{}.{ext}", image.photo.id));
        std::fs::write(&path, &image.bytes)?;
        Ok(path)
    }
}

impl SubmissionObserver for SavingObserver {
    fn on_image(&self, _submission: Uuid, event: ImageEvent) {
        match event {
            ImageEvent::Ready { image, slot } => match self.save(&image, slot) {
                Ok(path) => println!("saved {} (owner {})", path.display(), image.photo.owner),
                Err(e) => {
                    error!(photo = %image.photo.id, "failed to write image: {e}");
                    self.failures.fetch_add(1, Ordering::Relaxed);
                }
            },
            ImageEvent::Failed { error } => {
                warn!("image failed: {error}");
                self.failures.fetch_add(1, Ordering::Relaxed);
            }
            ImageEvent::Cancelled => {}
        }
    }

    fn on_complete(&self, _report: chromasthesia_pipeline::CompletionReport) {}
}

/// Execute the fetch command.
pub async fn handle_fetch(args: FetchArgs, config_path: Option<&Path>) -> i32 {
    match run_fetch(args, config_path).await {
        Ok(code) => code,
        Err(e) => {
            error!("fetch failed: {e}");
            1
        }
    }
}

async fn run_fetch(args: FetchArgs, config_path: Option<&Path>) -> PipelineResult<i32> {
    let config = load_config(config_path)?;
    std::fs::create_dir_all(&args.out_dir)
        .map_err(|e| chromasthesia_core::error::CoreError::Config(format!(
            "cannot create output directory {}: {e}",
            args.out_dir.display()
        )))?;

    let client = build_client(&config.retrieval)?;
    let engine = Arc::new(Chromasthetiator::new(
        Arc::new(LexiconClassifier::new()),
        Arc::new(StaticPalette::new()),
        Arc::new(HttpSearchBackend::new(client.clone(), config.search.clone())?),
        Arc::new(HttpPhotoResolver::new(client.clone(), config.photos.clone())?),
        Arc::new(HttpImageFetcher::new(client)),
        config,
    )?);

    let observer = Arc::new(SavingObserver {
        out_dir: args.out_dir,
        failures: AtomicUsize::new(0),
    });
    let request =
        SubmissionRequest::new(args.text, args.count).with_keywords(args.keywords);
    let handle = engine.submit(request, observer.clone());

    let Some(report) = handle.wait().await else {
        // Only cancellation leaves the handle without a report.
        warn!("submission cancelled before completion");
        return Ok(1);
    };

    if let Some(err) = &report.error {
        error!("submission failed: {err}");
        return Ok(1);
    }
    println!(
        "done: {} image(s), {} failure(s)",
        report.photos.len(),
        observer.failures.load(Ordering::Relaxed)
    );
    Ok(0)
}
