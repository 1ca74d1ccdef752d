//! Chromasthesia CLI
//!
//! Command-line frontend for the chromasthetiation pipeline.
//!
//! # Commands
//!
//! - `classify`: print the emotion classification for a text
//! - `plan`: build and print the search query without issuing it
//! - `fetch`: run the full pipeline and save the downloaded images
//!
//! Configuration is layered (`config/default.toml`, `config/{CHROMA_ENV}.toml`,
//! `CHROMA__`-prefixed environment variables) unless `--config` points at an
//! explicit file.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

/// Chromasthesia - turn text into emotionally matched imagery
#[derive(Parser)]
#[command(name = "chroma")]
#[command(version)]
#[command(about = "Turn text into emotionally matched imagery")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Explicit TOML configuration file (layered config/ loading otherwise)
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the emotion classification for a text
    Classify(commands::classify::ClassifyArgs),
    /// Build and print the search query for a text without issuing it
    Plan(commands::plan::PlanArgs),
    /// Run the full pipeline and save the downloaded images
    Fetch(commands::fetch::FetchArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match cli.command {
        Commands::Classify(args) => commands::classify::handle_classify(args).await,
        Commands::Plan(args) => commands::plan::handle_plan(args, cli.config.as_deref()).await,
        Commands::Fetch(args) => commands::fetch::handle_fetch(args, cli.config.as_deref()).await,
    };

    std::process::exit(exit_code);
}
