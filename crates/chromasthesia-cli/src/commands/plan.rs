//! Plan command: classify a text and print the search query that would be
//! issued, without touching any remote service.

use std::path::Path;
use std::sync::Arc;

use clap::Args;
use tracing::error;

use chromasthesia_core::lexicon::LexiconClassifier;
use chromasthesia_core::palette::StaticPalette;
use chromasthesia_core::traits::EmotionClassifier;
use chromasthesia_pipeline::QueryBuilder;

use super::load_config;

/// Arguments for the plan command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// The text to plan a query for
    pub text: String,

    /// Explicit keyword, overriding affect-word selection (repeatable)
    #[arg(long = "keyword")]
    pub keywords: Vec<String>,

    /// Emit the query as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

/// Execute the plan command.
pub async fn handle_plan(args: PlanArgs, config_path: Option<&Path>) -> i32 {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {e}");
            return 1;
        }
    };

    let classifier = LexiconClassifier::new();
    let vector = match classifier.classify(&args.text).await {
        Ok(vector) => vector,
        Err(e) => {
            error!("classification failed: {e}");
            return 1;
        }
    };

    let builder = QueryBuilder::new(Arc::new(StaticPalette::new()), config.query);
    let query = match builder.build(&vector, &args.text, &args.keywords) {
        Ok(query) => query,
        Err(e) => {
            error!("query building failed: {e}");
            return 1;
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&query) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("failed to serialize query: {e}");
                return 1;
            }
        }
    } else {
        println!("dominant: {} (intensity {:.2})", vector.dominant, vector.intensity);
        println!("q: {}", query.to_query_string());
        println!("start: {}  count: {}", query.start, query.page_size);
    }
    0
}
