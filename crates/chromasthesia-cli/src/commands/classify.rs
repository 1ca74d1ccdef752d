//! Classify command: run the lexicon classifier on one text and print the
//! resulting emotion vector.

use clap::Args;
use tracing::error;

use chromasthesia_core::lexicon::LexiconClassifier;
use chromasthesia_core::traits::EmotionClassifier;

/// Arguments for the classify command.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// The text to classify
    pub text: String,

    /// Emit the full vector as JSON instead of a summary line
    #[arg(long)]
    pub json: bool,
}

/// Execute the classify command.
pub async fn handle_classify(args: ClassifyArgs) -> i32 {
    let classifier = LexiconClassifier::new();
    let vector = match classifier.classify(&args.text).await {
        Ok(vector) => vector,
        Err(e) => {
            error!("classification failed: {e}");
            return 1;
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&vector) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("failed to serialize vector: {e}");
                return 1;
            }
        }
    } else {
        println!(
            "dominant: {} (intensity {:.2})",
            vector.dominant, vector.intensity
        );
        for word in &vector.words {
            println!("  {} {:.3}", word.word, word.weights.squared_sum());
        }
    }
    0
}
