//! Train the intent classification model
//!
//! Reads a labeled CSV dataset, fits the TF-IDF + logistic regression
//! classifier, prints an evaluation report and writes the model artifact
//! loaded by the analyzer at startup.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bank_assistant_agent::{Dataset, Trainer, TrainingConfig};
use bank_assistant_text_processing::normalize;

const SAMPLE_QUERIES: &[&str] = &[
    "What's my balance?",
    "Transfer 5000 to my friend",
    "I lost my credit card",
    "Apply for home loan",
    "Show branch details",
];

#[derive(Debug, Parser)]
#[command(name = "train-intent-model", version, about = "Train the banking intent classifier")]
struct Args {
    /// CSV dataset with `text` and `intent` columns
    #[arg(long, env = "BANK_ASSISTANT_TRAINING_DATA", default_value = "data/banking_queries.csv")]
    data: PathBuf,

    /// Where to write the model artifact
    #[arg(long, default_value = "models/intent_model.json")]
    output: PathBuf,

    /// Fraction of the dataset held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    test_size: f64,

    /// Shuffle seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Hold out the same fraction of every intent
    #[arg(long)]
    stratify: bool,

    /// Vocabulary cap
    #[arg(long, default_value_t = 5000)]
    max_features: usize,

    /// Gradient descent iterations
    #[arg(long, default_value_t = 1000)]
    max_iter: usize,

    /// Inverse L2 regularization strength
    #[arg(long, default_value_t = 1.0)]
    c: f64,
}

impl Args {
    fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            test_size: self.test_size,
            seed: self.seed,
            stratify: self.stratify,
            max_features: self.max_features,
            max_iter: self.max_iter,
            c: self.c,
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        tracing::error!(error = %e, "Training failed");
        return Err(e);
    }
    Ok(())
}

fn run(args: &Args) -> anyhow::Result<()> {
    let dataset = Dataset::from_csv(&args.data)
        .with_context(|| format!("loading dataset {}", args.data.display()))?;
    tracing::info!(
        path = %args.data.display(),
        samples = dataset.len(),
        "Loaded training dataset"
    );

    let trainer = Trainer::new(args.training_config());
    let (model, report) = trainer
        .train_and_save(&dataset, &args.output)
        .context("training intent model")?;

    println!("{}", report);
    println!("Model saved to {}", args.output.display());
    println!();
    println!("Sample predictions:");
    for query in SAMPLE_QUERIES {
        match model.predict(&normalize(query)) {
            Some((intent, confidence)) => {
                println!("  {:<32} -> {} ({:.2})", query, intent, confidence)
            }
            None => println!("  {:<32} -> (no prediction)", query),
        }
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bank_assistant=info,train_intent_model=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
