//! Query analysis for the banking assistant
//!
//! Features:
//! - Intent classification (TF-IDF + logistic regression, keyword-rule fallback)
//! - Offline training of the classifier from a labeled CSV dataset
//! - Slot filling with per-intent templates and follow-up questions
//! - Per-session conversation context with TTL and capacity eviction
//! - Canned response generation
//!
//! [`QueryAnalyzer::analyze`] is the single entry point used by the chat
//! handler. It never fails: a missing model degrades to keyword rules and
//! unrecognized input degrades to a fallback result.

pub mod analyzer;
pub mod classifier;
pub mod context;
pub mod responder;
pub mod slots;
pub mod training;

pub use analyzer::QueryAnalyzer;
pub use classifier::{
    Classification, IntentClassifier, KeywordRules, LogisticRegression, ModelMetadata,
    TfidfVectorizer, TrainedModel,
};
pub use context::ConversationContextStore;
pub use responder::Responder;
pub use slots::{SlotFillingEngine, SlotTurn};
pub use training::{
    ClassReport, Dataset, Example, Trainer, TrainingConfig, TrainingReport,
};

use thiserror::Error;

/// Classifier errors
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Model file not found: {0}")]
    ModelNotFound(String),

    #[error("Failed to read model: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse model: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Model has no classes")]
    NoClasses,
}

/// Offline training errors
#[derive(Error, Debug)]
pub enum TrainingError {
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("Malformed dataset: {0}")]
    Malformed(String),

    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Dataset has no usable rows")]
    EmptyDataset,

    #[error("Dataset has a single intent ({0}); at least two are required")]
    SingleClass(String),

    #[error("Intent '{intent}' has {count} example(s); stratified split needs at least 2")]
    InsufficientExamples { intent: String, count: usize },

    #[error("Dataset has {0} example(s); a train/test split needs at least 2")]
    TooFewExamples(usize),

    #[error("Invalid training option {field}: {message}")]
    InvalidOption { field: &'static str, message: String },

    #[error(transparent)]
    Model(#[from] ClassifierError),
}

impl From<csv::Error> for TrainingError {
    fn from(err: csv::Error) -> Self {
        TrainingError::Malformed(err.to_string())
    }
}
