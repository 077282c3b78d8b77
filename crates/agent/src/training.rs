//! Offline classifier training
//!
//! Reads a labeled CSV dataset (`text`, `intent` columns), normalizes the
//! text, holds out a seeded test split, fits the TF-IDF vectorizer and the
//! logistic regression on the training split and evaluates on the rest.
//! Never reachable from the live analyzer.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use bank_assistant_text_processing::normalize;

use crate::classifier::logistic::{LogisticConfig, DEFAULT_MAX_ITER};
use crate::classifier::tfidf::DEFAULT_MAX_FEATURES;
use crate::classifier::{LogisticRegression, ModelMetadata, TfidfVectorizer, TrainedModel};
use crate::TrainingError;

/// One labeled, normalized example
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub text: String,
    pub intent: String,
}

/// Labeled training data
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub examples: Vec<Example>,
}

impl Dataset {
    /// Read a CSV with a header row containing `text` and `intent`.
    ///
    /// Other columns are ignored. Rows whose text normalizes to nothing or
    /// whose intent is blank are dropped.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, TrainingError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TrainingError::DatasetNotFound(path.display().to_string()));
        }
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;
        Self::from_reader(reader)
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self, TrainingError> {
        let headers = reader.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or(TrainingError::MissingColumn(name))
        };
        let text_col = column("text")?;
        let intent_col = column("intent")?;

        let mut examples = Vec::new();
        let mut dropped = 0usize;
        for record in reader.records() {
            let record = record?;
            let text = normalize(record.get(text_col).unwrap_or_default());
            let intent = record.get(intent_col).unwrap_or_default().trim().to_string();
            if text.is_empty() || intent.is_empty() {
                dropped += 1;
                continue;
            }
            examples.push(Example { text, intent });
        }

        if dropped > 0 {
            tracing::warn!(dropped, "Dropped blank dataset rows");
        }

        Ok(Self { examples })
    }

    /// Build from `(text, intent)` pairs, normalizing the text
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let examples = pairs
            .into_iter()
            .map(|(text, intent)| Example {
                text: normalize(text),
                intent: intent.trim().to_string(),
            })
            .filter(|e| !e.text.is_empty() && !e.intent.is_empty())
            .collect();
        Self { examples }
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Samples per intent
    pub fn intent_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for example in &self.examples {
            *counts.entry(example.intent.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Seeded train/test split.
    ///
    /// The test split gets `ceil(len * test_size)` examples. A stratified
    /// split does this per intent and needs at least two examples of each.
    pub fn split(
        &self,
        test_size: f64,
        seed: u64,
        stratify: bool,
    ) -> Result<(Vec<Example>, Vec<Example>), TrainingError> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(TrainingError::InvalidOption {
                field: "test_size",
                message: format!("must be between 0 and 1 (exclusive), got {}", test_size),
            });
        }
        if self.len() < 2 {
            return Err(TrainingError::TooFewExamples(self.len()));
        }

        let mut rng = StdRng::seed_from_u64(seed);

        if !stratify {
            let mut shuffled = self.examples.clone();
            shuffled.shuffle(&mut rng);
            let n_test = test_count(shuffled.len(), test_size);
            let train = shuffled.split_off(n_test);
            return Ok((train, shuffled));
        }

        let mut by_intent: BTreeMap<&str, Vec<&Example>> = BTreeMap::new();
        for example in &self.examples {
            by_intent.entry(example.intent.as_str()).or_default().push(example);
        }

        if let Some((intent, group)) = by_intent.iter().find(|(_, group)| group.len() < 2) {
            return Err(TrainingError::InsufficientExamples {
                intent: intent.to_string(),
                count: group.len(),
            });
        }

        let mut train = Vec::new();
        let mut test = Vec::new();
        for group in by_intent.values_mut() {
            group.shuffle(&mut rng);
            let n_test = test_count(group.len(), test_size);
            test.extend(group[..n_test].iter().map(|e| (*e).clone()));
            train.extend(group[n_test..].iter().map(|e| (*e).clone()));
        }
        train.shuffle(&mut rng);
        test.shuffle(&mut rng);
        Ok((train, test))
    }
}

/// At least one test and one training example
fn test_count(len: usize, test_size: f64) -> usize {
    let n = (len as f64 * test_size).ceil() as usize;
    n.clamp(1, len.saturating_sub(1).max(1))
}

/// Training options
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub test_size: f64,
    pub seed: u64,
    pub stratify: bool,
    pub max_features: usize,
    pub max_iter: usize,
    /// Inverse regularization strength
    pub c: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
            stratify: false,
            max_features: DEFAULT_MAX_FEATURES,
            max_iter: DEFAULT_MAX_ITER,
            c: 1.0,
        }
    }
}

/// Evaluation of one intent on the test split
#[derive(Debug, Clone, PartialEq)]
pub struct ClassReport {
    pub intent: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub accuracy: f64,
    pub train_size: usize,
    pub test_size: usize,
    pub per_class: Vec<ClassReport>,
    pub intent_counts: BTreeMap<String, usize>,
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Accuracy: {:.4} (train {}, test {})",
            self.accuracy, self.train_size, self.test_size
        )?;
        writeln!(
            f,
            "{:<24} {:>9} {:>9} {:>9} {:>9}",
            "intent", "precision", "recall", "f1-score", "support"
        )?;
        for class in &self.per_class {
            writeln!(
                f,
                "{:<24} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                class.intent, class.precision, class.recall, class.f1, class.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Intent distribution:")?;
        for (intent, count) in &self.intent_counts {
            writeln!(f, "  {}: {}", intent, count)?;
        }
        Ok(())
    }
}

/// Fits and evaluates intent models
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Split, fit and evaluate
    pub fn train(
        &self,
        dataset: &Dataset,
    ) -> Result<(TrainedModel, TrainingReport), TrainingError> {
        if dataset.is_empty() {
            return Err(TrainingError::EmptyDataset);
        }
        let intent_counts = dataset.intent_counts();
        if intent_counts.len() < 2 {
            let only = intent_counts.keys().next().cloned().unwrap_or_default();
            return Err(TrainingError::SingleClass(only));
        }
        if self.config.max_features == 0 {
            return Err(TrainingError::InvalidOption {
                field: "max_features",
                message: "must be at least 1".to_string(),
            });
        }

        tracing::info!(
            samples = dataset.len(),
            intents = intent_counts.len(),
            "Training intent model"
        );

        let (train, test) =
            dataset.split(self.config.test_size, self.config.seed, self.config.stratify)?;

        let train_texts: Vec<&str> = train.iter().map(|e| e.text.as_str()).collect();
        let train_labels: Vec<String> = train.iter().map(|e| e.intent.clone()).collect();

        let vectorizer = TfidfVectorizer::fit(&train_texts, self.config.max_features);
        let x = vectorizer.transform_all(&train_texts);
        tracing::info!(
            train = train.len(),
            test = test.len(),
            features = vectorizer.num_features(),
            "Vectorized training split"
        );

        let model = LogisticRegression::fit(
            &x,
            &train_labels,
            vectorizer.num_features(),
            LogisticConfig {
                c: self.config.c,
                max_iter: self.config.max_iter,
            },
        );

        let predicted: Vec<String> = test
            .iter()
            .map(|e| {
                model
                    .predict(&vectorizer.transform(&e.text))
                    .map(|(label, _)| label.to_string())
                    .unwrap_or_default()
            })
            .collect();
        let actual: Vec<String> = test.iter().map(|e| e.intent.clone()).collect();

        let report = evaluate(&actual, &predicted, train.len(), intent_counts.clone());
        tracing::info!(
            accuracy = report.accuracy,
            n_iter = model.n_iter,
            "Intent model trained"
        );

        let trained = TrainedModel {
            metadata: ModelMetadata {
                classes: model.classes.clone(),
                accuracy: report.accuracy,
                total_samples: dataset.len(),
                intent_counts,
                trained_at: Utc::now(),
            },
            vectorizer,
            model,
        };

        Ok((trained, report))
    }

    /// Train and persist; the artifact is only written on success
    pub fn train_and_save(
        &self,
        dataset: &Dataset,
        output: impl AsRef<Path>,
    ) -> Result<(TrainedModel, TrainingReport), TrainingError> {
        let (model, report) = self.train(dataset)?;
        model.save(output.as_ref())?;
        tracing::info!(path = %output.as_ref().display(), "Saved intent model");
        Ok((model, report))
    }
}

/// Accuracy and per-class precision/recall/F1 over every label seen
fn evaluate(
    actual: &[String],
    predicted: &[String],
    train_size: usize,
    intent_counts: BTreeMap<String, usize>,
) -> TrainingReport {
    let total = actual.len();
    let correct = actual.iter().zip(predicted).filter(|(a, p)| a == p).count();
    let accuracy = if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    };

    let labels: BTreeSet<&String> = actual.iter().chain(predicted).collect();
    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };

    let per_class = labels
        .into_iter()
        .filter(|label| !label.is_empty())
        .map(|label| {
            let tp = actual
                .iter()
                .zip(predicted)
                .filter(|(a, p)| *a == label && *p == label)
                .count();
            let predicted_count = predicted.iter().filter(|p| *p == label).count();
            let support = actual.iter().filter(|a| *a == label).count();

            let precision = ratio(tp, predicted_count);
            let recall = ratio(tp, support);
            let f1 = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };

            ClassReport {
                intent: label.clone(),
                precision,
                recall,
                f1,
                support,
            }
        })
        .collect();

    TrainingReport {
        accuracy,
        train_size,
        test_size: total,
        per_class,
        intent_counts,
    }
}
