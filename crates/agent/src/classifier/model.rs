//! Persisted classifier artifact
//!
//! A JSON document holding the fitted vectorizer, the logistic regression
//! weights and training metadata. The artifact is read-only once loaded and
//! is only ever replaced wholesale by the offline trainer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::logistic::LogisticRegression;
use super::tfidf::TfidfVectorizer;
use crate::ClassifierError;

/// Training provenance stored next to the weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub classes: Vec<String>,
    /// Accuracy on the held-out split
    pub accuracy: f64,
    pub total_samples: usize,
    /// Samples per intent in the full dataset
    pub intent_counts: BTreeMap<String, usize>,
    pub trained_at: DateTime<Utc>,
}

/// Fitted vectorizer + linear model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub vectorizer: TfidfVectorizer,
    pub model: LogisticRegression,
    pub metadata: ModelMetadata,
}

impl TrainedModel {
    /// Load and validate an artifact
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ClassifierError::ModelNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let model: TrainedModel = serde_json::from_str(&content)?;
        model.validate()?;
        Ok(model)
    }

    /// Write the artifact atomically: a sibling temp file renamed into place
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ClassifierError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = std::path::PathBuf::from(tmp_name);

        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(&tmp_path, json)?;
        if let Err(e) = std::fs::rename(&tmp_path, path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }

    /// Check that weights, vocabulary and classes agree
    pub fn validate(&self) -> Result<(), ClassifierError> {
        let classes = &self.model.classes;
        if classes.is_empty() {
            return Err(ClassifierError::NoClasses);
        }

        if !self.vectorizer.is_consistent() {
            return Err(ClassifierError::ShapeMismatch(format!(
                "vocabulary has {} terms but {} idf weights",
                self.vectorizer.vocabulary.len(),
                self.vectorizer.idf.len()
            )));
        }

        if self.model.coef.len() != classes.len() || self.model.intercept.len() != classes.len() {
            return Err(ClassifierError::ShapeMismatch(format!(
                "{} classes but {} weight rows and {} intercepts",
                classes.len(),
                self.model.coef.len(),
                self.model.intercept.len()
            )));
        }

        let features = self.vectorizer.num_features();
        if let Some(row) = self.model.coef.iter().find(|row| row.len() != features) {
            return Err(ClassifierError::ShapeMismatch(format!(
                "weight row has {} features, vocabulary has {}",
                row.len(),
                features
            )));
        }

        Ok(())
    }

    /// Most probable intent label for already-normalized text
    pub fn predict(&self, normalized: &str) -> Option<(&str, f64)> {
        let row = self.vectorizer.transform(normalized);
        self.model.predict(&row)
    }

    /// Posterior per class label
    pub fn predict_proba(&self, normalized: &str) -> Vec<(&str, f64)> {
        let row = self.vectorizer.transform(normalized);
        self.model
            .classes
            .iter()
            .map(String::as_str)
            .zip(self.model.predict_proba(&row))
            .collect()
    }

    pub fn classes(&self) -> &[String] {
        &self.model.classes
    }
}
