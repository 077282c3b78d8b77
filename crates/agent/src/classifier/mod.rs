//! Intent classification
//!
//! Two capabilities, chosen once at startup:
//! - [`IntentClassifier::Ml`]: TF-IDF features + logistic regression
//! - [`IntentClassifier::Rules`]: ordered keyword rules
//!
//! A model that is missing or fails to load selects the rule backend for
//! the lifetime of the process. Classification itself never fails.

pub mod logistic;
pub mod model;
pub mod rules;
pub mod tfidf;

pub use logistic::{LogisticConfig, LogisticRegression};
pub use model::{ModelMetadata, TrainedModel};
pub use rules::{KeywordRule, KeywordRules};
pub use tfidf::{SparseVector, TfidfVectorizer};

use bank_assistant_config::ClassifierConfig;
use bank_assistant_core::{clamp_confidence, AnalysisMethod, Intent};

/// Outcome of classifying one utterance
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub intent: Intent,
    pub confidence: f32,
    pub method: AnalysisMethod,
}

/// Intent classifier backend
#[derive(Debug, Clone)]
pub enum IntentClassifier {
    Ml {
        model: Box<TrainedModel>,
        /// Predictions below this posterior become fallback
        min_confidence: f32,
    },
    Rules(KeywordRules),
}

impl IntentClassifier {
    /// Load the configured model, or fall back to keyword rules
    pub fn from_config(config: &ClassifierConfig) -> Self {
        match TrainedModel::load(&config.model_path) {
            Ok(model) => {
                tracing::info!(
                    path = %config.model_path,
                    classes = ?model.classes(),
                    accuracy = model.metadata.accuracy,
                    "Loaded intent model"
                );
                Self::ml(model, config.min_confidence)
            }
            Err(e) => {
                tracing::warn!(
                    path = %config.model_path,
                    error = %e,
                    "Intent model unavailable, using keyword rules"
                );
                Self::rules(config)
            }
        }
    }

    pub fn ml(model: TrainedModel, min_confidence: f32) -> Self {
        Self::Ml {
            model: Box::new(model),
            min_confidence,
        }
    }

    /// Rule backend with the configured confidences
    pub fn rules(config: &ClassifierConfig) -> Self {
        Self::Rules(KeywordRules::builtin(
            config.rule_confidence,
            config.rule_default_confidence,
        ))
    }

    /// Classify normalized text
    pub fn classify(&self, normalized: &str) -> Classification {
        match self {
            Self::Ml {
                model,
                min_confidence,
            } => match model.predict(normalized) {
                Some((label, posterior)) => {
                    let confidence = clamp_confidence(posterior as f32);
                    if confidence < *min_confidence {
                        Classification {
                            intent: Intent::Fallback,
                            confidence,
                            method: AnalysisMethod::Fallback,
                        }
                    } else {
                        Classification {
                            intent: Intent::from(label),
                            confidence,
                            method: AnalysisMethod::Ml,
                        }
                    }
                }
                None => Classification {
                    intent: Intent::Fallback,
                    confidence: 0.0,
                    method: AnalysisMethod::Fallback,
                },
            },
            Self::Rules(rules) => match rules.classify(normalized) {
                Some(intent) => Classification {
                    intent: intent.clone(),
                    confidence: clamp_confidence(rules.rule_confidence),
                    method: AnalysisMethod::Rule,
                },
                None => Classification {
                    intent: Intent::Fallback,
                    confidence: clamp_confidence(rules.default_confidence),
                    method: AnalysisMethod::Fallback,
                },
            },
        }
    }

    pub fn is_ml(&self) -> bool {
        matches!(self, Self::Ml { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bank_assistant_text_processing::normalize;

    #[test]
    fn test_missing_model_selects_rules() {
        let config = ClassifierConfig {
            model_path: "/nonexistent/intent_model.json".to_string(),
            ..Default::default()
        };
        let classifier = IntentClassifier::from_config(&config);
        assert!(!classifier.is_ml());
    }

    #[test]
    fn test_rule_confidences() {
        let classifier = IntentClassifier::rules(&ClassifierConfig::default());

        let hit = classifier.classify(&normalize("Apply for a loan"));
        assert_eq!(hit.intent, Intent::ApplyLoan);
        assert_eq!(hit.confidence, 0.85);
        assert_eq!(hit.method, AnalysisMethod::Rule);

        let miss = classifier.classify(&normalize("tell me a joke"));
        assert_eq!(miss.intent, Intent::Fallback);
        assert_eq!(miss.confidence, 0.6);
        assert_eq!(miss.method, AnalysisMethod::Fallback);
    }

    #[test]
    fn test_rules_are_pure() {
        let classifier = IntentClassifier::rules(&ClassifierConfig::default());
        let text = normalize("send 500 to 1234567890");
        assert_eq!(classifier.classify(&text), classifier.classify(&text));
    }

    fn trained() -> TrainedModel {
        use std::collections::BTreeMap;

        let docs: Vec<String> = [
            "check my balance",
            "what is my account balance",
            "transfer NUM to my friend",
            "send money",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let labels: Vec<String> = [
            "check_balance",
            "check_balance",
            "transfer_money",
            "transfer_money",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let vectorizer = TfidfVectorizer::fit(&docs, 5000);
        let x = vectorizer.transform_all(&docs);
        let model = LogisticRegression::fit(
            &x,
            &labels,
            vectorizer.num_features(),
            LogisticConfig::default(),
        );
        TrainedModel {
            metadata: ModelMetadata {
                classes: model.classes.clone(),
                accuracy: 1.0,
                total_samples: 4,
                intent_counts: BTreeMap::new(),
                trained_at: chrono::Utc::now(),
            },
            vectorizer,
            model,
        }
    }

    #[test]
    fn test_ml_prediction() {
        let classifier = IntentClassifier::ml(trained(), 0.3);
        let result = classifier.classify(&normalize("Check balance"));

        assert_eq!(result.intent, Intent::CheckBalance);
        assert_eq!(result.method, AnalysisMethod::Ml);
        assert!((0.5..=1.0).contains(&result.confidence));
    }

    #[test]
    fn test_ml_low_confidence_is_fallback() {
        // Two classes never reach a posterior of 0.99 on unseen text
        let classifier = IntentClassifier::ml(trained(), 0.99);
        let result = classifier.classify(&normalize("something else entirely"));

        assert_eq!(result.intent, Intent::Fallback);
        assert_eq!(result.method, AnalysisMethod::Fallback);
        assert!(result.confidence < 0.99);
    }
}
