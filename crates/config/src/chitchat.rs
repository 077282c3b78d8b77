//! Chitchat pattern configuration
//!
//! Category → trigger phrases and canned responses. The file form is an
//! ordered list so match order is explicit:
//!
//! ```yaml
//! - category: greeting
//!   triggers: ["hi", "hello"]
//!   responses: ["Hello! How can I help you with your banking today?"]
//! ```
//!
//! When no file is configured, or the configured file cannot be read, the
//! built-in patterns are used.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use bank_assistant_core::ChitchatCategory;

use crate::ConfigError;

/// Triggers and responses of one chitchat category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChitchatPatternSet {
    pub category: ChitchatCategory,
    pub triggers: Vec<String>,
    pub responses: Vec<String>,
}

/// Ordered chitchat patterns; earlier categories win ties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChitchatPatterns {
    pub categories: Vec<ChitchatPatternSet>,
}

impl ChitchatPatterns {
    /// Load patterns from a YAML, JSON or TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;

        let patterns: ChitchatPatterns = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?,
            Some("toml") => {
                #[derive(Deserialize)]
                struct TomlPatterns {
                    categories: Vec<ChitchatPatternSet>,
                }
                let parsed: TomlPatterns =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
                ChitchatPatterns {
                    categories: parsed.categories,
                }
            }
            _ => serde_yaml::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?,
        };

        patterns.validate()?;
        Ok(patterns)
    }

    /// Load from `path` when given, falling back to the built-in patterns
    pub fn load_or_default(path: Option<&str>) -> Self {
        match path {
            Some(p) => match Self::load(p) {
                Ok(patterns) => {
                    tracing::info!(
                        path = %p,
                        categories = patterns.categories.len(),
                        "Loaded chitchat patterns"
                    );
                    patterns
                }
                Err(e) => {
                    tracing::warn!(
                        path = %p,
                        error = %e,
                        "Failed to load chitchat patterns, using built-in defaults"
                    );
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for set in &self.categories {
            if !seen.insert(set.category) {
                return Err(ConfigError::InvalidValue {
                    field: "chitchat.category".to_string(),
                    message: format!("Duplicate category: {}", set.category),
                });
            }
            if set.triggers.iter().all(|t| t.trim().is_empty()) {
                return Err(ConfigError::InvalidValue {
                    field: format!("chitchat.{}.triggers", set.category),
                    message: "At least one trigger phrase is required".to_string(),
                });
            }
            if set.responses.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("chitchat.{}.responses", set.category),
                    message: "At least one response is required".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, category: ChitchatCategory) -> Option<&ChitchatPatternSet> {
        self.categories.iter().find(|s| s.category == category)
    }
}

fn set(category: ChitchatCategory, triggers: &[&str], responses: &[&str]) -> ChitchatPatternSet {
    ChitchatPatternSet {
        category,
        triggers: triggers.iter().map(|s| s.to_string()).collect(),
        responses: responses.iter().map(|s| s.to_string()).collect(),
    }
}

impl Default for ChitchatPatterns {
    fn default() -> Self {
        use ChitchatCategory::*;

        Self {
            categories: vec![
                set(
                    Greeting,
                    &[
                        "hi",
                        "hello",
                        "hey",
                        "good morning",
                        "good afternoon",
                        "good evening",
                        "namaste",
                    ],
                    &[
                        "Hello! I'm your SecureBank assistant. How can I help you today?",
                        "Hi there! What can I do for your account today?",
                        "Namaste! Ask me about balances, transfers, loans or cards.",
                    ],
                ),
                set(
                    Goodbye,
                    &["bye", "goodbye", "see you", "talk later"],
                    &[
                        "Thank you for banking with SecureBank. Have a great day!",
                        "Goodbye! I'm always here if you need help with your account.",
                    ],
                ),
                set(
                    HowAreYou,
                    &["how are you", "how r u", "how are things", "how is it going"],
                    &[
                        "I'm doing well, thanks for asking! \
                         How can I help with your banking?",
                        "All systems running smoothly. What can I do for you today?",
                    ],
                ),
                set(
                    Compliment,
                    &[
                        "thank you",
                        "thankyou",
                        "thanks",
                        "great job",
                        "awesome",
                        "well done",
                        "you are helpful",
                    ],
                    &[
                        "You're welcome! Anything else I can help you with?",
                        "Happy to help! Let me know if you need anything else.",
                    ],
                ),
                set(
                    Complaint,
                    &[
                        "not working",
                        "useless",
                        "terrible",
                        "worst",
                        "frustrated",
                        "disappointed",
                    ],
                    &[
                        "I'm sorry about the trouble. \
                         Could you tell me what went wrong so I can help?",
                        "I apologise for the inconvenience. \
                         You can also reach customer care at 1800-123-4567.",
                    ],
                ),
                set(
                    Help,
                    &["what can you do", "can you help", "help me", "need help"],
                    &[
                        "I can check your balance, transfer money, help with loan applications, \
                         block a lost card and find branches.",
                    ],
                ),
                set(
                    Name,
                    &["your name", "who are you"],
                    &[
                        "I'm the SecureBank virtual assistant, \
                         here to help with your banking needs.",
                    ],
                ),
            ],
        }
    }
}
