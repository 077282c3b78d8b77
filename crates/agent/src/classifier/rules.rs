//! Keyword-rule intent classification
//!
//! Used when no trained model is available. Rules are checked in order and
//! the first one sharing a keyword with the utterance wins.

use std::collections::HashSet;

use bank_assistant_core::Intent;
use bank_assistant_text_processing::tokenize;

/// One intent and the keywords that select it
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub intent: Intent,
    pub keywords: HashSet<String>,
}

impl KeywordRule {
    pub fn new(intent: Intent, keywords: &[&str]) -> Self {
        Self {
            intent,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn matches(&self, tokens: &[&str]) -> bool {
        tokens.iter().any(|t| self.keywords.contains(*t))
    }
}

/// Ordered keyword rules with fixed confidences
#[derive(Debug, Clone)]
pub struct KeywordRules {
    rules: Vec<KeywordRule>,
    /// Reported when a rule matches
    pub rule_confidence: f32,
    /// Reported when nothing matches
    pub default_confidence: f32,
}

impl KeywordRules {
    pub fn new(rules: Vec<KeywordRule>, rule_confidence: f32, default_confidence: f32) -> Self {
        Self {
            rules,
            rule_confidence,
            default_confidence,
        }
    }

    /// The built-in banking rules
    pub fn builtin(rule_confidence: f32, default_confidence: f32) -> Self {
        let rules = vec![
            KeywordRule::new(
                Intent::LostCard,
                &["lost", "stolen", "block", "missing", "theft"],
            ),
            KeywordRule::new(Intent::TransferMoney, &["transfer", "send", "pay", "remit"]),
            KeywordRule::new(Intent::ApplyLoan, &["loan", "apply", "borrow", "emi"]),
            KeywordRule::new(
                Intent::GetBranchDetails,
                &["branch", "ifsc", "nearest", "address", "location"],
            ),
            KeywordRule::new(
                Intent::CheckBalance,
                &["balance", "money", "amount", "statement"],
            ),
            KeywordRule::new(Intent::GreetingHi, &["hello", "hi", "hey"]),
            KeywordRule::new(Intent::GreetingBye, &["bye", "goodbye"]),
        ];
        Self::new(rules, rule_confidence, default_confidence)
    }

    /// First matching rule's intent for normalized text
    pub fn classify(&self, normalized: &str) -> Option<&Intent> {
        let tokens = tokenize(normalized);
        self.rules
            .iter()
            .find(|rule| rule.matches(&tokens))
            .map(|rule| &rule.intent)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for KeywordRules {
    fn default() -> Self {
        Self::builtin(0.85, 0.6)
    }
}
