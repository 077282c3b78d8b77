//! Entity extraction for banking utterances
//!
//! Scans the raw (non-normalized) text for:
//! - Amounts, with an optional currency marker (₹, Rs, INR, rupees)
//! - Account numbers (standalone runs of 10 to 12 digits)
//! - Card types and loan types from a fixed vocabulary
//!
//! Spans are character offsets into the raw text so they survive
//! non-ASCII currency symbols.
//!
//! # Example
//!
//! ```
//! use bank_assistant_core::EntityLabel;
//! use bank_assistant_text_processing::EntityExtractor;
//!
//! let entities = EntityExtractor::new().extract("Block my debit card");
//! assert_eq!(entities[0].label, EntityLabel::CardType);
//! assert_eq!(entities[0].value, "debit card");
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use bank_assistant_core::{Entity, EntityLabel};

/// Card types recognised in text
pub const CARD_TYPES: &[&str] = &[
    "credit card",
    "debit card",
    "atm card",
    "visa",
    "mastercard",
    "rupay",
];

/// Loan types recognised in text
pub const LOAN_TYPES: &[&str] = &[
    "personal loan",
    "home loan",
    "car loan",
    "business loan",
    "education loan",
];

const ACCOUNT_MIN_DIGITS: usize = 10;
const ACCOUNT_MAX_DIGITS: usize = 12;

// Compiled regex patterns
static AMOUNT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)((?:₹|\b(?:rs|inr|rupees?)\.?)\s*)?([0-9]{1,3}(?:,[0-9]{2,3})+|[0-9]+)(?:\.([0-9]+))?")
        .unwrap()
});

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

static CARD_PATTERN: Lazy<Regex> = Lazy::new(|| vocabulary_pattern(CARD_TYPES));

static LOAN_PATTERN: Lazy<Regex> = Lazy::new(|| vocabulary_pattern(LOAN_TYPES));

/// Case-insensitive alternation over `terms`, tolerant of repeated spaces
fn vocabulary_pattern(terms: &[&str]) -> Regex {
    let alternatives: Vec<String> = terms
        .iter()
        .map(|term| {
            term.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect();
    Regex::new(&format!("(?i)(?:{})", alternatives.join("|"))).unwrap()
}

/// Lowercase and collapse whitespace so a match maps back to its vocabulary term
fn canonical_term(matched: &str) -> String {
    matched
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Byte offset → character offset
fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

/// Pattern-based entity extractor
///
/// Stateless; one instance can be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityExtractor;

impl EntityExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract all entities, ordered amounts, accounts, cards, loans
    pub fn extract(&self, text: &str) -> Vec<Entity> {
        let mut entities = self.extract_amounts(text);
        entities.extend(self.extract_account_numbers(text));
        entities.extend(self.extract_card_types(text));
        entities.extend(self.extract_loan_types(text));
        entities
    }

    /// Amounts with separators stripped; a decimal part is kept
    pub fn extract_amounts(&self, text: &str) -> Vec<Entity> {
        AMOUNT_PATTERN
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let mut value: String = caps.get(2)?.as_str().replace(',', "");
                if let Some(fraction) = caps.get(3) {
                    value.push('.');
                    value.push_str(fraction.as_str());
                }
                Some(Entity::new(
                    EntityLabel::Amount,
                    value,
                    char_offset(text, whole.start()),
                    char_offset(text, whole.end()),
                ))
            })
            .collect()
    }

    /// Maximal digit runs of 10 to 12 digits
    pub fn extract_account_numbers(&self, text: &str) -> Vec<Entity> {
        DIGIT_RUN
            .find_iter(text)
            .filter(|m| (ACCOUNT_MIN_DIGITS..=ACCOUNT_MAX_DIGITS).contains(&m.as_str().len()))
            .map(|m| {
                Entity::new(
                    EntityLabel::AccountNumber,
                    m.as_str(),
                    char_offset(text, m.start()),
                    char_offset(text, m.end()),
                )
            })
            .collect()
    }

    pub fn extract_card_types(&self, text: &str) -> Vec<Entity> {
        Self::extract_vocabulary(&CARD_PATTERN, EntityLabel::CardType, text)
    }

    pub fn extract_loan_types(&self, text: &str) -> Vec<Entity> {
        Self::extract_vocabulary(&LOAN_PATTERN, EntityLabel::LoanType, text)
    }

    fn extract_vocabulary(pattern: &Regex, label: EntityLabel, text: &str) -> Vec<Entity> {
        pattern
            .find_iter(text)
            .map(|m| {
                Entity::new(
                    label,
                    canonical_term(m.as_str()),
                    char_offset(text, m.start()),
                    char_offset(text, m.end()),
                )
            })
            .collect()
    }
}
