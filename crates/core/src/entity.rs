//! Typed entity spans extracted from raw utterances

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityLabel {
    Amount,
    AccountNumber,
    CardType,
    LoanType,
}

impl EntityLabel {
    /// Slot an entity of this label fills during slot filling
    pub fn slot_name(&self) -> &'static str {
        match self {
            EntityLabel::Amount => "amount",
            EntityLabel::AccountNumber => "recipient",
            EntityLabel::CardType => "card_type",
            EntityLabel::LoanType => "loan_type",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLabel::Amount => "AMOUNT",
            EntityLabel::AccountNumber => "ACCOUNT_NUMBER",
            EntityLabel::CardType => "CARD_TYPE",
            EntityLabel::LoanType => "LOAN_TYPE",
        }
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity located in the raw (non-normalized) text.
///
/// `start` and `end` are character offsets, `end` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub label: EntityLabel,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

impl Entity {
    pub fn new(label: EntityLabel, value: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            label,
            value: value.into(),
            start,
            end,
        }
    }

    /// Whether both entities cover the same characters
    pub fn same_span(&self, other: &Entity) -> bool {
        self.start == other.start && self.end == other.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_serializes_screaming_snake() {
        let entity = Entity::new(EntityLabel::AccountNumber, "1234567890", 3, 13);
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["label"], "ACCOUNT_NUMBER");
        assert_eq!(json["start"], 3);
    }

    #[test]
    fn test_slot_mapping() {
        assert_eq!(EntityLabel::Amount.slot_name(), "amount");
        assert_eq!(EntityLabel::AccountNumber.slot_name(), "recipient");
        assert_eq!(EntityLabel::CardType.slot_name(), "card_type");
        assert_eq!(EntityLabel::LoanType.slot_name(), "loan_type");
    }
}
