//! Built-in slot templates
//!
//! Each banking intent that needs extra information declares its required
//! slots in the order they are asked for, with one question per slot.
//! Intents without a template need nothing further.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use bank_assistant_core::Intent;

/// Required slots of one intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotTemplate {
    /// Slots in asking order
    pub required_slots: Vec<String>,
    pub slot_questions: HashMap<String, String>,
}

impl SlotTemplate {
    /// Build from `(slot, question)` pairs in asking order
    pub fn new(slots: &[(&str, &str)]) -> Self {
        Self {
            required_slots: slots.iter().map(|(s, _)| s.to_string()).collect(),
            slot_questions: slots
                .iter()
                .map(|(s, q)| (s.to_string(), q.to_string()))
                .collect(),
        }
    }

    pub fn question(&self, slot: &str) -> Option<&str> {
        self.slot_questions.get(slot).map(String::as_str)
    }
}

/// Slot templates keyed by intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTemplates {
    templates: HashMap<Intent, SlotTemplate>,
}

impl SlotTemplates {
    /// The built-in templates
    pub fn builtin() -> Self {
        let mut templates = HashMap::new();

        templates.insert(
            Intent::TransferMoney,
            SlotTemplate::new(&[
                ("amount", "How much money would you like to transfer?"),
                (
                    "recipient",
                    "Who should receive the money? \
                     Please share the recipient's account number or name.",
                ),
            ]),
        );

        templates.insert(
            Intent::ApplyLoan,
            SlotTemplate::new(&[
                (
                    "loan_type",
                    "Which type of loan are you interested in? \
                     We offer personal, home, car, business and education loans.",
                ),
                ("amount", "How much would you like to borrow?"),
            ]),
        );

        templates.insert(
            Intent::LostCard,
            SlotTemplate::new(&[(
                "card_type",
                "Which card did you lose? For example your credit card, debit card or ATM card.",
            )]),
        );

        Self { templates }
    }

    pub fn get(&self, intent: &Intent) -> Option<&SlotTemplate> {
        self.templates.get(intent)
    }

    /// Required slots for `intent`; empty when it has no template
    pub fn required_slots(&self, intent: &Intent) -> &[String] {
        self.templates
            .get(intent)
            .map(|t| t.required_slots.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for SlotTemplates {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let templates = SlotTemplates::builtin();
        assert_eq!(
            templates.required_slots(&Intent::TransferMoney),
            &["amount".to_string(), "recipient".to_string()]
        );
        assert_eq!(
            templates.required_slots(&Intent::ApplyLoan),
            &["loan_type".to_string(), "amount".to_string()]
        );
    }

    #[test]
    fn test_every_required_slot_has_a_question() {
        let templates = SlotTemplates::builtin();
        for intent in [Intent::TransferMoney, Intent::ApplyLoan, Intent::LostCard] {
            let template = templates.get(&intent).unwrap();
            for slot in &template.required_slots {
                assert!(template.question(slot).is_some(), "{} / {}", intent, slot);
            }
        }
    }

    #[test]
    fn test_intent_without_template_has_no_slots() {
        let templates = SlotTemplates::builtin();
        assert!(templates.required_slots(&Intent::CheckBalance).is_empty());
        assert!(templates.get(&Intent::Fallback).is_none());
    }
}
