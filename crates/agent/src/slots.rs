//! Slot filling
//!
//! Decides which required slots of an intent are still missing and merges
//! extracted entities into the filled slots. Slot order comes from the
//! intent's template, so the first pending slot is always the earliest
//! declared one.

use std::collections::{BTreeMap, HashSet};

use bank_assistant_config::SlotTemplates;
use bank_assistant_core::{Entity, EntityLabel, Intent, PendingSlot};

/// Slot state after one turn
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SlotTurn {
    pub filled: BTreeMap<String, String>,
    pub pending: Vec<PendingSlot>,
}

/// Template-driven slot-filling engine
#[derive(Debug, Clone, Default)]
pub struct SlotFillingEngine {
    templates: SlotTemplates,
}

impl SlotFillingEngine {
    pub fn new(templates: SlotTemplates) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &SlotTemplates {
        &self.templates
    }

    /// Required slots of `intent` that are absent or empty in `filled`, in
    /// template order, each with its question
    pub fn check_slots(
        &self,
        intent: &Intent,
        filled: &BTreeMap<String, String>,
    ) -> Vec<PendingSlot> {
        let Some(template) = self.templates.get(intent) else {
            return Vec::new();
        };

        template
            .required_slots
            .iter()
            .filter(|slot| filled.get(*slot).map_or(true, |v| v.trim().is_empty()))
            .map(|slot| PendingSlot::new(slot.clone(), template.question(slot).unwrap_or_default()))
            .collect()
    }

    /// Merge entities into `filled`: one value per slot per turn, the first
    /// entity in scan order winning. Returns the slots written.
    pub fn merge_entities(
        &self,
        filled: &mut BTreeMap<String, String>,
        entities: &[Entity],
    ) -> Vec<String> {
        let mut written = Vec::new();
        let mut seen = HashSet::new();

        for entity in slot_candidates(entities) {
            let slot = entity.label.slot_name();
            if seen.insert(slot) {
                filled.insert(slot.to_string(), entity.value.clone());
                written.push(slot.to_string());
            }
        }
        written
    }

    /// Apply one continuation turn.
    ///
    /// Entities are merged by label. When the reply yields no entities at
    /// all, the trimmed reply itself answers the earliest pending slot.
    pub fn apply_turn(
        &self,
        intent: &Intent,
        mut filled: BTreeMap<String, String>,
        entities: &[Entity],
        raw_text: &str,
    ) -> SlotTurn {
        if entities.is_empty() {
            let answer = raw_text.trim();
            if let Some(first) = self.check_slots(intent, &filled).into_iter().next() {
                if !answer.is_empty() {
                    filled.insert(first.slot, answer.to_string());
                }
            }
        } else {
            self.merge_entities(&mut filled, entities);
        }

        let pending = self.check_slots(intent, &filled);
        SlotTurn { filled, pending }
    }
}

/// Entities usable for slot merging.
///
/// An amount covering exactly the span of an account number is the account
/// number read as a bare number; it is reported but fills no slot.
fn slot_candidates(entities: &[Entity]) -> impl Iterator<Item = &Entity> {
    entities.iter().filter(move |entity| {
        entity.label != EntityLabel::Amount
            || !entities
                .iter()
                .any(|other| other.label == EntityLabel::AccountNumber && other.same_span(entity))
    })
}
