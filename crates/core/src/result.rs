//! Structured output of a single analyzer turn

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::entity::Entity;
use crate::intent::Intent;

/// Which path produced an [`IntentResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMethod {
    /// Trained TF-IDF + logistic regression model
    Ml,
    /// Ordered keyword rules
    Rule,
    /// Small-talk short circuit
    Chitchat,
    /// Continuation of a pending slot-filling dialogue
    SlotFilling,
    /// Empty input or no confident match
    Fallback,
}

impl AnalysisMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMethod::Ml => "ml",
            AnalysisMethod::Rule => "rule",
            AnalysisMethod::Chitchat => "chitchat",
            AnalysisMethod::SlotFilling => "slot_filling",
            AnalysisMethod::Fallback => "fallback",
        }
    }
}

impl fmt::Display for AnalysisMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A required slot that is still missing, with the question that asks for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSlot {
    pub slot: String,
    pub question: String,
}

impl PendingSlot {
    pub fn new(slot: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            slot: slot.into(),
            question: question.into(),
        }
    }
}

/// Result of analyzing one utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    /// Always within [0, 1]
    pub confidence: f32,
    pub entities: Vec<Entity>,
    pub method: AnalysisMethod,
    pub needs_slot_filling: bool,
    /// Missing slots in template order
    pub pending_slots: Vec<PendingSlot>,
    pub filled_slots: BTreeMap<String, String>,
    pub conversation_complete: bool,
    /// Reply text for the chat handler
    pub response: String,
}

impl IntentResult {
    /// Build a result with no entities or slots
    pub fn new(intent: Intent, confidence: f32, method: AnalysisMethod) -> Self {
        Self {
            intent,
            confidence: clamp_confidence(confidence),
            entities: Vec::new(),
            method,
            needs_slot_filling: false,
            pending_slots: Vec::new(),
            filled_slots: BTreeMap::new(),
            conversation_complete: true,
            response: String::new(),
        }
    }

    pub fn with_entities(mut self, entities: Vec<Entity>) -> Self {
        self.entities = entities;
        self
    }

    /// Attach slot state; completion flags follow from `pending`
    pub fn with_slots(
        mut self,
        filled: BTreeMap<String, String>,
        pending: Vec<PendingSlot>,
    ) -> Self {
        self.needs_slot_filling = !pending.is_empty();
        self.conversation_complete = pending.is_empty();
        self.filled_slots = filled;
        self.pending_slots = pending;
        self
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = response.into();
        self
    }

    /// Next question to ask, if any slot is pending
    pub fn next_question(&self) -> Option<&str> {
        self.pending_slots.first().map(|p| p.question.as_str())
    }
}

/// Clamp to [0, 1], mapping NaN to 0
pub fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}
