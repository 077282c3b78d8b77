//! Per-session conversation state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::intent::Intent;
use crate::result::PendingSlot;

/// Conversation state for one session.
///
/// `pending_slots` always equals the required slots of `last_intent` minus
/// the keys of `filled_slots`, in template order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub last_intent: Option<Intent>,
    pub filled_slots: BTreeMap<String, String>,
    pub pending_slots: Vec<PendingSlot>,
    pub last_update: DateTime<Utc>,
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self {
            last_intent: None,
            filled_slots: BTreeMap::new(),
            pending_slots: Vec::new(),
            last_update: Utc::now(),
        }
    }
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a slot-filling dialogue is in progress
    pub fn has_pending_slots(&self) -> bool {
        !self.pending_slots.is_empty()
    }

    /// Seconds since the last update, relative to `now`
    pub fn idle_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_update).num_seconds()
    }

    pub fn touch(&mut self) {
        self.last_update = Utc::now();
    }
}
