//! Conversation context store
//!
//! Per-session [`ConversationContext`] keyed by session id. Each session
//! sits behind its own mutex, held for a whole analyzer turn, so turns of
//! one session are serialized while different sessions never wait on each
//! other.
//!
//! Eviction:
//! - contexts idle for longer than the TTL are reset on access and removed
//!   by [`ConversationContextStore::evict_expired`]
//! - creating a session at `max_sessions` evicts least recently updated
//!   sessions until there is room
//!
//! `max_sessions` is a soft cap: sessions locked by an in-flight turn are
//! never evicted, and concurrent creations may briefly overshoot it.

use chrono::{Duration, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

use bank_assistant_config::SessionConfig;
use bank_assistant_core::{ConversationContext, Intent, PendingSlot};

type SessionSlot = Arc<Mutex<ConversationContext>>;

/// Upper bound accepted by `chrono::Duration::seconds`
const MAX_TTL_SECONDS: u64 = i64::MAX as u64 / 1000;

/// Session-scoped conversation state with TTL and capacity eviction
#[derive(Debug)]
pub struct ConversationContextStore {
    sessions: DashMap<String, SessionSlot>,
    ttl: Duration,
    max_sessions: usize,
}

impl ConversationContextStore {
    pub fn new(ttl_seconds: u64, max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: Duration::seconds(ttl_seconds.min(MAX_TTL_SECONDS) as i64),
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.ttl_seconds, config.max_sessions)
    }

    /// Run `f` on the session's context with the session locked.
    ///
    /// The context is created on first use and reset when it has expired.
    /// Its `last_update` is refreshed before `f` runs.
    pub fn with_session<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut ConversationContext) -> R,
    ) -> R {
        loop {
            let slot = self.slot(session_id);
            let mut context = slot.lock();

            // Evicted between lookup and lock: retry against the live entry
            let current = self
                .sessions
                .get(session_id)
                .map(|entry| Arc::ptr_eq(entry.value(), &slot))
                .unwrap_or(false);
            if !current {
                continue;
            }

            if self.is_expired(&context) {
                tracing::debug!(
                    session_id = %session_id,
                    "Conversation context expired, resetting"
                );
                *context = ConversationContext::new();
            }
            context.touch();
            return f(&mut context);
        }
    }

    /// Snapshot of a session's context, creating an empty one if absent
    pub fn get(&self, session_id: &str) -> ConversationContext {
        self.with_session(session_id, |context| context.clone())
    }

    /// Snapshot without creating; `None` for unknown or expired sessions
    pub fn peek(&self, session_id: &str) -> Option<ConversationContext> {
        let slot = self.sessions.get(session_id).map(|e| Arc::clone(e.value()))?;
        let context = slot.lock();
        if self.is_expired(&context) {
            None
        } else {
            Some(context.clone())
        }
    }

    /// Replace a session's intent and slot state
    pub fn update(
        &self,
        session_id: &str,
        intent: Intent,
        filled_slots: BTreeMap<String, String>,
        pending_slots: Vec<PendingSlot>,
    ) {
        self.with_session(session_id, |context| {
            context.last_intent = Some(intent);
            context.filled_slots = filled_slots;
            context.pending_slots = pending_slots;
        });
    }

    /// Drop a session's context; returns whether it existed
    pub fn clear(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            tracing::debug!(session_id = %session_id, "Cleared conversation context");
        }
        removed
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Remove every expired context; returns how many were removed.
    /// Sessions locked by an in-flight turn are kept.
    pub fn evict_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, slot| match slot.try_lock() {
            Some(context) => !self.is_expired(&context),
            None => true,
        });
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::info!(
                removed,
                remaining = self.sessions.len(),
                "Evicted expired conversation contexts"
            );
        }
        removed
    }

    fn is_expired(&self, context: &ConversationContext) -> bool {
        Utc::now() - context.last_update > self.ttl
    }

    /// Existing slot, or a new one after making room
    fn slot(&self, session_id: &str) -> SessionSlot {
        if let Some(entry) = self.sessions.get(session_id) {
            return Arc::clone(entry.value());
        }

        while self.sessions.len() >= self.max_sessions {
            if !self.evict_least_recent() {
                break;
            }
        }

        Arc::clone(
            self.sessions
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(ConversationContext::new())))
                .value(),
        )
    }

    /// Remove the least recently updated unlocked session; false when
    /// every session is locked
    fn evict_least_recent(&self) -> bool {
        let oldest = self
            .sessions
            .iter()
            .filter_map(|entry| {
                let last_update = entry.value().try_lock()?.last_update;
                Some((entry.key().clone(), last_update))
            })
            .min_by_key(|(_, last_update)| *last_update)
            .map(|(id, _)| id);

        match oldest {
            Some(id) => {
                self.sessions.remove(&id);
                tracing::info!(
                    session_id = %id,
                    "Evicted least recently updated conversation context"
                );
                true
            }
            None => false,
        }
    }
}

impl Default for ConversationContextStore {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}
