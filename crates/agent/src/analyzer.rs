//! Query analyzer
//!
//! Composes chitchat matching, intent classification, entity extraction,
//! slot filling and the conversation context store into one entry point.
//! Each turn is evaluated in order, first match wins:
//!
//! 1. Blank input: low-confidence fallback, context untouched
//! 2. Chitchat: canned response, no classification
//! 3. Slot-filling continuation: the session has pending slots
//! 4. Fresh classification: classify, extract, fill slots from this turn
//!    only, persist
//!
//! Calls without a session id are stateless and never touch the store.

use std::collections::BTreeMap;
use std::sync::Arc;

use bank_assistant_config::{ChitchatPatterns, Settings};
use bank_assistant_core::{AnalysisMethod, ConversationContext, Intent, IntentResult};
use bank_assistant_text_processing::{normalize, ChitchatMatcher, EntityExtractor};

use crate::classifier::IntentClassifier;
use crate::context::ConversationContextStore;
use crate::responder::{Responder, CLARIFY_PROMPT};
use crate::slots::SlotFillingEngine;

/// Confidence reported for slot-filling continuation turns
pub const SLOT_FILLING_CONFIDENCE: f32 = 0.9;

const DEFAULT_CHITCHAT_CONFIDENCE: f32 = 0.95;

/// Shared, thread-safe analyzer
pub struct QueryAnalyzer {
    classifier: IntentClassifier,
    extractor: EntityExtractor,
    chitchat: ChitchatMatcher,
    chitchat_confidence: f32,
    slots: SlotFillingEngine,
    contexts: Arc<ConversationContextStore>,
    responder: Responder,
}

impl QueryAnalyzer {
    pub fn new(
        classifier: IntentClassifier,
        chitchat: ChitchatMatcher,
        contexts: Arc<ConversationContextStore>,
    ) -> Self {
        Self {
            classifier,
            extractor: EntityExtractor::new(),
            chitchat,
            chitchat_confidence: DEFAULT_CHITCHAT_CONFIDENCE,
            slots: SlotFillingEngine::default(),
            contexts,
            responder: Responder::new(),
        }
    }

    /// Build every component from settings. A missing or invalid model
    /// selects the keyword-rule classifier.
    pub fn from_settings(settings: &Settings) -> Self {
        let classifier = IntentClassifier::from_config(&settings.classifier);
        let patterns =
            ChitchatPatterns::load_or_default(settings.chitchat.patterns_path.as_deref());
        let chitchat = ChitchatMatcher::new(&patterns, settings.chitchat.deterministic);
        let contexts = Arc::new(ConversationContextStore::from_config(&settings.sessions));

        tracing::info!(
            ml_enabled = classifier.is_ml(),
            chitchat_categories = chitchat.category_count(),
            ttl_seconds = settings.sessions.ttl_seconds,
            max_sessions = settings.sessions.max_sessions,
            "Query analyzer initialized"
        );

        Self::new(classifier, chitchat, contexts)
            .with_chitchat_confidence(settings.chitchat.confidence)
    }

    pub fn with_chitchat_confidence(mut self, confidence: f32) -> Self {
        self.chitchat_confidence = confidence;
        self
    }

    /// Analyze one utterance. Never fails.
    pub fn analyze(&self, query: &str, session_id: Option<&str>) -> IntentResult {
        if query.trim().is_empty() {
            return IntentResult::new(Intent::Fallback, 0.0, AnalysisMethod::Fallback)
                .with_response(CLARIFY_PROMPT);
        }

        if let Some(matched) = self.chitchat.match_chitchat(query) {
            if let Some(id) = session_id {
                // Keeps an in-progress dialogue alive without changing it
                self.contexts.with_session(id, |_| ());
            }
            tracing::debug!(category = %matched.category, "Chitchat matched");
            return IntentResult::new(
                Intent::Chitchat(matched.category),
                self.chitchat_confidence,
                AnalysisMethod::Chitchat,
            )
            .with_response(matched.response);
        }

        let result = match session_id {
            Some(id) => self.contexts.with_session(id, |context| {
                if context.has_pending_slots() {
                    self.continue_slot_filling(query, context)
                } else {
                    self.classify_turn(query, Some(context))
                }
            }),
            None => self.classify_turn(query, None),
        };

        tracing::debug!(
            session_id = session_id.unwrap_or("-"),
            method = %result.method,
            intent = %result.intent,
            confidence = result.confidence,
            pending = result.pending_slots.len(),
            "Analyzed query"
        );

        result
    }

    /// Answer to a pending slot question
    fn continue_slot_filling(
        &self,
        query: &str,
        context: &mut ConversationContext,
    ) -> IntentResult {
        let intent = context.last_intent.clone().unwrap_or(Intent::Fallback);
        let entities = self.extractor.extract(query);
        let turn = self
            .slots
            .apply_turn(&intent, context.filled_slots.clone(), &entities, query);

        context.filled_slots = turn.filled.clone();
        context.pending_slots = turn.pending.clone();

        self.finish(
            IntentResult::new(intent, SLOT_FILLING_CONFIDENCE, AnalysisMethod::SlotFilling)
                .with_entities(entities)
                .with_slots(turn.filled, turn.pending),
        )
    }

    /// Classify, extract and fill slots; persist when a context is given
    fn classify_turn(
        &self,
        query: &str,
        context: Option<&mut ConversationContext>,
    ) -> IntentResult {
        let classification = self.classifier.classify(&normalize(query));
        let entities = self.extractor.extract(query);
        let intent = classification.intent;

        let mut filled = BTreeMap::new();
        if intent != Intent::Fallback {
            self.slots.merge_entities(&mut filled, &entities);
        }
        let pending = self.slots.check_slots(&intent, &filled);

        if let Some(ctx) = context {
            ctx.last_intent = Some(intent.clone());
            ctx.filled_slots = filled.clone();
            ctx.pending_slots = pending.clone();
        }

        self.finish(
            IntentResult::new(intent, classification.confidence, classification.method)
                .with_entities(entities)
                .with_slots(filled, pending),
        )
    }

    fn finish(&self, result: IntentResult) -> IntentResult {
        let response = self.responder.respond_to(&result);
        result.with_response(response)
    }

    /// Drop a session's context; returns whether it existed
    pub fn clear_context(&self, session_id: &str) -> bool {
        self.contexts.clear(session_id)
    }

    pub fn contexts(&self) -> &Arc<ConversationContextStore> {
        &self.contexts
    }

    pub fn is_ml(&self) -> bool {
        self.classifier.is_ml()
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }
}
