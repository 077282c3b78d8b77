//! Core types for the banking assistant
//!
//! This crate provides the types shared by every other crate:
//! - Banking intents and chitchat categories
//! - Typed entity spans
//! - The structured result of one analyzer turn
//! - Per-session conversation context

pub mod conversation;
pub mod entity;
pub mod intent;
pub mod result;

pub use conversation::ConversationContext;
pub use entity::{Entity, EntityLabel};
pub use intent::{ChitchatCategory, Intent};
pub use result::{clamp_confidence, AnalysisMethod, IntentResult, PendingSlot};
