//! Text processing for the banking assistant
//!
//! This crate provides the stateless text stages of query analysis:
//! - **Normalization**: lowercase, strip punctuation, mask digit runs
//! - **Entity Extraction**: amounts, account numbers, card and loan types
//! - **Chitchat Matching**: small-talk detection with canned responses
//!
//! # Example
//!
//! ```
//! use bank_assistant_text_processing::{normalize, EntityExtractor};
//!
//! assert_eq!(normalize("Transfer ₹5,000 now!"), "transfer NUM now");
//!
//! let entities = EntityExtractor::new().extract("Send ₹12,500 to 1234567890");
//! assert_eq!(entities[0].value, "12500");
//! ```

pub mod chitchat;
pub mod entities;
pub mod normalizer;

pub use chitchat::{ChitchatMatch, ChitchatMatcher};
pub use entities::EntityExtractor;
pub use normalizer::{normalize, tokenize, DIGIT_PLACEHOLDER};
