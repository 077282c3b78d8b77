//! Multi-turn analyzer scenarios against the keyword-rule classifier

use std::sync::Arc;
use std::thread;

use bank_assistant_agent::{ConversationContextStore, IntentClassifier, QueryAnalyzer};
use bank_assistant_config::ClassifierConfig;
use bank_assistant_core::{AnalysisMethod, ChitchatCategory, EntityLabel, Intent};
use bank_assistant_text_processing::ChitchatMatcher;

fn analyzer() -> QueryAnalyzer {
    QueryAnalyzer::new(
        IntentClassifier::rules(&ClassifierConfig::default()),
        ChitchatMatcher::builtin(true),
        Arc::new(ConversationContextStore::new(1800, 1000)),
    )
}

fn pending(result: &bank_assistant_core::IntentResult) -> Vec<&str> {
    result.pending_slots.iter().map(|p| p.slot.as_str()).collect()
}

#[test]
fn test_transfer_converges_over_three_turns() {
    let analyzer = analyzer();

    let first = analyzer.analyze("transfer money", Some("s1"));
    assert_eq!(first.intent, Intent::TransferMoney);
    assert_eq!(first.method, AnalysisMethod::Rule);
    assert_eq!(pending(&first), vec!["amount", "recipient"]);
    assert!(first.needs_slot_filling);
    assert!(!first.conversation_complete);
    assert_eq!(first.response, first.pending_slots[0].question);

    let second = analyzer.analyze("5000", Some("s1"));
    assert_eq!(second.intent, Intent::TransferMoney);
    assert_eq!(second.method, AnalysisMethod::SlotFilling);
    assert_eq!(second.confidence, 0.9);
    assert_eq!(second.filled_slots["amount"], "5000");
    assert_eq!(pending(&second), vec!["recipient"]);

    let third = analyzer.analyze("9876543210", Some("s1"));
    assert_eq!(third.method, AnalysisMethod::SlotFilling);
    assert_eq!(third.filled_slots["amount"], "5000");
    assert_eq!(third.filled_slots["recipient"], "9876543210");
    assert!(third.pending_slots.is_empty());
    assert!(third.conversation_complete);
    assert!(third.response.contains("₹5000"));
    assert!(third.response.contains("to account 9876543210"));

    let context = analyzer.contexts().peek("s1").unwrap();
    assert_eq!(context.last_intent, Some(Intent::TransferMoney));
    assert!(!context.has_pending_slots());
}

#[test]
fn test_repeating_completed_intent_starts_fresh() {
    let analyzer = analyzer();
    analyzer.analyze("transfer money", Some("s1"));
    analyzer.analyze("5000", Some("s1"));
    let done = analyzer.analyze("9876543210", Some("s1"));
    assert!(done.conversation_complete);

    let again = analyzer.analyze("I want to transfer money", Some("s1"));
    assert_eq!(again.intent, Intent::TransferMoney);
    assert_eq!(again.method, AnalysisMethod::Rule);
    assert!(again.filled_slots.is_empty());
    assert_eq!(pending(&again), vec!["amount", "recipient"]);
    assert!(again.needs_slot_filling);
    assert_eq!(again.response, again.pending_slots[0].question);
}

#[test]
fn test_lost_card_completes_in_one_turn() {
    let result = analyzer().analyze("I lost my credit card", Some("s1"));

    assert_eq!(result.intent, Intent::LostCard);
    assert!(result.pending_slots.is_empty());
    assert_eq!(result.filled_slots["card_type"], "credit card");
    assert!(result.conversation_complete);
}

#[test]
fn test_loan_application_asks_for_type_then_amount() {
    let analyzer = analyzer();

    let first = analyzer.analyze("Apply for a loan", Some("s2"));
    assert_eq!(first.intent, Intent::ApplyLoan);
    assert_eq!(pending(&first), vec!["loan_type", "amount"]);

    let second = analyzer.analyze("a home loan please", Some("s2"));
    assert_eq!(second.filled_slots["loan_type"], "home loan");
    assert_eq!(pending(&second), vec!["amount"]);

    let third = analyzer.analyze("Rs. 25,00,000", Some("s2"));
    assert_eq!(third.filled_slots["amount"], "2500000");
    assert!(third.conversation_complete);
    assert!(third.response.contains("home loan application"));
}

#[test]
fn test_free_text_recipient() {
    let analyzer = analyzer();
    analyzer.analyze("send 500", Some("s3"));

    let result = analyzer.analyze("  my brother Ravi ", Some("s3"));
    assert_eq!(result.filled_slots["recipient"], "my brother Ravi");
    assert!(result.conversation_complete);
    assert!(result.response.contains("to my brother Ravi"));
}

#[test]
fn test_chitchat_takes_precedence() {
    let analyzer = analyzer();

    let result = analyzer.analyze("hello, transfer 500 to 9876543210", Some("s4"));
    assert_eq!(result.intent, Intent::Chitchat(ChitchatCategory::Greeting));
    assert_eq!(result.method, AnalysisMethod::Chitchat);
    assert!(result.entities.is_empty());
    assert!(result.filled_slots.is_empty());

    let context = analyzer.contexts().peek("s4").unwrap();
    assert!(context.last_intent.is_none());
}

#[test]
fn test_new_intent_supersedes_completed_one() {
    let analyzer = analyzer();
    analyzer.analyze("I lost my debit card", Some("s5"));

    let result = analyzer.analyze("transfer 200", Some("s5"));
    assert_eq!(result.intent, Intent::TransferMoney);
    assert!(!result.filled_slots.contains_key("card_type"));
    assert_eq!(result.filled_slots["amount"], "200");
    assert_eq!(pending(&result), vec!["recipient"]);
}

#[test]
fn test_stateless_calls_are_idempotent() {
    let analyzer = analyzer();
    for query in [
        "transfer money",
        "I lost my credit card",
        "what's my balance",
        "good morning",
        "blah blah",
        "",
    ] {
        let first = analyzer.analyze(query, None);
        let second = analyzer.analyze(query, None);
        assert_eq!(first, second, "query {query:?}");
    }
    assert!(analyzer.contexts().is_empty());
}

#[test]
fn test_confidence_always_in_unit_interval() {
    let analyzer = analyzer();
    for query in [
        "",
        "   ",
        "hi",
        "transfer ₹1,000.50 to 123456789012",
        "where is the nearest branch",
        "???",
        "apply for a car loan of 5 lakh",
        "bye",
    ] {
        let result = analyzer.analyze(query, Some("bounds"));
        assert!(
            (0.0..=1.0).contains(&result.confidence),
            "query {query:?} gave {}",
            result.confidence
        );
    }
}

#[test]
fn test_entity_offsets_are_char_based() {
    let result = analyzer().analyze("send ₹500 now", None);
    let amount = result
        .entities
        .iter()
        .find(|e| e.label == EntityLabel::Amount)
        .unwrap();

    assert_eq!(amount.value, "500");
    assert_eq!((amount.start, amount.end), (5, 9));
}

#[test]
fn test_concurrent_sessions_do_not_interfere() {
    let analyzer = Arc::new(analyzer());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let analyzer = Arc::clone(&analyzer);
            thread::spawn(move || {
                let session = format!("user-{i}");
                let amount = format!("{}", 100 * (i + 1));
                let account = format!("98765432{:02}", i);

                analyzer.analyze("transfer money", Some(&session));
                analyzer.analyze(&amount, Some(&session));
                let done = analyzer.analyze(&account, Some(&session));

                assert_eq!(done.filled_slots["amount"], amount);
                assert_eq!(done.filled_slots["recipient"], account);
                assert!(done.conversation_complete);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(analyzer.contexts().len(), 8);
}

#[test]
fn test_clear_context_restarts_dialogue() {
    let analyzer = analyzer();
    analyzer.analyze("transfer money", Some("s6"));
    assert!(analyzer.clear_context("s6"));

    let result = analyzer.analyze("5000", Some("s6"));
    assert_ne!(result.method, AnalysisMethod::SlotFilling);
    assert_eq!(result.intent, Intent::Fallback);
}
