//! Canned reply text per intent

use std::collections::BTreeMap;

use bank_assistant_core::{Entity, EntityLabel, Intent, IntentResult};

const LOAN_OFFERS: &str = "Based on your profile, you're eligible for:\n\
    - Personal Loan: Up to ₹5,00,000 @ 10.5%\n\
    - Home Loan: Up to ₹25,00,000 @ 8.5%\n\
    - Car Loan: Up to ₹8,00,000 @ 9.5%";

const CAPABILITIES: &str = "I can help with:\n\
    - Balance inquiries\n\
    - Money transfers\n\
    - Loan applications\n\
    - Card services\n\
    - Branch information";

/// Prompt for blank input and unrecognized requests
pub const CLARIFY_PROMPT: &str = "I'm not sure I understood that. Could you rephrase? \
    I can help with balance inquiries, money transfers, loan applications, \
    card services and branch information.";

/// Builds reply text for analyzed turns
#[derive(Debug, Clone, Copy, Default)]
pub struct Responder;

impl Responder {
    pub fn new() -> Self {
        Self
    }

    /// Reply for a result: the next slot question while slots are pending,
    /// otherwise the intent's own reply
    pub fn respond_to(&self, result: &IntentResult) -> String {
        match result.next_question() {
            Some(question) => question.to_string(),
            None => self.respond(&result.intent, &result.filled_slots, &result.entities),
        }
    }

    /// Reply for a completed intent. Slot values take precedence over
    /// entities of the current turn.
    pub fn respond(
        &self,
        intent: &Intent,
        filled: &BTreeMap<String, String>,
        entities: &[Entity],
    ) -> String {
        let value = |slot: &str, label: EntityLabel| {
            filled
                .get(slot)
                .filter(|v| !v.trim().is_empty())
                .cloned()
                .or_else(|| first_value(entities, label))
        };

        match intent {
            Intent::CheckBalance => "I'd be happy to help you check your balance. \
                For your security, please verify your identity with customer service \
                to see account details."
                .to_string(),

            Intent::TransferMoney => {
                let mut line = "I can help you transfer money".to_string();
                if let Some(amount) = value("amount", EntityLabel::Amount) {
                    line.push_str(&format!(" of ₹{}", amount));
                }
                if let Some(recipient) = value("recipient", EntityLabel::AccountNumber) {
                    if recipient.chars().all(|c| c.is_ascii_digit()) {
                        line.push_str(&format!(" to account {}", recipient));
                    } else {
                        line.push_str(&format!(" to {}", recipient));
                    }
                }
                format!(
                    "{}.\n\nFor security, I'll need to verify the recipient details \
                     before the transfer is made.",
                    line
                )
            }

            Intent::ApplyLoan => {
                let loan_type = value("loan_type", EntityLabel::LoanType);
                let amount = value("amount", EntityLabel::Amount);
                let opening = match (loan_type, amount) {
                    (Some(loan_type), Some(amount)) => format!(
                        "Great! I'll start your {} application for ₹{}.",
                        loan_type, amount
                    ),
                    (Some(loan_type), None) => {
                        format!("Great! I can help you apply for a {}.", loan_type)
                    }
                    _ => "Great! I can help you with loan applications.".to_string(),
                };
                format!("{}\n\n{}", opening, LOAN_OFFERS)
            }

            Intent::LostCard => {
                let card = value("card_type", EntityLabel::CardType)
                    .unwrap_or_else(|| "card".to_string());
                format!(
                    "I understand you need to report a lost/stolen {}.\n\n\
                     I can block your card immediately for security. \
                     Your card will be blocked within 2 minutes. Should I proceed?",
                    card
                )
            }

            Intent::GetBranchDetails => "I can help you find branch information.\n\n\
                Our main branches:\n\
                - Mumbai - Nariman Point\n\
                - Delhi - Connaught Place\n\
                - Bangalore - MG Road\n\
                - Chennai - Anna Salai\n\n\
                Which city are you looking for?"
                .to_string(),

            Intent::GreetingHi => "Hello! I'm your AI banking assistant. \
                I can help with balance inquiries, transfers, loans, and much more. \
                What would you like to do today?"
                .to_string(),

            Intent::GreetingBye => "Thank you for using SecureBank services! \
                Have a great day. I'm always here to help with your banking needs."
                .to_string(),

            Intent::GeneralInquiry | Intent::Other(_) => format!(
                "I understand you're asking about banking services.\n\n{}\n\n\
                 What specifically would you like help with?",
                CAPABILITIES
            ),

            // Chitchat replies come from the matcher's response pools
            Intent::Chitchat(_) => {
                "I'm here whenever you need help with your banking.".to_string()
            }

            Intent::Fallback => CLARIFY_PROMPT.to_string(),
        }
    }
}

fn first_value(entities: &[Entity], label: EntityLabel) -> Option<String> {
    entities
        .iter()
        .find(|e| e.label == label)
        .map(|e| e.value.clone())
}
