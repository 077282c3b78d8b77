//! Banking intents and chitchat categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Small-talk categories recognised before intent classification.
///
/// Declaration order is match order: when an utterance triggers more than
/// one category, the first one listed in [`ChitchatCategory::ALL`] wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChitchatCategory {
    Greeting,
    Goodbye,
    HowAreYou,
    Compliment,
    Complaint,
    Help,
    Name,
}

impl ChitchatCategory {
    /// All categories in declared (match) order
    pub const ALL: [ChitchatCategory; 7] = [
        ChitchatCategory::Greeting,
        ChitchatCategory::Goodbye,
        ChitchatCategory::HowAreYou,
        ChitchatCategory::Compliment,
        ChitchatCategory::Complaint,
        ChitchatCategory::Help,
        ChitchatCategory::Name,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChitchatCategory::Greeting => "greeting",
            ChitchatCategory::Goodbye => "goodbye",
            ChitchatCategory::HowAreYou => "how_are_you",
            ChitchatCategory::Compliment => "compliment",
            ChitchatCategory::Complaint => "complaint",
            ChitchatCategory::Help => "help",
            ChitchatCategory::Name => "name",
        }
    }
}

impl fmt::Display for ChitchatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChitchatCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChitchatCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown chitchat category: {}", s))
    }
}

/// Banking action expressed by an utterance.
///
/// Labels round-trip through their snake_case string form, which is also the
/// label space of the trained classifier. Labels without a dedicated variant
/// are kept as [`Intent::Other`] so a retrained model can introduce new
/// classes without a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Intent {
    CheckBalance,
    TransferMoney,
    ApplyLoan,
    LostCard,
    GetBranchDetails,
    GreetingHi,
    GreetingBye,
    GeneralInquiry,
    /// Small talk answered from a canned response pool
    Chitchat(ChitchatCategory),
    /// Nothing matched with enough confidence
    Fallback,
    /// A trained label this build has no dedicated handling for
    Other(String),
}

impl Intent {
    pub fn as_str(&self) -> &str {
        match self {
            Intent::CheckBalance => "check_balance",
            Intent::TransferMoney => "transfer_money",
            Intent::ApplyLoan => "apply_loan",
            Intent::LostCard => "lost_card",
            Intent::GetBranchDetails => "get_branch_details",
            Intent::GreetingHi => "greeting_hi",
            Intent::GreetingBye => "greeting_bye",
            Intent::GeneralInquiry => "general_inquiry",
            Intent::Chitchat(category) => category.as_str(),
            Intent::Fallback => "fallback",
            Intent::Other(label) => label.as_str(),
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Intent {
    fn from(label: &str) -> Self {
        match label {
            "check_balance" => Intent::CheckBalance,
            "transfer_money" => Intent::TransferMoney,
            "apply_loan" => Intent::ApplyLoan,
            "lost_card" => Intent::LostCard,
            "get_branch_details" => Intent::GetBranchDetails,
            "greeting_hi" => Intent::GreetingHi,
            "greeting_bye" => Intent::GreetingBye,
            "general_inquiry" => Intent::GeneralInquiry,
            "fallback" => Intent::Fallback,
            other => match other.parse::<ChitchatCategory>() {
                Ok(category) => Intent::Chitchat(category),
                Err(_) => Intent::Other(other.to_string()),
            },
        }
    }
}

impl From<String> for Intent {
    fn from(label: String) -> Self {
        Intent::from(label.as_str())
    }
}

impl From<Intent> for String {
    fn from(intent: Intent) -> Self {
        intent.as_str().to_string()
    }
}

impl FromStr for Intent {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Intent::from(s))
    }
}
