//! Chitchat detection
//!
//! Small talk is answered with a canned response before any intent
//! classification runs. Categories are checked in their configured order
//! and the first category with a trigger phrase contained in the text wins.
//!
//! Matching is a plain case-insensitive substring test over
//! whitespace-collapsed text, so "hi" matches "hiya" and also "this".

use rand::seq::SliceRandom;

use bank_assistant_config::ChitchatPatterns;
use bank_assistant_core::ChitchatCategory;

/// A matched category with the response chosen for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChitchatMatch {
    pub category: ChitchatCategory,
    pub response: String,
}

#[derive(Debug)]
struct CompiledCategory {
    category: ChitchatCategory,
    /// Lowercased, whitespace-collapsed, never empty
    triggers: Vec<String>,
    responses: Vec<String>,
}

/// Prepared chitchat patterns
#[derive(Debug)]
pub struct ChitchatMatcher {
    categories: Vec<CompiledCategory>,
    /// Always answer with the first response of a category
    deterministic: bool,
}

impl ChitchatMatcher {
    pub fn new(patterns: &ChitchatPatterns, deterministic: bool) -> Self {
        let categories = patterns
            .categories
            .iter()
            .filter_map(|set| {
                let triggers: Vec<String> = set
                    .triggers
                    .iter()
                    .map(|t| collapse_lowercase(t))
                    .filter(|t| !t.is_empty())
                    .collect();
                if triggers.is_empty() {
                    tracing::warn!(
                        category = %set.category,
                        "Skipping chitchat category without triggers"
                    );
                    return None;
                }

                Some(CompiledCategory {
                    category: set.category,
                    triggers,
                    responses: set.responses.clone(),
                })
            })
            .collect();

        Self {
            categories,
            deterministic,
        }
    }

    /// Matcher over the built-in patterns
    pub fn builtin(deterministic: bool) -> Self {
        Self::new(&ChitchatPatterns::default(), deterministic)
    }

    /// First category, in declared order, with a trigger present in `text`
    pub fn match_category(&self, text: &str) -> Option<ChitchatCategory> {
        let lowered = collapse_lowercase(text);
        if lowered.is_empty() {
            return None;
        }
        self.categories
            .iter()
            .find(|c| c.triggers.iter().any(|t| lowered.contains(t.as_str())))
            .map(|c| c.category)
    }

    /// Match `text` and pick a response from the category's pool
    pub fn match_chitchat(&self, text: &str) -> Option<ChitchatMatch> {
        let category = self.match_category(text)?;
        Some(ChitchatMatch {
            category,
            response: self.response(category),
        })
    }

    /// A response for `category`: uniformly random, or the first one in
    /// deterministic mode. Empty when the category is not configured.
    pub fn response(&self, category: ChitchatCategory) -> String {
        let Some(compiled) = self.categories.iter().find(|c| c.category == category) else {
            return String::new();
        };

        let chosen = if self.deterministic {
            compiled.responses.first()
        } else {
            compiled.responses.choose(&mut rand::thread_rng())
        };
        chosen.cloned().unwrap_or_default()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }
}

impl Default for ChitchatMatcher {
    fn default() -> Self {
        Self::builtin(false)
    }
}

fn collapse_lowercase(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bank_assistant_config::ChitchatPatternSet;

    #[test]
    fn test_greeting_before_banking_content() {
        let matcher = ChitchatMatcher::builtin(true);
        assert_eq!(
            matcher.match_category("hi, what's my balance"),
            Some(ChitchatCategory::Greeting)
        );
    }

    #[test]
    fn test_trigger_matches_inside_words() {
        let matcher = ChitchatMatcher::builtin(true);
        assert_eq!(matcher.match_category("hiya"), Some(ChitchatCategory::Greeting));
        assert_eq!(matcher.match_category("thankyou"), Some(ChitchatCategory::Compliment));
        // "this" contains "hi"
        assert_eq!(
            matcher.match_category("which account is this"),
            Some(ChitchatCategory::Greeting)
        );
        assert_eq!(matcher.match_category("What's my balance?"), None);
    }

    #[test]
    fn test_multi_word_triggers() {
        let matcher = ChitchatMatcher::builtin(true);
        assert_eq!(
            matcher.match_category("How  are you doing?"),
            Some(ChitchatCategory::HowAreYou)
        );
        assert_eq!(
            matcher.match_category("THANK YOU so much"),
            Some(ChitchatCategory::Compliment)
        );
        assert_eq!(
            matcher.match_category("what is your name"),
            Some(ChitchatCategory::Name)
        );
    }

    #[test]
    fn test_declared_order_breaks_ties() {
        // "hello" (greeting) and "thanks" (compliment) both present
        let matcher = ChitchatMatcher::builtin(true);
        assert_eq!(
            matcher.match_category("thanks, hello"),
            Some(ChitchatCategory::Greeting)
        );
    }

    #[test]
    fn test_deterministic_response_is_first() {
        let patterns = ChitchatPatterns::default();
        let matcher = ChitchatMatcher::new(&patterns, true);
        let matched = matcher.match_chitchat("goodbye").unwrap();

        assert_eq!(matched.category, ChitchatCategory::Goodbye);
        assert_eq!(
            matched.response,
            patterns.get(ChitchatCategory::Goodbye).unwrap().responses[0]
        );
    }

    #[test]
    fn test_random_response_from_pool() {
        let patterns = ChitchatPatterns::default();
        let matcher = ChitchatMatcher::new(&patterns, false);
        let pool = &patterns.get(ChitchatCategory::Greeting).unwrap().responses;

        for _ in 0..20 {
            let response = matcher.response(ChitchatCategory::Greeting);
            assert!(pool.contains(&response));
        }
    }

    #[test]
    fn test_custom_patterns() {
        let patterns = ChitchatPatterns {
            categories: vec![ChitchatPatternSet {
                category: ChitchatCategory::Goodbye,
                triggers: vec!["ciao".to_string(), "ta-ta!".to_string()],
                responses: vec!["Bye!".to_string()],
            }],
        };
        let matcher = ChitchatMatcher::new(&patterns, true);

        assert_eq!(matcher.category_count(), 1);
        assert_eq!(matcher.match_category("ok ciao"), Some(ChitchatCategory::Goodbye));
        assert_eq!(matcher.match_category("ta-ta!"), Some(ChitchatCategory::Goodbye));
        assert_eq!(matcher.match_category("hello"), None);
        assert_eq!(matcher.response(ChitchatCategory::Help), "");
    }

    #[test]
    fn test_empty_text() {
        assert!(ChitchatMatcher::builtin(true).match_chitchat("").is_none());
    }
}
