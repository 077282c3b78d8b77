//! Text normalization shared by the classifier and the keyword rules

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Token every maximal digit run is replaced with
pub const DIGIT_PLACEHOLDER: &str = "NUM";

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize an utterance for classification.
///
/// Lowercases, drops every character that is neither a word character nor
/// whitespace, replaces each digit run with [`DIGIT_PLACEHOLDER`] and
/// collapses whitespace. Punctuation inside a number is removed before
/// masking, so `5,000` becomes a single placeholder.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    let masked = DIGITS.replace_all(&stripped, DIGIT_PLACEHOLDER);
    WHITESPACE.replace_all(masked.trim(), " ").into_owned()
}

/// Split normalized text into word tokens
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized.unicode_words().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        assert_eq!(normalize("What's my Balance?"), "whats my balance");
    }

    #[test]
    fn test_amounts_normalize_identically() {
        assert_eq!(normalize("transfer 5000"), normalize("transfer 9999"));
        assert_eq!(normalize("transfer 5000"), "transfer NUM");
    }

    #[test]
    fn test_separated_number_is_one_placeholder() {
        assert_eq!(normalize("Send ₹12,500.75 please"), "send NUM please");
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t "), "");
        assert_eq!(normalize("?!..."), "");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  lost   my\ncard "), "lost my card");
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("apply for a loan"), vec!["apply", "for", "a", "loan"]);
        assert!(tokenize("").is_empty());
    }
}
