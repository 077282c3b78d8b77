//! TF-IDF vectorizer over unigrams and bigrams
//!
//! Tokens are runs of two or more word characters, lowercased, with English
//! stop words removed. Bigrams are formed after stop-word removal. The
//! vocabulary is capped at `max_features` terms by corpus frequency and
//! indexed in lexical order. Rows are L2-normalized sparse vectors.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Sparse feature row: `(feature index, value)` sorted by index
pub type SparseVector = Vec<(usize, f64)>;

pub const DEFAULT_MAX_FEATURES: usize = 5000;

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
        "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
        "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down",
        "during", "each", "else", "etc", "ever", "every", "few", "for", "from", "further",
        "had", "has", "have", "having", "he", "her", "here", "hers", "herself", "him",
        "himself", "his", "how", "however", "if", "in", "into", "is", "it", "its", "itself",
        "just", "me", "might", "more", "most", "must", "my", "myself", "no", "nor", "not",
        "now", "of", "off", "on", "once", "only", "or", "other", "ought", "our", "ours",
        "ourselves", "out", "over", "own", "please", "same", "shall", "she", "should", "so",
        "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves",
        "then", "there", "these", "they", "this", "those", "through", "to", "too", "under",
        "until", "up", "upon", "us", "very", "was", "we", "were", "what", "when", "where",
        "which", "while", "who", "whom", "why", "will", "with", "would", "yet", "you", "your",
        "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// Fitted TF-IDF vectorizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Term → feature index
    pub vocabulary: BTreeMap<String, usize>,
    /// Inverse document frequency per feature index
    pub idf: Vec<f64>,
    pub max_features: usize,
}

impl TfidfVectorizer {
    /// Unigrams and bigrams of `text` after stop-word removal
    pub fn analyze(text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = TOKEN_PATTERN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !STOP_WORDS.contains(t))
            .collect();

        let mut terms: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        terms.extend(tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
        terms
    }

    /// Learn vocabulary and idf from `documents`
    pub fn fit<S: AsRef<str>>(documents: &[S], max_features: usize) -> Self {
        let mut term_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let terms = Self::analyze(doc.as_ref());
            let mut seen = HashSet::new();
            for term in terms {
                *term_counts.entry(term.clone()).or_insert(0) += 1;
                if seen.insert(term.clone()) {
                    *doc_freq.entry(term).or_insert(0) += 1;
                }
            }
        }

        // Most frequent terms first, lexical order among equals
        let mut ranked: Vec<(String, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);

        let mut kept: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort();

        let n_docs = documents.len() as f64;
        let idf = kept
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vocabulary = kept
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();

        Self {
            vocabulary,
            idf,
            max_features,
        }
    }

    /// Vectorize one document; out-of-vocabulary terms are ignored
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in Self::analyze(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseVector = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();

        let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in row.iter_mut() {
                *v /= norm;
            }
        }
        row
    }

    pub fn transform_all<S: AsRef<str>>(&self, documents: &[S]) -> Vec<SparseVector> {
        documents.iter().map(|d| self.transform(d.as_ref())).collect()
    }

    pub fn num_features(&self) -> usize {
        self.vocabulary.len()
    }

    /// Vocabulary indices must be a permutation of `0..idf.len()`
    pub fn is_consistent(&self) -> bool {
        let n = self.idf.len();
        if self.vocabulary.len() != n {
            return false;
        }
        let mut seen = vec![false; n];
        for &index in self.vocabulary.values() {
            if index >= n || seen[index] {
                return false;
            }
            seen[index] = true;
        }
        true
    }
}
