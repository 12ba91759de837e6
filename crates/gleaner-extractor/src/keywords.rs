//! Heuristic keyword extraction
//!
//! A frequency count over word tokens. Used whenever the model did not
//! supply keywords, including when the model could not be reached at all.

use crate::config::KeywordConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Runs of letters, allowing inner apostrophes ("don't", "o'brien")
static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{L}+(?:['’]\p{L}+)*").expect("token pattern is valid"));

/// Stop words filtered when no list is configured
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "this", "that", "these", "those", "is", "are", "was", "were", "be", "been", "have",
    "has", "had", "do", "does", "will", "would", "could", "should", "can", "may", "might",
    "must", "not", "its", "it's", "than", "then", "there", "their", "they", "them", "what",
    "which", "who", "when", "where", "how", "all", "any", "also", "into", "our", "you", "your",
];

/// Deterministic frequency-based keyword extractor
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    min_length: usize,
    top_k: usize,
    stop_words: HashSet<String>,
}

impl KeywordExtractor {
    /// Build an extractor from its settings
    pub fn new(config: &KeywordConfig) -> Self {
        let stop_words = match &config.stop_words {
            Some(words) => words.iter().map(|w| w.trim().to_lowercase()).collect(),
            None => DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        };

        Self {
            min_length: config.min_length,
            top_k: config.top_k,
            stop_words,
        }
    }

    /// Ranked `(word, count)` pairs, most frequent first
    ///
    /// Ties are broken alphabetically so the output never depends on hash
    /// order. Text without qualifying words yields an empty list.
    pub fn extract(&self, text: &str) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();

        for token in TOKEN.find_iter(text) {
            let word = token.as_str().to_lowercase();
            if word.chars().count() < self.min_length || self.stop_words.contains(&word) {
                continue;
            }
            *counts.entry(word).or_insert(0) += 1;
        }

        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.top_k);
        ranked
    }

    /// Ranked keywords without their counts
    pub fn keywords(&self, text: &str) -> Vec<String> {
        self.extract(text).into_iter().map(|(word, _)| word).collect()
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(&KeywordConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_by_frequency_then_alphabetically() {
        let extractor = KeywordExtractor::default();
        let ranked = extractor.extract("Rust rust RUST. Cargo crates cargo. Zebra apple.");

        assert_eq!(
            ranked,
            vec![
                ("rust".to_string(), 3),
                ("cargo".to_string(), 2),
                ("apple".to_string(), 1),
                ("crates".to_string(), 1),
                ("zebra".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_filters_short_words_and_stop_words() {
        let extractor = KeywordExtractor::default();
        let words = extractor.keywords("The cat and the dog sat on a mat with those owls");

        assert_eq!(words, vec!["cat", "dog", "mat", "owls", "sat"]);
    }

    #[test]
    fn test_min_length_counts_characters() {
        let extractor = KeywordExtractor::default();
        // Three characters, six bytes
        assert_eq!(extractor.keywords("été"), vec!["été"]);
    }

    #[test]
    fn test_inner_apostrophes_stay_in_token() {
        let extractor = KeywordExtractor::default();
        let words = extractor.keywords("don't stop, don't");
        assert_eq!(words, vec!["don't", "stop"]);
    }

    #[test]
    fn test_top_k_truncates() {
        let config = KeywordConfig {
            top_k: 2,
            ..KeywordConfig::default()
        };
        let extractor = KeywordExtractor::new(&config);

        assert_eq!(extractor.keywords("alpha beta gamma delta beta"), vec!["beta", "alpha"]);
    }

    #[test]
    fn test_custom_stop_words_replace_defaults() {
        let config = KeywordConfig {
            stop_words: Some(vec!["Alpha".to_string()]),
            ..KeywordConfig::default()
        };
        let extractor = KeywordExtractor::new(&config);

        assert_eq!(extractor.keywords("alpha the beta"), vec!["beta", "the"]);
    }

    #[test]
    fn test_no_qualifying_words_is_empty() {
        let extractor = KeywordExtractor::default();
        assert!(extractor.extract("").is_empty());
        assert!(extractor.extract("a an the of 42 !!").is_empty());
    }

    #[test]
    fn test_deterministic() {
        let extractor = KeywordExtractor::default();
        let text = "one two three four five six seven eight nine ten eleven twelve";
        assert_eq!(extractor.extract(text), extractor.extract(text));
        assert_eq!(extractor.extract(text).len(), 10);
    }
}
