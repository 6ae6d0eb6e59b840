// Text normalization.
//
// Turns raw communication text into the token stream the topic model
// trains on: lowercase, stop words and purely numeric tokens dropped,
// punctuation characters removed, remaining words reduced to their stems.
// The stopword pass runs on whole whitespace tokens before punctuation is
// stripped, so "the," (with a trailing comma) is not treated as a stop
// word. That ordering is deliberate and matched by the tests.

use std::collections::HashSet;

use rust_stemmers::{Algorithm, Stemmer};
use serde_json::Value;
use stop_words::{get, LANGUAGE};

/// ASCII punctuation characters stripped from tokens.
const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

pub struct TextNormalizer {
    stopwords: HashSet<String>,
    punctuation: HashSet<char>,
    stemmer: Stemmer,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self::with_extra_stopwords(&[])
    }

    /// Normalizer with domain-specific stop words on top of the standard
    /// English list. Useful for boilerplate that would otherwise dominate
    /// every topic ("regards", a company name, and so on).
    pub fn with_extra_stopwords(extra: &[&str]) -> Self {
        let mut stopwords: HashSet<String> = get(LANGUAGE::English).into_iter().collect();
        for word in extra {
            stopwords.insert(word.to_lowercase());
        }
        Self {
            stopwords,
            punctuation: PUNCTUATION.chars().collect(),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Normalized form of `text` as a single space-joined string.
    pub fn clean(&self, text: &str) -> String {
        let text = text.trim().to_lowercase();

        // Stopword and digit filtering over whole whitespace tokens.
        let stop_free = text
            .split_whitespace()
            .filter(|word| {
                !self.stopwords.contains(*word) && !word.chars().all(|c| c.is_ascii_digit())
            })
            .collect::<Vec<_>>()
            .join(" ");

        // Character-level punctuation strip: spaces survive, punctuation
        // disappears wherever it sits, so "wire-transfer" becomes one word.
        let punc_free: String = stop_free
            .chars()
            .filter(|c| !self.punctuation.contains(c))
            .collect();

        punc_free
            .split_whitespace()
            .map(|word| self.stemmer.stem(word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Normalized tokens of `text`, ready for bag-of-words counting.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.clean(text)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// [`TextNormalizer::clean`] over a table cell. Anything that is not a
    /// string normalizes to the empty string.
    pub fn clean_value(&self, value: &Value) -> String {
        match value {
            Value::String(s) => self.clean(s),
            _ => String::new(),
        }
    }

    /// [`TextNormalizer::tokenize`] over a table cell.
    pub fn tokenize_value(&self, value: &Value) -> Vec<String> {
        match value {
            Value::String(s) => self.tokenize(s),
            _ => Vec::new(),
        }
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
