use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub mod keywords;
pub mod sentiment;

pub use keywords::{AiKeywordExtractor, KeywordExtractor, LocalKeywordExtractor};
pub use sentiment::{
    AiSentimentAnalyzer, LocalSentimentAnalyzer, Sentiment, SentimentAnalyzer, SentimentLabel,
};

/// Characters of transcript sent along with keyword and sentiment prompts
pub const PROMPT_EXCERPT_CHARS: usize = 1000;

const DEFAULT_STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will", "would",
    "could", "should", "may", "might", "must", "can", "this", "that", "these", "those", "i", "you",
    "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
];

/// One row of the word-frequency table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Words excluded from frequency counting
#[derive(Debug, Clone)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Default list extended with additional words
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stopwords = Self::default();
        stopwords
            .words
            .extend(extra.into_iter().map(|w| w.as_ref().to_lowercase()));
        stopwords
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::new(DEFAULT_STOPWORDS.iter())
    }
}

/// Lowercase a whitespace token and strip punctuation, keeping inner apostrophes
pub fn normalize_token(token: &str) -> Option<String> {
    let cleaned: String = token
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '\'')
        .flat_map(char::to_lowercase)
        .collect();
    let cleaned = cleaned.trim_matches('\'');

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Normalized tokens of a text, in order
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().filter_map(normalize_token)
}

/// Most frequent non-stopword tokens, by descending count, ties in first-occurrence order
pub fn word_frequency(text: &str, stopwords: &StopWords, top_n: usize) -> Vec<WordCount> {
    // word -> (count, first position)
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();

    for (position, word) in tokenize(text).enumerate() {
        if stopwords.contains(&word) {
            continue;
        }
        counts.entry(word).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(top_n)
        .map(|(word, count, _)| WordCount { word, count })
        .collect()
}

/// Leading slice of the transcript used in keyword and sentiment prompts
pub fn prompt_excerpt(text: &str) -> &str {
    match text.char_indices().nth(PROMPT_EXCERPT_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wc(word: &str, count: usize) -> WordCount {
        WordCount {
            word: word.to_string(),
            count,
        }
    }

    #[test]
    fn test_stopwords_excluded_example() {
        let stopwords = StopWords::new(["the", "on"]);
        let table = word_frequency("the the the cat sat on the the mat", &stopwords, 10);
        assert_eq!(table, vec![wc("cat", 1), wc("sat", 1), wc("mat", 1)]);
    }

    #[test]
    fn test_descending_counts_with_first_occurrence_ties() {
        let stopwords = StopWords::new(Vec::<&str>::new());
        let text = "beta alpha gamma alpha beta delta alpha";
        let table = word_frequency(text, &stopwords, 3);
        assert_eq!(table, vec![wc("alpha", 3), wc("beta", 2), wc("gamma", 1)]);
    }

    #[test]
    fn test_case_and_punctuation_are_normalized() {
        let stopwords = StopWords::default();
        let text = "Rust, rust! RUST? (rust) don't Don't...";
        let table = word_frequency(text, &stopwords, 10);
        assert_eq!(table, vec![wc("rust", 4), wc("don't", 2)]);
    }

    #[test]
    fn test_only_stopwords_yields_empty() {
        let table = word_frequency("The and THE, of it. We they", &StopWords::default(), 10);
        assert!(table.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let text = "one two three two three three four five six seven eight nine ten eleven";
        let stopwords = StopWords::default();
        let first = word_frequency(text, &stopwords, 10);
        let second = word_frequency(text, &stopwords, 10);
        assert_eq!(first, second);
        assert_eq!(first.len(), 10);
        assert_eq!(first[0], wc("three", 3));
    }

    #[test]
    fn test_extra_stopwords() {
        let stopwords = StopWords::with_extra(["Um", "uh"]);
        assert!(stopwords.contains("um"));
        assert!(stopwords.contains("the"));
        let table = word_frequency("um uh um video", &stopwords, 10);
        assert_eq!(table, vec![wc("video", 1)]);
    }

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("'quoted'"), Some("quoted".to_string()));
        assert_eq!(normalize_token("--"), None);
        assert_eq!(normalize_token("Café!"), Some("café".to_string()));
    }

    #[test]
    fn test_prompt_excerpt() {
        let long = "é".repeat(PROMPT_EXCERPT_CHARS + 50);
        assert_eq!(prompt_excerpt(&long).chars().count(), PROMPT_EXCERPT_CHARS);
        assert_eq!(prompt_excerpt("short"), "short");
    }
}
