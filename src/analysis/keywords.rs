use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

use super::{prompt_excerpt, word_frequency, StopWords};
use crate::summarize::Generator;
use crate::transcript::Transcript;
use crate::Result;

// Leading list markers such as "-", "*", "1." or "2)"
static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*•]|\d+[.)])\s*").expect("list marker pattern is valid"));

/// Produces the main topics and key phrases of a transcript
#[async_trait]
pub trait KeywordExtractor: Send + Sync {
    async fn extract_keywords(&self, transcript: &Transcript) -> Result<Vec<String>>;
}

/// Keyword extraction delegated to a generative model
pub struct AiKeywordExtractor {
    generator: Arc<dyn Generator>,
    max_keywords: usize,
}

impl AiKeywordExtractor {
    pub fn new(generator: Arc<dyn Generator>, max_keywords: usize) -> Self {
        Self {
            generator,
            max_keywords,
        }
    }

    fn prompt(text: &str) -> String {
        format!(
            "Extract the main topics and key phrases from this video transcript. \
             Return them as a comma-separated list of the most important topics and keywords, \
             with no other text: {}",
            prompt_excerpt(text)
        )
    }
}

#[async_trait]
impl KeywordExtractor for AiKeywordExtractor {
    async fn extract_keywords(&self, transcript: &Transcript) -> Result<Vec<String>> {
        let reply = self
            .generator
            .generate(&Self::prompt(&transcript.raw_text))
            .await?;

        let keywords = parse_keyword_list(&reply, self.max_keywords);
        if keywords.is_empty() {
            anyhow::bail!("model returned no keywords");
        }
        Ok(keywords)
    }
}

/// Frequency-based keywords: the most common words longer than three characters
pub struct LocalKeywordExtractor {
    stopwords: StopWords,
    max_keywords: usize,
}

impl LocalKeywordExtractor {
    pub fn new(stopwords: StopWords, max_keywords: usize) -> Self {
        Self {
            stopwords,
            max_keywords,
        }
    }
}

#[async_trait]
impl KeywordExtractor for LocalKeywordExtractor {
    async fn extract_keywords(&self, transcript: &Transcript) -> Result<Vec<String>> {
        let keywords = word_frequency(&transcript.raw_text, &self.stopwords, usize::MAX)
            .into_iter()
            .filter(|entry| entry.word.chars().count() > 3)
            .take(self.max_keywords)
            .map(|entry| entry.word)
            .collect();
        Ok(keywords)
    }
}

/// Split a comma or newline separated model reply into clean, distinct keywords
pub fn parse_keyword_list(reply: &str, max_keywords: usize) -> Vec<String> {
    let mut seen = HashSet::new();

    reply
        .split(|c: char| c == ',' || c == '\n' || c == ';')
        .map(|item| {
            let item = item.trim();
            let item = match LIST_MARKER.find(item) {
                Some(marker) => &item[marker.end()..],
                None => item,
            };
            item.trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
                .trim()
        })
        .filter(|item| !item.is_empty())
        .filter(|item| seen.insert(item.to_lowercase()))
        .take(max_keywords)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarize::{GenerationError, MockGenerator};

    #[test]
    fn test_parse_comma_list() {
        let keywords = parse_keyword_list("Rust, ownership, borrow checker , rust", 10);
        assert_eq!(keywords, vec!["Rust", "ownership", "borrow checker"]);
    }

    #[test]
    fn test_parse_bulleted_list() {
        let reply = "- \"async\"\n* tokio\n1. futures\n2) pinning\n\n";
        let keywords = parse_keyword_list(reply, 10);
        assert_eq!(keywords, vec!["async", "tokio", "futures", "pinning"]);
    }

    #[test]
    fn test_parse_respects_limit() {
        assert_eq!(parse_keyword_list("a, b, c, d", 2), vec!["a", "b"]);
    }

    #[test]
    fn test_local_keywords_skip_short_words() {
        let extractor = LocalKeywordExtractor::new(StopWords::default(), 2);
        let transcript = Transcript::new(
            "dQw4w9WgXcQ",
            "cat cat cat rust rust memory memory memory safety",
        );
        let keywords = tokio_test::block_on(extractor.extract_keywords(&transcript)).unwrap();
        assert_eq!(keywords, vec!["memory", "rust"]);
    }

    #[tokio::test]
    async fn test_ai_keywords() {
        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .withf(|prompt: &str| prompt.starts_with("Extract the main topics") && prompt.ends_with("some text"))
            .returning(|_| Ok("borrowing, lifetimes, traits".to_string()));

        let extractor = AiKeywordExtractor::new(Arc::new(generator), 10);
        let transcript = Transcript::new("dQw4w9WgXcQ", "some text");
        let keywords = extractor.extract_keywords(&transcript).await.unwrap();
        assert_eq!(keywords, vec!["borrowing", "lifetimes", "traits"]);
    }

    #[tokio::test]
    async fn test_ai_keywords_failure() {
        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .returning(|_| Err(GenerationError::Network("connection reset".to_string())));

        let extractor = AiKeywordExtractor::new(Arc::new(generator), 10);
        let transcript = Transcript::new("dQw4w9WgXcQ", "some text");
        let err = extractor.extract_keywords(&transcript).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_ai_keywords_empty_reply() {
        let mut generator = MockGenerator::new();
        generator.expect_generate().returning(|_| Ok(" , \n".to_string()));

        let extractor = AiKeywordExtractor::new(Arc::new(generator), 10);
        let transcript = Transcript::new("dQw4w9WgXcQ", "some text");
        assert!(extractor.extract_keywords(&transcript).await.is_err());
    }
}
