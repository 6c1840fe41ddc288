use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{prompt_excerpt, tokenize};
use crate::summarize::Generator;
use crate::transcript::Transcript;
use crate::Result;

/// Scores within this distance of zero are neutral
const NEUTRAL_BAND: f64 = 0.05;

const POSITIVE_WORDS: &[&str] = &[
    "amazing", "awesome", "beautiful", "best", "better", "brilliant", "easy", "enjoy", "excellent",
    "exciting", "fantastic", "favorite", "fun", "good", "great", "happy", "helpful", "impressive",
    "incredible", "love", "nice", "perfect", "powerful", "recommend", "success", "thank", "thanks",
    "useful", "win", "wonderful",
];

const NEGATIVE_WORDS: &[&str] = &[
    "angry", "annoying", "awful", "bad", "boring", "broken", "bug", "crash", "difficult",
    "disappointing", "fail", "failed", "failure", "fear", "hard", "hate", "horrible", "lose",
    "loss", "poor", "problem", "sad", "scary", "slow", "terrible", "ugly", "unfortunately", "worse",
    "worst", "wrong",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Label for a score in [-1, 1]
    pub fn from_score(score: f64) -> Self {
        if score > NEUTRAL_BAND {
            SentimentLabel::Positive
        } else if score < -NEUTRAL_BAND {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    fn nominal_score(&self) -> f64 {
        match self {
            SentimentLabel::Positive => 1.0,
            SentimentLabel::Negative => -1.0,
            SentimentLabel::Neutral => 0.0,
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Neutral => write!(f, "neutral"),
        }
    }
}

/// Overall tone of a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,

    /// Polarity in [-1, 1]
    pub score: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    async fn analyze_sentiment(&self, transcript: &Transcript) -> Result<Sentiment>;
}

/// Sentiment judged by a generative model
pub struct AiSentimentAnalyzer {
    generator: Arc<dyn Generator>,
}

impl AiSentimentAnalyzer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    fn prompt(text: &str) -> String {
        format!(
            "Analyze the sentiment of this video transcript. Determine if it's positive, negative, or neutral \
             and provide a brief explanation. Respond with only a JSON object of the form \
             {{\"label\": \"positive|negative|neutral\", \"score\": <number from -1 to 1>, \"explanation\": \"...\"}}. \
             Transcript: {}",
            prompt_excerpt(text)
        )
    }
}

#[async_trait]
impl SentimentAnalyzer for AiSentimentAnalyzer {
    async fn analyze_sentiment(&self, transcript: &Transcript) -> Result<Sentiment> {
        let reply = self
            .generator
            .generate(&Self::prompt(&transcript.raw_text))
            .await?;
        parse_sentiment_reply(&reply)
    }
}

/// Lexicon-based polarity over the whole transcript
#[derive(Debug, Default)]
pub struct LocalSentimentAnalyzer;

#[async_trait]
impl SentimentAnalyzer for LocalSentimentAnalyzer {
    async fn analyze_sentiment(&self, transcript: &Transcript) -> Result<Sentiment> {
        Ok(score_lexicon(&transcript.raw_text))
    }
}

/// (pos - neg) / (pos + neg) over lexicon hits; zero when there are none
pub fn score_lexicon(text: &str) -> Sentiment {
    let (positive, negative) = tokenize(text).fold((0usize, 0usize), |(pos, neg), word| {
        if POSITIVE_WORDS.contains(&word.as_str()) {
            (pos + 1, neg)
        } else if NEGATIVE_WORDS.contains(&word.as_str()) {
            (pos, neg + 1)
        } else {
            (pos, neg)
        }
    });

    let hits = positive + negative;
    let score = if hits == 0 {
        0.0
    } else {
        (positive as f64 - negative as f64) / hits as f64
    };

    Sentiment {
        label: SentimentLabel::from_score(score),
        score,
        explanation: Some(format!(
            "{} positive and {} negative terms",
            positive, negative
        )),
    }
}

#[derive(Debug, Deserialize)]
struct SentimentReply {
    label: String,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    explanation: Option<String>,
}

fn parse_label(text: &str) -> Option<SentimentLabel> {
    let lower = text.to_lowercase();
    [
        ("positive", SentimentLabel::Positive),
        ("negative", SentimentLabel::Negative),
        ("neutral", SentimentLabel::Neutral),
    ]
    .into_iter()
    .filter_map(|(name, label)| lower.find(name).map(|idx| (idx, label)))
    .min_by_key(|(idx, _)| *idx)
    .map(|(_, label)| label)
}

/// Strip a surrounding markdown code fence from a model reply
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

/// Interpret a model reply as JSON, falling back to the first label mentioned in prose
pub fn parse_sentiment_reply(reply: &str) -> Result<Sentiment> {
    let body = strip_code_fence(reply);

    if let Ok(parsed) = serde_json::from_str::<SentimentReply>(body) {
        let label = parse_label(&parsed.label)
            .ok_or_else(|| anyhow::anyhow!("unknown sentiment label '{}'", parsed.label))?;
        let score = parsed
            .score
            .filter(|s| s.is_finite())
            .map(|s| s.clamp(-1.0, 1.0))
            .unwrap_or_else(|| label.nominal_score());
        return Ok(Sentiment {
            label,
            score,
            explanation: parsed.explanation.filter(|e| !e.trim().is_empty()),
        });
    }

    let label = parse_label(body)
        .ok_or_else(|| anyhow::anyhow!("could not determine sentiment from model reply"))?;
    Ok(Sentiment {
        label,
        score: label.nominal_score(),
        explanation: Some(body.to_string()),
    })
}
