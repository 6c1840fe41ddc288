use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod gemini;

pub use gemini::GeminiClient;

use crate::AnalysisError;

/// Failures reported by a generative text service
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("authentication rejected: {0}")]
    Authentication(String),

    #[error("quota exhausted: {0}")]
    QuotaExceeded(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unusable response: {0}")]
    InvalidResponse(String),
}

/// A single prompt/response exchange with a generative model
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Model identifier, for logs
    fn model_name(&self) -> String;
}

/// Output style of a summary
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryType {
    /// Concise bullet points of the key ideas
    BulletPoints,
    /// Comprehensive prose with context and examples
    Detailed,
    /// Takeaways and actionable points
    KeyInsights,
    /// Chronological progression of topics
    Timeline,
}

impl SummaryType {
    pub const ALL: [SummaryType; 4] = [
        SummaryType::BulletPoints,
        SummaryType::Detailed,
        SummaryType::KeyInsights,
        SummaryType::Timeline,
    ];

    /// Target length of the generated summary in words
    pub fn target_words(&self) -> u32 {
        match self {
            SummaryType::BulletPoints => 250,
            SummaryType::Detailed => 500,
            SummaryType::KeyInsights => 300,
            SummaryType::Timeline => 400,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SummaryType::BulletPoints => "Bullet Points",
            SummaryType::Detailed => "Detailed",
            SummaryType::KeyInsights => "Key Insights",
            SummaryType::Timeline => "Timeline",
        }
    }

    fn instructions(&self) -> &'static str {
        match self {
            SummaryType::BulletPoints => {
                "Create a concise bullet-point summary of the video transcript. Focus on key points and main ideas."
            }
            SummaryType::Detailed => {
                "Provide a comprehensive detailed summary of the video transcript. Include context, examples, and explanations."
            }
            SummaryType::KeyInsights => {
                "Extract the most important insights, takeaways, and actionable points from the video transcript."
            }
            SummaryType::Timeline => {
                "Create a chronological timeline summary of the video content, highlighting the progression of topics discussed in the order they appear."
            }
        }
    }
}

impl std::fmt::Display for SummaryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryType::BulletPoints => write!(f, "bullet-points"),
            SummaryType::Detailed => write!(f, "detailed"),
            SummaryType::KeyInsights => write!(f, "key-insights"),
            SummaryType::Timeline => write!(f, "timeline"),
        }
    }
}

/// Transcript text paired with the requested summary style
#[derive(Debug, Clone, Copy)]
pub struct SummaryRequest<'a> {
    pub transcript_text: &'a str,
    pub summary_type: SummaryType,
}

impl SummaryRequest<'_> {
    /// Full prompt sent to the model
    pub fn prompt(&self) -> String {
        format!(
            "You are a YouTube video summarizer. {} Keep the summary within {} words.\n\nTranscript:\n{}",
            self.summary_type.instructions(),
            self.summary_type.target_words(),
            self.transcript_text
        )
    }
}

/// Produces summaries through a generative model
#[derive(Clone)]
pub struct Summarizer {
    generator: Arc<dyn Generator>,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Generate a summary in one call; no retries and no partial output
    pub async fn summarize(&self, request: SummaryRequest<'_>) -> Result<String, AnalysisError> {
        tracing::info!(
            "Requesting {} summary from {}",
            request.summary_type,
            self.generator.model_name()
        );

        let text = self
            .generator
            .generate(&request.prompt())
            .await
            .map_err(|e| AnalysisError::SummarizationFailed(e.to_string()))?;

        let text = text.trim();
        if text.is_empty() {
            return Err(AnalysisError::SummarizationFailed(
                "model returned an empty summary".to_string(),
            ));
        }

        Ok(text.to_string())
    }
}
