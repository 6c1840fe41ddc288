//! YouTube Summarizer - A Rust CLI tool for summarizing and analyzing YouTube videos
//!
//! This library fetches a video's transcript, asks a generative AI service for a summary,
//! and computes transcript statistics (word frequency, keywords, sentiment). Every external
//! service sits behind a small trait so the pipeline can run against fakes.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod summarize;
pub mod transcript;
pub mod utils;
pub mod video;

pub use cli::{BatchFormat, Cli, Commands, OutputFormat};
pub use config::Config;
pub use pipeline::{AnalysisOptions, AnalysisPipeline, AnalysisResult, BatchEntry, BatchResult};
pub use summarize::{Generator, SummaryType};
pub use transcript::{Transcript, TranscriptFetcher};
pub use video::{normalize_url, VideoReference};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Failures that end the analysis of a single video
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),

    #[error("Transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("No transcript found for video {video_id} in languages: {}", languages.join(", "))]
    NoTranscriptFound {
        video_id: String,
        languages: Vec<String>,
    },

    #[error("Video {0} is unavailable")]
    VideoUnavailable(String),

    #[error("Transcript service error: {0}")]
    Upstream(String),

    #[error("Summarization failed: {0}")]
    SummarizationFailed(String),
}

impl AnalysisError {
    /// Stable identifier for the failure class, used in exports
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InvalidUrl(_) => "invalid_url",
            AnalysisError::TranscriptsDisabled(_) => "transcripts_disabled",
            AnalysisError::NoTranscriptFound { .. } => "no_transcript_found",
            AnalysisError::VideoUnavailable(_) => "video_unavailable",
            AnalysisError::Upstream(_) => "upstream_error",
            AnalysisError::SummarizationFailed(_) => "summarization_failed",
        }
    }
}
