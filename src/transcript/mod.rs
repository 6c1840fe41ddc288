use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod youtube;

pub use youtube::YoutubeTranscriptFetcher;

use crate::video::VideoReference;
use crate::AnalysisError;

/// Assumed speaking rate used to estimate duration from word count
pub const ASSUMED_WORDS_PER_MINUTE: f64 = 150.0;

/// Spoken text of a video with statistics derived once at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: String,

    /// Timestamp-free transcript text
    pub raw_text: String,

    /// Whitespace-separated token count
    pub word_count: usize,

    /// Number of characters in the raw text
    pub char_count: usize,

    /// Duration estimate at the assumed speaking rate (display heuristic)
    pub estimated_duration_minutes: f64,

    /// Caption track language, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,

    /// Spoken span measured from caption timing, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,

    /// Words per minute over the measured span, or the assumed rate
    pub speaking_rate_wpm: f64,
}

impl Transcript {
    pub fn new(video_id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self::build(video_id.into(), raw_text.into(), None, None)
    }

    /// Build a transcript with caption track details from the fetcher
    pub fn with_details(
        video_id: impl Into<String>,
        raw_text: impl Into<String>,
        language_code: Option<String>,
        duration_seconds: Option<f64>,
    ) -> Self {
        Self::build(video_id.into(), raw_text.into(), language_code, duration_seconds)
    }

    fn build(
        video_id: String,
        raw_text: String,
        language_code: Option<String>,
        duration_seconds: Option<f64>,
    ) -> Self {
        let word_count = raw_text.split_whitespace().count();
        let char_count = raw_text.chars().count();
        let estimated_duration_minutes = word_count as f64 / ASSUMED_WORDS_PER_MINUTE;

        let speaking_rate_wpm = match duration_seconds {
            Some(seconds) if seconds > 0.0 => word_count as f64 / (seconds / 60.0),
            _ => ASSUMED_WORDS_PER_MINUTE,
        };

        Self {
            video_id,
            raw_text,
            word_count,
            char_count,
            estimated_duration_minutes,
            language_code,
            duration_seconds,
            speaking_rate_wpm,
        }
    }
}

/// Source of video transcripts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    /// Fetch the transcript in the first available language from `languages`
    async fn fetch_transcript(
        &self,
        video: &VideoReference,
        languages: &[String],
    ) -> Result<Transcript, AnalysisError>;

    /// Name of the backing service, for logs
    fn source_name(&self) -> &'static str;
}
