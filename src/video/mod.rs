use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod metadata;

pub use metadata::{MetadataProvider, OEmbedClient, VideoMetadata};

use crate::AnalysisError;

/// Length of a YouTube video identifier
pub const VIDEO_ID_LEN: usize = 11;

// Captures the id-shaped run after one of the accepted prefixes. Length is checked
// separately so a 10 or 12 character id is rejected instead of truncated.
static VIDEO_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:youtube\.com/watch\?(?:[^#\s]*?&)?v=|youtu\.be/|youtube\.com/embed/)([A-Za-z0-9_-]+)",
    )
    .expect("video URL pattern is valid")
});

/// A validated reference to a single YouTube video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoReference {
    /// Canonical 11-character video identifier
    pub video_id: String,

    /// The URL exactly as the user supplied it (trimmed)
    pub source_url: String,
}

impl VideoReference {
    /// Canonical watch page URL
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }

    /// Default thumbnail served by YouTube's image CDN
    pub fn thumbnail_url(&self) -> String {
        format!("https://img.youtube.com/vi/{}/0.jpg", self.video_id)
    }
}

/// Check that a token has the shape of a YouTube video identifier
pub fn is_valid_video_id(id: &str) -> bool {
    id.len() == VIDEO_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Extract a video reference from a watch, short (youtu.be) or embed URL
pub fn normalize_url(input: &str) -> Result<VideoReference, AnalysisError> {
    let source_url = input.trim();

    let video_id = VIDEO_URL_PATTERN
        .captures(source_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| AnalysisError::InvalidUrl(source_url.to_string()))?;

    if !is_valid_video_id(video_id) {
        return Err(AnalysisError::InvalidUrl(format!(
            "{} (video id '{}' must be {} characters)",
            source_url, video_id, VIDEO_ID_LEN
        )));
    }

    tracing::debug!("Normalized {} to video id {}", source_url, video_id);

    Ok(VideoReference {
        video_id: video_id.to_string(),
        source_url: source_url.to_string(),
    })
}
