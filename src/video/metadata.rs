use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::VideoReference;
use crate::Result;

const OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";

/// Descriptive information about a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    pub thumbnail_url: String,
}

/// Source of video metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn fetch_metadata(&self, video: &VideoReference) -> Result<VideoMetadata>;
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: String,
    author_name: Option<String>,
    thumbnail_url: Option<String>,
}

/// Metadata lookup through YouTube's public oEmbed endpoint
pub struct OEmbedClient {
    client: Client,
    endpoint: String,
}

impl OEmbedClient {
    pub fn new(client: Client) -> Self {
        Self::with_endpoint(client, OEMBED_ENDPOINT)
    }

    pub fn with_endpoint(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl MetadataProvider for OEmbedClient {
    async fn fetch_metadata(&self, video: &VideoReference) -> Result<VideoMetadata> {
        let url = Url::parse_with_params(
            &self.endpoint,
            &[("url", video.watch_url().as_str()), ("format", "json")],
        )
        .context("Invalid oEmbed endpoint")?;

        tracing::debug!("Fetching metadata from oEmbed: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to reach oEmbed endpoint")?;

        if !response.status().is_success() {
            anyhow::bail!("oEmbed lookup failed: HTTP {}", response.status());
        }

        let oembed: OEmbedResponse = response
            .json()
            .await
            .context("Failed to parse oEmbed response")?;

        Ok(VideoMetadata {
            title: oembed.title,
            author: oembed.author_name,
            thumbnail_url: oembed
                .thumbnail_url
                .unwrap_or_else(|| video.thumbnail_url()),
        })
    }
}
