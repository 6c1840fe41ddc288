use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::{Transcript, TranscriptFetcher};
use crate::video::VideoReference;
use crate::AnalysisError;

const YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

// Client identity sent to the InnerTube player endpoint
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

static INNERTUBE_API_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("api key pattern is valid")
});

/// A caption track advertised by the player response
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub language_code: String,
    pub base_url: String,
    /// Auto-generated (ASR) track
    pub is_generated: bool,
}

#[derive(Debug, Deserialize)]
struct Json3Transcript {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(rename = "tStartMs", default)]
    start_ms: Option<u64>,
    #[serde(rename = "dDurationMs", default)]
    duration_ms: Option<u64>,
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Transcript fetcher backed by YouTube's watch page, InnerTube player API and timedtext tracks
pub struct YoutubeTranscriptFetcher {
    client: Client,
    base_url: String,
}

impl YoutubeTranscriptFetcher {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, YOUTUBE_BASE_URL)
    }

    /// Point the fetcher at a different host (used by tests)
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_watch_page(&self, video_id: &str) -> Result<String, AnalysisError> {
        let url = format!("{}/watch", self.base_url);
        tracing::debug!("Fetching watch page for {}", video_id);

        let response = self
            .client
            .get(&url)
            .query(&[("v", video_id)])
            .send()
            .await
            .map_err(|e| upstream("Failed to fetch watch page", e))?;

        let response = check_http_status(response)?;
        response
            .text()
            .await
            .map_err(|e| upstream("Failed to read watch page", e))
    }

    async fn fetch_player_response(
        &self,
        video_id: &str,
        api_key: &str,
    ) -> Result<Value, AnalysisError> {
        let url = format!("{}/youtubei/v1/player", self.base_url);
        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION
                }
            },
            "videoId": video_id
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| upstream("Failed to query player API", e))?;

        let response = check_http_status(response)?;
        response
            .json()
            .await
            .map_err(|e| upstream("Failed to parse player response", e))
    }

    async fn fetch_track(&self, track: &CaptionTrack) -> Result<String, AnalysisError> {
        let url = json3_track_url(&track.base_url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| upstream("Failed to fetch caption track", e))?;

        let response = check_http_status(response)?;
        response
            .text()
            .await
            .map_err(|e| upstream("Failed to read caption track", e))
    }
}

#[async_trait]
impl TranscriptFetcher for YoutubeTranscriptFetcher {
    async fn fetch_transcript(
        &self,
        video: &VideoReference,
        languages: &[String],
    ) -> Result<Transcript, AnalysisError> {
        let video_id = video.video_id.as_str();

        let html = self.fetch_watch_page(video_id).await?;
        let api_key = extract_innertube_api_key(&html)?;

        let player = self.fetch_player_response(video_id, &api_key).await?;
        assert_playability(video_id, &player)?;

        let tracks = parse_caption_tracks(video_id, &player)?;
        let track = select_track(&tracks, languages).ok_or_else(|| {
            AnalysisError::NoTranscriptFound {
                video_id: video_id.to_string(),
                languages: languages.to_vec(),
            }
        })?;

        if track.base_url.contains("&exp=xpe") {
            return Err(AnalysisError::Upstream(format!(
                "caption track for {} requires a proof-of-origin token",
                video_id
            )));
        }

        tracing::info!(
            "Using {} caption track '{}' for {}",
            if track.is_generated { "auto-generated" } else { "manual" },
            track.language_code,
            video_id
        );

        let body = self.fetch_track(track).await?;
        let (text, duration_seconds) = parse_json3(&body)?;

        if text.is_empty() {
            return Err(AnalysisError::NoTranscriptFound {
                video_id: video_id.to_string(),
                languages: languages.to_vec(),
            });
        }

        Ok(Transcript::with_details(
            video_id,
            text,
            Some(track.language_code.clone()),
            duration_seconds,
        ))
    }

    fn source_name(&self) -> &'static str {
        "YouTube"
    }
}

fn upstream(context: &str, err: reqwest::Error) -> AnalysisError {
    AnalysisError::Upstream(format!("{}: {}", context, err))
}

fn check_http_status(response: Response) -> Result<Response, AnalysisError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(AnalysisError::Upstream(
            "YouTube is rate limiting requests (HTTP 429)".to_string(),
        ));
    }
    if !status.is_success() {
        return Err(AnalysisError::Upstream(format!("HTTP {}", status)));
    }
    Ok(response)
}

/// Caption track URL with its format forced to json3
pub fn json3_track_url(base_url: &str) -> Result<Url, AnalysisError> {
    let mut url = Url::parse(base_url).map_err(|e| {
        AnalysisError::Upstream(format!("Invalid caption track URL '{}': {}", base_url, e))
    })?;

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "fmt")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("fmt", "json3");

    Ok(url)
}

/// Pull the InnerTube API key out of a watch page
pub fn extract_innertube_api_key(html: &str) -> Result<String, AnalysisError> {
    if html.contains("g-recaptcha") {
        return Err(AnalysisError::Upstream(
            "YouTube is blocking requests from this IP (captcha challenge)".to_string(),
        ));
    }

    INNERTUBE_API_KEY
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| AnalysisError::Upstream("Could not parse YouTube watch page".to_string()))
}

/// Classify a non-playable player response
pub fn assert_playability(video_id: &str, player: &Value) -> Result<(), AnalysisError> {
    let Some(playability) = player.get("playabilityStatus") else {
        return Ok(());
    };

    let status = playability["status"].as_str().unwrap_or("");
    if status == "OK" {
        return Ok(());
    }

    let reason = playability["reason"].as_str().unwrap_or("");
    if status == "ERROR" && reason.to_lowercase().contains("unavailable") {
        return Err(AnalysisError::VideoUnavailable(video_id.to_string()));
    }

    Err(AnalysisError::Upstream(format!(
        "video {} is not playable ({}): {}",
        video_id,
        status,
        if reason.is_empty() { "no reason given" } else { reason }
    )))
}

/// List caption tracks in a player response
pub fn parse_caption_tracks(
    video_id: &str,
    player: &Value,
) -> Result<Vec<CaptionTrack>, AnalysisError> {
    let tracks: Vec<CaptionTrack> = player
        .pointer("/captions/playerCaptionsTracklistRenderer/captionTracks")
        .and_then(|t| t.as_array())
        .map(|tracks| {
            tracks
                .iter()
                .filter_map(|track| {
                    Some(CaptionTrack {
                        language_code: track["languageCode"].as_str()?.to_string(),
                        base_url: track["baseUrl"].as_str()?.to_string(),
                        is_generated: track["kind"].as_str() == Some("asr"),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(AnalysisError::TranscriptsDisabled(video_id.to_string()));
    }

    Ok(tracks)
}

/// Pick the first track matching the language preference, manual tracks first per language
pub fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|lang| {
        tracks
            .iter()
            .find(|t| !t.is_generated && t.language_code == *lang)
            .or_else(|| tracks.iter().find(|t| t.is_generated && t.language_code == *lang))
    })
}

/// Join the text of a json3 caption track; returns the text and the spoken span in seconds
pub fn parse_json3(body: &str) -> Result<(String, Option<f64>), AnalysisError> {
    let transcript: Json3Transcript = serde_json::from_str(body)
        .map_err(|e| AnalysisError::Upstream(format!("Failed to parse caption track: {}", e)))?;

    let text = transcript
        .events
        .iter()
        .map(|event| event.segs.iter().map(|s| s.utf8.as_str()).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let end_ms = transcript
        .events
        .iter()
        .filter_map(|e| e.start_ms.map(|start| start + e.duration_ms.unwrap_or(0)))
        .max();

    Ok((text, end_ms.map(|ms| ms as f64 / 1000.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::normalize_url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn track(lang: &str, generated: bool) -> CaptionTrack {
        CaptionTrack {
            language_code: lang.to_string(),
            base_url: format!("https://example.com/{lang}"),
            is_generated: generated,
        }
    }

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_api_key() {
        let html = r#"<script>ytcfg.set({"INNERTUBE_API_KEY": "AIzaSyA-test_key"});</script>"#;
        assert_eq!(extract_innertube_api_key(html).unwrap(), "AIzaSyA-test_key");
    }

    #[test]
    fn test_extract_api_key_captcha() {
        let err = extract_innertube_api_key(r#"<div class="g-recaptcha"></div>"#).unwrap_err();
        assert!(matches!(err, AnalysisError::Upstream(msg) if msg.contains("captcha")));
    }

    #[test]
    fn test_extract_api_key_missing() {
        assert!(matches!(
            extract_innertube_api_key("<html></html>"),
            Err(AnalysisError::Upstream(_))
        ));
    }

    #[test]
    fn test_playability_classification() {
        let ok = json!({ "playabilityStatus": { "status": "OK" } });
        assert!(assert_playability("id", &ok).is_ok());
        assert!(assert_playability("id", &json!({})).is_ok());

        let unavailable = json!({
            "playabilityStatus": { "status": "ERROR", "reason": "This video is unavailable" }
        });
        assert_eq!(
            assert_playability("id", &unavailable),
            Err(AnalysisError::VideoUnavailable("id".to_string()))
        );

        let login = json!({
            "playabilityStatus": { "status": "LOGIN_REQUIRED", "reason": "Sign in to confirm your age" }
        });
        assert!(matches!(
            assert_playability("id", &login),
            Err(AnalysisError::Upstream(msg)) if msg.contains("LOGIN_REQUIRED")
        ));
    }

    #[test]
    fn test_missing_captions_means_disabled() {
        let player = json!({ "playabilityStatus": { "status": "OK" } });
        assert_eq!(
            parse_caption_tracks("id", &player),
            Err(AnalysisError::TranscriptsDisabled("id".to_string()))
        );

        let empty = json!({
            "captions": { "playerCaptionsTracklistRenderer": { "captionTracks": [] } }
        });
        assert!(matches!(
            parse_caption_tracks("id", &empty),
            Err(AnalysisError::TranscriptsDisabled(_))
        ));
    }

    #[test]
    fn test_parse_caption_tracks() {
        let player = json!({
            "captions": { "playerCaptionsTracklistRenderer": { "captionTracks": [
                { "languageCode": "en", "baseUrl": "https://x/en", "kind": "asr" },
                { "languageCode": "de", "baseUrl": "https://x/de" },
                { "baseUrl": "https://x/missing-lang" }
            ] } }
        });
        let tracks = parse_caption_tracks("id", &player).unwrap();
        assert_eq!(tracks.len(), 2);
        assert!(tracks[0].is_generated);
        assert!(!tracks[1].is_generated);
    }

    #[test]
    fn test_select_track_prefers_manual_then_language_order() {
        let tracks = vec![track("en", true), track("en", false), track("de", false)];

        let selected = select_track(&tracks, &langs(&["en"])).unwrap();
        assert!(!selected.is_generated);

        let selected = select_track(&tracks, &langs(&["fr", "de", "en"])).unwrap();
        assert_eq!(selected.language_code, "de");

        let generated_only = vec![track("en", true)];
        assert!(select_track(&generated_only, &langs(&["en"])).unwrap().is_generated);

        assert!(select_track(&tracks, &langs(&["fr"])).is_none());
    }

    #[test]
    fn test_parse_json3() {
        let body = json!({
            "events": [
                { "tStartMs": 0, "dDurationMs": 1500, "segs": [{ "utf8": "hello" }, { "utf8": " world" }] },
                { "tStartMs": 1500, "dDurationMs": 10 },
                { "tStartMs": 1600, "dDurationMs": 2400, "segs": [{ "utf8": "\n" }] },
                { "tStartMs": 2000, "dDurationMs": 3000, "segs": [{ "utf8": "again\nand  again" }] }
            ]
        })
        .to_string();

        let (text, duration) = parse_json3(&body).unwrap();
        assert_eq!(text, "hello world again and again");
        assert_eq!(duration, Some(5.0));
    }

    #[test]
    fn test_json3_track_url_replaces_format() {
        let url = json3_track_url("https://www.youtube.com/api/timedtext?v=abc&fmt=srv3&lang=en").unwrap();
        assert_eq!(url.as_str(), "https://www.youtube.com/api/timedtext?v=abc&lang=en&fmt=json3");

        let leading = json3_track_url("https://www.youtube.com/api/timedtext?fmt=srv3&v=abc").unwrap();
        assert_eq!(leading.as_str(), "https://www.youtube.com/api/timedtext?v=abc&fmt=json3");

        let fmts: Vec<_> = leading.query_pairs().filter(|(k, _)| k == "fmt").collect();
        assert_eq!(fmts.len(), 1);

        let bare = json3_track_url("https://www.youtube.com/api/timedtext").unwrap();
        assert_eq!(bare.as_str(), "https://www.youtube.com/api/timedtext?fmt=json3");
    }

    #[test]
    fn test_json3_track_url_invalid() {
        assert!(matches!(json3_track_url("not a url"), Err(AnalysisError::Upstream(_))));
    }

    #[test]
    fn test_parse_json3_invalid() {
        assert!(matches!(parse_json3("<xml/>"), Err(AnalysisError::Upstream(_))));
    }

    async fn mount_watch_page(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/watch"))
            .and(query_param("v", "dQw4w9WgXcQ"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"INNERTUBE_API_KEY":"test-key"}"#),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_transcript_end_to_end() {
        let server = MockServer::start().await;
        mount_watch_page(&server).await;

        Mock::given(method("POST"))
            .and(path("/youtubei/v1/player"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "playabilityStatus": { "status": "OK" },
                "captions": { "playerCaptionsTracklistRenderer": { "captionTracks": [
                    { "languageCode": "en", "baseUrl": format!("{}/api/timedtext?v=dQw4w9WgXcQ&lang=en&fmt=srv3", server.uri()) }
                ] } }
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/timedtext"))
            .and(query_param("fmt", "json3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "events": [
                    { "tStartMs": 0, "dDurationMs": 30000, "segs": [{ "utf8": "never gonna give you up" }] },
                    { "tStartMs": 30000, "dDurationMs": 30000, "segs": [{ "utf8": "never gonna let you down" }] }
                ]
            })))
            .mount(&server)
            .await;

        let fetcher = YoutubeTranscriptFetcher::with_base_url(Client::new(), server.uri());
        let video = normalize_url("https://youtu.be/dQw4w9WgXcQ").unwrap();
        let transcript = fetcher.fetch_transcript(&video, &langs(&["en"])).await.unwrap();

        assert_eq!(transcript.video_id, "dQw4w9WgXcQ");
        assert_eq!(transcript.raw_text, "never gonna give you up never gonna let you down");
        assert_eq!(transcript.word_count, 10);
        assert_eq!(transcript.duration_seconds, Some(60.0));
        assert_eq!(transcript.speaking_rate_wpm, 10.0);
        assert_eq!(transcript.language_code.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_fetch_transcript_language_not_found() {
        let server = MockServer::start().await;
        mount_watch_page(&server).await;

        Mock::given(method("POST"))
            .and(path("/youtubei/v1/player"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "playabilityStatus": { "status": "OK" },
                "captions": { "playerCaptionsTracklistRenderer": { "captionTracks": [
                    { "languageCode": "de", "baseUrl": "https://unused.example/de" }
                ] } }
            })))
            .mount(&server)
            .await;

        let fetcher = YoutubeTranscriptFetcher::with_base_url(Client::new(), server.uri());
        let video = normalize_url("https://youtu.be/dQw4w9WgXcQ").unwrap();
        let err = fetcher.fetch_transcript(&video, &langs(&["en", "fr"])).await.unwrap_err();

        assert_eq!(
            err,
            AnalysisError::NoTranscriptFound {
                video_id: "dQw4w9WgXcQ".to_string(),
                languages: langs(&["en", "fr"]),
            }
        );
    }

    #[tokio::test]
    async fn test_rate_limit_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/watch"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let fetcher = YoutubeTranscriptFetcher::with_base_url(Client::new(), server.uri());
        let video = normalize_url("https://youtu.be/dQw4w9WgXcQ").unwrap();
        let err = fetcher.fetch_transcript(&video, &langs(&["en"])).await.unwrap_err();

        assert!(matches!(err, AnalysisError::Upstream(msg) if msg.contains("429")));
    }
}
