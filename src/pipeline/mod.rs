use anyhow::Context;
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub mod batch;

pub use batch::{parse_url_list, BatchEntry, BatchResult};

use crate::analysis::{
    word_frequency, AiKeywordExtractor, AiSentimentAnalyzer, KeywordExtractor,
    LocalKeywordExtractor, LocalSentimentAnalyzer, Sentiment, SentimentAnalyzer, StopWords,
    WordCount,
};
use crate::config::{AnalysisMode, Config};
use crate::summarize::{GeminiClient, Generator, SummaryRequest, SummaryType, Summarizer};
use crate::transcript::{Transcript, TranscriptFetcher, YoutubeTranscriptFetcher};
use crate::video::{normalize_url, MetadataProvider, OEmbedClient, VideoMetadata, VideoReference};
use crate::{AnalysisError, Result};

/// Complete, immutable outcome of analyzing one video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub video: VideoReference,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VideoMetadata>,

    pub transcript: Transcript,

    pub summary_type: SummaryType,

    pub summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,

    /// Top-N words, most frequent first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_frequency: Option<Vec<WordCount>>,

    /// Non-fatal problems from optional stages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    pub generated_at: DateTime<Utc>,
}

/// Per-run analysis choices
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub summary_type: SummaryType,
    pub languages: Vec<String>,
    pub top_words: usize,
    pub include_metadata: bool,
    pub include_statistics: bool,
    pub extract_keywords: bool,
    pub analyze_sentiment: bool,
}

impl AnalysisOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            summary_type: config.analysis.default_summary_type,
            languages: config.transcript.languages.clone(),
            top_words: config.analysis.top_words,
            include_metadata: config.analysis.metadata,
            include_statistics: config.analysis.statistics,
            extract_keywords: config.analysis.keywords,
            analyze_sentiment: config.analysis.sentiment,
        }
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Main analysis pipeline: normalize, fetch, summarize, analyze
pub struct AnalysisPipeline {
    fetcher: Box<dyn TranscriptFetcher>,
    summarizer: Summarizer,
    metadata: Option<Box<dyn MetadataProvider>>,
    keywords: Box<dyn KeywordExtractor>,
    sentiment: Box<dyn SentimentAnalyzer>,
    stopwords: StopWords,
    show_progress: bool,
}

impl AnalysisPipeline {
    /// Pipeline with AI keyword/sentiment strategies and no metadata lookup
    pub fn new(fetcher: Box<dyn TranscriptFetcher>, generator: Arc<dyn Generator>) -> Self {
        Self {
            fetcher,
            summarizer: Summarizer::new(generator.clone()),
            metadata: None,
            keywords: Box::new(AiKeywordExtractor::new(generator.clone(), 10)),
            sentiment: Box::new(AiSentimentAnalyzer::new(generator)),
            stopwords: StopWords::default(),
            show_progress: false,
        }
    }

    /// Wire the production services described by the configuration
    pub fn from_config(config: &Config, api_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US"));

        let http = Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .user_agent(config.http.user_agent.as_str())
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        let generator: Arc<dyn Generator> = Arc::new(
            GeminiClient::new(http.clone(), api_key, config.generation.model.as_str())
                .with_base_url(config.generation.api_base_url.as_str())
                .with_temperature(config.generation.temperature),
        );

        let stopwords = StopWords::with_extra(&config.analysis.extra_stopwords);
        let max_keywords = config.analysis.max_keywords;

        let keywords: Box<dyn KeywordExtractor> = match config.analysis.keywords_mode {
            AnalysisMode::Ai => Box::new(AiKeywordExtractor::new(generator.clone(), max_keywords)),
            AnalysisMode::Local => {
                Box::new(LocalKeywordExtractor::new(stopwords.clone(), max_keywords))
            }
        };

        let sentiment: Box<dyn SentimentAnalyzer> = match config.analysis.sentiment_mode {
            AnalysisMode::Ai => Box::new(AiSentimentAnalyzer::new(generator.clone())),
            AnalysisMode::Local => Box::new(LocalSentimentAnalyzer),
        };

        tracing::debug!(
            "Pipeline configured: model={}, keywords={}, sentiment={}",
            config.generation.model,
            config.analysis.keywords_mode,
            config.analysis.sentiment_mode
        );

        Ok(Self::new(Box::new(YoutubeTranscriptFetcher::new(http.clone())), generator)
            .with_metadata_provider(Box::new(OEmbedClient::new(http)))
            .with_keyword_extractor(keywords)
            .with_sentiment_analyzer(sentiment)
            .with_stopwords(stopwords))
    }

    pub fn with_metadata_provider(mut self, provider: Box<dyn MetadataProvider>) -> Self {
        self.metadata = Some(provider);
        self
    }

    pub fn with_keyword_extractor(mut self, extractor: Box<dyn KeywordExtractor>) -> Self {
        self.keywords = extractor;
        self
    }

    pub fn with_sentiment_analyzer(mut self, analyzer: Box<dyn SentimentAnalyzer>) -> Self {
        self.sentiment = analyzer;
        self
    }

    pub fn with_stopwords(mut self, stopwords: StopWords) -> Self {
        self.stopwords = stopwords;
        self
    }

    /// Show spinners and progress bars on stderr
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Analyze a single video URL
    pub async fn analyze(
        &self,
        url: &str,
        options: &AnalysisOptions,
    ) -> std::result::Result<AnalysisResult, AnalysisError> {
        let progress = if self.show_progress {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.enable_steady_tick(Duration::from_millis(120));
            spinner
        } else {
            ProgressBar::hidden()
        };

        let result = self.run(url, options, &progress).await;

        match &result {
            Ok(_) => progress.finish_with_message("Analysis complete"),
            Err(_) => progress.finish_and_clear(),
        }

        result
    }

    async fn run(
        &self,
        url: &str,
        options: &AnalysisOptions,
        progress: &ProgressBar,
    ) -> std::result::Result<AnalysisResult, AnalysisError> {
        let video = normalize_url(url)?;
        tracing::info!("Analyzing video {}", video.video_id);

        progress.set_message(format!(
            "Fetching transcript from {}...",
            self.fetcher.source_name()
        ));
        let transcript = self
            .fetcher
            .fetch_transcript(&video, &options.languages)
            .await?;
        tracing::info!(
            "Fetched transcript for {}: {} words",
            video.video_id,
            transcript.word_count
        );

        let mut warnings = Vec::new();

        let metadata = match (&self.metadata, options.include_metadata) {
            (Some(provider), true) => {
                progress.set_message("Looking up video metadata...");
                match provider.fetch_metadata(&video).await {
                    Ok(metadata) => Some(metadata),
                    Err(e) => {
                        tracing::warn!("Metadata lookup failed for {}: {:#}", video.video_id, e);
                        warnings.push(format!("Video metadata unavailable: {:#}", e));
                        None
                    }
                }
            }
            _ => None,
        };

        progress.set_message(format!("Generating {} summary...", options.summary_type));
        let summary = self
            .summarizer
            .summarize(SummaryRequest {
                transcript_text: &transcript.raw_text,
                summary_type: options.summary_type,
            })
            .await?;

        let word_frequency = options
            .include_statistics
            .then(|| word_frequency(&transcript.raw_text, &self.stopwords, options.top_words));

        let keywords = if options.extract_keywords {
            progress.set_message("Extracting keywords...");
            match self.keywords.extract_keywords(&transcript).await {
                Ok(keywords) => Some(keywords),
                Err(e) => {
                    tracing::warn!("Keyword extraction failed for {}: {:#}", video.video_id, e);
                    warnings.push(format!("Keyword extraction failed: {:#}", e));
                    None
                }
            }
        } else {
            None
        };

        let sentiment = if options.analyze_sentiment {
            progress.set_message("Analyzing sentiment...");
            match self.sentiment.analyze_sentiment(&transcript).await {
                Ok(sentiment) => Some(sentiment),
                Err(e) => {
                    tracing::warn!("Sentiment analysis failed for {}: {:#}", video.video_id, e);
                    warnings.push(format!("Sentiment analysis failed: {:#}", e));
                    None
                }
            }
        } else {
            None
        };

        Ok(AnalysisResult {
            video,
            metadata,
            transcript,
            summary_type: options.summary_type,
            summary,
            keywords,
            sentiment,
            word_frequency,
            warnings,
            generated_at: Utc::now(),
        })
    }

    /// Analyze each URL in order; one failure never stops the rest
    pub async fn run_batch(&self, urls: &[String], options: &AnalysisOptions) -> BatchResult {
        let progress = if self.show_progress {
            let bar = ProgressBar::new(urls.len() as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        let mut entries = Vec::with_capacity(urls.len());

        for (index, url) in urls.iter().enumerate() {
            tracing::info!("Processing video {}/{}: {}", index + 1, urls.len(), url);

            let outcome = self.run(url, options, &progress).await;
            if let Err(e) = &outcome {
                tracing::warn!("Failed to analyze {}: {}", url, e);
            }

            entries.push(BatchEntry {
                input: url.clone(),
                outcome,
            });
            progress.inc(1);
        }

        progress.finish_with_message("Batch processing complete");

        BatchResult { entries }
    }
}
