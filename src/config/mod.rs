use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::summarize::gemini::DEFAULT_API_BASE_URL;
use crate::summarize::SummaryType;

/// Environment variables checked, in order, for the generative API key
pub const API_KEY_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generative model settings
    pub generation: GenerationConfig,

    /// Transcript retrieval settings
    pub transcript: TranscriptConfig,

    /// Analysis defaults
    pub analysis: AnalysisConfig,

    /// HTTP client settings
    pub http: HttpConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Model name, with or without the `models/` prefix
    pub model: String,

    /// Base URL of the Generative Language API
    pub api_base_url: String,

    /// Sampling temperature (model default when unset)
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Preferred caption languages, most preferred first
    pub languages: Vec<String>,
}

/// Where keyword and sentiment signals come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Ask the generative model
    Ai,
    /// Compute locally from the transcript
    Local,
}

impl std::fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisMode::Ai => write!(f, "ai"),
            AnalysisMode::Local => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub default_summary_type: SummaryType,

    /// Rows in the word-frequency table
    pub top_words: usize,

    pub max_keywords: usize,

    pub keywords_mode: AnalysisMode,

    pub sentiment_mode: AnalysisMode,

    /// Added to the built-in stopword list
    pub extra_stopwords: Vec<String>,

    /// Default toggles, overridable per run
    pub metadata: bool,
    pub statistics: bool,
    pub keywords: bool,
    pub sentiment: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout
    pub timeout_secs: u64,

    pub user_agent: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gemma-3-27b-it".to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            temperature: None,
        }
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_summary_type: SummaryType::BulletPoints,
            top_words: 10,
            max_keywords: 10,
            keywords_mode: AnalysisMode::Ai,
            sentiment_mode: AnalysisMode::Ai,
            extra_stopwords: Vec::new(),
            metadata: true,
            statistics: true,
            keywords: true,
            sentiment: true,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            user_agent: concat!("yt-summarizer/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            if let Err(e) = config.save_to(&config_path) {
                tracing::warn!("Could not write default config: {:#}", e);
            }
            Ok(config)
        }
    }

    /// Load and validate a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(path, content).context("Failed to write config file")?;

        tracing::debug!("Wrote config to {}", path.display());
        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("yt-summarizer").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.generation.model.trim().is_empty() {
            anyhow::bail!("generation.model must not be empty");
        }
        if self.transcript.languages.is_empty() {
            anyhow::bail!("transcript.languages must list at least one language");
        }
        if self.analysis.top_words == 0 {
            anyhow::bail!("analysis.top_words must be greater than 0");
        }
        if self.analysis.max_keywords == 0 {
            anyhow::bail!("analysis.max_keywords must be greater than 0");
        }
        if self.http.timeout_secs == 0 {
            anyhow::bail!("http.timeout_secs must be greater than 0");
        }
        url::Url::parse(&self.generation.api_base_url)
            .context("generation.api_base_url is not a valid URL")?;

        Ok(())
    }

    /// Read the generative API key from the environment (after `.env` loading)
    pub fn api_key() -> Result<String> {
        API_KEY_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .with_context(|| {
                format!(
                    "Missing API key: set {} in the environment or a .env file",
                    API_KEY_VARS.join(" or ")
                )
            })
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Model: {}", self.generation.model);
        println!("  API Base URL: {}", self.generation.api_base_url);
        if let Some(temperature) = self.generation.temperature {
            println!("  Temperature: {}", temperature);
        }
        println!("  Transcript Languages: {}", self.transcript.languages.join(", "));
        println!("  Default Summary Type: {}", self.analysis.default_summary_type);
        println!("  Top Words: {}", self.analysis.top_words);
        println!("  Max Keywords: {}", self.analysis.max_keywords);
        println!("  Keywords Mode: {}", self.analysis.keywords_mode);
        println!("  Sentiment Mode: {}", self.analysis.sentiment_mode);
        if !self.analysis.extra_stopwords.is_empty() {
            println!("  Extra Stopwords: {}", self.analysis.extra_stopwords.join(", "));
        }
        println!("  HTTP Timeout: {}s", self.http.timeout_secs);
    }
}
