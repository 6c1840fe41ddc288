use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Config;
use crate::pipeline::AnalysisOptions;
use crate::summarize::SummaryType;

#[derive(Parser)]
#[command(
    name = "ytsum",
    about = "YouTube Summarizer - AI summaries and transcript statistics for YouTube videos",
    version,
    long_about = "Fetches the transcript of a YouTube video, generates an AI summary in one of several styles, and reports word frequency, keywords and sentiment. Works on single videos or batches of URLs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize and analyze a single video
    Analyze {
        /// YouTube URL (watch, youtu.be, or embed)
        #[arg(value_name = "URL")]
        url: String,

        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE", conflicts_with = "save")]
        output: Option<PathBuf>,

        /// Save to the default export file name in the current directory
        #[arg(long)]
        save: bool,
    },

    /// Analyze several videos, one after another
    Batch {
        /// YouTube URLs
        #[arg(value_name = "URL")]
        urls: Vec<String>,

        /// File with one URL per line ("-" reads stdin)
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,

        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: BatchFormat,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE", conflicts_with = "save")]
        output: Option<PathBuf>,

        /// Save to batch_results.json in the current directory
        #[arg(long)]
        save: bool,
    },

    /// Show configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List available summary types
    SummaryTypes,
}

/// Per-run analysis flags shared by `analyze` and `batch`
#[derive(Args, Clone, Debug, Default)]
pub struct AnalysisArgs {
    /// Summary style (config default if not specified)
    #[arg(short = 't', long, value_enum)]
    pub summary_type: Option<SummaryType>,

    /// Skip the video title/author lookup
    #[arg(long)]
    pub no_metadata: bool,

    /// Skip the word-frequency table
    #[arg(long)]
    pub no_stats: bool,

    /// Skip keyword extraction
    #[arg(long)]
    pub no_keywords: bool,

    /// Skip sentiment analysis
    #[arg(long)]
    pub no_sentiment: bool,

    /// Preferred transcript language, most preferred first (repeatable)
    #[arg(short, long = "language", value_name = "LANG")]
    pub languages: Vec<String>,

    /// Rows in the word-frequency table
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub top_words: Option<u64>,
}

impl AnalysisArgs {
    /// Config defaults overridden by the flags given on the command line
    pub fn to_options(&self, config: &Config) -> AnalysisOptions {
        let mut options = AnalysisOptions::from_config(config);

        if let Some(summary_type) = self.summary_type {
            options.summary_type = summary_type;
        }
        if !self.languages.is_empty() {
            options.languages = self.languages.clone();
        }
        if let Some(top_words) = self.top_words {
            options.top_words = top_words as usize;
        }

        options.include_metadata &= !self.no_metadata;
        options.include_statistics &= !self.no_stats;
        options.extract_keywords &= !self.no_keywords;
        options.analyze_sentiment &= !self.no_sentiment;

        options
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// Full analysis as JSON
    Json,
    /// Summary text only
    Summary,
    /// Raw transcript only
    Transcript,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Summary => write!(f, "summary"),
            OutputFormat::Transcript => write!(f, "transcript"),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchFormat {
    /// Console table
    Table,
    /// JSON array of per-URL records
    Json,
}

impl std::fmt::Display for BatchFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchFormat::Table => write!(f, "table"),
            BatchFormat::Json => write!(f, "json"),
        }
    }
}
