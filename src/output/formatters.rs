use anyhow::Result;
use console::style;
use serde::Serialize;
use std::fmt::Write as _;

use crate::pipeline::{AnalysisResult, BatchResult};
use crate::utils::format_duration;

const RULE_WIDTH: usize = 60;

fn heading(text: &str, styled: bool) -> String {
    style(text).cyan().bold().force_styling(styled).to_string()
}

fn dim(text: &str, styled: bool) -> String {
    style(text).dim().force_styling(styled).to_string()
}

fn rule(styled: bool) -> String {
    dim(&"─".repeat(RULE_WIDTH), styled)
}

/// Format the full analysis as a human-readable report
pub fn format_as_text(result: &AnalysisResult, styled: bool) -> String {
    let mut out = String::new();
    let transcript = &result.transcript;

    // `write!` into a String cannot fail
    let _ = writeln!(out, "{}", rule(styled));
    match &result.metadata {
        Some(metadata) => {
            let _ = writeln!(out, "{}", heading(&metadata.title, styled));
            if let Some(author) = &metadata.author {
                let _ = writeln!(out, "{} {}", dim("by", styled), author);
            }
        }
        None => {
            let _ = writeln!(out, "{}", heading(&result.video.video_id, styled));
        }
    }
    let _ = writeln!(out, "{}", dim(&result.video.watch_url(), styled));
    let _ = writeln!(out, "{}", rule(styled));

    let _ = writeln!(out, "\n{}", heading("Transcript Statistics", styled));
    let _ = writeln!(out, "  Words: {}", transcript.word_count);
    let _ = writeln!(out, "  Characters: {}", transcript.char_count);
    let _ = writeln!(
        out,
        "  Estimated duration: {}",
        format_duration(transcript.estimated_duration_minutes * 60.0)
    );
    if let Some(seconds) = transcript.duration_seconds {
        let _ = writeln!(out, "  Video length: {}", format_duration(seconds));
    }
    let _ = writeln!(out, "  Speaking rate: {:.0} wpm", transcript.speaking_rate_wpm);
    if let Some(language) = &transcript.language_code {
        let _ = writeln!(out, "  Language: {}", language);
    }

    if let Some(words) = &result.word_frequency {
        let _ = writeln!(out, "\n{}", heading("Top Words", styled));
        if words.is_empty() {
            let _ = writeln!(out, "  {}", dim("(none)", styled));
        }
        for (rank, entry) in words.iter().enumerate() {
            let _ = writeln!(out, "  {:>2}. {:<20} {}", rank + 1, entry.word, entry.count);
        }
    }

    let _ = writeln!(
        out,
        "\n{}",
        heading(&format!("Summary ({})", result.summary_type.title()), styled)
    );
    let _ = writeln!(out, "{}", result.summary);

    if let Some(keywords) = &result.keywords {
        let _ = writeln!(out, "\n{}", heading("Keywords", styled));
        let _ = writeln!(out, "  {}", keywords.join(", "));
    }

    if let Some(sentiment) = &result.sentiment {
        let _ = writeln!(out, "\n{}", heading("Sentiment", styled));
        let _ = writeln!(out, "  {} ({:+.2})", sentiment.label, sentiment.score);
        if let Some(explanation) = &sentiment.explanation {
            let _ = writeln!(out, "  {}", explanation);
        }
    }

    if !result.warnings.is_empty() {
        let _ = writeln!(
            out,
            "\n{}",
            style("Warnings").yellow().bold().force_styling(styled)
        );
        for warning in &result.warnings {
            let _ = writeln!(out, "  • {}", warning);
        }
    }

    out
}

/// Format the analysis as pretty JSON
pub fn format_as_json(result: &AnalysisResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// One row of the batch JSON export
#[derive(Debug, Serialize)]
struct BatchRecord<'a> {
    input: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    word_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Format a batch run as a JSON array of per-URL records
pub fn format_batch_as_json(batch: &BatchResult) -> Result<String> {
    let records: Vec<BatchRecord<'_>> = batch
        .iter()
        .map(|entry| match &entry.outcome {
            Ok(result) => BatchRecord {
                input: &entry.input,
                status: "succeeded",
                video_id: Some(&result.video.video_id),
                title: result.metadata.as_ref().map(|m| m.title.as_str()),
                word_count: Some(result.transcript.word_count),
                summary: Some(&result.summary),
                error_kind: None,
                error: None,
            },
            Err(e) => BatchRecord {
                input: &entry.input,
                status: "failed",
                video_id: None,
                title: None,
                word_count: None,
                summary: None,
                error_kind: Some(e.kind()),
                error: Some(e.to_string()),
            },
        })
        .collect();

    Ok(serde_json::to_string_pretty(&records)?)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Format a batch run as a console table
pub fn format_batch_as_table(batch: &BatchResult, styled: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}",
        heading(
            &format!("{:>3}  {:<7}  {:<11}  {:>7}  {}", "#", "Status", "Video", "Words", "Title / Error"),
            styled
        )
    );
    let _ = writeln!(out, "{}", rule(styled));

    for (index, entry) in batch.iter().enumerate() {
        let row = match &entry.outcome {
            Ok(result) => format!(
                "{:>3}  {}  {:<11}  {:>7}  {}",
                index + 1,
                style(format!("{:<7}", "ok")).green().force_styling(styled),
                result.video.video_id,
                result.transcript.word_count,
                truncate(
                    result
                        .metadata
                        .as_ref()
                        .map(|m| m.title.as_str())
                        .unwrap_or("-"),
                    40
                )
            ),
            Err(e) => format!(
                "{:>3}  {}  {:<11}  {:>7}  {}",
                index + 1,
                style(format!("{:<7}", "failed")).red().force_styling(styled),
                "-",
                "-",
                truncate(&e.to_string(), 60)
            ),
        };
        let _ = writeln!(out, "{}", row);
    }

    let _ = writeln!(out, "{}", rule(styled));
    let _ = writeln!(
        out,
        "Processed {} of {} videos successfully ({} failed)",
        batch.success_count(),
        batch.len(),
        batch.failure_count()
    );

    out
}
