use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::{BatchFormat, OutputFormat};
use crate::pipeline::{AnalysisResult, BatchResult};

pub mod formatters;

pub use formatters::*;

/// Render one analysis in the requested format
pub fn render(result: &AnalysisResult, format: OutputFormat, styled: bool) -> Result<String> {
    let content = match format {
        OutputFormat::Text => format_as_text(result, styled),
        OutputFormat::Json => format_as_json(result)?,
        OutputFormat::Summary => result.summary.clone(),
        OutputFormat::Transcript => result.transcript.raw_text.clone(),
    };
    Ok(content)
}

/// Render a batch run in the requested format
pub fn render_batch(batch: &BatchResult, format: BatchFormat, styled: bool) -> Result<String> {
    match format {
        BatchFormat::Table => Ok(format_batch_as_table(batch, styled)),
        BatchFormat::Json => format_batch_as_json(batch),
    }
}

/// Save analysis result to file
pub fn save_to_file(result: &AnalysisResult, path: &Path, format: OutputFormat) -> Result<()> {
    let content = render(result, format, false)?;
    write_file(path, &content)
}

/// Print analysis result to console
pub fn print_to_console(result: &AnalysisResult, format: OutputFormat) -> Result<()> {
    let content = render(result, format, console::colors_enabled())?;
    println!("{}", content);
    Ok(())
}

/// Save batch results to file
pub fn save_batch_to_file(batch: &BatchResult, path: &Path, format: BatchFormat) -> Result<()> {
    let content = render_batch(batch, format, false)?;
    write_file(path, &content)
}

/// Print batch results to console
pub fn print_batch_to_console(batch: &BatchResult, format: BatchFormat) -> Result<()> {
    let content = render_batch(batch, format, console::colors_enabled())?;
    println!("{}", content);
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent)?;
    }
    fs_err::write(path, content)
        .with_context(|| format!("Failed to write output to {}", path.display()))?;
    tracing::debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
