use crate::cli::OutputFormat;

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0).round() as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Sanitize filename for safe filesystem usage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            c if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' => c,
            _ => '_',
        })
        .collect::<String>()
        .trim_matches('_')
        .to_string()
}

/// Default export file name for a single analysis
pub fn default_export_filename(format: OutputFormat, video_id: &str) -> String {
    let id = sanitize_filename(video_id);
    match format {
        OutputFormat::Summary => format!("summary_{}.txt", id),
        OutputFormat::Json => format!("analysis_{}.json", id),
        OutputFormat::Transcript => format!("transcript_{}.txt", id),
        OutputFormat::Text => format!("report_{}.txt", id),
    }
}

/// Default export file name for batch results
pub const BATCH_EXPORT_FILENAME: &str = "batch_results.json";
