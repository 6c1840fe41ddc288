use super::AnalysisResult;
use crate::AnalysisError;

/// Outcome for one input of a batch run
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    /// URL exactly as supplied
    pub input: String,
    pub outcome: Result<AnalysisResult, AnalysisError>,
}

impl BatchEntry {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Ordered outcomes of a batch run, one per input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    pub entries: Vec<BatchEntry>,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BatchEntry> {
        self.entries.iter()
    }
}

/// One URL per line; blank lines and `#` comments are skipped
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_list() {
        let text = "https://youtu.be/dQw4w9WgXcQ\n\n   \n# watch later\n  https://www.youtube.com/watch?v=aaaaaaaaaaa  \r\n";
        assert_eq!(
            parse_url_list(text),
            vec![
                "https://youtu.be/dQw4w9WgXcQ",
                "https://www.youtube.com/watch?v=aaaaaaaaaaa"
            ]
        );
    }

    #[test]
    fn test_counts() {
        let batch = BatchResult {
            entries: vec![BatchEntry {
                input: "nope".to_string(),
                outcome: Err(AnalysisError::InvalidUrl("nope".to_string())),
            }],
        };
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.success_count(), 0);
        assert_eq!(batch.failure_count(), 1);
        assert!(BatchResult::default().is_empty());
    }
}
