//! JSON summary: the analysis plus when and from what it was generated.

use crate::analysis::AnalysisResult;
use crate::output::{self, OutputError};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The document written to `<base>_summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub analysis: AnalysisResult,
    pub generated_at: DateTime<FixedOffset>,
    pub source_file: String,
}

impl Summary {
    pub fn new(analysis: AnalysisResult, generated_at: DateTime<FixedOffset>, source: &Path) -> Self {
        Self {
            analysis,
            generated_at,
            source_file: source.display().to_string(),
        }
    }

    /// Serialize as pretty JSON and write atomically.
    pub fn write(&self, path: &Path) -> Result<(), SummaryError> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| SummaryError::Serialize { source: e })?;
        output::write_atomic(path, json.as_bytes())?;
        Ok(())
    }

    /// Read a summary back from disk.
    #[cfg(test)]
    pub fn read(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Errors from summary file operations.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("failed to serialize summary: {source}")]
    Serialize { source: serde_json::Error },
    #[error(transparent)]
    Output(#[from] OutputError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ResponseTimes;
    use serde_json::Value;
    use tempfile::TempDir;

    fn generated_at() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-03-01T12:30:00.250+02:00").unwrap()
    }

    fn sample() -> Summary {
        Summary::new(
            AnalysisResult {
                total_requests: Some(500),
                request_rate: Some(8.333333333333334),
                response_times: Some(ResponseTimes {
                    avg: 120.0,
                    min: 5.0,
                    max: 900.0,
                    p50: 80.0,
                    p90: 300.0,
                    p95: 450.0,
                    p99: 800.0,
                }),
                error_rate: Some(0.01),
                ..Default::default()
            },
            generated_at(),
            Path::new("runs/results.json"),
        )
    }

    #[test]
    fn json_shape() {
        let v: Value = serde_json::to_value(sample()).unwrap();
        assert_eq!(v["source_file"], "runs/results.json");
        let stamp = v["generated_at"].as_str().unwrap();
        assert_eq!(DateTime::parse_from_rfc3339(stamp).unwrap(), generated_at());
        assert!(stamp.ends_with("+02:00"));
        assert_eq!(v["analysis"]["total_requests"], 500);
        assert_eq!(v["analysis"]["response_times"]["p95"], 450.0);
        assert!(v["analysis"].get("cold_starts").is_none());
    }

    #[test]
    fn empty_analysis_serializes_as_empty_object() {
        let summary = Summary::new(AnalysisResult::default(), generated_at(), Path::new("x.json"));
        let v: Value = serde_json::to_value(summary).unwrap();
        assert_eq!(v["analysis"], serde_json::json!({}));
    }

    #[test]
    fn write_and_read_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results_summary.json");
        let summary = sample();
        summary.write(&path).unwrap();

        let back = Summary::read(&path).unwrap();
        assert_eq!(back, summary);
    }

    #[test]
    fn write_and_read_keep_floats_exact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results_summary.json");
        let summary = Summary::new(
            AnalysisResult {
                request_rate: Some(20.566666666666666),
                error_rate: Some(0.1 + 0.2),
                ..Default::default()
            },
            generated_at(),
            Path::new("results.json"),
        );
        summary.write(&path).unwrap();

        let back = Summary::read(&path).unwrap();
        assert_eq!(back.analysis.request_rate, Some(20.566666666666666));
        assert_eq!(back.analysis.error_rate, Some(0.1 + 0.2));
    }

    #[test]
    fn write_to_missing_dir_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("summary.json");
        assert!(matches!(
            sample().write(&path),
            Err(SummaryError::Output(_))
        ));
    }
}
