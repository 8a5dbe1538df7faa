/// JSONL record parsing: turn k6 `--out json` output into typed metric
/// definitions and data points.
///
/// Ingestion is best-effort. Each line is parsed on its own and discarded if
/// it is not a well-formed `Metric` or `Point` record, so truncated or
/// partially corrupt result files still yield whatever they contain.
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// One parsed line of k6 output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RawRecord {
    Metric(MetricDefinition),
    Point(DataPoint),
}

/// End-of-run summary for a single metric.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MetricDefinition {
    pub name: String,
    /// Stat name (`count`, `rate`, `avg`, `med`, `p(95)`, ...) to value.
    /// Kept as raw JSON so one odd stat does not discard the metric.
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
}

impl MetricDefinition {
    /// Value of a stat, or 0 when k6 did not report it or it is not a number.
    pub fn stat(&self, key: &str) -> f64 {
        self.values.get(key).and_then(Value::as_f64).unwrap_or(0.0)
    }

    /// A stat interpreted as a count. Fractions truncate; negative and
    /// non-finite values collapse to 0.
    pub fn count(&self, key: &str) -> u64 {
        let v = self.stat(key);
        if v.is_finite() && v > 0.0 {
            v as u64
        } else {
            0
        }
    }
}

/// A single timestamped sample.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DataPoint {
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
}

/// Everything kept from one results file.
#[derive(Debug, Default)]
pub struct ParsedResults {
    pub metrics: HashMap<String, MetricDefinition>,
    pub points: Vec<DataPoint>,
}

/// Parse a single line. Returns `None` for anything that is not a
/// recognizable record.
pub fn parse_record(line: &[u8]) -> Option<RawRecord> {
    serde_json::from_slice(line).ok()
}

/// Parse newline-delimited k6 output. Only a failing reader is an error.
pub fn parse_lines<R: BufRead>(reader: R) -> std::io::Result<ParsedResults> {
    let mut parsed = ParsedResults::default();

    for line in reader.split(b'\n') {
        let mut line = line?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match parse_record(&line) {
            Some(RawRecord::Metric(def)) => {
                if def.name.is_empty() {
                    continue;
                }
                // Later summaries for the same metric replace earlier ones.
                parsed.metrics.insert(def.name.clone(), def);
            }
            Some(RawRecord::Point(point)) => parsed.points.push(point),
            None => continue,
        }
    }

    Ok(parsed)
}

/// Open and parse a k6 results file.
pub fn load_results(path: &Path) -> Result<ParsedResults, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    let parsed =
        parse_lines(std::io::BufReader::new(file)).map_err(|e| LoadError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

    tracing::debug!(
        path = %path.display(),
        metrics = parsed.metrics.len(),
        points = parsed.points.len(),
        "loaded results"
    );

    Ok(parsed)
}

/// Errors from reading a results file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open results file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read results file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}
