//! Metric aggregation: reduce k6 end-of-run metric summaries into the
//! flat structure the report and JSON summary are built from.
//!
//! Each known k6 metric maps to one extractor in [`EXTRACTORS`]. An extractor
//! only runs when its metric is present, and missing sub-fields read as 0.
//! Percentiles are taken as k6 computed them, never recomputed here.

use crate::record::MetricDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// k6 built-in request counter.
pub const HTTP_REQS: &str = "http_reqs";
/// k6 built-in request duration trend.
pub const HTTP_REQ_DURATION: &str = "http_req_duration";
/// k6 built-in failed-request rate.
pub const HTTP_REQ_FAILED: &str = "http_req_failed";
/// Custom counter emitted by the scale-to-zero scripts.
pub const COLD_START_REQUESTS: &str = "cold_start_requests";
/// Custom trend emitted by the scale-to-zero scripts.
pub const SCALE_UP_TIME: &str = "scale_up_time";

/// Derived metrics for one results file. A field is `None` when its source
/// metric never appeared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_requests: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_times: Option<ResponseTimes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cold_starts: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_up_times: Option<ScaleUpTimes>,
}

/// Request duration distribution, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseTimes {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub p50: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Scale-up latency, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleUpTimes {
    pub avg: f64,
    pub max: f64,
    pub p90: f64,
}

impl AnalysisResult {
    /// True when no known metric was found.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Error rate as a fraction, 0 when absent.
    pub fn error_rate_or_zero(&self) -> f64 {
        self.error_rate.unwrap_or(0.0)
    }

    /// p95 response time in ms, 0 when absent.
    pub fn p95_or_zero(&self) -> f64 {
        self.response_times.map(|rt| rt.p95).unwrap_or(0.0)
    }
}

type Extractor = fn(&MetricDefinition, &mut AnalysisResult);

/// Known metric name to the fields it populates.
const EXTRACTORS: &[(&str, Extractor)] = &[
    (HTTP_REQS, extract_requests),
    (HTTP_REQ_DURATION, extract_response_times),
    (HTTP_REQ_FAILED, extract_error_rate),
    (COLD_START_REQUESTS, extract_cold_starts),
    (SCALE_UP_TIME, extract_scale_up_times),
];

/// Build the analysis from parsed metric definitions.
pub fn analyze(metrics: &HashMap<String, MetricDefinition>) -> AnalysisResult {
    let mut result = AnalysisResult::default();
    for (name, extract) in EXTRACTORS {
        if let Some(def) = metrics.get(*name) {
            extract(def, &mut result);
        }
    }
    tracing::debug!(
        known = EXTRACTORS
            .iter()
            .filter(|(name, _)| metrics.contains_key(*name))
            .count(),
        total = metrics.len(),
        "aggregated metrics"
    );
    result
}

fn extract_requests(def: &MetricDefinition, out: &mut AnalysisResult) {
    // Counts are whole numbers; a fractional count truncates.
    out.total_requests = Some(def.count("count"));
    out.request_rate = Some(def.stat("rate"));
}

fn extract_response_times(def: &MetricDefinition, out: &mut AnalysisResult) {
    out.response_times = Some(ResponseTimes {
        avg: def.stat("avg"),
        min: def.stat("min"),
        max: def.stat("max"),
        p50: def.stat("med"),
        p90: def.stat("p(90)"),
        p95: def.stat("p(95)"),
        p99: def.stat("p(99)"),
    });
}

fn extract_error_rate(def: &MetricDefinition, out: &mut AnalysisResult) {
    out.error_rate = Some(def.stat("rate"));
}

fn extract_cold_starts(def: &MetricDefinition, out: &mut AnalysisResult) {
    // Truncates like total_requests.
    out.cold_starts = Some(def.count("count"));
}

fn extract_scale_up_times(def: &MetricDefinition, out: &mut AnalysisResult) {
    out.scale_up_times = Some(ScaleUpTimes {
        avg: def.stat("avg"),
        max: def.stat("max"),
        p90: def.stat("p(90)"),
    });
}
