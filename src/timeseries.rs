//! Group k6 data points into per-metric time series.

use crate::record::DataPoint;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// One sample of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub time: DateTime<Utc>,
    pub value: f64,
}

/// Metric name to samples in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    series: BTreeMap<String, Vec<SeriesPoint>>,
}

impl TimeSeries {
    pub fn get(&self, metric: &str) -> Option<&[SeriesPoint]> {
        self.series.get(metric).map(Vec::as_slice)
    }

    /// Metric names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Number of distinct series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Parse an RFC 3339 timestamp with a `Z` or numeric offset.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Group points by metric name, keeping input order within each group.
///
/// Points without a metric, a parseable time, or a value are dropped.
pub fn group_points(points: &[DataPoint]) -> TimeSeries {
    let mut series: BTreeMap<String, Vec<SeriesPoint>> = BTreeMap::new();

    for point in points {
        let Some(metric) = point.metric.as_deref() else {
            continue;
        };
        let Some(time) = point.time.as_deref().and_then(parse_timestamp) else {
            tracing::trace!(metric, time = ?point.time, "dropping point without usable time");
            continue;
        };
        let Some(value) = point.value else {
            tracing::trace!(metric, "dropping point without value");
            continue;
        };

        series
            .entry(metric.to_string())
            .or_default()
            .push(SeriesPoint { time, value });
    }

    tracing::debug!(series = series.len(), "grouped data points");
    TimeSeries { series }
}
