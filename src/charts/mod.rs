#[cfg(feature = "charts")]
pub mod svg;

use crate::analysis::{AnalysisResult, HTTP_REQS, SCALE_UP_TIME};
use crate::config::ChartsConfig;
use crate::timeseries::{SeriesPoint, TimeSeries};
use std::path::{Path, PathBuf};

/// Fill color for a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarColor {
    Green,
    Yellow,
    Orange,
    Red,
}

/// One bar of a bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: &'static str,
    pub value: f64,
    pub color: BarColor,
}

/// A drawable chart, independent of any plotting backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    /// Labeled bars, each annotated with its value.
    PercentileBars {
        title: &'static str,
        x_label: &'static str,
        y_label: &'static str,
        bars: Vec<Bar>,
    },
    /// Values over time joined by a line.
    TimeLine {
        title: &'static str,
        y_label: &'static str,
        points: Vec<SeriesPoint>,
    },
    /// Values over time as unconnected markers.
    TimeScatter {
        title: &'static str,
        y_label: &'static str,
        points: Vec<SeriesPoint>,
    },
}

impl ChartSpec {
    pub fn title(&self) -> &'static str {
        match self {
            ChartSpec::PercentileBars { title, .. }
            | ChartSpec::TimeLine { title, .. }
            | ChartSpec::TimeScatter { title, .. } => *title,
        }
    }
}

/// Build the charts that apply to this analysis, in page order.
pub fn build_charts(analysis: &AnalysisResult, series: &TimeSeries) -> Vec<ChartSpec> {
    let mut charts = Vec::new();

    if let Some(rt) = &analysis.response_times {
        charts.push(ChartSpec::PercentileBars {
            title: "Response Time Percentiles",
            x_label: "Percentile",
            y_label: "Response Time (ms)",
            bars: vec![
                Bar { label: "50th", value: rt.p50, color: BarColor::Green },
                Bar { label: "90th", value: rt.p90, color: BarColor::Yellow },
                Bar { label: "95th", value: rt.p95, color: BarColor::Orange },
                Bar { label: "99th", value: rt.p99, color: BarColor::Red },
            ],
        });
    }

    if let Some(points) = series.get(HTTP_REQS).filter(|p| !p.is_empty()) {
        charts.push(ChartSpec::TimeLine {
            title: "Request Rate Over Time",
            y_label: "Requests/second",
            points: points.to_vec(),
        });
    }

    if let Some(points) = series.get(SCALE_UP_TIME).filter(|p| !p.is_empty()) {
        charts.push(ChartSpec::TimeScatter {
            title: "Scale-up Events Over Time",
            y_label: "Scale-up Time (ms)",
            points: points.to_vec(),
        });
    }

    charts
}

/// Writes a list of charts as one document, one page per chart.
pub trait ChartSink {
    /// Human-readable backend name (e.g., "svg").
    fn name(&self) -> &str;

    /// File extension of the produced document, without the dot.
    fn extension(&self) -> &str;

    /// Render `charts` to `path`. Called with at least one chart.
    fn write(&self, charts: &[ChartSpec], path: &Path) -> Result<(), ChartError>;
}

/// Resolve the plotting backend compiled into this build, if any.
#[cfg(feature = "charts")]
pub fn plotting_capability(config: &ChartsConfig) -> Option<Box<dyn ChartSink>> {
    Some(Box::new(svg::SvgChartSink::new(config.width, config.height)))
}

/// Resolve the plotting backend compiled into this build, if any.
#[cfg(not(feature = "charts"))]
pub fn plotting_capability(_config: &ChartsConfig) -> Option<Box<dyn ChartSink>> {
    None
}

/// Errors from chart rendering.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("failed to render chart {title:?} to {}: {message}", path.display())]
    Render {
        path: PathBuf,
        title: String,
        message: String,
    },
    #[error("failed to write charts to {}: {message}", path.display())]
    Write { path: PathBuf, message: String },
    #[error("chart document {} too tall: {pages} pages of height {height}", path.display())]
    TooLarge {
        path: PathBuf,
        pages: usize,
        height: u32,
    },
}
