/// One analysis run: load a results file, derive the analysis, and write
/// the text report, charts, and JSON summary.
use crate::analysis::{self, AnalysisResult};
use crate::charts::{self, ChartError, ChartSink};
use crate::config::ConfigError;
use crate::output::{self, OutputDir, OutputError};
use crate::record::{self, LoadError};
use crate::report;
use crate::summary::{Summary, SummaryError};
use crate::timeseries::{self, TimeSeries};
use chrono::{DateTime, FixedOffset, Local};
use std::fmt::Display;
use std::path::PathBuf;

/// Resolved settings for a run (CLI flags merged over config).
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub charts: bool,
    /// Echo the text report to stdout as well as writing it.
    pub print_report: bool,
    /// Suppress progress messages.
    pub quiet: bool,
}

/// What a successful run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub analysis: AnalysisResult,
    pub text_report: PathBuf,
    pub charts: Option<PathBuf>,
    pub summary: PathBuf,
}

/// User-facing progress messages on stdout.
struct Console {
    quiet: bool,
}

impl Console {
    fn say(&self, msg: impl Display) {
        if !self.quiet {
            println!("{msg}");
        }
    }
}

/// Run the full pipeline. `sink` is the plotting capability resolved at
/// startup; `None` turns chart generation into a no-op.
pub fn run(opts: &RunOptions, sink: Option<&dyn ChartSink>) -> Result<RunOutcome, AnalyzeError> {
    if !opts.input.exists() {
        return Err(AnalyzeError::InputNotFound(opts.input.clone()));
    }

    let console = Console { quiet: opts.quiet };
    let out = OutputDir::new(&opts.output_dir, &opts.input);
    out.ensure()?;
    tracing::debug!(dir = %out.root().display(), base = out.base(), "output layout");

    console.say(format_args!(
        "Loading results from {}...",
        opts.input.display()
    ));
    let parsed = record::load_results(&opts.input)?;

    console.say("Analyzing results...");
    let analysis = analysis::analyze(&parsed.metrics);
    let series = timeseries::group_points(&parsed.points);
    if series.is_empty() {
        tracing::debug!("no time series in results");
    } else {
        tracing::debug!(
            count = series.len(),
            series = ?series.names().collect::<Vec<_>>(),
            "time series available"
        );
    }

    let now = Local::now();

    let text = report::render_text(&analysis, &now);
    let text_report = out.text_report();
    output::write_atomic(&text_report, text.as_bytes())?;
    if opts.print_report {
        println!("{text}");
    }
    console.say(format_args!("Text report saved to: {}", text_report.display()));

    let charts = if opts.charts {
        write_charts(&out, &analysis, &series, sink, &console)?
    } else {
        tracing::debug!("chart generation disabled");
        None
    };

    let summary_path = out.summary();
    let generated_at: DateTime<FixedOffset> = now.into();
    let summary = Summary::new(analysis, generated_at, &opts.input);
    summary.write(&summary_path)?;
    console.say(format_args!("JSON summary saved to: {}", summary_path.display()));
    console.say("\nAnalysis complete!");

    Ok(RunOutcome {
        analysis: summary.analysis,
        text_report,
        charts,
        summary: summary_path,
    })
}

fn write_charts(
    out: &OutputDir,
    analysis: &AnalysisResult,
    series: &TimeSeries,
    sink: Option<&dyn ChartSink>,
    console: &Console,
) -> Result<Option<PathBuf>, AnalyzeError> {
    let Some(sink) = sink else {
        console.say("Cannot generate charts: plotting support not available");
        return Ok(None);
    };

    let specs = charts::build_charts(analysis, series);
    if specs.is_empty() {
        tracing::info!("no chartable metrics in results, skipping charts");
        return Ok(None);
    }

    let path = out.charts(sink.extension());
    tracing::debug!(backend = sink.name(), pages = specs.len(), "rendering charts");
    sink.write(&specs, &path)?;
    console.say(format_args!("Charts saved to: {}", path.display()));
    Ok(Some(path))
}

/// Fatal errors for a run.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("results file {} not found", .0.display())]
    InputNotFound(PathBuf),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error(transparent)]
    Charts(#[from] ChartError),
    #[error(transparent)]
    Summary(#[from] SummaryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartSpec;
    use std::cell::RefCell;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    /// Records what it was asked to draw and writes the titles to `path`.
    #[derive(Default)]
    struct RecordingSink {
        calls: RefCell<Vec<Vec<ChartSpec>>>,
    }

    impl ChartSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        fn extension(&self) -> &str {
            "txt"
        }

        fn write(&self, charts: &[ChartSpec], path: &Path) -> Result<(), ChartError> {
            let titles: Vec<_> = charts.iter().map(ChartSpec::title).collect();
            std::fs::write(path, titles.join("\n")).map_err(|e| ChartError::Write {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            self.calls.borrow_mut().push(charts.to_vec());
            Ok(())
        }
    }

    const FULL_RUN: &[&str] = &[
        r#"{"type":"Metric","data":{"name":"http_reqs","values":{"count":1500,"rate":25}}}"#,
        r#"{"type":"Metric","data":{"name":"http_req_duration","values":{"avg":120,"min":5,"max":900,"med":80,"p(90)":300,"p(95)":450,"p(99)":800}}}"#,
        r#"{"type":"Metric","data":{"name":"http_req_failed","values":{"rate":0.03}}}"#,
        r#"{"type":"Metric","data":{"name":"cold_start_requests","values":{"count":2}}}"#,
        r#"{"type":"Metric","data":{"name":"scale_up_time","values":{"avg":2100,"max":4000,"p(90)":3500}}}"#,
        r#"{"type":"Point","data":{"metric":"http_reqs","time":"2024-03-01T12:00:00Z","value":1}}"#,
        r#"{"type":"Point","data":{"metric":"http_reqs","time":"2024-03-01T12:00:01Z","value":1}}"#,
        r#"{"type":"Point","data":{"metric":"scale_up_time","time":"2024-03-01T12:00:03+00:00","value":2100}}"#,
        r#"{"type":"Point","data":{"time":"2024-03-01T12:00:04Z","value":9}}"#,
        "garbage line",
    ];

    fn write_results(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(f, "{}", line).unwrap();
        }
        path
    }

    fn options(input: PathBuf, output_dir: PathBuf, charts: bool) -> RunOptions {
        RunOptions {
            input,
            output_dir,
            charts,
            print_report: false,
            quiet: true,
        }
    }

    #[test]
    fn missing_input_is_fatal_and_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let out_dir = dir.path().join("analysis");
        let opts = options(dir.path().join("nope.json"), out_dir.clone(), true);

        let err = run(&opts, None).unwrap_err();
        assert!(matches!(err, AnalyzeError::InputNotFound(_)));
        assert!(err.to_string().contains("nope.json"));
        assert!(!out_dir.exists());
    }

    #[test]
    fn full_run_writes_all_outputs() {
        let dir = TempDir::new().unwrap();
        let input = write_results(dir.path(), "spike.json", FULL_RUN);
        let out_dir = dir.path().join("out").join("nested");
        let sink = RecordingSink::default();

        let outcome = run(&options(input.clone(), out_dir.clone(), true), Some(&sink as &dyn ChartSink)).unwrap();

        assert_eq!(outcome.text_report, out_dir.join("spike_analysis.txt"));
        assert_eq!(outcome.summary, out_dir.join("spike_summary.json"));
        assert_eq!(outcome.charts, Some(out_dir.join("spike_charts.txt")));

        let text = std::fs::read_to_string(&outcome.text_report).unwrap();
        assert!(text.contains("Total Requests: 1,500"));
        assert!(text.contains("✅ Error Rate: GOOD (< 5%)"));
        assert!(text.contains("Cold Starts Detected: 2"));

        let calls = sink.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 3);
        // The point without a metric reached no chart.
        match &calls[0][1] {
            ChartSpec::TimeLine { points, .. } => assert_eq!(points.len(), 2),
            other => panic!("expected request rate line, got {other:?}"),
        }

        let summary = Summary::read(&outcome.summary).unwrap();
        assert_eq!(summary.analysis, outcome.analysis);
        assert_eq!(summary.source_file, input.display().to_string());
        assert_eq!(summary.analysis.total_requests, Some(1500));
        assert_eq!(summary.analysis.error_rate, Some(0.03));
    }

    #[test]
    fn no_charts_skips_sink() {
        let dir = TempDir::new().unwrap();
        let input = write_results(dir.path(), "results.json", FULL_RUN);
        let sink = RecordingSink::default();

        let outcome = run(&options(input, dir.path().join("a"), false), Some(&sink as &dyn ChartSink)).unwrap();
        assert_eq!(outcome.charts, None);
        assert!(sink.calls.borrow().is_empty());
        assert!(outcome.summary.exists());
    }

    #[test]
    fn missing_capability_degrades_to_text_and_json() {
        let dir = TempDir::new().unwrap();
        let input = write_results(dir.path(), "results.json", FULL_RUN);
        let out_dir = dir.path().join("a");

        let outcome = run(&options(input, out_dir.clone(), true), None).unwrap();
        assert_eq!(outcome.charts, None);
        assert!(outcome.text_report.exists());
        assert!(outcome.summary.exists());
        let entries = std::fs::read_dir(&out_dir).unwrap().count();
        assert_eq!(entries, 2);
    }

    #[test]
    fn nothing_chartable_writes_no_chart_file() {
        let dir = TempDir::new().unwrap();
        let input = write_results(
            dir.path(),
            "results.json",
            &[r#"{"type":"Metric","data":{"name":"http_req_failed","values":{"rate":0.2}}}"#],
        );
        let sink = RecordingSink::default();

        let outcome = run(&options(input, dir.path().join("a"), true), Some(&sink as &dyn ChartSink)).unwrap();
        assert_eq!(outcome.charts, None);
        assert!(sink.calls.borrow().is_empty());
    }

    #[test]
    fn empty_input_still_reports() {
        let dir = TempDir::new().unwrap();
        let input = write_results(dir.path(), "empty.json", &["", "not json"]);

        let outcome = run(&options(input, dir.path().join("a"), true), None).unwrap();
        assert!(outcome.analysis.is_empty());

        let text = std::fs::read_to_string(&outcome.text_report).unwrap();
        assert!(text.contains("k6 LOAD TEST ANALYSIS REPORT"));
        assert!(text.contains("✅ Error Rate: EXCELLENT (< 1%)"));
        assert!(!text.contains("BASIC METRICS"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&outcome.summary).unwrap()).unwrap();
        assert_eq!(json["analysis"], serde_json::json!({}));
        assert!(json["generated_at"].is_string());
    }

    #[test]
    fn output_dir_blocked_by_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let input = write_results(dir.path(), "results.json", FULL_RUN);
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, "x").unwrap();

        let err = run(&options(input, blocker, true), None).unwrap_err();
        assert!(matches!(err, AnalyzeError::Output(OutputError::CreateDir { .. })));
    }
}
