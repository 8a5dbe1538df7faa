mod analysis;
mod analyze;
mod assessment;
mod charts;
mod config;
mod output;
mod record;
mod report;
mod summary;
mod timeseries;

use analyze::{AnalyzeError, RunOptions, RunOutcome};
use clap::Parser;
use config::AnalyzerConfig;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Analyze k6 load test results: reads the JSON output of
/// `k6 run --out json=...` and writes a text report, a JSON summary,
/// and charts.
#[derive(Parser, Debug)]
#[command(name = "k6-analyze", version, about)]
pub struct Cli {
    /// Path to the k6 JSON results file
    #[arg(value_name = "RESULTS_FILE")]
    results_file: PathBuf,

    /// Output directory for reports (default: ./analysis)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Skip chart generation
    #[arg(long)]
    no_charts: bool,

    /// Config file path (default: k6-analyze.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also print the text report to stdout
    #[arg(long)]
    print: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Suppress progress messages, only errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Merge CLI flags over the loaded config.
    fn run_options(&self, config: &AnalyzerConfig) -> RunOptions {
        RunOptions {
            input: self.results_file.clone(),
            output_dir: self
                .output_dir
                .clone()
                .unwrap_or_else(|| config.output.dir.clone()),
            charts: config.output.charts && !self.no_charts,
            print_report: self.print,
            quiet: self.quiet,
        }
    }

    fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    tracing::debug!(?cli, "parsed CLI arguments");

    match execute(&cli) {
        Ok(outcome) => {
            tracing::debug!(
                report = %outcome.text_report.display(),
                summary = %outcome.summary.display(),
                charts = ?outcome.charts,
                empty = outcome.analysis.is_empty(),
                "analysis finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli) -> Result<RunOutcome, AnalyzeError> {
    let config = match &cli.config {
        Some(path) => AnalyzerConfig::load(path)?,
        None => AnalyzerConfig::load_or_default(Path::new(".")),
    };
    tracing::debug!(?config, "resolved config");

    // Resolved once per run.
    let sink = charts::plotting_capability(&config.charts);
    let opts = cli.run_options(&config);
    if opts.charts && sink.is_none() {
        tracing::warn!("plotting support not compiled in; charts will not be generated");
    }

    analyze::run(&opts, sink.as_deref())
}
