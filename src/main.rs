//! CLI entry point for the grid monitor tool.
//!
//! Provides subcommands for running the full sensor-data pipeline (ingest,
//! clean, transform, aggregate, rank, report) and for checking the data
//! quality of a sensor CSV without generating reports.

use anyhow::Result;
use chrono::Weekday;
use clap::{Parser, Subcommand, ValueEnum};
use grid_monitor::{
    ingest::ingest,
    output::{append_summary, ensure_report_dir, print_json, write_ranking_json, write_weekly_csv},
    pipeline::{
        aggregate::aggregate_weekly,
        rank::{rank_sources, top_n},
        transform::transform,
        types::RatioFormula,
    },
    report,
    stats::RunSummary,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "grid_monitor")]
#[command(about = "A tool to process renewable grid sensor data and report weekly performance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// First day of the aggregation week.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum WeekStart {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl WeekStart {
    fn weekday(self) -> Weekday {
        match self {
            WeekStart::Mon => Weekday::Mon,
            WeekStart::Tue => Weekday::Tue,
            WeekStart::Wed => Weekday::Wed,
            WeekStart::Thu => Weekday::Thu,
            WeekStart::Fri => Weekday::Fri,
            WeekStart::Sat => Weekday::Sat,
            WeekStart::Sun => Weekday::Sun,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write report artifacts
    Run {
        /// Path to the sensor CSV file
        #[arg(value_name = "INPUT", default_value = "sensor_data.csv")]
        input: PathBuf,

        /// Directory the aggregate table, ranking, and charts are written to
        #[arg(short, long, default_value = "reports")]
        report_dir: PathBuf,

        /// Number of top-ranked sources to chart
        #[arg(short = 'n', long, default_value_t = 5)]
        top_n: usize,

        /// First day of the aggregation week
        #[arg(long, value_enum, default_value = "mon")]
        week_start: WeekStart,

        /// How the per-reading efficiency ratio is derived
        #[arg(long, value_enum, default_value = "product")]
        ratio_formula: RatioFormula,
    },
    /// Validate and clean a sensor CSV without generating reports
    Check {
        /// Path to the sensor CSV file
        #[arg(value_name = "INPUT", default_value = "sensor_data.csv")]
        input: PathBuf,

        /// CSV quality log to append the run summary to
        #[arg(short, long)]
        log: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/grid_monitor.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("grid_monitor.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            report_dir,
            top_n,
            week_start,
            ratio_formula,
        } => {
            run_pipeline(
                &input,
                &report_dir,
                top_n,
                week_start.weekday(),
                ratio_formula,
            )?;
        }
        Commands::Check { input, log } => {
            check_quality(&input, log.as_deref())?;
        }
    }

    Ok(())
}

/// Runs ingest, transform, aggregation, and ranking, then hands the results
/// to the report collaborator and logs the run summary.
#[tracing::instrument(
    skip(input, report_dir, week_starts_on, ratio_formula),
    fields(input = %input.display())
)]
fn run_pipeline(
    input: &Path,
    report_dir: &Path,
    top_n_sources: usize,
    week_starts_on: Weekday,
    ratio_formula: RatioFormula,
) -> Result<()> {
    let (cleaned, ingest_report) = ingest(input)?;
    info!(
        rows_read = ingest_report.rows_read,
        rows_kept = ingest_report.rows_kept,
        excluded = ingest_report.rows_excluded(),
        retention_pct = ingest_report.retention_pct(),
        "Ingest complete"
    );

    let transformed = transform(&cleaned, ratio_formula);
    let aggregates = aggregate_weekly(&transformed, week_starts_on);
    let ranking = rank_sources(&aggregates);
    let top = top_n(&ranking, top_n_sources);

    let summary = RunSummary::from_run(&transformed, &ingest_report);

    ensure_report_dir(report_dir)?;
    write_weekly_csv(&report_dir.join("weekly_output.csv"), &aggregates)?;
    write_ranking_json(
        &report_dir.join("source_ranking.json"),
        &ranking,
        ratio_formula,
    )?;

    report::generate(report_dir, &aggregates, top, &transformed)?;

    for (i, source) in top.iter().enumerate() {
        info!(
            rank = i + 1,
            source_id = %source.source_id,
            total_kwh = source.total_power_output,
            "Top source"
        );
    }

    info!(
        total_records = summary.total_records,
        excluded = summary.rows_excluded,
        unique_sources = summary.unique_sources,
        date_range_start = ?summary.date_range_start,
        date_range_end = ?summary.date_range_end,
        total_power_output_kwh = summary.total_power_output,
        avg_power_output_kwh = summary.avg_power_output,
        avg_efficiency_factor = summary.avg_efficiency_factor,
        avg_efficiency_ratio = summary.avg_efficiency_ratio,
        "Pipeline summary"
    );

    Ok(())
}

/// Ingests and cleans the input, logging every dropped row and the summary,
/// without writing report artifacts.
#[tracing::instrument(skip(input, quality_log), fields(input = %input.display()))]
fn check_quality(input: &Path, quality_log: Option<&Path>) -> Result<()> {
    let (cleaned, ingest_report) = ingest(input)?;

    for row_error in &ingest_report.row_errors {
        warn!(
            line = row_error.line,
            message = %row_error.message,
            "Invalid row"
        );
    }

    let transformed = transform(&cleaned, RatioFormula::default());
    let summary = RunSummary::from_run(&transformed, &ingest_report);
    print_json(&summary)?;

    if let Some(path) = quality_log {
        append_summary(path, &summary)?;
        info!(path = %path.display(), "Summary appended to quality log");
    }

    Ok(())
}
