//! Output formatting and persistence for pipeline results.
//!
//! Writes the weekly aggregate table as CSV, the source ranking as JSON,
//! and supports appending run summaries to a quality-log CSV.

use anyhow::Result;
use tracing::{debug, info};

use chrono::{DateTime, NaiveDate, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::pipeline::types::{BucketKey, RatioFormula, SourceTotal, WeeklyAggregate};
use crate::stats::RunSummary;

/// One row of the persisted weekly aggregate table.
#[derive(Debug, Serialize)]
struct WeeklyRow<'a> {
    source_id: &'a str,
    week_start: NaiveDate,
    total_power_output: f64,
    mean_efficiency_ratio: f64,
    readings: usize,
}

/// Source ranking artifact, persisted as JSON.
#[derive(Debug, Serialize)]
pub struct RankingDoc<'a> {
    pub generated_at: DateTime<Utc>,
    pub ratio_formula: RatioFormula,
    pub sources: &'a [SourceTotal],
}

/// Creates the report directory if it does not already exist.
pub fn ensure_report_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}

/// Writes the weekly aggregate table to `path` as CSV with headers.
pub fn write_weekly_csv(
    path: &Path,
    aggregates: &BTreeMap<BucketKey, WeeklyAggregate>,
) -> Result<()> {
    debug!(path = %path.display(), buckets = aggregates.len(), "Writing weekly aggregate CSV");

    // Header is written up front so an empty aggregate still produces a
    // valid (if row-less) table.
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(File::create(path)?);
    writer.write_record([
        "source_id",
        "week_start",
        "total_power_output",
        "mean_efficiency_ratio",
        "readings",
    ])?;
    for (key, aggregate) in aggregates {
        writer.serialize(WeeklyRow {
            source_id: &key.source_id,
            week_start: key.week_start,
            total_power_output: aggregate.total_power_output,
            mean_efficiency_ratio: aggregate.mean_efficiency_ratio,
            readings: aggregate.readings,
        })?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes the source ranking to `path` as pretty-printed JSON.
pub fn write_ranking_json(
    path: &Path,
    ranking: &[SourceTotal],
    ratio_formula: RatioFormula,
) -> Result<()> {
    debug!(path = %path.display(), sources = ranking.len(), "Writing ranking JSON");

    let doc = RankingDoc {
        generated_at: Utc::now(),
        ratio_formula,
        sources: ranking,
    };
    serde_json::to_writer_pretty(File::create(path)?, &doc)?;

    Ok(())
}

/// Appends a [`RunSummary`] record as a row to a CSV quality log.
///
/// Creates the file with headers if it does not already exist.
pub fn append_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending summary record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(summary)?;
    writer.flush()?;

    Ok(())
}

/// Logs a run summary as pretty-printed JSON.
pub fn print_json(summary: &RunSummary) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}
