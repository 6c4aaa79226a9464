//! CSV ingest and cleaning for raw sensor readings.
//!
//! Turns a raw sensor CSV into an ordered sequence of [`CleanedReading`]s
//! that are safe to transform and aggregate:
//! - **Strict schema** for the four required columns (clear, fatal errors)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Stable output order** (rows come out in input order)

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDateTime;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::pipeline::types::CleanedReading;

/// Column names the input header must contain, verbatim.
pub const REQUIRED_COLUMNS: [&str; 4] =
    ["Time", "Source_ID", "Power_Output", "Efficiency_Factor"];

/// Expected `Time` format, e.g. `2026-02-13 14:30:00`.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A row-level problem encountered during cleaning.
///
/// `line` is the 1-based CSV line number (the header is line 1).
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Bookkeeping for one ingest run: what was read, kept, and dropped.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub row_errors: Vec<RowError>,
}

impl IngestReport {
    pub fn rows_excluded(&self) -> usize {
        self.row_errors.len()
    }

    /// Fraction of read rows that survived cleaning, in percent.
    pub fn retention_pct(&self) -> f64 {
        if self.rows_read == 0 {
            return 0.0;
        }
        (self.rows_kept as f64 / self.rows_read as f64) * 100.0
    }
}

/// Loads and cleans a sensor CSV.
///
/// Fatal outcomes: [`PipelineError::NotFound`] when the file cannot be
/// opened, [`PipelineError::Parse`] when the content is not decodable CSV
/// (including a file with no data at all),
/// and [`PipelineError::Schema`] naming every required column the header
/// lacks. Rows that fail validation (unparsable timestamp, empty source id,
/// missing or non-numeric values, negative power) are dropped and recorded
/// in the report; the run continues.
pub fn ingest(path: &Path) -> Result<(Vec<CleanedReading>, IngestReport), PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::NotFound {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::Parse {
            path: path.to_path_buf(),
            message: format!("failed to read CSV headers: {e}"),
        })?
        .clone();

    // An empty file yields an empty headers record. Report that as a data
    // problem, not as four missing columns.
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(PipelineError::Parse {
            path: path.to_path_buf(),
            message: "file contains no data (no header row)".to_string(),
        });
    }

    let header_map = build_header_map(&headers);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !header_map.contains_key(**name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::Schema {
            path: path.to_path_buf(),
            missing,
        });
    }

    let mut readings = Vec::new();
    let mut report = IngestReport::default();

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, and CSV line numbers are 1-based.
        let line = idx + 2;
        report.rows_read += 1;

        let record = result.map_err(|e| PipelineError::Parse {
            path: path.to_path_buf(),
            message: format!("line {line}: {e}"),
        })?;

        match clean_row(&record, &header_map) {
            Ok(reading) => {
                report.rows_kept += 1;
                readings.push(reading);
            }
            Err(message) => {
                debug!(line, %message, "Dropping invalid row");
                report.row_errors.push(RowError { line, message });
            }
        }
    }

    if report.rows_excluded() > 0 {
        warn!(
            excluded = report.rows_excluded(),
            read = report.rows_read,
            "Some rows were dropped during cleaning"
        );
    }

    Ok((readings, report))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and similar tools sometimes emit UTF-8 CSVs with a BOM prefix on
    // the first header (e.g. "﻿Time"). Strip it so schema validation does not
    // falsely report a missing column. Matching stays case-sensitive.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn clean_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<CleanedReading, String> {
    let time_raw = get_field(record, header_map, "Time")?;
    let timestamp = NaiveDateTime::parse_from_str(time_raw, TIME_FORMAT)
        .map_err(|_| format!("invalid Time '{time_raw}' (expected YYYY-MM-DD HH:MM:SS)"))?;

    let source_id = get_field(record, header_map, "Source_ID")?.to_string();

    let power_output = parse_f64(get_field(record, header_map, "Power_Output")?, "Power_Output")?;
    if power_output < 0.0 {
        return Err(format!("negative Power_Output ({power_output})"));
    }

    let efficiency_factor = parse_f64(
        get_field(record, header_map, "Efficiency_Factor")?,
        "Efficiency_Factor",
    )?;

    Ok(CleanedReading {
        timestamp,
        source_id,
        power_output,
        efficiency_factor,
    })
}

fn get_field<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    // Column presence was validated against the header up front, so a miss
    // here means the value is empty or the record is short.
    header_map
        .get(name)
        .and_then(|idx| record.get(*idx))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing value for `{name}`"))
}

fn parse_f64(raw: &str, name: &str) -> Result<f64, String> {
    let value = raw
        .parse::<f64>()
        .map_err(|_| format!("non-numeric `{name}` value '{raw}'"))?;
    if !value.is_finite() {
        return Err(format!("non-finite `{name}` value '{raw}'"));
    }
    Ok(value)
}
