//! Typed error taxonomy for the processing pipeline.
//!
//! File- and schema-level problems are fatal and propagate to the caller.
//! Row-level data problems are recovered during ingest and surfaced as
//! counts in the [`IngestReport`](crate::ingest::IngestReport), never here.
//!
//! An input that yields zero valid rows is not an error: downstream stages
//! return empty tables and the report generators skip their artifacts.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input file is missing or unreadable at the storage layer.
    #[error("sensor data file not found or unreadable: {}: {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input could not be decoded as CSV (malformed structure).
    #[error("corrupted or invalid CSV in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// One or more required columns are absent from the header row.
    #[error("missing required column(s) in {}: {}", path.display(), missing.join(", "))]
    Schema { path: PathBuf, missing: Vec<String> },
}
