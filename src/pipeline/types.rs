//! Data types flowing through the processing pipeline.

use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::Serialize;

/// A sensor reading that has passed schema and null validation.
///
/// All four fields are present and well-typed; `power_output` is
/// non-negative. `efficiency_factor` is expected in `[0.0, 1.0]` but that
/// range is not hard-enforced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedReading {
    pub timestamp: NaiveDateTime,
    pub source_id: String,
    /// Reported output for the reading interval, in kWh.
    pub power_output: f64,
    pub efficiency_factor: f64,
}

/// A cleaned reading plus its derived efficiency ratio.
#[derive(Debug, Clone, Serialize)]
pub struct TransformedReading {
    pub timestamp: NaiveDateTime,
    pub source_id: String,
    pub power_output: f64,
    pub efficiency_factor: f64,
    /// Derived metric, a pure function of `power_output` and
    /// `efficiency_factor`. See [`RatioFormula`].
    pub efficiency_ratio: f64,
}

/// How the per-reading efficiency ratio is derived.
///
/// The choice is stable for a run and recorded in the ranking artifact, so
/// results stay reproducible across runs with the same configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RatioFormula {
    /// `power_output * efficiency_factor` (effective delivered output).
    #[default]
    Product,
    /// `power_output / efficiency_factor`. A zero factor yields a zero
    /// ratio rather than an infinity or a fault.
    OutputPerEfficiency,
}

/// Aggregation key: one source within one calendar week.
///
/// `week_start` is the first day of the week containing the readings, under
/// the run's week-start convention. The derived `Ord` gives the aggregate
/// map a deterministic iteration order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BucketKey {
    pub source_id: String,
    pub week_start: NaiveDate,
}

/// Aggregated totals for one `(source, week)` bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyAggregate {
    /// Sum of `power_output` over the bucket, in kWh.
    pub total_power_output: f64,
    /// Arithmetic mean of `efficiency_ratio` over the bucket.
    pub mean_efficiency_ratio: f64,
    /// Number of readings in the bucket.
    pub readings: usize,
}

/// Total aggregated output for one source across all of its weeks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceTotal {
    pub source_id: String,
    pub total_power_output: f64,
}
