use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::ingest::IngestReport;
use crate::pipeline::types::TransformedReading;
use crate::pipeline::utility::mean;

/// Run-level summary exposed for the caller to print after a pipeline run.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub rows_read: usize,
    pub total_records: usize,
    pub rows_excluded: usize,
    pub unique_sources: usize,
    pub date_range_start: Option<NaiveDateTime>,
    pub date_range_end: Option<NaiveDateTime>,
    pub total_power_output: f64,
    pub avg_power_output: f64,
    pub avg_efficiency_factor: f64,
    pub avg_efficiency_ratio: f64,
}

impl RunSummary {
    pub fn from_run(readings: &[TransformedReading], report: &IngestReport) -> Self {
        let mut s = RunSummary {
            rows_read: report.rows_read,
            total_records: readings.len(),
            rows_excluded: report.rows_excluded(),
            ..Default::default()
        };

        let mut sources = BTreeSet::new();
        let mut powers = Vec::with_capacity(readings.len());
        let mut factors = Vec::with_capacity(readings.len());
        let mut ratios = Vec::with_capacity(readings.len());

        for r in readings {
            sources.insert(r.source_id.as_str());
            powers.push(r.power_output);
            factors.push(r.efficiency_factor);
            ratios.push(r.efficiency_ratio);

            s.date_range_start = Some(match s.date_range_start {
                Some(start) if start <= r.timestamp => start,
                _ => r.timestamp,
            });
            s.date_range_end = Some(match s.date_range_end {
                Some(end) if end >= r.timestamp => end,
                _ => r.timestamp,
            });
        }

        s.unique_sources = sources.len();
        s.total_power_output = powers.iter().sum();
        s.avg_power_output = mean(&powers);
        s.avg_efficiency_factor = mean(&factors);
        s.avg_efficiency_ratio = mean(&ratios);

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reading(source: &str, day: u32, power: f64, factor: f64) -> TransformedReading {
        TransformedReading {
            timestamp: NaiveDate::from_ymd_opt(2026, 1, day)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            source_id: source.to_string(),
            power_output: power,
            efficiency_factor: factor,
            efficiency_ratio: power * factor,
        }
    }

    #[test]
    fn test_summary_empty_run() {
        let report = IngestReport::default();
        let s = RunSummary::from_run(&[], &report);

        assert_eq!(s.total_records, 0);
        assert_eq!(s.unique_sources, 0);
        assert!(s.date_range_start.is_none());
        assert_eq!(s.total_power_output, 0.0);
    }

    #[test]
    fn test_summary_counts_and_totals() {
        let readings = vec![
            reading("SRC_001", 5, 100.0, 0.5),
            reading("SRC_001", 9, 200.0, 0.5),
            reading("SRC_002", 7, 50.0, 1.0),
        ];
        let report = IngestReport {
            rows_read: 4,
            rows_kept: 3,
            row_errors: vec![crate::ingest::RowError {
                line: 3,
                message: "invalid Time".to_string(),
            }],
        };

        let s = RunSummary::from_run(&readings, &report);

        assert_eq!(s.rows_read, 4);
        assert_eq!(s.total_records, 3);
        assert_eq!(s.rows_excluded, 1);
        assert_eq!(s.unique_sources, 2);
        assert_eq!(s.total_power_output, 350.0);
        assert_eq!(
            s.date_range_start.unwrap().date(),
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
        );
        assert_eq!(
            s.date_range_end.unwrap().date(),
            NaiveDate::from_ymd_opt(2026, 1, 9).unwrap()
        );
    }

    #[test]
    fn test_summary_averages() {
        let readings = vec![
            reading("SRC_001", 5, 100.0, 0.4),
            reading("SRC_001", 6, 300.0, 0.6),
        ];
        let s = RunSummary::from_run(&readings, &IngestReport::default());

        assert_eq!(s.avg_power_output, 200.0);
        assert_eq!(s.avg_efficiency_factor, 0.5);
        assert_eq!(s.avg_efficiency_ratio, (40.0 + 180.0) / 2.0);
    }
}
