//! Weekly aggregation of transformed readings.
//!
//! Readings are grouped into calendar-week buckets keyed by
//! `(source_id, week_start)`. A reading belongs to the bucket whose interval
//! `[week_start, week_start + 7 days)` contains its timestamp, so boundary
//! instants land in the bucket they start. Each bucket's contributions are
//! sorted before they are reduced, so totals and means are bit-identical for
//! any permutation of the same input rows.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, Weekday};

use crate::pipeline::types::{BucketKey, TransformedReading, WeeklyAggregate};
use crate::pipeline::utility::mean;

/// Default week-start convention: calendar weeks beginning on Monday.
pub const DEFAULT_WEEK_START: Weekday = Weekday::Mon;

/// First day of the calendar week containing `timestamp`.
pub fn week_start(timestamp: NaiveDateTime, week_starts_on: Weekday) -> NaiveDate {
    timestamp.date().week(week_starts_on).first_day()
}

/// Groups readings into `(source, week)` buckets and aggregates each bucket.
///
/// Empty input yields an empty map by design; callers treat that as "nothing
/// to report", not as a failure.
pub fn aggregate_weekly(
    readings: &[TransformedReading],
    week_starts_on: Weekday,
) -> BTreeMap<BucketKey, WeeklyAggregate> {
    #[derive(Default)]
    struct Accum {
        powers: Vec<f64>,
        ratios: Vec<f64>,
    }

    let mut accums: BTreeMap<BucketKey, Accum> = BTreeMap::new();

    for r in readings {
        let key = BucketKey {
            source_id: r.source_id.clone(),
            week_start: week_start(r.timestamp, week_starts_on),
        };
        let acc = accums.entry(key).or_default();
        acc.powers.push(r.power_output);
        acc.ratios.push(r.efficiency_ratio);
    }

    accums
        .into_iter()
        .map(|(key, mut acc)| {
            // Float addition is not associative, so reduce each bucket in a
            // fixed order rather than input row order.
            acc.powers.sort_by(f64::total_cmp);
            acc.ratios.sort_by(f64::total_cmp);
            let aggregate = WeeklyAggregate {
                total_power_output: acc.powers.iter().sum(),
                mean_efficiency_ratio: mean(&acc.ratios),
                readings: acc.powers.len(),
            };
            (key, aggregate)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(source: &str, y: i32, m: u32, d: u32, power: f64) -> TransformedReading {
        TransformedReading {
            timestamp: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            source_id: source.to_string(),
            power_output: power,
            efficiency_factor: 0.5,
            efficiency_ratio: power * 0.5,
        }
    }

    #[test]
    fn test_week_start_monday_convention() {
        // 2026-01-07 is a Wednesday; its Monday week starts 2026-01-05.
        let ts = NaiveDate::from_ymd_opt(2026, 1, 7)
            .unwrap()
            .and_hms_opt(3, 0, 0)
            .unwrap();
        assert_eq!(
            week_start(ts, Weekday::Mon),
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
        );
    }

    #[test]
    fn test_week_boundary_belongs_to_started_bucket() {
        // Monday 00:00:00 exactly: belongs to the week it starts.
        let ts = NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            week_start(ts, Weekday::Mon),
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
        );

        // One second earlier is still Sunday of the previous week.
        let ts = NaiveDate::from_ymd_opt(2026, 1, 4)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(
            week_start(ts, Weekday::Mon),
            NaiveDate::from_ymd_opt(2025, 12, 29).unwrap()
        );
    }

    #[test]
    fn test_aggregate_sums_within_bucket() {
        // All three readings fall in the Monday week of 2026-01-05.
        let readings = vec![
            reading("SRC_001", 2026, 1, 5, 100.0),
            reading("SRC_001", 2026, 1, 6, 200.0),
            reading("SRC_001", 2026, 1, 9, 300.0),
        ];

        let buckets = aggregate_weekly(&readings, Weekday::Mon);

        assert_eq!(buckets.len(), 1);
        let key = BucketKey {
            source_id: "SRC_001".to_string(),
            week_start: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        };
        let agg = &buckets[&key];
        assert_eq!(agg.total_power_output, 600.0);
        assert_eq!(agg.readings, 3);
        assert_eq!(agg.mean_efficiency_ratio, 100.0);
    }

    #[test]
    fn test_aggregate_splits_sources_and_weeks() {
        let readings = vec![
            reading("SRC_001", 2026, 1, 5, 100.0),
            reading("SRC_001", 2026, 1, 12, 50.0), // next week
            reading("SRC_002", 2026, 1, 5, 25.0),
        ];

        let buckets = aggregate_weekly(&readings, Weekday::Mon);
        assert_eq!(buckets.len(), 3);
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let a = reading("SRC_001", 2026, 1, 5, 100.0);
        let b = reading("SRC_001", 2026, 1, 6, 200.0);
        let c = reading("SRC_002", 2026, 1, 7, 300.0);

        let forward = aggregate_weekly(&[a.clone(), b.clone(), c.clone()], Weekday::Mon);
        let backward = aggregate_weekly(&[c, b, a], Weekday::Mon);

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_aggregate_totals_bit_identical_under_permutation() {
        // 0.1 + 0.2 + 0.3 != 0.3 + 0.2 + 0.1 under naive f64 accumulation;
        // the per-bucket reduction must not depend on input row order.
        let a = reading("SRC_001", 2026, 1, 5, 0.1);
        let b = reading("SRC_001", 2026, 1, 6, 0.2);
        let c = reading("SRC_001", 2026, 1, 7, 0.3);

        let key = BucketKey {
            source_id: "SRC_001".to_string(),
            week_start: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        };

        let forward = aggregate_weekly(&[a.clone(), b.clone(), c.clone()], Weekday::Mon);
        let reversed = aggregate_weekly(&[c.clone(), a.clone(), b.clone()], Weekday::Mon);
        let rotated = aggregate_weekly(&[b, c, a], Weekday::Mon);

        assert_eq!(
            forward[&key].total_power_output.to_bits(),
            reversed[&key].total_power_output.to_bits()
        );
        assert_eq!(
            forward[&key].total_power_output.to_bits(),
            rotated[&key].total_power_output.to_bits()
        );
        assert_eq!(
            forward[&key].mean_efficiency_ratio.to_bits(),
            reversed[&key].mean_efficiency_ratio.to_bits()
        );
    }

    #[test]
    fn test_aggregate_partitions_readings() {
        // Every reading is counted in exactly one bucket.
        let readings = vec![
            reading("SRC_001", 2026, 1, 4, 1.0),
            reading("SRC_001", 2026, 1, 5, 2.0),
            reading("SRC_002", 2026, 1, 18, 3.0),
            reading("SRC_003", 2026, 2, 1, 4.0),
        ];

        let buckets = aggregate_weekly(&readings, Weekday::Mon);
        let counted: usize = buckets.values().map(|a| a.readings).sum();
        let total: f64 = buckets.values().map(|a| a.total_power_output).sum();

        assert_eq!(counted, readings.len());
        assert_eq!(total, 10.0);
    }

    #[test]
    fn test_aggregate_empty_input_is_empty_map() {
        let buckets = aggregate_weekly(&[], Weekday::Mon);
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_aggregate_sunday_week_start() {
        // 2026-01-07 (Wed) under a Sunday convention starts 2026-01-04.
        let ts = NaiveDate::from_ymd_opt(2026, 1, 7)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(
            week_start(ts, Weekday::Sun),
            NaiveDate::from_ymd_opt(2026, 1, 4).unwrap()
        );
    }
}
