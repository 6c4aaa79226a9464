//! Source ranking over the weekly aggregate table.

use std::collections::BTreeMap;

use crate::pipeline::types::{BucketKey, SourceTotal, WeeklyAggregate};

/// Ranks sources by total aggregated power output, descending.
///
/// Ties are broken by `source_id` ascending so the ordering is deterministic
/// regardless of how the aggregate map is iterated.
pub fn rank_sources(aggregates: &BTreeMap<BucketKey, WeeklyAggregate>) -> Vec<SourceTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for (key, aggregate) in aggregates {
        *totals.entry(key.source_id.as_str()).or_insert(0.0) += aggregate.total_power_output;
    }

    let mut ranking: Vec<SourceTotal> = totals
        .into_iter()
        .map(|(source_id, total_power_output)| SourceTotal {
            source_id: source_id.to_string(),
            total_power_output,
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.total_power_output
            .total_cmp(&a.total_power_output)
            .then_with(|| a.source_id.cmp(&b.source_id))
    });

    ranking
}

/// The leading `n` entries of a ranking (all of them when fewer exist).
pub fn top_n(ranking: &[SourceTotal], n: usize) -> &[SourceTotal] {
    &ranking[..ranking.len().min(n)]
}
