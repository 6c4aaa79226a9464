//! Pure per-reading derivation of the efficiency ratio.

use crate::pipeline::types::{CleanedReading, RatioFormula, TransformedReading};

/// Computes the efficiency ratio for one reading.
///
/// Deterministic and total: every `(power_output, efficiency_factor)` pair
/// maps to a finite ratio, including a zero efficiency factor.
pub fn efficiency_ratio(power_output: f64, efficiency_factor: f64, formula: RatioFormula) -> f64 {
    match formula {
        RatioFormula::Product => power_output * efficiency_factor,
        RatioFormula::OutputPerEfficiency => {
            if efficiency_factor == 0.0 {
                0.0
            } else {
                power_output / efficiency_factor
            }
        }
    }
}

/// Derives [`TransformedReading`]s from cleaned readings, preserving order.
pub fn transform(readings: &[CleanedReading], formula: RatioFormula) -> Vec<TransformedReading> {
    readings
        .iter()
        .map(|r| TransformedReading {
            timestamp: r.timestamp,
            source_id: r.source_id.clone(),
            power_output: r.power_output,
            efficiency_factor: r.efficiency_factor,
            efficiency_ratio: efficiency_ratio(r.power_output, r.efficiency_factor, formula),
        })
        .collect()
}
