//! Static weekly-trend chart rendered with Plotters.
//!
//! One line series per top-ranked source, x axis indexed by week. We render
//! to SVG so the chart needs no native font or bitmap dependencies.

use anyhow::Result;
use plotters::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

use crate::pipeline::types::{BucketKey, SourceTotal, WeeklyAggregate};

/// High-contrast palette cycled across the plotted sources.
const PALETTE: [RGBColor; 5] = [
    RGBColor(0x2e, 0x86, 0xab),
    RGBColor(0xa2, 0x3b, 0x72),
    RGBColor(0xf1, 0x8f, 0x01),
    RGBColor(0xc7, 0x3e, 0x1d),
    RGBColor(0x6a, 0x99, 0x4e),
];

/// Renders the weekly power-output trend for `top_sources` into an SVG file.
///
/// Does nothing when the aggregate table or the selection is empty.
pub fn render_weekly_trend(
    path: &Path,
    aggregates: &BTreeMap<BucketKey, WeeklyAggregate>,
    top_sources: &[SourceTotal],
) -> Result<()> {
    if aggregates.is_empty() || top_sources.is_empty() {
        debug!("Nothing to chart");
        return Ok(());
    }

    // X axis: the sorted set of observed week starts, plotted by index so the
    // axis stays evenly spaced even when weeks are missing in between.
    let weeks: Vec<_> = aggregates
        .keys()
        .map(|k| k.week_start)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let week_index: BTreeMap<_, _> = weeks.iter().enumerate().map(|(i, w)| (*w, i)).collect();

    let y_max = aggregates
        .values()
        .map(|a| a.total_power_output)
        .fold(0.0_f64, f64::max);
    // Headroom so the highest point does not touch the frame.
    let y_top = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

    let root = SVGBackend::new(path, (1000, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Weekly Power Output Trends - Top Renewable Sources",
            ("sans-serif", 22),
        )
        .margin(12)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 60)
        .build_cartesian_2d(-0.5..(weeks.len() as f64 - 0.5), 0.0..y_top)?;

    chart
        .configure_mesh()
        .x_desc("Week")
        .y_desc("Total Power Output (kWh)")
        .x_labels(weeks.len().min(12))
        .x_label_formatter(&|v| {
            let idx = v.round() as i64;
            if idx >= 0 && (idx as usize) < weeks.len() && (v - idx as f64).abs() < 1e-6 {
                weeks[idx as usize].format("%Y-%m-%d").to_string()
            } else {
                String::new()
            }
        })
        .light_line_style(&RGBColor(230, 230, 230))
        .draw()?;

    for (i, source) in top_sources.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];

        let series: Vec<(f64, f64)> = aggregates
            .iter()
            .filter(|(key, _)| key.source_id == source.source_id)
            .map(|(key, agg)| (week_index[&key.week_start] as f64, agg.total_power_output))
            .collect();

        chart
            .draw_series(LineSeries::new(
                series.iter().copied(),
                color.stroke_width(2),
            ))?
            .label(source.source_id.clone())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
            });

        chart.draw_series(
            series
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;

    Ok(())
}
