//! Report rendering for aggregated grid data.
//!
//! This is the downstream collaborator of the processing pipeline: it
//! consumes the weekly aggregate table, the top-N source selection, and the
//! transformed readings, and persists two artifacts into the report
//! directory (a static trend chart and an interactive dashboard). An empty
//! aggregate produces no artifacts rather than an error.

pub mod chart;
pub mod dashboard;

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::pipeline::types::{BucketKey, SourceTotal, TransformedReading, WeeklyAggregate};

/// Paths of the artifacts written by [`generate`]. `None` means the artifact
/// was skipped because there was nothing to draw.
#[derive(Debug, Default)]
pub struct ReportArtifacts {
    pub trend_chart: Option<PathBuf>,
    pub dashboard: Option<PathBuf>,
}

/// Renders both report artifacts into `dir`.
pub fn generate(
    dir: &Path,
    aggregates: &BTreeMap<BucketKey, WeeklyAggregate>,
    top_sources: &[SourceTotal],
    readings: &[TransformedReading],
) -> Result<ReportArtifacts> {
    if aggregates.is_empty() {
        warn!("No aggregated data; skipping report generation");
        return Ok(ReportArtifacts::default());
    }

    let trend_path = dir.join("weekly_output_trend.svg");
    chart::render_weekly_trend(&trend_path, aggregates, top_sources)?;
    info!(path = %trend_path.display(), "Static trend chart written");

    let dashboard_path = dir.join("efficiency_dashboard.html");
    dashboard::render_efficiency_dashboard(&dashboard_path, readings)?;
    info!(path = %dashboard_path.display(), "Interactive dashboard written");

    Ok(ReportArtifacts {
        trend_chart: Some(trend_path),
        dashboard: Some(dashboard_path),
    })
}
