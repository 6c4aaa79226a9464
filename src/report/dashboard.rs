//! Interactive efficiency dashboard rendered as a self-contained HTML page.
//!
//! The transformed readings are embedded as JSON and plotted client-side
//! with plotly.js (loaded from its CDN): one scatter trace per source,
//! efficiency factor on x, power output on y, with per-point hover details.

use anyhow::Result;
use std::path::Path;
use tracing::debug;

use crate::pipeline::types::TransformedReading;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Efficiency Factor vs Power Output</title>
<script src="https://cdn.plot.ly/plotly-2.32.0.min.js"></script>
<style>
  body { font-family: Arial, sans-serif; margin: 0; }
  #chart { width: 100vw; height: 95vh; }
</style>
</head>
<body>
<div id="chart"></div>
<script>
const readings = __DATA__;

const bySource = new Map();
for (const r of readings) {
  if (!bySource.has(r.source_id)) bySource.set(r.source_id, []);
  bySource.get(r.source_id).push(r);
}

const traces = [...bySource.entries()].map(([source, rows]) => ({
  name: source,
  type: "scatter",
  mode: "markers",
  x: rows.map(r => r.efficiency_factor),
  y: rows.map(r => r.power_output),
  text: rows.map(r =>
    `${r.source_id}<br>${r.timestamp}` +
    `<br>Power: ${r.power_output.toFixed(2)} kWh` +
    `<br>Factor: ${r.efficiency_factor.toFixed(4)}` +
    `<br>Ratio: ${r.efficiency_ratio.toFixed(2)}`),
  hoverinfo: "text",
  marker: { size: 6, opacity: 0.7 },
}));

const layout = {
  title: { text: "Efficiency Factor vs Power Output - Interactive Dashboard" },
  hovermode: "closest",
  xaxis: { title: { text: "Efficiency Factor" } },
  yaxis: { title: { text: "Power Output (kWh)" } },
};

Plotly.newPlot("chart", traces, layout, {
  displaylogo: false,
  modeBarButtonsToRemove: ["lasso2d", "select2d"],
});
</script>
</body>
</html>
"#;

/// Writes the dashboard HTML for `readings` to `path`.
///
/// Does nothing when there are no readings to plot.
pub fn render_efficiency_dashboard(path: &Path, readings: &[TransformedReading]) -> Result<()> {
    if readings.is_empty() {
        debug!("No readings; skipping dashboard");
        return Ok(());
    }

    let data = serde_json::to_string(readings)?;
    let html = TEMPLATE.replace("__DATA__", &data);
    std::fs::write(path, html)?;

    Ok(())
}
