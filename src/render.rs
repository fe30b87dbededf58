//! Comparative charts and tables for experiment grids.
//!
//! Charts are self-contained HTML pages drawn with Chart.js. The renderer
//! only lays out what the grid holds; it never aggregates.

use crate::grid::ExperimentGrid;
use crate::output::format::pad;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;

const COLORS: [&str; 8] = [
    "#e74c3c", "#3498db", "#2ecc71", "#9b59b6", "#f39c12", "#1abc9c", "#34495e", "#e67e22",
];

const MARKERS: [&str; 6] = ["circle", "triangle", "rectRot", "star", "crossRot", "rect"];

/// Axis scaling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    #[default]
    Linear,
    Log,
}

impl Scale {
    fn chartjs_type(&self) -> &'static str {
        match self {
            Scale::Linear => "linear",
            Scale::Log => "logarithmic",
        }
    }
}

/// Color and marker assigned to a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub color: &'static str,
    pub marker: &'static str,
}

/// Deterministic label to style assignment.
///
/// Labels are sorted before styles are handed out, so the same label set
/// always yields the same styles regardless of series order.
#[derive(Debug, Clone)]
pub struct StyleMap {
    styles: BTreeMap<String, Style>,
}

impl StyleMap {
    pub fn for_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut sorted: Vec<&str> = labels.into_iter().collect();
        sorted.sort_unstable();
        sorted.dedup();

        let styles = sorted
            .into_iter()
            .enumerate()
            .map(|(i, label)| {
                (
                    label.to_string(),
                    Style {
                        color: COLORS[i % COLORS.len()],
                        marker: MARKERS[i % MARKERS.len()],
                    },
                )
            })
            .collect();

        Self { styles }
    }

    pub fn get(&self, label: &str) -> Option<Style> {
        self.styles.get(label).copied()
    }
}

/// Horizontal reference line drawn across the chart.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Threshold {
    pub value: f64,
    #[serde(default = "Threshold::default_label")]
    pub label: String,
}

impl Threshold {
    fn default_label() -> String {
        "Threshold".to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChartOptions {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub x_scale: Scale,
    pub y_scale: Scale,
    pub threshold: Option<Threshold>,
}

/// Build the Chart.js configuration for a grid.
pub fn chart_config(grid: &ExperimentGrid, opts: &ChartOptions) -> Value {
    let styles = StyleMap::for_labels(grid.labels());

    let mut datasets: Vec<Value> = grid
        .series
        .iter()
        .map(|series| {
            let style = styles.get(&series.label).unwrap_or(Style {
                color: COLORS[0],
                marker: MARKERS[0],
            });
            let points: Vec<Value> = series
                .cells
                .iter()
                .map(|c| json!({ "x": c.axis, "y": c.value }))
                .collect();
            json!({
                "label": series.label,
                "data": points,
                "borderColor": style.color,
                "backgroundColor": style.color,
                "pointStyle": style.marker,
                "pointRadius": 6,
                "showLine": true,
                "fill": false,
            })
        })
        .collect();

    if let Some(threshold) = &opts.threshold {
        let axis = grid.axis_values();
        let lo = axis.iter().min().copied().unwrap_or(0);
        let hi = axis.iter().max().copied().unwrap_or(0);
        datasets.push(json!({
            "label": threshold.label,
            "data": [{ "x": lo, "y": threshold.value }, { "x": hi, "y": threshold.value }],
            "borderColor": "#ff0000",
            "borderDash": [6, 6],
            "pointRadius": 0,
            "showLine": true,
            "fill": false,
        }));
    }

    json!({
        "type": "scatter",
        "data": { "datasets": datasets },
        "options": {
            "responsive": true,
            "plugins": {
                "title": { "display": !opts.title.is_empty(), "text": opts.title },
                "legend": { "position": "top" },
            },
            "scales": {
                "x": {
                    "type": opts.x_scale.chartjs_type(),
                    "title": { "display": true, "text": opts.x_title },
                },
                "y": {
                    "type": opts.y_scale.chartjs_type(),
                    "title": { "display": true, "text": opts.y_title },
                },
            },
        },
    })
}

/// Render a grid as a standalone HTML page.
pub fn html(grid: &ExperimentGrid, opts: &ChartOptions) -> String {
    // "</" inside a script block would end it early
    let config = chart_config(grid, opts).to_string().replace("</", "<\\/");
    let title = escape(&opts.title);

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 0;
            padding: 20px;
            background: #f5f5f5;
            color: #333;
        }}
        .chart-container {{
            max-width: 1000px;
            margin: 0 auto;
            background: white;
            border-radius: 8px;
            padding: 20px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }}
    </style>
</head>
<body>
    <div class="chart-container">
        <canvas id="chart"></canvas>
    </div>
    <script>
        const config = {config};
        new Chart(document.getElementById('chart').getContext('2d'), config);
    </script>
</body>
</html>
"##
    )
}

/// Render a grid as an aligned text table, one row per series.
pub fn table(grid: &ExperimentGrid, format_value: impl Fn(f64) -> String) -> String {
    let axis = grid.axis_values();
    let label_width = grid
        .series
        .iter()
        .map(|s| s.label.len())
        .max()
        .unwrap_or(0)
        .max(6);

    let rows: Vec<Vec<String>> = grid
        .series
        .iter()
        .map(|s| {
            axis.iter()
                .map(|&x| s.value_at(x).map(&format_value).unwrap_or_else(|| "-".to_string()))
                .collect()
        })
        .collect();

    let col_width = axis
        .iter()
        .map(|x| x.to_string().len())
        .chain(rows.iter().flatten().map(|v| v.len()))
        .max()
        .unwrap_or(0)
        .max(8);

    let mut out = String::new();
    out.push_str(&format!("  {:<label_width$}", "series"));
    for x in &axis {
        out.push(' ');
        out.push_str(&pad(&x.to_string(), col_width));
    }
    out.push('\n');
    out.push_str(&format!("  {:-<label_width$}", ""));
    for _ in &axis {
        out.push(' ');
        out.push_str(&"-".repeat(col_width));
    }
    out.push('\n');

    for (series, row) in grid.series.iter().zip(&rows) {
        out.push_str(&format!("  {:<label_width$}", series.label));
        for value in row {
            out.push(' ');
            out.push_str(&pad(value, col_width));
        }
        out.push('\n');
    }

    out
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
