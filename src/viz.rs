//! Chart rendering for aligned comparisons.
//!
//! Two charts are drawn per comparison, rebased prices first and log returns
//! second:
//! - [`SvgRenderer`] writes each chart as an SVG line chart with a legend.
//! - [`TerminalRenderer`] prints sparklines and summary statistics.
//!
//! # Example
//!
//! ```ignore
//! use crosslist::viz::{Renderer, SvgRenderer};
//!
//! let renderer = SvgRenderer::new("charts");
//! renderer.render(&comparison)?;
//! ```

use crate::analytics::ComparisonStats;
use crate::error::Result;
use crate::types::Comparison;
use chrono::NaiveDate;
use colored::Colorize;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Y-axis label of the rebased price chart.
pub const REBASED_Y_LABEL: &str = "prices rebased from start, %";
/// Y-axis label of the log-return chart.
pub const LOG_RETURNS_Y_LABEL: &str = "log returns";

/// Characters used for sparkline rendering, ordered from low to high.
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Line colours, assigned to series in order.
const PALETTE: [&str; 6] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b",
];

/// Something that can display a [`Comparison`].
pub trait Renderer {
    /// Draw the rebased chart, then the log-return chart.
    fn render(&self, comparison: &Comparison) -> Result<()>;
}

// ============================================================================
// SVG line charts
// ============================================================================

/// Configuration for SVG line charts.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    /// Total width in pixels.
    pub width: f64,
    /// Total height in pixels.
    pub height: f64,
    /// Margin around the plot area in pixels.
    pub margin: f64,
    /// Number of labelled ticks on each axis.
    pub ticks: usize,
    pub title: Option<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 450.0,
            margin: 70.0,
            ticks: 6,
            title: None,
        }
    }
}

/// One named line to plot.
#[derive(Debug, Clone, Copy)]
pub struct LineSeries<'a> {
    pub label: &'a str,
    /// Values index-aligned to the chart's dates.
    pub values: &'a [f64],
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Min and max over all finite values, widened when flat.
fn value_extent(series: &[LineSeries<'_>]) -> Option<(f64, f64)> {
    let (min, max) = series
        .iter()
        .flat_map(|s| s.values.iter())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() || !max.is_finite() {
        return None;
    }

    if (max - min).abs() < f64::EPSILON {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
        return Some((min - pad, max + pad));
    }

    Some((min, max))
}

/// Evenly spaced indices into `0..len`, always including both ends.
fn tick_indices(len: usize, ticks: usize) -> Vec<usize> {
    match (len, ticks) {
        (0, _) | (_, 0) => Vec::new(),
        (1, _) | (_, 1) => vec![0],
        _ => {
            let mut idx: Vec<usize> = (0..ticks)
                .map(|i| (i as f64 * (len - 1) as f64 / (ticks - 1) as f64).round() as usize)
                .collect();
            idx.dedup();
            idx
        }
    }
}

/// Render a line chart of `series` against `dates` as a complete SVG document.
///
/// Non-finite values are skipped. Series longer than `dates` are truncated.
pub fn line_chart_svg(
    dates: &[NaiveDate],
    series: &[LineSeries<'_>],
    y_label: &str,
    config: &ChartConfig,
) -> String {
    let w = config.width;
    let h = config.height;
    let m = config.margin;

    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#
    )
    .unwrap();
    writeln!(svg, r#"  <rect width="100%" height="100%" fill="white"/>"#).unwrap();

    if let Some(title) = &config.title {
        writeln!(svg, r#"  <text x="{}" y="25" text-anchor="middle" font-family="sans-serif" font-size="16" font-weight="bold">{}</text>"#,
            w / 2.0, escape(title)).unwrap();
    }

    // Y-axis label, rotated along the left edge
    writeln!(svg, r#"  <text x="18" y="{y}" text-anchor="middle" font-family="sans-serif" font-size="12" transform="rotate(-90 18 {y})">{label}</text>"#,
        y = h / 2.0, label = escape(y_label)).unwrap();

    let extent = value_extent(series);
    let (min_v, max_v) = match (dates.is_empty(), extent) {
        (false, Some(e)) => e,
        _ => {
            writeln!(svg, "</svg>").unwrap();
            return svg;
        }
    };

    let plot_w = w - 2.0 * m;
    let plot_h = h - 2.0 * m;
    let x_at = |i: usize| {
        if dates.len() == 1 {
            m + plot_w / 2.0
        } else {
            m + plot_w * i as f64 / (dates.len() - 1) as f64
        }
    };
    let y_at = |v: f64| m + (1.0 - (v - min_v) / (max_v - min_v)) * plot_h;

    // Axes
    writeln!(svg, r##"  <line x1="{m}" y1="{b}" x2="{r}" y2="{b}" stroke="#000" stroke-width="1"/>"##,
        b = h - m, r = w - m).unwrap();
    writeln!(svg, r##"  <line x1="{m}" y1="{m}" x2="{m}" y2="{b}" stroke="#000" stroke-width="1"/>"##,
        b = h - m).unwrap();

    // Y ticks with horizontal grid lines
    for i in 0..config.ticks.max(2) {
        let v = min_v + (max_v - min_v) * i as f64 / (config.ticks.max(2) - 1) as f64;
        let y = y_at(v);
        writeln!(svg, r##"  <line x1="{m}" y1="{y:.2}" x2="{r}" y2="{y:.2}" stroke="#e0e0e0" stroke-width="0.5"/>"##,
            r = w - m).unwrap();
        writeln!(svg, r#"  <text x="{x}" y="{ty:.2}" text-anchor="end" font-family="sans-serif" font-size="10">{v:.4}</text>"#,
            x = m - 5.0, ty = y + 3.0).unwrap();
    }

    // X ticks labelled with dates
    for i in tick_indices(dates.len(), config.ticks) {
        let x = x_at(i);
        writeln!(svg, r##"  <line x1="{x:.2}" y1="{b}" x2="{x:.2}" y2="{t}" stroke="#000" stroke-width="1"/>"##,
            b = h - m, t = h - m + 4.0).unwrap();
        writeln!(svg, r#"  <text x="{x:.2}" y="{y}" text-anchor="middle" font-family="sans-serif" font-size="10">{}</text>"#,
            dates[i].format("%Y-%m-%d"), y = h - m + 16.0).unwrap();
    }

    // Lines
    for (n, s) in series.iter().enumerate() {
        let points: Vec<String> = s
            .values
            .iter()
            .take(dates.len())
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, &v)| format!("{:.2},{:.2}", x_at(i), y_at(v)))
            .collect();
        if points.is_empty() {
            continue;
        }
        writeln!(svg, r#"  <polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
            PALETTE[n % PALETTE.len()], points.join(" ")).unwrap();
    }

    // Legend, upper left inside the plot area
    for (n, s) in series.iter().enumerate() {
        let y = m + 15.0 + n as f64 * 16.0;
        let x = m + 10.0;
        writeln!(svg, r#"  <line x1="{x}" y1="{ly}" x2="{x2}" y2="{ly}" stroke="{c}" stroke-width="2"/>"#,
            ly = y - 4.0, x2 = x + 20.0, c = PALETTE[n % PALETTE.len()]).unwrap();
        writeln!(svg, r#"  <text x="{tx}" y="{y}" font-family="sans-serif" font-size="11">{}</text>"#,
            escape(s.label), tx = x + 26.0).unwrap();
    }

    writeln!(svg, "</svg>").unwrap();
    svg
}

/// SVG for the rebased price chart of a comparison.
pub fn rebased_chart_svg(comparison: &Comparison, config: &ChartConfig) -> String {
    let series: Vec<LineSeries<'_>> = comparison
        .series
        .iter()
        .map(|s| LineSeries {
            label: &s.label,
            values: &s.rebased,
        })
        .collect();
    line_chart_svg(&comparison.dates, &series, REBASED_Y_LABEL, config)
}

/// SVG for the log-return chart, plotted against every date but the first.
pub fn log_returns_chart_svg(comparison: &Comparison, config: &ChartConfig) -> String {
    let series: Vec<LineSeries<'_>> = comparison
        .series
        .iter()
        .map(|s| LineSeries {
            label: &s.label,
            values: &s.log_returns,
        })
        .collect();
    line_chart_svg(comparison.return_dates(), &series, LOG_RETURNS_Y_LABEL, config)
}

/// Writes `rebased.svg` and `log_returns.svg` into an output directory.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    output_dir: PathBuf,
    config: ChartConfig,
}

impl SvgRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            config: ChartConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ChartConfig) -> Self {
        self.config = config;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write both charts, creating the output directory if needed, and return
    /// the written paths in drawing order.
    pub fn write(&self, comparison: &Comparison) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir)?;

        let charts = [
            ("rebased.svg", rebased_chart_svg(comparison, &self.config)),
            (
                "log_returns.svg",
                log_returns_chart_svg(comparison, &self.config),
            ),
        ];

        let mut written = Vec::with_capacity(charts.len());
        for (name, svg) in charts {
            let path = self.output_dir.join(name);
            fs::write(&path, svg)?;
            info!("Wrote chart: {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

impl Renderer for SvgRenderer {
    fn render(&self, comparison: &Comparison) -> Result<()> {
        for path in self.write(comparison)? {
            println!("Chart written to {}", path.display());
        }
        Ok(())
    }
}

// ============================================================================
// Terminal output
// ============================================================================

/// Generate a sparkline from `values`, averaging down to at most `width`
/// characters. Non-finite values are ignored.
pub fn sparkline(values: &[f64], width: usize) -> String {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || width == 0 {
        return String::new();
    }

    let sampled = downsample(&finite, width);
    let min_val = sampled.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_val = sampled.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max_val - min_val;

    sampled
        .iter()
        .map(|&val| {
            let normalized = if range > 0.0 {
                ((val - min_val) / range).clamp(0.0, 1.0)
            } else {
                0.5
            };
            SPARKLINE_CHARS[((normalized * 7.0).round() as usize).min(7)]
        })
        .collect()
}

/// Downsample a slice of values to a target length using averaging.
fn downsample(values: &[f64], target_len: usize) -> Vec<f64> {
    if values.len() <= target_len {
        return values.to_vec();
    }

    let chunk_size = values.len() as f64 / target_len as f64;
    (0..target_len)
        .filter_map(|i| {
            let start = (i as f64 * chunk_size).floor() as usize;
            let end = (((i + 1) as f64 * chunk_size).ceil() as usize).min(values.len());
            (start < end).then(|| values[start..end].iter().sum::<f64>() / (end - start) as f64)
        })
        .collect()
}

/// Prints both charts as sparklines followed by summary statistics.
#[derive(Debug, Clone)]
pub struct TerminalRenderer {
    pub width: usize,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self { width: 60 }
    }
}

impl TerminalRenderer {
    /// Plain-text report; [`Renderer::render`] prints it with colour.
    pub fn report(&self, comparison: &Comparison) -> String {
        let mut out = String::new();
        let (first, last) = match (comparison.dates.first(), comparison.dates.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => return out,
        };
        let label_width = comparison
            .series
            .iter()
            .map(|s| s.label.chars().count())
            .max()
            .unwrap_or(0);

        writeln!(
            out,
            "{} common dates, {} to {}",
            comparison.dates.len(),
            first,
            last
        )
        .unwrap();

        writeln!(out, "\n{}", REBASED_Y_LABEL).unwrap();
        for s in &comparison.series {
            writeln!(
                out,
                "  {:<lw$}  {}  {:>8.2}",
                s.label,
                sparkline(&s.rebased, self.width),
                s.rebased.last().copied().unwrap_or(f64::NAN),
                lw = label_width
            )
            .unwrap();
        }

        writeln!(out, "\n{}", LOG_RETURNS_Y_LABEL).unwrap();
        for s in &comparison.series {
            writeln!(
                out,
                "  {:<lw$}  {}",
                s.label,
                sparkline(&s.log_returns, self.width),
                lw = label_width
            )
            .unwrap();
        }

        let stats = ComparisonStats::from_comparison(comparison);
        writeln!(out, "\nsummary").unwrap();
        for s in &stats.series {
            writeln!(
                out,
                "  {:<lw$}  total log return {:>+8.4}  mean {:>+9.6}  std {:>9.6}",
                s.label,
                s.total_log_return,
                s.mean_log_return,
                s.std_log_return,
                lw = label_width
            )
            .unwrap();
        }
        if let Some(spread) = stats.final_spread {
            writeln!(out, "  final rebased spread     {:>+8.2}", spread).unwrap();
        }
        if let Some(corr) = stats.return_correlation {
            writeln!(out, "  log return correlation   {:>8.4}", corr).unwrap();
        }

        out
    }
}

impl Renderer for TerminalRenderer {
    fn render(&self, comparison: &Comparison) -> Result<()> {
        println!("{}", "═".repeat(60).blue());
        for line in self.report(comparison).lines() {
            if line == REBASED_Y_LABEL || line == LOG_RETURNS_Y_LABEL || line == "summary" {
                println!("{}", line.bold().underline());
            } else {
                println!("{}", line);
            }
        }
        println!("{}", "═".repeat(60).blue());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
