//! Summary statistics over a [`Comparison`].

use crate::types::{Comparison, SeriesComparison};

/// Per-series summary of rebased level and log-return behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStats {
    pub label: String,
    /// Last rebased value (100 = unchanged since the first common date).
    pub final_rebased: f64,
    /// Sum of log returns, i.e. `ln(last / first)`.
    pub total_log_return: f64,
    pub mean_log_return: f64,
    /// Sample standard deviation of log returns. Zero with fewer than two returns.
    pub std_log_return: f64,
}

impl SeriesStats {
    pub fn from_series(series: &SeriesComparison) -> Self {
        let returns = &series.log_returns;
        let mean = mean(returns);

        Self {
            label: series.label.clone(),
            final_rebased: series.rebased.last().copied().unwrap_or(f64::NAN),
            total_log_return: returns.iter().sum(),
            mean_log_return: mean,
            std_log_return: sample_std(returns, mean),
        }
    }
}

/// Statistics for every series plus a pairwise comparison of the first two.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonStats {
    pub series: Vec<SeriesStats>,
    /// Pearson correlation of the first two series' log returns.
    pub return_correlation: Option<f64>,
    /// Final rebased level of the first series minus the second.
    pub final_spread: Option<f64>,
}

impl ComparisonStats {
    pub fn from_comparison(comparison: &Comparison) -> Self {
        let series: Vec<SeriesStats> = comparison
            .series
            .iter()
            .map(SeriesStats::from_series)
            .collect();

        let (return_correlation, final_spread) = match comparison.series.as_slice() {
            [a, b, ..] => (
                correlation(&a.log_returns, &b.log_returns),
                Some(series[0].final_rebased - series[1].final_rebased),
            ),
            _ => (None, None),
        };

        Self {
            series,
            return_correlation,
            final_spread,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Pearson correlation. `None` when lengths differ, fewer than two points,
/// or either side has zero variance.
pub fn correlation(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }

    let mean_a = mean(a);
    let mean_b = mean(b);

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a <= 0.0 || var_b <= 0.0 {
        return None;
    }

    Some(cov / (var_a.sqrt() * var_b.sqrt()))
}
