//! Performance metrics — pure functions from a portfolio return series.
//!
//! Annualization assumes 252 trading days. Skew and kurtosis use the
//! standard third and fourth standardized moments; kurtosis is reported
//! in excess form (0 for a normal distribution). The legacy system
//! computed "kurtosis" with the skew formula — that defect is corrected
//! here, not reproduced.

use serde::{Deserialize, Serialize};

use crate::backtest::{drawdown, DrawdownSeries};

/// Aggregate statistics for a strategy run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Annualized mean portfolio return.
    pub mean: f64,
    /// Annualized standard deviation of portfolio returns.
    pub std: f64,
    /// Third standardized moment of the daily returns.
    pub skew: f64,
    /// Excess kurtosis (fourth standardized moment − 3).
    pub kurtosis: f64,
    /// mean / std.
    pub sharpe: f64,
    /// Largest drawdown observed.
    pub max_drawdown: f64,
    /// Longest run of consecutive underwater dates.
    pub max_drawdown_duration: u32,
    /// Final cumulative return, Π(1 + r).
    pub terminal: f64,
    /// True when any portfolio return was non-finite. Statistics are
    /// still reported (they will themselves be NaN) so the degeneracy is
    /// visible rather than masked.
    pub non_finite_inputs: bool,
    /// Full drawdown bundle for plotting and inspection.
    pub drawdown: DrawdownSeries,
}

impl PerformanceReport {
    /// Compute every statistic from the portfolio return series.
    pub fn compute(portfolio_returns: &[f64]) -> Self {
        let non_finite_inputs = portfolio_returns.iter().any(|r| !r.is_finite());
        let dd = drawdown(portfolio_returns);

        let mean = mean_f64(portfolio_returns) * 252.0;
        let std = std_dev(portfolio_returns) * 252.0_f64.sqrt();
        let max_drawdown = dd.drawdown.iter().cloned().fold(0.0, f64::max);
        let max_drawdown_duration = dd.duration.iter().copied().max().unwrap_or(0);
        let terminal = dd.cumulative.last().copied().unwrap_or(1.0);

        Self {
            mean,
            std,
            skew: skewness(portfolio_returns),
            kurtosis: excess_kurtosis(portfolio_returns),
            sharpe: mean / std,
            max_drawdown,
            max_drawdown_duration,
            terminal,
            non_finite_inputs,
            drawdown: dd,
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof = 1).
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// k-th central moment with population normalization.
fn central_moment(values: &[f64], k: i32) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean_f64(values);
    values.iter().map(|v| (v - mean).powi(k)).sum::<f64>() / values.len() as f64
}

/// Third standardized moment: m3 / m2^(3/2).
pub fn skewness(values: &[f64]) -> f64 {
    let m2 = central_moment(values, 2);
    central_moment(values, 3) / m2.powf(1.5)
}

/// Excess kurtosis: m4 / m2² − 3.
pub fn excess_kurtosis(values: &[f64]) -> f64 {
    let m2 = central_moment(values, 2);
    central_moment(values, 4) / (m2 * m2) - 3.0
}
