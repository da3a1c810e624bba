//! Backtest accounting — lagged returns, transaction costs, drawdown.
//!
//! Positions decided on date t earn the price move of t+1: the weight
//! panel is lagged one period before being applied, with the lag of the
//! first date defined as 0 (no position before the series starts). The
//! first date's price return is likewise defined as 0, so the cost of
//! establishing the initial position is still charged on date 0 instead
//! of vanishing into a NaN.

use serde::{Deserialize, Serialize};
use straddlelab_core::domain::{Panel, Universe};

/// Per-asset and portfolio returns from a weight panel.
///
/// `returns` and `weights` must share axes (both descend from the price
/// panel). asset_return(t,a) = price_return(t,a) × weight(t−1,a) −
/// |weight(t,a) − weight(t−1,a)| × commission(a). The portfolio return is
/// the straight sum across assets — a NaN contribution poisons the date
/// rather than being silently skipped.
pub fn compute_returns(
    returns: &Panel,
    weights: &Panel,
    universe: &Universe,
) -> (Panel, Vec<f64>) {
    let n = returns.n_dates();
    let asset_returns = Panel::map_columns_of(returns, |a, ret| {
        let asset = &returns.assets()[a];
        let commission = universe.get(asset).map(|cfg| cfg.commission).unwrap_or(0.0);
        let w = weights.column(a);
        (0..n)
            .map(|t| {
                let lagged = if t == 0 { 0.0 } else { w[t - 1] };
                let cost = (w[t] - lagged).abs() * commission;
                ret[t] * lagged - cost
            })
            .collect()
    });

    let portfolio: Vec<f64> = (0..n)
        .map(|t| (0..asset_returns.n_assets()).map(|a| asset_returns.get(t, a)).sum())
        .collect();

    (asset_returns, portfolio)
}

/// Cumulative return, high-water mark, drawdown, and drawdown duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawdownSeries {
    /// Π(1 + r) up to and including each date.
    pub cumulative: Vec<f64>,
    /// Running maximum of the cumulative return.
    pub high_water: Vec<f64>,
    /// |cumulative / high_water − 1| — non-negative by construction.
    pub drawdown: Vec<f64>,
    /// Consecutive dates (inclusive) spent below the high-water mark;
    /// resets to 0 whenever the drawdown is exactly 0.
    pub duration: Vec<u32>,
}

/// Compute the drawdown bundle from a portfolio return series.
pub fn drawdown(portfolio_returns: &[f64]) -> DrawdownSeries {
    let n = portfolio_returns.len();
    let mut cumulative = Vec::with_capacity(n);
    let mut high_water = Vec::with_capacity(n);
    let mut dd = Vec::with_capacity(n);
    let mut duration = Vec::with_capacity(n);

    let mut cum = 1.0;
    let mut hwm = f64::NEG_INFINITY;
    let mut run: u32 = 0;
    for &r in portfolio_returns {
        cum *= 1.0 + r;
        hwm = hwm.max(cum);
        let d = (cum / hwm - 1.0).abs();
        run = if d == 0.0 { 0 } else { run + 1 };

        cumulative.push(cum);
        high_water.push(hwm);
        dd.push(d);
        duration.push(run);
    }

    DrawdownSeries {
        cumulative,
        high_water,
        drawdown: dd,
        duration,
    }
}
