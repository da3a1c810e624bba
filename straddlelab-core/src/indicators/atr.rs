//! Smoothed true range — the risk estimate behind position sizing.
//!
//! True Range at t: max(high-low, |high-prev_close|, |low-prev_close|).
//! Smoothing: span EWM with span = the asset's atr lookback.
//!
//! The first bar has no previous close. The legacy convention treats it as
//! 0, which inflates the first true-range value to roughly the price level;
//! the EWM then decays that spike over the warm-up. `FirstBarPolicy` makes
//! the convention explicit and overridable.

use rayon::prelude::*;

use crate::domain::{Panel, PricePanel, Universe};
use crate::indicators::ewm::ewm_span_mean;

/// How to compute true range on the first bar, where no previous close
/// exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstBarPolicy {
    /// Treat the missing previous close as 0. Reproduces the legacy
    /// series exactly, including its inflated first value.
    #[default]
    ZeroPrevClose,
    /// First true range is just high - low.
    HighLowOnly,
}

/// Compute the true-range series for one asset.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64], policy: FirstBarPolicy) -> Vec<f64> {
    let n = close.len();
    let mut tr = vec![f64::NAN; n];
    if n == 0 {
        return tr;
    }

    let first_prev_close = match policy {
        FirstBarPolicy::ZeroPrevClose => 0.0,
        FirstBarPolicy::HighLowOnly => f64::NAN,
    };
    tr[0] = single_true_range(high[0], low[0], first_prev_close);

    for t in 1..n {
        tr[t] = single_true_range(high[t], low[t], close[t - 1]);
    }
    tr
}

fn single_true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    let range = high - low;
    if prev_close.is_nan() {
        return range;
    }
    range.max((high - prev_close).abs()).max((low - prev_close).abs())
}

/// Smoothed true range across the whole price panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtrEngine {
    pub first_bar: FirstBarPolicy,
}

impl AtrEngine {
    /// One EWM-smoothed true-range column per asset, span taken from each
    /// asset's configured lookback. Assets are independent and run in
    /// parallel.
    pub fn compute(&self, prices: &PricePanel, universe: &Universe) -> Panel {
        let n = prices.last.n_dates();
        let columns: Vec<Vec<f64>> = (0..prices.last.n_assets())
            .into_par_iter()
            .map(|a| {
                let asset = &prices.last.assets()[a];
                let span = universe
                    .get(asset)
                    .map(|cfg| cfg.atr_lookback)
                    .unwrap_or(1);
                let tr = true_range(
                    prices.high.column(a),
                    prices.low.column(a),
                    prices.last.column(a),
                    self.first_bar,
                );
                ewm_span_mean(&tr, span)
            })
            .collect();

        let mut it = columns.into_iter();
        Panel::map_columns_of(&prices.last, |_, _| {
            it.next().unwrap_or_else(|| vec![f64::NAN; n])
        })
    }
}

/// Convert a per-asset panel into currency terms: value × fx price ×
/// futures multiplier × fx multiplier.
pub fn apply_multipliers(panel: &Panel, fx: &Panel, universe: &Universe) -> Panel {
    Panel::map_columns_of(panel, |a, col| {
        let asset = &panel.assets()[a];
        let (fut_m, fx_m) = universe
            .get(asset)
            .map(|cfg| (cfg.futures_multiplier, cfg.fx_multiplier))
            .unwrap_or((f64::NAN, f64::NAN));
        let fx_col = fx
            .asset_index(asset)
            .map(|i| fx.column(i))
            .unwrap_or(&[]);
        col.iter()
            .enumerate()
            .map(|(t, &v)| {
                let fx_px = fx_col.get(t).copied().unwrap_or(f64::NAN);
                v * fx_px * fut_m * fx_m
            })
            .collect()
    })
}
