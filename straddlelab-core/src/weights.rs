//! Risk-parity position sizing into currency weights.
//!
//! contracts(t,a) = floor((1 / usd_atr(t,a)) × risk_target × composite(t,a))
//!
//! The floor truncates toward negative infinity, so a short grows more
//! negative rather than rounding toward zero — the conservative-sizing
//! convention the strategy was calibrated with.
//!
//! weight(t,a) = last(t,a) × contracts(t,a) × fx(t,a)
//!               × futures_multiplier × fx_multiplier / scheme_value

use crate::domain::{Panel, Universe};

/// Convert composite signals into currency-denominated weights.
///
/// `usd_atr` is the smoothed true range already scaled into currency
/// terms (see `indicators::apply_multipliers`). Assets flagged
/// `long_only` have negative weights clipped to zero; NaN weights are
/// left NaN so degeneracy stays visible downstream.
pub fn risk_weights(
    composite: &Panel,
    last: &Panel,
    fx: &Panel,
    usd_atr: &Panel,
    universe: &Universe,
) -> Panel {
    Panel::map_columns_of(composite, |a, comp| {
        let asset = &composite.assets()[a];
        let cfg = match universe.get(asset) {
            Some(cfg) => cfg,
            None => return vec![f64::NAN; comp.len()],
        };
        let price = column_for(last, asset);
        let fx_px = column_for(fx, asset);
        let atr = column_for(usd_atr, asset);

        comp.iter()
            .enumerate()
            .map(|(t, &c)| {
                let contracts = ((1.0 / atr(t)) * cfg.risk_target * c).floor();
                let weight = price(t) * contracts * fx_px(t) * cfg.futures_multiplier
                    * cfg.fx_multiplier
                    / cfg.scheme_value;
                if cfg.long_only && weight < 0.0 {
                    0.0
                } else {
                    weight
                }
            })
            .collect()
    })
}

/// Date-indexed accessor for one asset's column, NaN when absent.
fn column_for<'p>(panel: &'p Panel, asset: &str) -> impl Fn(usize) -> f64 + 'p {
    let col = panel.asset_index(asset).map(|i| panel.column(i));
    move |t| col.and_then(|c| c.get(t).copied()).unwrap_or(f64::NAN)
}
