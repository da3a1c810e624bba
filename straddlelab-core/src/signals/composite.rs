//! Composite signal — the per-asset directional state machine.
//!
//! State S ∈ {−1, 0, +1}, initial 0, evaluated strictly in date order:
//! 1. Carry the previous state forward.
//! 2. Entries: price at its entry-window rolling max with a +1 discrete
//!    signal goes long; price at its entry-window rolling min with a −1
//!    discrete signal goes short. Down-entry is evaluated after up-entry
//!    (last write wins on the rare date both fire).
//! 3. Exits (breakout mode only, conditioned on the *previous* state): a
//!    long exits when the discrete signal drops to ≤ 0 or price touches
//!    its exit-window rolling min; symmetric for shorts. An exit evaluated
//!    against the previous state overrides a same-date opposing entry.
//!
//! Without breakout mode a position never auto-exits; it persists until an
//! opposing entry overwrites it. That asymmetry is deliberate and mirrors
//! the trend-persistence design.
//!
//! Output: state sign × |momentum score|. Dates before an asset's signal
//! coverage are flat (0.0); a NaN score inside coverage propagates.
//!
//! Only this stage carries memory across dates. Assets are independent
//! and run in parallel.

use rayon::prelude::*;

use crate::domain::{coverage_start, Panel, Universe};
use crate::indicators::{rolling_max, rolling_min};

/// Run the state machine across the whole panel.
///
/// `signals` is the continuous momentum score, `discrete` its bufferized
/// sign, `last` the price panel the rolling extremes are computed on.
pub fn composite_signal(
    signals: &Panel,
    discrete: &Panel,
    last: &Panel,
    universe: &Universe,
) -> Panel {
    let dates = last.dates();
    let n = dates.len();

    let columns: Vec<Vec<f64>> = (0..last.n_assets())
        .into_par_iter()
        .map(|a| {
            let asset = &last.assets()[a];
            let cfg = match universe.get(asset) {
                Some(cfg) => cfg,
                None => return vec![f64::NAN; n],
            };
            let price = last.column(a);
            let sig = signals.column(a);
            let disc = discrete.column(a);

            let entry_high = rolling_max(price, cfg.entry_window);
            let entry_low = rolling_min(price, cfg.entry_window);
            let exit_high = rolling_max(price, cfg.exit_window);
            let exit_low = rolling_min(price, cfg.exit_window);

            let first = coverage_start(dates, cfg.straddle_lookback, cfg.start_date);

            let mut out = vec![0.0; n];
            let mut state: i8 = 0;
            for t in 0..n {
                match first {
                    Some(first) if t >= first => {}
                    _ => continue,
                }

                let prev = state;
                if price[t] >= entry_high[t] && disc[t] == 1.0 {
                    state = 1;
                }
                if price[t] <= entry_low[t] && disc[t] == -1.0 {
                    state = -1;
                }
                if cfg.breakout {
                    if prev == 1 && (disc[t] <= 0.0 || price[t] <= exit_low[t]) {
                        state = 0;
                    }
                    if prev == -1 && (disc[t] >= 0.0 || price[t] >= exit_high[t]) {
                        state = 0;
                    }
                }

                out[t] = state as f64 * sig[t].abs();
            }
            out
        })
        .collect();

    let mut it = columns.into_iter();
    Panel::map_columns_of(last, |_, _| it.next().unwrap())
}
