//! Lookback-straddle momentum score.
//!
//! For each trailing window, price a pair of synthetic straddles per window
//! day — one struck at the running maximum from that day to the window end
//! (up-strike), one at the running minimum (down-strike) — and average the
//! call+put deltas across all days and both strikes. A persistently
//! trending price pushes the deltas toward one sign, so the average acts
//! as a continuous momentum score.
//!
//! Window day k (1-based from the window start) pairs with year fraction
//! t = k/365; the maturity grid therefore spans the window itself and the
//! horizon equals the lookback.

use chrono::NaiveDate;
use rayon::prelude::*;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::domain::{coverage_start, Panel, RateSeries, Universe};

/// Trading days per year, used to annualize window volatility.
const TRADING_DAYS: f64 = 252.0;

/// Calendar days per year, used for option maturities.
const CALENDAR_DAYS: f64 = 365.0;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error(
        "asset '{asset}': {observations} finite observation(s) in the \
         {lookback}-day window ending {date}; at least 2 required"
    )]
    InsufficientData {
        asset: String,
        date: NaiveDate,
        lookback: usize,
        observations: usize,
    },
    #[error("no risk-free rate quoted for {0}")]
    MissingRate(NaiveDate),
}

/// Standard normal distribution for delta calculations.
fn std_normal() -> Normal {
    Normal::new(0.0, 1.0).unwrap()
}

/// Standard normal CDF, NaN-transparent.
fn norm_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    std_normal().cdf(x)
}

/// Black-Scholes d1 term.
///
/// Zero volatility or a non-positive price ratio produce a non-finite
/// result; callers propagate it rather than masking it.
pub fn d1(spot: f64, strike: f64, rate: f64, t: f64, vol: f64) -> f64 {
    ((spot / strike).ln() + t * (rate + vol * vol / 2.0)) / (t.sqrt() * vol)
}

/// Call and put deltas for a given d1: (Φ(d1), −Φ(−d1)).
pub fn straddle_deltas(d1: f64) -> (f64, f64) {
    (norm_cdf(d1), -norm_cdf(-d1))
}

/// Annualized volatility of daily percent changes within a window.
///
/// Sample standard deviation (ddof = 1) over the window's L−1 changes;
/// a window of 2 observations has a single change and yields NaN.
fn annualized_vol(window: &[f64]) -> f64 {
    let changes: Vec<f64> = window
        .windows(2)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    if changes.len() < 2 {
        return f64::NAN;
    }
    let mean = changes.iter().sum::<f64>() / changes.len() as f64;
    let var = changes.iter().map(|c| (c - mean).powi(2)).sum::<f64>()
        / (changes.len() - 1) as f64;
    var.sqrt() * TRADING_DAYS.sqrt()
}

/// Average straddle delta for one fully-observed window.
///
/// `rate_pct` is the risk-free rate in percent at the window end.
fn window_score(window: &[f64], rate_pct: f64) -> f64 {
    let l = window.len();
    let spot = window[l - 1];
    let rate = rate_pct / 100.0;
    let vol = annualized_vol(window);

    // Running extremes from each window day to the window end.
    let mut up_strikes = vec![0.0; l];
    let mut down_strikes = vec![0.0; l];
    up_strikes[l - 1] = window[l - 1];
    down_strikes[l - 1] = window[l - 1];
    for k in (0..l - 1).rev() {
        up_strikes[k] = window[k].max(up_strikes[k + 1]);
        down_strikes[k] = window[k].min(down_strikes[k + 1]);
    }

    let mut total = 0.0;
    for k in 0..l {
        let t = (k + 1) as f64 / CALENDAR_DAYS;
        for strike in [up_strikes[k], down_strikes[k]] {
            let (call, put) = straddle_deltas(d1(spot, strike, rate, t, vol));
            total += call + put;
        }
    }
    total / (4.0 * l as f64)
}

/// Vectorized momentum-score engine over a price panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraddleDeltaEngine;

impl StraddleDeltaEngine {
    /// One score per asset per covered date; dates outside an asset's
    /// coverage (window does not fit, or before its start date) are NaN.
    ///
    /// Assets are independent and run in parallel. Any window with fewer
    /// than 2 finite observations aborts the run for its asset.
    pub fn compute(
        &self,
        last: &Panel,
        rates: &RateSeries,
        universe: &Universe,
    ) -> Result<Panel, SignalError> {
        let dates = last.dates();
        let n = dates.len();

        let columns: Vec<Vec<f64>> = (0..last.n_assets())
            .into_par_iter()
            .map(|a| -> Result<Vec<f64>, SignalError> {
                let asset = &last.assets()[a];
                let col = last.column(a);
                let mut out = vec![f64::NAN; n];

                let cfg = match universe.get(asset) {
                    Some(cfg) => cfg,
                    None => return Ok(out),
                };
                let lookback = cfg.straddle_lookback;
                let first = match coverage_start(dates, lookback, cfg.start_date) {
                    Some(first) => first,
                    None => return Ok(out),
                };

                for t in first..n {
                    let window = &col[t + 1 - lookback..=t];
                    let finite = window.iter().filter(|v| v.is_finite()).count();
                    if finite < 2 {
                        return Err(SignalError::InsufficientData {
                            asset: asset.clone(),
                            date: dates[t],
                            lookback,
                            observations: finite,
                        });
                    }
                    let rate = rates
                        .get(dates[t])
                        .ok_or(SignalError::MissingRate(dates[t]))?;
                    out[t] = window_score(window, rate);
                }
                Ok(out)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut it = columns.into_iter();
        Ok(Panel::map_columns_of(last, |_, _| it.next().unwrap()))
    }
}

/// Discretize a score panel: |score| > buffer → sign(score), else 0.
///
/// NaN scores compare false and map to 0.
pub fn discretize(signals: &Panel, universe: &Universe) -> Panel {
    Panel::map_columns_of(signals, |a, col| {
        let buffer = universe
            .get(&signals.assets()[a])
            .map(|cfg| cfg.buffer)
            .unwrap_or(f64::INFINITY);
        col.iter()
            .map(|&s| if s.abs() > buffer { s.signum() } else { 0.0 })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AssetConfig;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};
    use std::collections::HashMap;

    fn day(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap() + chrono::Duration::days(i)
    }

    fn config(lookback: usize, buffer: f64) -> AssetConfig {
        AssetConfig {
            futures_multiplier: 1.0,
            fx_multiplier: 1.0,
            commission: 0.0,
            start_date: day(0),
            straddle_lookback: lookback,
            atr_lookback: 3,
            entry_window: 2,
            exit_window: 2,
            breakout: false,
            buffer,
            risk_target: 1.0,
            scheme_value: 1.0,
            long_only: false,
        }
    }

    fn universe_of(asset: &str, cfg: AssetConfig) -> Universe {
        let mut configs = HashMap::new();
        configs.insert(asset.to_string(), cfg);
        Universe::new(configs)
    }

    /// Day-by-day reference: price each window day's straddle pair with
    /// scalar Black-Scholes calls, no vectorization.
    fn reference_window_score(window: &[f64], rate_pct: f64) -> f64 {
        let l = window.len();
        let spot = window[l - 1];
        let rate = rate_pct / 100.0;
        let vol = annualized_vol(window);

        let mut total = 0.0;
        for k in 0..l {
            let t = (k + 1) as f64 / 365.0;
            let up = window[k..].iter().cloned().fold(f64::MIN, f64::max);
            let down = window[k..].iter().cloned().fold(f64::MAX, f64::min);
            for strike in [up, down] {
                let (call, put) = straddle_deltas(d1(spot, strike, rate, t, vol));
                total += call + put;
            }
        }
        total / (4.0 * l as f64)
    }

    // ── Black-Scholes delta mathematics ─────────────────────────────

    #[test]
    fn at_the_money_forward_deltas_are_half() {
        let (call, put) = straddle_deltas(0.0);
        assert_approx(call, 0.5, DEFAULT_EPSILON);
        assert_approx(put, -0.5, DEFAULT_EPSILON);
    }

    #[test]
    fn put_call_delta_parity() {
        for x in [-3.0, -0.7, 0.0, 0.2, 2.5] {
            let (call, put) = straddle_deltas(x);
            assert_approx(call - put, 1.0, 1e-12);
        }
    }

    #[test]
    fn d1_known_value() {
        // S=100, K=95, r=5%, t=0.25, v=20%:
        // d1 = (ln(100/95) + 0.25*(0.05 + 0.02)) / (0.5*0.2)
        let expected = ((100.0f64 / 95.0).ln() + 0.25 * 0.07) / (0.5 * 0.2);
        assert_approx(d1(100.0, 95.0, 0.05, 0.25, 0.2), expected, 1e-12);
    }

    #[test]
    fn zero_volatility_is_not_masked() {
        let v = d1(100.0, 95.0, 0.05, 0.25, 0.0);
        assert!(!v.is_finite());
    }

    #[test]
    fn negative_price_ratio_is_nan() {
        assert!(d1(100.0, -95.0, 0.05, 0.25, 0.2).is_nan());
    }

    // ── Window score ────────────────────────────────────────────────

    #[test]
    fn vectorized_score_matches_scalar_reference() {
        let window = [100.0, 101.5, 99.0, 103.0, 104.2, 102.8, 106.0];
        let score = window_score(&window, 5.0);
        let reference = reference_window_score(&window, 5.0);
        assert_approx(score, reference, 1e-12);
        assert!(score.is_finite());
    }

    #[test]
    fn rising_price_scores_positive_falling_negative() {
        let up: Vec<f64> = (0..10).map(|i| 100.0 + i as f64 * 2.0).collect();
        let down: Vec<f64> = (0..10).map(|i| 100.0 - i as f64 * 2.0).collect();
        assert!(window_score(&up, 1.0) > 0.0);
        assert!(window_score(&down, 1.0) < 0.0);
    }

    #[test]
    fn two_point_window_has_undefined_volatility() {
        // One percent change -> sample std undefined -> NaN score.
        assert!(window_score(&[100.0, 101.0], 1.0).is_nan());
    }

    #[test]
    fn flat_window_is_not_silently_zeroed() {
        // Zero volatility sends d1 to ±infinity; the deltas saturate
        // instead of collapsing to a fake neutral score.
        let score = window_score(&[100.0; 5], 1.0);
        assert!(score.is_nan() || score != 0.0);
    }

    // ── Engine coverage ─────────────────────────────────────────────

    fn price_panel(closes: &[f64]) -> Panel {
        let dates: Vec<NaiveDate> = (0..closes.len() as i64).map(day).collect();
        Panel::from_columns(dates, vec![("GOLD".into(), closes.to_vec())]).unwrap()
    }

    fn flat_rates(n: i64) -> RateSeries {
        RateSeries::new((0..n).map(|i| (day(i), 1.0)).collect()).unwrap()
    }

    #[test]
    fn engine_fills_only_covered_dates() {
        let last = price_panel(&[100.0, 101.0, 99.0, 105.0, 95.0, 103.0]);
        let universe = universe_of("GOLD", config(4, 0.0));
        let signals = StraddleDeltaEngine
            .compute(&last, &flat_rates(6), &universe)
            .unwrap();

        for t in 0..3 {
            assert!(signals.get(t, 0).is_nan(), "t={t} should be pre-coverage");
        }
        for t in 3..6 {
            assert!(signals.get(t, 0).is_finite(), "t={t} should be covered");
        }
    }

    #[test]
    fn engine_respects_start_date() {
        let last = price_panel(&[100.0, 101.0, 99.0, 105.0, 95.0, 103.0]);
        let mut cfg = config(3, 0.0);
        cfg.start_date = day(4);
        let universe = universe_of("GOLD", cfg);
        let signals = StraddleDeltaEngine
            .compute(&last, &flat_rates(6), &universe)
            .unwrap();

        for t in 0..4 {
            assert!(signals.get(t, 0).is_nan());
        }
        assert!(signals.get(4, 0).is_finite());
    }

    #[test]
    fn engine_is_causal() {
        // Perturbing the final price must not change earlier scores.
        let base_prices = [100.0, 101.0, 99.0, 105.0, 95.0, 103.0];
        let mut shocked = base_prices;
        shocked[5] = 250.0;
        let universe = universe_of("GOLD", config(3, 0.0));

        let base = StraddleDeltaEngine
            .compute(&price_panel(&base_prices), &flat_rates(6), &universe)
            .unwrap();
        let moved = StraddleDeltaEngine
            .compute(&price_panel(&shocked), &flat_rates(6), &universe)
            .unwrap();
        for t in 2..5 {
            assert_eq!(base.get(t, 0).to_bits(), moved.get(t, 0).to_bits());
        }
        assert!(base.get(5, 0) != moved.get(5, 0));
    }

    #[test]
    fn engine_fails_on_starved_window() {
        let last = price_panel(&[100.0, f64::NAN, f64::NAN, 105.0]);
        let universe = universe_of("GOLD", config(3, 0.0));
        let err = StraddleDeltaEngine
            .compute(&last, &flat_rates(4), &universe)
            .unwrap_err();
        assert!(matches!(err, SignalError::InsufficientData { observations: 1, .. }));
    }

    #[test]
    fn engine_fails_on_missing_rate() {
        let last = price_panel(&[100.0, 101.0, 99.0, 105.0]);
        let universe = universe_of("GOLD", config(3, 0.0));
        let rates = RateSeries::new(vec![(day(2), 1.0)]).unwrap();
        let err = StraddleDeltaEngine
            .compute(&last, &rates, &universe)
            .unwrap_err();
        assert!(matches!(err, SignalError::MissingRate(d) if d == day(3)));
    }

    // ── Discretization ──────────────────────────────────────────────

    #[test]
    fn discretize_applies_buffer() {
        let dates: Vec<NaiveDate> = (0..4).map(day).collect();
        let signals = Panel::from_columns(
            dates,
            vec![("GOLD".into(), vec![0.3, -0.3, 0.1, -0.1])],
        )
        .unwrap();
        let universe = universe_of("GOLD", config(3, 0.15));
        let disc = discretize(&signals, &universe);
        assert_eq!(disc.get(0, 0), 1.0);
        assert_eq!(disc.get(1, 0), -1.0);
        assert_eq!(disc.get(2, 0), 0.0);
        assert_eq!(disc.get(3, 0), 0.0);
    }

    #[test]
    fn discretize_maps_nan_to_flat() {
        let dates: Vec<NaiveDate> = (0..2).map(day).collect();
        let signals = Panel::from_columns(
            dates,
            vec![("GOLD".into(), vec![f64::NAN, 0.5])],
        )
        .unwrap();
        let universe = universe_of("GOLD", config(3, 0.15));
        let disc = discretize(&signals, &universe);
        assert_eq!(disc.get(0, 0), 0.0);
        assert_eq!(disc.get(1, 0), 1.0);
    }

    #[test]
    fn discretize_exact_buffer_is_flat() {
        let dates: Vec<NaiveDate> = (0..1).map(day).collect();
        let signals =
            Panel::from_columns(dates, vec![("GOLD".into(), vec![0.15])]).unwrap();
        let universe = universe_of("GOLD", config(3, 0.15));
        assert_eq!(discretize(&signals, &universe).get(0, 0), 0.0);
    }
}
