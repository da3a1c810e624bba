//! Rolling-window primitives and the range-volatility estimator.
//!
//! All functions here are causal: the value at index `t` depends only on
//! inputs at or before `t`. NaN inputs make the affected outputs NaN
//! instead of raising; degeneracy is surfaced at the end of the pipeline.

pub mod atr;
pub mod ewm;
pub mod rolling;

pub use atr::{apply_multipliers, true_range, AtrEngine, FirstBarPolicy};
pub use ewm::ewm_span_mean;
pub use rolling::{rolling_max, rolling_min};

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
