//! Exponentially weighted moving average, span-parameterized.
//!
//! Matches the adjust=true formulation: the output at `t` is the weighted
//! mean of all observations so far with weights (1-α)^0, (1-α)^1, ...,
//! α = 2/(span+1), normalized by the running weight sum. Early values are
//! therefore true means of the short prefix rather than seeded estimates.

/// Span-based EWM mean over a series.
///
/// A NaN observation yields a NaN output at that index and does not
/// disturb the running average.
pub fn ewm_span_mean(values: &[f64], span: usize) -> Vec<f64> {
    assert!(span >= 1, "EWM span must be >= 1");
    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;

    let mut out = vec![f64::NAN; values.len()];
    let mut num = 0.0;
    let mut den = 0.0;
    for (t, &x) in values.iter().enumerate() {
        if x.is_nan() {
            continue;
        }
        num = x + decay * num;
        den = 1.0 + decay * den;
        out[t] = num / den;
    }
    out
}
