//! Numerical stability utilities.
//!
//! Provides safe implementations of the transforms a log-linear model
//! evaluates in its inner loop, all of which overflow or lose precision in
//! naïve form.
//!
//! # Provided items
//! - [`PROB_FLOOR`]: smallest probability passed to a logarithm (1e-300).
//! - [`safe_ln(p)`]: `ln(max(p, PROB_FLOOR))`, finite for every `p ≥ 0`.
//! - [`log_sum_exp(xs)`]: `ln Σ exp(x_i)` with the maximum shifted out.
//! - [`softmax_in_place(xs)`]: overwrites scores with their max-shifted
//!   softmax and returns the log-normalizer.
//!
//! # Rationale
//! Label scores are unbounded sums of weights; exponentiating them
//! directly overflows for scores above ~709. Subtracting the maximum keeps
//! every exponent `≤ 0`, so at least one term is exactly 1 and the sum is
//! in `[1, n]`.
use ndarray::{ArrayView1, ArrayViewMut1};

/// Floor applied to probabilities before taking logarithms.
///
/// Reference distributions may assign exactly zero to a label; the floor
/// keeps `ln p` finite (≈ −690.8) so that label remains representable with
/// a large negative prior score instead of `−∞`.
pub const PROB_FLOOR: f64 = 1e-300;

/// Natural logarithm with the argument floored at [`PROB_FLOOR`].
pub fn safe_ln(p: f64) -> f64 {
    p.max(PROB_FLOOR).ln()
}

/// `ln Σ_i exp(x_i)` evaluated as `m + ln Σ_i exp(x_i − m)` with `m = max x`.
///
/// Returns `−∞` for an empty slice.
pub fn log_sum_exp(xs: ArrayView1<'_, f64>) -> f64 {
    let m = xs.fold(f64::NEG_INFINITY, |acc, &x| acc.max(x));
    if !m.is_finite() {
        return m;
    }
    m + xs.fold(0.0, |acc, &x| acc + (x - m).exp()).ln()
}

/// Replace `scores` with `softmax(scores)` and return `ln Σ exp(scores)`.
///
/// The maximum is subtracted before exponentiating. The output entries are
/// non-negative and sum to 1 up to rounding.
pub fn softmax_in_place(mut scores: ArrayViewMut1<'_, f64>) -> f64 {
    let m = scores.fold(f64::NEG_INFINITY, |acc, &x| acc.max(x));
    let mut z = 0.0;
    scores.mapv_inplace(|x| {
        let e = (x - m).exp();
        z += e;
        e
    });
    scores.mapv_inplace(|e| e / z);
    m + z.ln()
}
