//! numerical_stability: overflow-safe transforms for log-linear scoring.
//!
//! Purpose
//! -------
//! Collect the small numerical primitives the evaluator and classifier
//! share: a max-shifted softmax, log-sum-exp and a floored logarithm. This
//! module centralizes the probability floor so every consumer of reference
//! distributions applies the same guard.
//!
//! Key behaviors
//! -------------
//! - [`softmax_in_place`] normalizes a score vector in place and returns
//!   its log-normalizer, so the caller gets `ln p(y) = s_y − ln Z` without
//!   a second pass.
//! - [`log_sum_exp`] computes `ln Z` alone.
//! - [`safe_ln`] floors probabilities at [`PROB_FLOOR`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite scores; a softmax over an empty vector is never
//!   requested (a frozen model has at least one label).
//!
//! Conventions
//! -----------
//! - Routines operate on `ndarray` views and update in place.
//! - Pure functions: no logging, I/O or global state.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] compare against naïve formulas on
//!   safe inputs and check extreme scores.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{PROB_FLOOR, log_sum_exp, safe_ln, softmax_in_place};

pub mod prelude {
    pub use super::transformations::{PROB_FLOOR, log_sum_exp, safe_ln, softmax_in_place};
}
