//! loglik_optimizer::types: shared numeric aliases and solver state.
//!
//! Purpose
//! -------
//! Centralize the numeric types used by the log-likelihood optimizer and
//! its solvers so the rest of the code stays agnostic to `ndarray` and
//! argmin generics.
//!
//! Key behaviors
//! -------------
//! - Define canonical aliases for parameter vectors, gradients and scalar
//!   costs (`Theta`, `Grad`, `Cost`).
//! - Provide the argmin state type every solver in this crate runs on
//!   ([`OptimState`]), the map type for function-evaluation counters
//!   ([`FnEvalMap`]) and the concrete argmin L-BFGS type ([`LbfgsArmijo`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - All optimizer vectors are `ndarray::Array1<f64>` of length equal to the
//!   number of free parameters.
//! - `Cost` is the minimized quantity `c(θ) = -ℓ(θ)` (plus the L1 term for
//!   the orthant-wise solver); sign flips happen in the adapter.
//!
//! Testing notes
//! -------------
//! - Only aliases and constants live here; they are exercised by the
//!   solver and adapter tests.
use argmin::{
    core::IterState,
    solver::{
        linesearch::{BacktrackingLineSearch, condition::ArmijoCondition},
        quasinewton::LBFGS,
    },
};
use ndarray::Array1;
use std::collections::HashMap;

/// Parameter vector `θ` for log-likelihood optimization.
pub type Theta = Array1<f64>;

/// Gradient vector `∇ℓ(θ)` or `∇c(θ)`, matching the shape of `Theta`.
pub type Grad = Array1<f64>;

/// Scalar objective value used by the optimizer.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps counter names (e.g., `"gradient_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Argmin iteration state shared by every solver in this crate.
pub type OptimState = IterState<Theta, Grad, (), (), (), Cost>;

/// Backtracking line search with the Armijo sufficient-decrease condition.
pub type ArmijoLineSearch = BacktrackingLineSearch<Theta, Grad, ArmijoCondition<Cost>, Cost>;

/// argmin's L-BFGS (OWL-QN when L1 is enabled) over [`ArmijoLineSearch`].
pub type LbfgsArmijo = LBFGS<ArmijoLineSearch, Theta, Grad, Cost>;

/// Default history size (`m`) for L-BFGS and OWL-QN runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;
