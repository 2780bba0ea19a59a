//! solvers: argmin `Solver`s used by the optimizer.
//!
//! Purpose
//! -------
//! Provide the three optimization strategies as argmin solvers running on
//! the crate's shared state type
//! ([`OptimState`](crate::optimization::loglik_optimizer::types::OptimState)):
//!
//! - [`QuasiNewton`]: argmin's `LBFGS` with backtracking Armijo line
//!   search; with an L1 coefficient it runs in argmin's OWL-QN mode.
//! - [`Sgd`]: mini-batch stochastic gradient descent, one epoch per
//!   iteration.
//!
//! Key behaviors
//! -------------
//! - `QuasiNewton` consumes argmin's `CostFunction` / `Gradient`; `Sgd`
//!   consumes the two small traits defined here, [`CostGradient`] (fused
//!   cost and gradient) and [`SampleGradient`] (mini-batch gradients). The
//!   log-likelihood adapter implements all four.
//! - Every evaluation goes through `Problem` so argmin's counters
//!   (`cost_count`, `gradient_count`, `cost_gradient_count`,
//!   `batch_gradient_count`) reach the outcome.
//! - Convergence is shared ([`convergence_status`]): relative cost change
//!   `|c_{k-1} − c_k| / max(1, |c_k|) < tol_cost`, or gradient norm
//!   `< tol_grad`. The iteration cap is enforced by the executor.
//!
//! Invariants & assumptions
//! ------------------------
//! - Solvers minimize; the adapter has already negated the log-likelihood.
//! - A run that can make no further progress ends with
//!   `TerminationReason::SolverExit` and keeps the last accepted point; it
//!   is not an error.
//!
//! Testing notes
//! -------------
//! - Each solver module tests convergence on the small convex problems in
//!   `test_problems`.

pub mod quasi_newton;
pub mod sgd;

pub use self::quasi_newton::QuasiNewton;
pub use self::sgd::Sgd;

use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        types::{Cost, Grad, OptimState, Theta},
        validation::{verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::{Error, State, TerminationReason, TerminationStatus};

/// Fused evaluation of cost and gradient.
pub trait CostGradient {
    fn cost_gradient(&self, param: &Theta) -> Result<(Cost, Grad), Error>;
}

/// Cost gradient restricted to a mini-batch of additive terms.
///
/// `n_terms` is the total number of terms; implementations use it to scale
/// any non-decomposable part (e.g., a prior) by `|batch| / n_terms`.
pub trait SampleGradient {
    fn batch_gradient(&self, param: &Theta, batch: &[usize], n_terms: usize)
    -> Result<Grad, Error>;
}

/// Stopping tolerances carried by every solver.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Convergence {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
}

impl Convergence {
    pub fn with_tolerance_grad(mut self, tol: f64) -> OptResult<Self> {
        verify_tol_grad(Some(tol))?;
        self.tol_grad = Some(tol);
        Ok(self)
    }

    pub fn with_tolerance_cost(mut self, tol: f64) -> OptResult<Self> {
        verify_tol_cost(Some(tol))?;
        self.tol_cost = Some(tol);
        Ok(self)
    }
}

/// Solvers that carry a [`Convergence`] and can have tolerances attached.
pub trait Tolerant: Sized {
    fn convergence_mut(&mut self) -> &mut Convergence;

    /// Stop when the (pseudo-)gradient norm drops below `tol`.
    fn with_tolerance_grad(mut self, tol: f64) -> OptResult<Self> {
        let conv = *self.convergence_mut();
        *self.convergence_mut() = conv.with_tolerance_grad(tol)?;
        Ok(self)
    }

    /// Stop when the relative cost change drops below `tol`.
    fn with_tolerance_cost(mut self, tol: f64) -> OptResult<Self> {
        let conv = *self.convergence_mut();
        *self.convergence_mut() = conv.with_tolerance_cost(tol)?;
        Ok(self)
    }
}

/// Shared convergence test.
///
/// `grad_norm` is the norm the gradient tolerance applies to (the
/// pseudo-gradient for OWL-QN), or `None` to skip the gradient test. The
/// cost test is skipped until a previous cost exists.
pub fn convergence_status(
    state: &OptimState, grad_norm: Option<f64>, conv: &Convergence,
) -> TerminationStatus {
    if let (Some(tol), Some(norm)) = (conv.tol_grad, grad_norm) {
        if norm < tol {
            return TerminationStatus::Terminated(TerminationReason::SolverConverged);
        }
    }
    if let Some(tol) = conv.tol_cost {
        let prev = state.get_prev_cost();
        let cur = state.get_cost();
        if prev.is_finite() && cur.is_finite() && (prev - cur).abs() / cur.abs().max(1.0) < tol {
            return TerminationStatus::Terminated(TerminationReason::SolverConverged);
        }
    }
    TerminationStatus::NotTerminated
}

/// Error for a solver started without an initial parameter vector.
pub(crate) fn missing_param() -> Error {
    OptError::MissingThetaHat.into()
}
