//! Limited-memory quasi-Newton solver (L-BFGS, and OWL-QN with an L1 term).
//!
//! Purpose
//! -------
//! Run argmin's `LBFGS` with a backtracking Armijo line search while keeping
//! the crate's stopping rule, so that all three strategies stop on the same
//! relative cost test.
//!
//! Key behaviors
//! -------------
//! - [`QuasiNewton::new`] builds plain L-BFGS; [`QuasiNewton::orthant_wise`]
//!   switches on argmin's L1 mode (OWL-QN), which minimizes `c(θ) + C‖θ‖₁`
//!   and can leave coordinates exactly at zero.
//! - Backtracking starts from a unit step and halves it until the Armijo
//!   condition with `c₁ = 1e-4` holds.
//! - `init` / `next_iter` delegate to argmin; `terminate` applies
//!   [`convergence_status`] instead of argmin's absolute cost test.
//!
//! Invariants & assumptions
//! ------------------------
//! - In L1 mode the state cost includes `C‖θ‖₁` and, after the first step,
//!   the state gradient is the pseudo-gradient. The initial state carries the
//!   smooth gradient, so the gradient test is skipped at iteration 0.
//! - A failed line search ends the run with `TerminationReason::SolverExit`
//!   (reported by argmin) and keeps the last accepted point.
use argmin::{
    core::{Error, KV, Problem, Solver, State, TerminationReason, TerminationStatus},
    solver::{
        linesearch::{BacktrackingLineSearch, condition::ArmijoCondition},
        quasinewton::LBFGS,
    },
};
use argmin_math::ArgminL2Norm;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        types::{ArmijoLineSearch, LbfgsArmijo, OptimState},
        validation::verify_l1_coeff,
    },
    solvers::{Convergence, Tolerant, convergence_status},
};

/// Sufficient-decrease constant of the Armijo condition.
const ARMIJO_C1: f64 = 1e-4;

/// Step contraction factor of the backtracking line search.
const BACKTRACK_RHO: f64 = 0.5;

#[derive(Clone)]
pub struct QuasiNewton {
    inner: LbfgsArmijo,
    orthant_wise: bool,
    conv: Convergence,
}

impl QuasiNewton {
    /// L-BFGS with history size `mem`.
    ///
    /// # Errors
    /// - Propagates argmin's parameter errors for the line search.
    pub fn new(mem: usize) -> OptResult<Self> {
        let inner = LBFGS::new(line_search()?, mem);
        Ok(Self { inner, orthant_wise: false, conv: Convergence::default() })
    }

    /// OWL-QN with history size `mem` and L1 coefficient `l1`.
    ///
    /// # Errors
    /// - `OptError::InvalidL1Coeff` unless `l1` is finite and positive.
    pub fn orthant_wise(mem: usize, l1: f64) -> OptResult<Self> {
        verify_l1_coeff(l1)?;
        let inner = LBFGS::new(line_search()?, mem).with_l1_regularization(l1)?;
        Ok(Self { inner, orthant_wise: true, conv: Convergence::default() })
    }
}

fn line_search() -> OptResult<ArmijoLineSearch> {
    Ok(BacktrackingLineSearch::new(ArmijoCondition::new(ARMIJO_C1)?).rho(BACKTRACK_RHO)?)
}

impl Tolerant for QuasiNewton {
    fn convergence_mut(&mut self) -> &mut Convergence {
        &mut self.conv
    }
}

impl<O> Solver<O, OptimState> for QuasiNewton
where
    LbfgsArmijo: Solver<O, OptimState>,
{
    const NAME: &'static str = "L-BFGS";

    fn init(
        &mut self, problem: &mut Problem<O>, state: OptimState,
    ) -> Result<(OptimState, Option<KV>), Error> {
        self.inner.init(problem, state)
    }

    fn next_iter(
        &mut self, problem: &mut Problem<O>, state: OptimState,
    ) -> Result<(OptimState, Option<KV>), Error> {
        self.inner.next_iter(problem, state)
    }

    fn terminate(&mut self, state: &OptimState) -> TerminationStatus {
        let grad_norm = if self.orthant_wise && state.get_iter() == 0 {
            None
        } else {
            state.get_gradient().map(|g| g.l2_norm())
        };
        // Stationary point: the search direction would be zero.
        if grad_norm == Some(0.0) {
            return TerminationStatus::Terminated(TerminationReason::SolverConverged);
        }
        convergence_status(state, grad_norm, &self.conv)
    }
}
