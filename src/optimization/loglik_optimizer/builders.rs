//! loglik_optimizer::builders: solver construction helpers.
//!
//! Purpose
//! -------
//! Turn an [`MLEOptions`] into a configured solver for each [`Strategy`]
//! so that the entry point can dispatch without knowing how any solver is
//! wired.
//!
//! Key behaviors
//! -------------
//! - [`build_quasi_newton`] and [`build_orthant_wise`] wrap argmin's
//!   `LBFGS` (the latter in its L1 mode) with history `opts.lbfgs_mem`,
//!   falling back to [`DEFAULT_LBFGS_MEM`].
//! - [`build_sgd`] takes the schedule, batch size and shuffle seed from
//!   `opts.sgd` and the number of additive terms from the caller.
//! - Every builder applies `tol_grad` / `tol_cost` through the shared
//!   [`configure_tolerances`] helper.
//!
//! Invariants & assumptions
//! ------------------------
//! - Builders never set `theta0` or `max_iters`; the runner owns both.
//! - The orthant-wise builder requires `opts.l1_coeff`; a missing or
//!   invalid coefficient is reported as [`OptError::InvalidL1Coeff`].
//!
//! Testing notes
//! -------------
//! - Unit tests check that each builder accepts valid options, that the
//!   orthant-wise builder rejects a missing coefficient, and that invalid
//!   tolerances surface as errors.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        traits::{MLEOptions, Strategy},
        types::DEFAULT_LBFGS_MEM,
    },
    solvers::{QuasiNewton, Sgd, Tolerant},
};

/// Build an L-BFGS solver from `opts`.
///
/// # Errors
/// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
///   tolerances that are not finite and positive.
pub fn build_quasi_newton(opts: &MLEOptions) -> OptResult<QuasiNewton> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_tolerances(QuasiNewton::new(mem)?, opts)
}

/// Build an OWL-QN solver from `opts`.
///
/// # Errors
/// - [`OptError::InvalidL1Coeff`] when `opts.l1_coeff` is `None` or not
///   finite and positive.
/// - Tolerance errors as in [`build_quasi_newton`].
pub fn build_orthant_wise(opts: &MLEOptions) -> OptResult<QuasiNewton> {
    let l1 = opts.l1_coeff.ok_or(OptError::InvalidL1Coeff {
        value: 0.0,
        reason: "The orthant-wise strategy requires an L1 coefficient.",
    })?;
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_tolerances(QuasiNewton::orthant_wise(mem, l1)?, opts)
}

/// Build a stochastic gradient solver over `n_terms` additive terms.
///
/// # Errors
/// - Tolerance errors as in [`build_quasi_newton`].
pub fn build_sgd(opts: &MLEOptions, n_terms: usize) -> OptResult<Sgd> {
    configure_tolerances(Sgd::new(&opts.sgd, n_terms), opts)
}

/// Apply the optional gradient and cost tolerances of `opts` to `solver`.
pub fn configure_tolerances<S: Tolerant>(mut solver: S, opts: &MLEOptions) -> OptResult<S> {
    if let Some(tol) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(tol)?;
    }
    if let Some(tol) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(tol)?;
    }
    Ok(solver)
}

/// Name used in log lines for `strategy`.
pub fn strategy_name(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::QuasiNewton => "lbfgs",
        Strategy::OrthantWise => "owlqn",
        Strategy::Stochastic => "sgd",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::traits::Tolerances;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction of each solver from valid options.
    // - The L1 coefficient requirement of the orthant-wise builder.
    // - Rejection of invalid tolerances reaching a solver.
    // -------------------------------------------------------------------------

    fn opts(strategy: Strategy, mem: Option<usize>) -> MLEOptions {
        let tols = Tolerances::new(Some(1e-6), Some(1e-8), Some(50)).expect("valid tolerances");
        MLEOptions::new(tols, strategy, false, mem).expect("valid options")
    }

    #[test]
    // Purpose
    // -------
    // All three builders succeed on valid options, with default or explicit
    // L-BFGS memory.
    //
    // Given
    // -----
    // - Valid tolerances; `lbfgs_mem` of `None` and `Some(11)`; L1 = 0.5 for
    //   the orthant-wise case.
    //
    // Expect
    // ------
    // - Every builder returns `Ok(_)`.
    fn builders_accept_valid_options() {
        assert!(build_quasi_newton(&opts(Strategy::QuasiNewton, None)).is_ok());
        assert!(build_quasi_newton(&opts(Strategy::QuasiNewton, Some(11))).is_ok());

        let owl = opts(Strategy::OrthantWise, Some(4)).with_l1(0.5).expect("valid L1");
        assert!(build_orthant_wise(&owl).is_ok());

        assert!(build_sgd(&opts(Strategy::Stochastic, None), 10).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // The orthant-wise builder cannot run without a coefficient.
    //
    // Given
    // -----
    // - `Strategy::OrthantWise` with `l1_coeff = None`.
    //
    // Expect
    // ------
    // - `OptError::InvalidL1Coeff`.
    fn orthant_wise_requires_coefficient() {
        let err = build_orthant_wise(&opts(Strategy::OrthantWise, None)).err().unwrap();

        assert!(matches!(err, OptError::InvalidL1Coeff { .. }));
    }

    #[test]
    // Purpose
    // -------
    // A tolerance that bypassed `Tolerances::new` is still rejected when it
    // reaches a solver.
    //
    // Given
    // -----
    // - Options whose `tol_grad` was overwritten with -1.
    //
    // Expect
    // ------
    // - `OptError::InvalidTolGrad`.
    fn invalid_tolerance_is_rejected() {
        let mut bad = opts(Strategy::QuasiNewton, None);
        bad.tols.tol_grad = Some(-1.0);

        let err = build_quasi_newton(&bad).err().unwrap();

        assert!(matches!(err, OptError::InvalidTolGrad { .. }));
    }
}
