//! loglik_optimizer::finite_diff: finite-difference gradient helpers.
//!
//! Purpose
//! -------
//! Provide central- and forward-difference gradient approximations around a
//! parameter vector, together with error capture and validation, so that
//! the optimizer can fall back to numerical derivatives for log-likelihoods
//! without an analytic gradient, and so that analytic gradients can be
//! checked against a numerical reference in tests.
//!
//! Key behaviors
//! -------------
//! - Differences come from the `finitediff` crate (`FiniteDiff` on
//!   `ndarray::Array1<f64>`).
//! - [`run_central_diff`] and [`run_fd_diff`] wrap them with error capture
//!   (through a shared `closure_err` cell) and post-hoc validation.
//!
//! Invariants & assumptions
//! ------------------------
//! - `finitediff` steps every coordinate by `√ε` (ε the `f64` machine
//!   epsilon) for both schemes.
//! - Any error raised by the objective during differencing is treated as a
//!   hard failure for that gradient computation.
//!
//! Conventions
//! -----------
//! - Differences are taken with respect to the unconstrained vector `Theta`.
//! - Central differences are preferred; forward differences are the
//!   fallback used when the central result fails validation.
//!
//! Downstream usage
//! ----------------
//! - [`ArgMinAdapter`](crate::optimization::loglik_optimizer::adapter::ArgMinAdapter)
//!   calls these helpers when `LogLikelihood::grad` reports
//!   `GradientNotImplemented`.
//! - Gradient-correctness tests call `FiniteDiff::central_diff` directly.
//!
//! Testing notes
//! -------------
//! - Unit tests cover accuracy on a smooth function and the error-capture
//!   path.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{Grad, Theta, validation::validate_grad},
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// run_fd_diff: forward-difference gradient with error capture and validation.
///
/// Purpose
/// -------
/// Compute a forward-difference approximation to the gradient of a scalar
/// objective at `theta`, while capturing any error raised inside the
/// evaluation closure and enforcing basic shape/finiteness invariants on
/// the resulting gradient.
///
/// Parameters
/// ----------
/// - `theta`: `&Theta`
///   Point at which the gradient is approximated.
/// - `func`: `&G`
///   Objective mapping `theta` to a scalar. It is assumed to route any
///   evaluation error into `closure_err` and return `NaN` in that case.
/// - `closure_err`: `&RefCell<Option<Error>>`
///   Shared cell capturing the first error raised inside `func`. This
///   helper clears the cell on entry and inspects it afterwards.
///
/// Errors
/// ------
/// - The captured error (converted into `OptError`) when `func` failed.
/// - `OptError::GradientDimMismatch` / `OptError::InvalidGradient` from
///   [`validate_grad`].
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// run_central_diff: central-difference counterpart of [`run_fd_diff`].
///
/// # Errors
/// Same as [`run_fd_diff`].
pub fn run_central_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.central_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Accuracy of central and forward differences on a smooth function.
    // - Propagation of errors captured inside the objective closure.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Both runners should match the analytic gradient of a smooth function.
    //
    // Given
    // -----
    // - f(x) = x0² + 3·x0·x1 + exp(x1) at (0.5, -1.0), no captured error.
    //
    // Expect
    // ------
    // - Central and forward errors < 1e-6 per coordinate.
    fn differences_match_analytic_gradient() {
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |x: &Theta| x[0] * x[0] + 3.0 * x[0] * x[1] + x[1].exp();
        let theta = array![0.5, -1.0];
        let exact = array![2.0 * 0.5 + 3.0 * -1.0, 3.0 * 0.5 + (-1.0f64).exp()];

        let central = run_central_diff(&theta, &f, &closure_err).unwrap();
        let forward = run_fd_diff(&theta, &f, &closure_err).unwrap();

        for i in 0..2 {
            assert!((central[i] - exact[i]).abs() < 1e-6);
            assert!((forward[i] - exact[i]).abs() < 1e-6);
        }
    }

    #[test]
    // Purpose
    // -------
    // An error recorded by the objective is returned instead of a gradient.
    //
    // Given
    // -----
    // - An objective that records `NonFiniteCost` and returns NaN.
    //
    // Expect
    // ------
    // - Both runners return that `OptError`.
    fn captured_errors_are_propagated() {
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_: &Theta| {
            let mut slot = closure_err.borrow_mut();
            if slot.is_none() {
                *slot = Some(OptError::NonFiniteCost { value: f64::NAN }.into());
            }
            f64::NAN
        };
        let theta = array![1.0];

        assert!(matches!(
            run_central_diff(&theta, &f, &closure_err),
            Err(OptError::NonFiniteCost { .. })
        ));
        assert!(matches!(run_fd_diff(&theta, &f, &closure_err), Err(OptError::NonFiniteCost { .. })));
    }
}
