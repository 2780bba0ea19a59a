//! Adapter that exposes a user `LogLikelihood` as an `argmin` problem.
//!
//! We convert a *maximization* of a log-likelihood `ℓ(θ)` into a *minimization*
//! problem by defining the cost as `c(θ) = -ℓ(θ)`. Analytic gradients (if
//! provided by the user) are negated accordingly. If a gradient is not
//! provided, we finite-difference the **cost** closure, so no sign flip is
//! needed in that branch.
//!
//! Besides argmin's `CostFunction`/`Gradient`, the adapter implements the two
//! problem traits the crate's solvers consume: [`CostGradient`] (fused
//! evaluation) and [`SampleGradient`] (mini-batch gradients for SGD).
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        finite_diff::{run_central_diff, run_fd_diff},
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
    solvers::{CostGradient, SampleGradient},
};
use argmin::core::{CostFunction, Error, Gradient};

/// Bridges a user `LogLikelihood` to `argmin` and to the crate's solvers.
///
/// - `CostFunction::cost` returns `-ℓ(θ)` (negative log-likelihood).
/// - `Gradient::gradient` returns:
///   - `-∇ℓ(θ)` if the user provides an analytic gradient, or
///   - a finite-difference gradient of the cost (no sign flip needed).
/// - `CostGradient::cost_gradient` returns both at once, using the user's
///   fused `value_and_grad` when available.
/// - `SampleGradient::batch_gradient` returns the cost gradient of a
///   mini-batch of terms, with the penalty gradient scaled by `|B|/N`.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate the cost `c(θ) = -ℓ(θ)`.
    ///
    /// # Errors
    /// - `NonFiniteCost` if the log-likelihood is not finite.
    /// - Propagates any `OptError` from the user’s `value` via `?`.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(theta, self.data)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(-output)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate the gradient of the cost at `θ`.
    ///
    /// Behavior:
    /// - If the user implements `grad(θ, data)`, we validate it and return `-grad`.
    /// - Otherwise, we compute a finite-difference gradient of the **cost**:
    ///   central differences first, forward differences if the central
    ///   attempt captured an error or failed validation.
    ///
    /// Implementation notes:
    /// - The FD closure must return `f64`, so we can’t use `?` inside it; we capture
    ///   the first error in `closure_err` and return `NaN` from the closure.
    ///
    /// # Errors
    /// - Propagates user errors from `grad` (non-`GradientNotImplemented`).
    /// - Propagates any error raised by cost evaluations performed during FD.
    /// - Returns validation errors if the gradient has wrong dimension or
    ///   non-finite entries.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let cost_func = |theta: &Theta| -> f64 {
                    match self.cost(theta) {
                        Ok(val) => val,
                        Err(e) => {
                            let mut slot = closure_err.borrow_mut();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            f64::NAN
                        }
                    }
                };
                match run_central_diff(theta, &cost_func, &closure_err) {
                    Ok(g) => Ok(g),
                    Err(_) => Ok(run_fd_diff(theta, &cost_func, &closure_err)?),
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl<'a, F: LogLikelihood> CostGradient for ArgMinAdapter<'a, F> {
    /// Evaluate `(c(θ), ∇c(θ))`.
    ///
    /// Uses the user's fused `value_and_grad`; if it reports
    /// `GradientNotImplemented`, falls back to [`CostFunction::cost`] plus the
    /// finite-difference [`Gradient::gradient`].
    fn cost_gradient(&self, theta: &Theta) -> Result<(Cost, Grad), Error> {
        match self.f.value_and_grad(theta, self.data) {
            Ok((value, g)) => {
                if !value.is_finite() {
                    return Err((OptError::NonFiniteCost { value }).into());
                }
                validate_grad(&g, theta.len())?;
                Ok((-value, -g))
            }
            Err(OptError::GradientNotImplemented) => Ok((self.cost(theta)?, self.gradient(theta)?)),
            Err(e) => Err(e.into()),
        }
    }
}

impl<'a, F: LogLikelihood> SampleGradient for ArgMinAdapter<'a, F> {
    /// Cost gradient of the terms in `batch`:
    /// `-(Σ_{i∈B} ∇ℓ_i(θ) + (|B|/N)·∇r(θ))`.
    ///
    /// # Errors
    /// - `StochasticNotImplemented` if the model has no per-term gradients.
    /// - Validation errors for non-finite results.
    fn batch_gradient(&self, theta: &Theta, batch: &[usize], n_terms: usize) -> Result<Grad, Error> {
        let mut acc = Grad::zeros(theta.len());
        for &term in batch {
            self.f.term_grad(theta, self.data, term, &mut acc)?;
        }
        let penalty = self.f.penalty_grad(theta, self.data)?;
        acc.scaled_add(batch.len() as f64 / n_terms.max(1) as f64, &penalty);
        validate_grad(&acc, theta.len())?;
        Ok(-acc)
    }
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    /// Construct a new adapter over a user `LogLikelihood` and its data.
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Sign conventions for cost and gradient.
    // - The finite-difference fallback when no analytic gradient exists.
    // - Mini-batch gradients with the scaled penalty term.
    // -------------------------------------------------------------------------

    /// ℓ(θ) = -Σ_i (θ - a_i)² / 2 over terms a, with optional analytic gradient.
    struct Quadratic {
        analytic: bool,
    }

    impl LogLikelihood for Quadratic {
        type Data = Vec<f64>;

        fn value(&self, theta: &Theta, data: &Vec<f64>) -> OptResult<f64> {
            Ok(-data.iter().map(|a| (theta[0] - a).powi(2) / 2.0).sum::<f64>())
        }

        fn check(&self, _theta: &Theta, _data: &Vec<f64>) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, theta: &Theta, data: &Vec<f64>) -> OptResult<Grad> {
            if !self.analytic {
                return Err(OptError::GradientNotImplemented);
            }
            Ok(array![-data.iter().map(|a| theta[0] - a).sum::<f64>()])
        }

        fn n_terms(&self, data: &Vec<f64>) -> OptResult<usize> {
            Ok(data.len())
        }

        fn term_grad(
            &self, theta: &Theta, data: &Vec<f64>, term: usize, acc: &mut Grad,
        ) -> OptResult<()> {
            acc[0] -= theta[0] - data[term];
            Ok(())
        }

        fn penalty_grad(&self, theta: &Theta, _data: &Vec<f64>) -> OptResult<Grad> {
            Ok(array![-theta[0]])
        }
    }

    #[test]
    // Purpose
    // -------
    // Cost and gradient are the negated log-likelihood and gradient, and the
    // fused path agrees with the separate one.
    //
    // Given
    // -----
    // - Terms [1, 3] and θ = 0 with an analytic gradient.
    //
    // Expect
    // ------
    // - cost = 5, ∇c = -4, `cost_gradient` returns the same pair.
    fn signs_are_flipped_for_minimization() {
        let model = Quadratic { analytic: true };
        let data = vec![1.0, 3.0];
        let adapter = ArgMinAdapter::new(&model, &data);
        let theta = array![0.0];

        assert_eq!(adapter.cost(&theta).unwrap(), 5.0);
        assert_eq!(adapter.gradient(&theta).unwrap(), array![-4.0]);
        let (c, g) = adapter.cost_gradient(&theta).unwrap();
        assert_eq!(c, 5.0);
        assert_eq!(g, array![-4.0]);
    }

    #[test]
    // Purpose
    // -------
    // Without an analytic gradient, both gradient paths fall back to finite
    // differences of the cost.
    //
    // Given
    // -----
    // - The same model with `analytic = false`.
    //
    // Expect
    // ------
    // - ∇c ≈ -4 within 1e-6 from `gradient` and from `cost_gradient`.
    fn finite_difference_fallback() {
        let model = Quadratic { analytic: false };
        let data = vec![1.0, 3.0];
        let adapter = ArgMinAdapter::new(&model, &data);
        let theta = array![0.0];

        assert!((adapter.gradient(&theta).unwrap()[0] + 4.0).abs() < 1e-6);
        let (_, g) = adapter.cost_gradient(&theta).unwrap();
        assert!((g[0] + 4.0).abs() < 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // A mini-batch gradient sums its terms and adds the penalty gradient
    // scaled by the batch fraction.
    //
    // Given
    // -----
    // - Terms [1, 3, 5, 7], θ = 2, batch {0, 2}.
    //
    // Expect
    // ------
    // - ∇ℓ_B = (1 - 2) + (5 - 2) + (2/4)·(-2) = 1, so ∇c_B = -1.
    fn batch_gradient_scales_penalty() {
        let model = Quadratic { analytic: true };
        let data = vec![1.0, 3.0, 5.0, 7.0];
        let adapter = ArgMinAdapter::new(&model, &data);

        let g = adapter.batch_gradient(&array![2.0], &[0, 2], 4).unwrap();

        assert!((g[0] + 1.0).abs() < 1e-12);
    }
}
