//! Validation helpers for log-likelihood optimization.
//!
//! This module centralizes common consistency checks used across the
//! optimizer interface:
//!
//! - **Tolerance checks**: [`verify_tol_grad`], [`verify_tol_cost`] ensure
//!   numeric tolerances are finite and strictly positive when provided.
//! - **Strategy options**: [`verify_l1_coeff`], [`verify_learning_rate`],
//!   [`verify_batch_size`] and [`verify_strategy`] check the per-strategy
//!   settings and their combination.
//! - **Gradient validation**: [`validate_grad`] enforces correct dimension
//!   and finite entries.
//! - **Parameter estimates**: [`validate_theta_hat`] ensures a candidate
//!   `theta_hat` exists and contains only finite values.
//! - **Objective values**: [`validate_value`] checks log-likelihood outputs
//!   for finiteness.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Grad, Theta,
        traits::{LearningRate, MLEOptions, Strategy},
    },
};

/// Validate the optional gradient‐norm tolerance.
///
/// - Accepts `None` (no stopping rule on gradient).
/// - If `Some`, the value must be **finite** and **strictly positive**.
///
/// # Errors
/// Returns [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate the optional relative cost‐change tolerance.
///
/// - Accepts `None` (no stopping rule on cost change).
/// - If `Some`, the value must be **finite** and **strictly positive**.
///
/// # Errors
/// Returns [`OptError::InvalidTolCost`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate an L1 regularization coefficient.
///
/// # Errors
/// Returns [`OptError::InvalidL1Coeff`] unless the value is finite and `> 0`.
pub fn verify_l1_coeff(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::InvalidL1Coeff { value, reason: "Coefficient must be finite." });
    }
    if value <= 0.0 {
        return Err(OptError::InvalidL1Coeff { value, reason: "Coefficient must be positive." });
    }
    Ok(())
}

/// Validate the parameters of a learning-rate schedule.
///
/// - Every initial rate must be finite and `> 0`.
/// - `Exponential::alpha` must lie in `(0, 1]`.
/// - `InverseScaling::decay` must be finite and `≥ 0`.
///
/// # Errors
/// Returns [`OptError::InvalidLearningRate`] naming the offending value.
pub fn verify_learning_rate(schedule: &LearningRate) -> OptResult<()> {
    let eta0 = match *schedule {
        LearningRate::Constant(eta) => eta,
        LearningRate::Exponential { eta0, alpha } => {
            if !alpha.is_finite() || alpha <= 0.0 || alpha > 1.0 {
                return Err(OptError::InvalidLearningRate {
                    value: alpha,
                    reason: "Decay factor alpha must lie in (0, 1].",
                });
            }
            eta0
        }
        LearningRate::InverseScaling { eta0, decay } => {
            if !decay.is_finite() || decay < 0.0 {
                return Err(OptError::InvalidLearningRate {
                    value: decay,
                    reason: "Decay must be finite and non-negative.",
                });
            }
            eta0
        }
    };
    if !eta0.is_finite() || eta0 <= 0.0 {
        return Err(OptError::InvalidLearningRate {
            value: eta0,
            reason: "Learning rate must be finite and positive.",
        });
    }
    Ok(())
}

/// Validate a mini-batch size.
///
/// # Errors
/// Returns [`OptError::InvalidBatchSize`] if `size == 0`.
pub fn verify_batch_size(size: usize) -> OptResult<()> {
    if size == 0 {
        return Err(OptError::InvalidBatchSize {
            size,
            reason: "Batch size must be greater than zero.",
        });
    }
    Ok(())
}

/// Validate the combination of strategy and L1 coefficient.
///
/// - The orthant-wise strategy requires a valid `l1_coeff`.
/// - Every other strategy requires `l1_coeff == None`.
///
/// # Errors
/// - [`OptError::InvalidL1Coeff`] for orthant-wise without a coefficient.
/// - [`OptError::L1RequiresOrthantWise`] for a coefficient on another strategy.
pub fn verify_strategy(opts: &MLEOptions) -> OptResult<()> {
    match (opts.strategy, opts.l1_coeff) {
        (Strategy::OrthantWise, Some(c)) => verify_l1_coeff(c),
        (Strategy::OrthantWise, None) => Err(OptError::InvalidL1Coeff {
            value: 0.0,
            reason: "The orthant-wise strategy requires an L1 coefficient.",
        }),
        (_, Some(_)) => Err(OptError::L1RequiresOrthantWise),
        (_, None) => Ok(()),
    }
}

/// Validate a gradient vector against dimension and finiteness.
///
/// Checks:
/// - `grad.len() == dim`
/// - every element is finite (`NaN` or `±∞` are rejected)
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if length does not match `dim`.
/// - [`OptError::InvalidGradient`] with the index/value/reason of the first
///   offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate and unwrap an estimated parameter vector (`theta_hat`).
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if no vector was provided.
/// - [`OptError::InvalidThetaHat`] if any element is non-finite.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    match theta_hat {
        Some(t) => {
            for (index, &value) in t.iter().enumerate() {
                if !value.is_finite() {
                    return Err(OptError::InvalidThetaHat {
                        index,
                        value,
                        reason: "Parameter estimates must be finite.",
                    });
                }
            }
            Ok(t)
        }
        None => Err(OptError::MissingThetaHat),
    }
}

/// Validate that a scalar log-likelihood value is finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}
