//! Error surface for the optimization layer.
//!
//! [`OptError`] covers option validation, objective/gradient evaluation
//! failures, outcome validation and errors raised inside the argmin
//! backend. Argmin transports errors as `anyhow` values; the
//! `From<argmin::core::Error>` conversion recovers an [`OptError`] that
//! travelled through the executor unchanged before falling back to
//! argmin's own error kinds.
use argmin::core::{ArgminError, Error};

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// Implies that FD should be used
    GradientNotImplemented,

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient elements need to be finite
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Per-term gradients are required by the stochastic strategy.
    StochasticNotImplemented,

    // ---- MLEOptions ----
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad {
        tol: f64,
        reason: &'static str,
    },
    /// Cost change tolerance needs to be positive and finite.
    InvalidTolCost {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// At least one tolerance must be provided.
    NoTolerancesProvided,

    /// Invalid optimization strategy name.
    InvalidStrategy {
        name: String,
        reason: &'static str,
    },

    /// lbfgs_mem needs to be at least 1.
    InvalidLBFGSMem {
        mem: usize,
        reason: &'static str,
    },

    /// L1 coefficient needs to be positive and finite.
    InvalidL1Coeff {
        value: f64,
        reason: &'static str,
    },

    /// An L1 coefficient was given to a strategy that cannot handle it.
    L1RequiresOrthantWise,

    /// Learning-rate schedule parameters are out of range.
    InvalidLearningRate {
        value: f64,
        reason: &'static str,
    },

    /// Mini-batch size needs to be at least 1.
    InvalidBatchSize {
        size: usize,
        reason: &'static str,
    },

    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    /// Parameter vector length does not match the model.
    ThetaLengthMismatch {
        expected: usize,
        actual: usize,
    },

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Theta hat is missing
    MissingThetaHat,

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientNotImplemented => {
                write!(f, "Gradient optimization not implemented")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }
            OptError::StochasticNotImplemented => {
                write!(f, "Per-term gradients are not implemented; SGD is unavailable")
            }

            // ---- MLEOptions ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost function change tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "No tolerances provided")
            }
            OptError::InvalidStrategy { name, reason } => {
                write!(f, "Invalid optimization strategy '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}: {reason}")
            }
            OptError::InvalidL1Coeff { value, reason } => {
                write!(f, "Invalid L1 coefficient {value}: {reason}")
            }
            OptError::L1RequiresOrthantWise => {
                write!(f, "An L1 coefficient requires the orthant-wise strategy")
            }
            OptError::InvalidLearningRate { value, reason } => {
                write!(f, "Invalid learning-rate parameter {value}: {reason}")
            }
            OptError::InvalidBatchSize { size, reason } => {
                write!(f, "Invalid batch size {size}: {reason}")
            }

            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Theta length mismatch: expected {expected}, actual {actual}")
            }

            // ---- Optimizer outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid estimated parameter at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Missing estimated parameters (theta hat)")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(opt_err) => match opt_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the conversion from argmin's `anyhow`-based error
    // into `OptError` for the three possible origins.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // An `OptError` raised inside a cost function and carried through argmin
    // must come back out unchanged.
    //
    // Given
    // -----
    // - `OptError::NonFiniteCost { value: inf }` wrapped as `argmin::core::Error`.
    //
    // Expect
    // ------
    // - Conversion yields the identical variant.
    fn own_errors_round_trip_through_argmin() {
        let err: Error = OptError::NonFiniteCost { value: f64::INFINITY }.into();

        assert_eq!(OptError::from(err), OptError::NonFiniteCost { value: f64::INFINITY });
    }

    #[test]
    // Purpose
    // -------
    // Argmin's own error kinds map onto the wrapper variants.
    //
    // Given
    // -----
    // - `ArgminError::NotInitialized { text: "x" }`.
    //
    // Expect
    // ------
    // - `OptError::NotInitialized { text: "x" }`.
    fn argmin_errors_map_to_wrappers() {
        let err: Error = ArgminError::NotInitialized { text: "x".to_string() }.into();

        assert_eq!(OptError::from(err), OptError::NotInitialized { text: "x".to_string() });
    }

    #[test]
    // Purpose
    // -------
    // Anything else becomes a `BackendError` carrying the message.
    //
    // Given
    // -----
    // - An ad-hoc `anyhow` error with message "boom".
    //
    // Expect
    // ------
    // - `OptError::BackendError { text: "boom" }`.
    fn foreign_errors_become_backend_errors() {
        let err = Error::msg("boom");

        assert_eq!(OptError::from(err), OptError::BackendError { text: "boom".to_string() });
    }
}
