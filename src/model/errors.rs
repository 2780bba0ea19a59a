//! Errors for the classifier model layer (ingestion, training
//! configuration, persistence and optimizer failures).
//!
//! [`ModelError`] is the single error type returned by the sample store,
//! the trainer, the classifier and model persistence. Lower layers keep
//! their own enums and are folded in through `From` conversions:
//!
//! - [`EncodingError`] capacity errors keep their meaning
//!   (`TooManyLabels`, `FeatureSpaceExhausted`); lookup and reconstruction
//!   errors can only arise from a damaged model file and become
//!   [`ModelError::CorruptModelFile`].
//! - [`OptError::ThetaLengthMismatch`] becomes
//!   [`ModelError::DimensionMismatch`]; every other optimizer error is
//!   wrapped in [`ModelError::Optimization`].
//! - `serde_json` syntax/data/EOF errors become `CorruptModelFile`; its I/O
//!   errors and `std::io::Error` become [`ModelError::Io`].
//!
//! ## Conventions
//! - All ingestion errors are raised before the store commits anything.
//! - Optimizer non-convergence is a reported status, never an error.
use crate::{encoding::EncodingError, optimization::errors::OptError};

/// Result alias for model-layer operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Unified error type for the model layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    // ---- Ingestion ----
    /// A new label would exceed the maximum number of distinct labels.
    TooManyLabels { limit: usize },

    /// A feature id does not fit in the joint-feature feature field.
    FeatureSpaceExhausted { limit: usize },

    /// A real-valued feature is NaN or infinite.
    InvalidFeatureValue { feature: String, value: f64 },

    // ---- Training configuration ----
    /// Training requested on a store without training samples.
    EmptyTrainingSet,

    /// Heldout count must leave at least one training sample.
    InvalidHeldout { heldout: usize, samples: usize },

    /// Gaussian prior variance must be finite and > 0.
    InvalidPriorVariance { value: f64 },

    /// Random initialization scale must be finite and > 0.
    InvalidInitScale { value: f64 },

    /// Parameter vector length disagrees with the joint-feature encoder.
    DimensionMismatch { expected: usize, actual: usize },

    // ---- Persistence ----
    /// Not a model file of this crate, or an unsupported version.
    UnknownModelFile { reason: String },

    /// Malformed, truncated or internally inconsistent model file.
    CorruptModelFile { reason: String },

    /// Underlying reader/writer failure.
    Io { kind: std::io::ErrorKind, message: String },

    // ---- Estimation ----
    /// Error raised by the optimization layer.
    Optimization(OptError),
}

impl std::error::Error for ModelError {}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Ingestion ----
            ModelError::TooManyLabels { limit } => {
                write!(f, "Too many distinct labels: at most {limit} are supported.")
            }
            ModelError::FeatureSpaceExhausted { limit } => {
                write!(f, "Feature id space exhausted: ids must not exceed {limit}.")
            }
            ModelError::InvalidFeatureValue { feature, value } => {
                write!(f, "Feature '{feature}' has a non-finite value: {value}")
            }
            // ---- Training configuration ----
            ModelError::EmptyTrainingSet => {
                write!(f, "No training samples have been added.")
            }
            ModelError::InvalidHeldout { heldout, samples } => {
                write!(
                    f,
                    "Heldout count ({heldout}) must be smaller than the number of samples ({samples})."
                )
            }
            ModelError::InvalidPriorVariance { value } => {
                write!(f, "Prior variance must be finite and > 0; got: {value}")
            }
            ModelError::InvalidInitScale { value } => {
                write!(f, "Random initialization scale must be finite and > 0; got: {value}")
            }
            ModelError::DimensionMismatch { expected, actual } => {
                write!(f, "Parameter vector length mismatch: expected {expected}, got {actual}")
            }
            // ---- Persistence ----
            ModelError::UnknownModelFile { reason } => {
                write!(f, "Unrecognized model file: {reason}")
            }
            ModelError::CorruptModelFile { reason } => {
                write!(f, "Corrupt model file: {reason}")
            }
            ModelError::Io { kind, message } => {
                write!(f, "I/O error ({kind:?}): {message}")
            }
            // ---- Estimation ----
            ModelError::Optimization(err) => {
                write!(f, "Optimization failed: {err}")
            }
        }
    }
}

impl From<EncodingError> for ModelError {
    fn from(err: EncodingError) -> ModelError {
        match err {
            EncodingError::TooManyLabels { limit } => ModelError::TooManyLabels { limit },
            EncodingError::FeatureSpaceExhausted { limit } => {
                ModelError::FeatureSpaceExhausted { limit }
            }
            other => ModelError::CorruptModelFile { reason: other.to_string() },
        }
    }
}

impl From<OptError> for ModelError {
    fn from(err: OptError) -> ModelError {
        match err {
            OptError::ThetaLengthMismatch { expected, actual } => {
                ModelError::DimensionMismatch { expected, actual }
            }
            other => ModelError::Optimization(other),
        }
    }
}

impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> ModelError {
        ModelError::Io { kind: err.kind(), message: err.to_string() }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> ModelError {
        if err.is_io() {
            return std::io::Error::from(err).into();
        }
        ModelError::CorruptModelFile { reason: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the `From` conversions into `ModelError`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Encoding capacity errors keep their meaning; lookup errors read as a
    // damaged model.
    //
    // Given
    // -----
    // - `TooManyLabels` and `UnknownId` encoding errors.
    //
    // Expect
    // ------
    // - `ModelError::TooManyLabels` and `ModelError::CorruptModelFile`.
    fn encoding_errors_convert() {
        let cap: ModelError = EncodingError::TooManyLabels { limit: 255 }.into();
        let lookup: ModelError = EncodingError::UnknownId { id: 9, len: 2 }.into();

        assert_eq!(cap, ModelError::TooManyLabels { limit: 255 });
        assert!(matches!(lookup, ModelError::CorruptModelFile { .. }));
    }

    #[test]
    // Purpose
    // -------
    // A dimension error from the optimizer surfaces as `DimensionMismatch`.
    //
    // Given
    // -----
    // - `OptError::ThetaLengthMismatch` and `OptError::NonFiniteCost`.
    //
    // Expect
    // ------
    // - `DimensionMismatch` and a wrapped `Optimization` error.
    fn optimizer_errors_convert() {
        let dim: ModelError = OptError::ThetaLengthMismatch { expected: 4, actual: 3 }.into();
        let other: ModelError = OptError::NonFiniteCost { value: f64::INFINITY }.into();

        assert_eq!(dim, ModelError::DimensionMismatch { expected: 4, actual: 3 });
        assert!(matches!(other, ModelError::Optimization(OptError::NonFiniteCost { .. })));
    }

    #[test]
    // Purpose
    // -------
    // JSON syntax errors read as a corrupt file.
    //
    // Given
    // -----
    // - A truncated JSON document.
    //
    // Expect
    // ------
    // - `CorruptModelFile`.
    fn json_errors_convert() {
        let err = serde_json::from_str::<serde_json::Value>("{\"labels\": [").unwrap_err();

        assert!(matches!(ModelError::from(err), ModelError::CorruptModelFile { .. }));
    }
}
