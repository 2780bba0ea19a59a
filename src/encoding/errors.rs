//! Errors for the interning and joint-feature encoding layer.
//!
//! This module defines [`EncodingError`], raised by [`Interner`] and
//! [`JointFeatureEncoder`] when an id is out of range or when a fixed
//! capacity (label count, feature id width) would be exceeded.
//!
//! ## Conventions
//! - **Ids are 0-based** and assigned in first-seen order.
//! - Capacity violations are recoverable errors; the encoders never abort
//!   the process and never silently truncate an id.
//!
//! [`Interner`]: crate::encoding::interner::Interner
//! [`JointFeatureEncoder`]: crate::encoding::joint::JointFeatureEncoder

/// Result alias for interning and encoding operations.
pub type EncodingResult<T> = Result<T, EncodingError>;

/// Unified error type for the encoding layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    // ---- Capacity ----
    /// A new label would exceed the maximum number of distinct labels.
    TooManyLabels { limit: usize },

    /// A feature id does not fit in the joint-feature feature field.
    FeatureSpaceExhausted { limit: usize },

    // ---- Lookup ----
    /// An interned id was resolved that was never assigned.
    UnknownId { id: usize, len: usize },

    /// A parameter index was resolved that the encoder never assigned.
    UnknownParameter { index: usize, len: usize },

    // ---- Reconstruction ----
    /// The same entry appeared twice while rebuilding an encoder.
    DuplicateEntry { value: String },
}

impl std::error::Error for EncodingError {}

impl std::fmt::Display for EncodingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Capacity ----
            EncodingError::TooManyLabels { limit } => {
                write!(f, "Too many distinct labels: at most {limit} are supported.")
            }
            EncodingError::FeatureSpaceExhausted { limit } => {
                write!(f, "Feature id space exhausted: ids must not exceed {limit}.")
            }

            // ---- Lookup ----
            EncodingError::UnknownId { id, len } => {
                write!(f, "Unknown id {id}: only {len} entries are interned.")
            }
            EncodingError::UnknownParameter { index, len } => {
                write!(f, "Unknown parameter index {index}: the model has {len} parameters.")
            }

            // ---- Reconstruction ----
            EncodingError::DuplicateEntry { value } => {
                write!(f, "Duplicate entry while rebuilding encoder: {value}")
            }
        }
    }
}
