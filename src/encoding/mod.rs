//! encoding: interning and joint-feature indexing for symbolic observations.
//!
//! Purpose
//! -------
//! Turn string labels and feature names into dense integer ids and map each
//! `(label, feature)` pair to an index in the parameter vector. Everything
//! above this layer (sample store, evaluator, classifier) works with ids
//! only.
//!
//! Key behaviors
//! -------------
//! - [`interner::Interner`]: bidirectional `String ↔ id` table with
//!   first-seen id assignment and rollback by truncation.
//! - [`joint::JointFeatureEncoder`]: `(label, feature) → parameter index`
//!   with checked capacity bounds ([`joint::MAX_LABELS`],
//!   [`joint::MAX_FEATURE_ID`]).
//! - [`observation::Observation`]: the caller-facing input value.
//!
//! Invariants & assumptions
//! ------------------------
//! - Ids are dense and 0-based; `len()` of a table is the next id to assign.
//! - Capacity violations are recoverable [`errors::EncodingError`] values.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests for idempotence, lookup in both
//!   directions and the capacity edges.

pub mod errors;
pub mod interner;
pub mod joint;
pub mod observation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{EncodingError, EncodingResult};
pub use self::interner::Interner;
pub use self::joint::{
    FeatureId, JointFeatureEncoder, JointFeatureKey, LabelId, MAX_FEATURE_ID, MAX_LABELS,
};
pub use self::observation::Observation;
