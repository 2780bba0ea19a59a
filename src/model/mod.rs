//! model: ingestion, objective, training, classification and persistence
//! for the maximum-entropy classifier.
//!
//! Purpose
//! -------
//! Provide everything between raw [`Observation`](crate::encoding::Observation)s
//! and a trained, persistable [`Classifier`], on top of the `encoding` and
//! `optimization` layers.
//!
//! Key behaviors
//! -------------
//! - [`sample_store`]: interning of observations with rollback on error,
//!   and the freeze into an immutable [`TrainingSet`].
//! - [`evaluator`]: the penalized log-likelihood and its gradient as a
//!   [`LogLikelihood`](crate::optimization::loglik_optimizer::LogLikelihood).
//! - [`classifier`]: label distributions for new observations.
//! - [`trainer`]: the end-to-end [`MaxEntTrainer`].
//! - [`persist`]: versioned JSON snapshots of a classifier.
//! - [`distribution`]: [`LabelDistribution`] and the [`ReferenceModel`]
//!   seam for prior calibration.
//!
//! Invariants & assumptions
//! ------------------------
//! - Training and classification share [`scoring`], so a sample scores the
//!   same whether it is evaluated by the optimizer or by the classifier.
//! - Every fallible operation returns [`ModelResult`]; the layer never
//!   panics on bad input.
//!
//! Downstream usage
//! ----------------
//! - Most callers only need the [`prelude`].

pub mod classifier;
pub mod distribution;
pub mod errors;
pub mod evaluator;
pub mod options;
pub mod persist;
pub mod sample_store;
pub mod scoring;
pub mod trainer;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::classifier::Classifier;
pub use self::distribution::{LabelDistribution, ReferenceModel};
pub use self::errors::{ModelError, ModelResult};
pub use self::evaluator::{Evaluator, GaussianPrior, Portion};
pub use self::options::{Init, TrainingOptions};
pub use self::persist::{MODEL_FORMAT, MODEL_VERSION, ModelSnapshot};
pub use self::sample_store::{Sample, SampleStore, TrainingSet};
pub use self::trainer::{MaxEntTrainer, TrainingReport};

pub mod prelude {
    pub use super::classifier::Classifier;
    pub use super::distribution::{LabelDistribution, ReferenceModel};
    pub use super::errors::{ModelError, ModelResult};
    pub use super::options::{Init, TrainingOptions};
    pub use super::trainer::{MaxEntTrainer, TrainingReport};
}
