//! rust_maxent: maximum-entropy (multinomial logistic regression)
//! classifier trainer.
//!
//! Purpose
//! -------
//! Train log-linear classifiers over sparse binary and real-valued
//! features, such as part-of-speech taggers, and use them to classify new
//! observations. The crate covers the full path from symbolic observations
//! to a persisted model.
//!
//! Key behaviors
//! -------------
//! - [`encoding`]: interns labels and feature names and maps each
//!   `(label, feature)` pair to a parameter index.
//! - [`model`]: sample store, penalized log-likelihood evaluator, trainer,
//!   classifier and JSON persistence.
//! - [`optimization`]: an argmin-backed maximizer with three strategies
//!   (L-BFGS, OWL-QN for L1 penalties, and seeded mini-batch SGD).
//!
//! Invariants & assumptions
//! ------------------------
//! - At most 255 distinct labels and feature ids below 2²⁴; exceeding
//!   either is a recoverable error.
//! - Training is single-threaded and deterministic for a fixed
//!   configuration, including the SGD shuffle seed.
//! - Fallible operations return typed errors (`EncodingError`,
//!   `ModelError`, `OptError`); none of them panic on bad input.
//!
//! Conventions
//! -----------
//! - Parameters are `ndarray::Array1<f64>`; the optimizer maximizes the
//!   log-likelihood by minimizing its negation.
//! - Logging is structured through `slog`; without a logger nothing is
//!   emitted.
//!
//! Downstream usage
//! ----------------
//! ```no_run
//! use rust_maxent::encoding::Observation;
//! use rust_maxent::model::prelude::*;
//!
//! let mut trainer = MaxEntTrainer::new(TrainingOptions::default());
//! trainer.add_observation(&Observation::new("NN").with_feature("suffix=ion"))?;
//! trainer.add_observation(&Observation::new("VB").with_feature("prev=to"))?;
//! let (classifier, report) = trainer.train()?;
//!
//! let dist = classifier.classify(&Observation::unlabeled().with_feature("prev=to"));
//! println!("{:?} after {} iterations", dist.best(), report.outcome.iterations);
//! # Ok::<(), rust_maxent::model::ModelError>(())
//! ```
//!
//! Testing notes
//! -------------
//! - Unit tests live beside each module; `tests/` runs the full ingestion,
//!   training, classification and persistence pipeline.

pub mod encoding;
pub mod model;
pub mod optimization;
