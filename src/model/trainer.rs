//! MaxEntTrainer: end-to-end training of a maximum-entropy classifier.
//!
//! Purpose
//! -------
//! Tie the pieces together: collect observations in a [`SampleStore`],
//! freeze them, maximize the penalized log-likelihood with the configured
//! strategy and return a [`Classifier`] together with a [`TrainingReport`].
//!
//! Key behaviors
//! -------------
//! - `add_observation` forwards to the store and logs rejections at warn
//!   level with the observation's label.
//! - `train` consumes the trainer:
//!   1. freeze the store with `options.heldout` trailing samples held out;
//!   2. build θ₀ from `options.init`;
//!   3. run `maximize_logged` with an [`Evaluator`] carrying the prior;
//!   4. score training and heldout accuracy at θ̂;
//!   5. move θ̂ and the frozen vocabulary into a [`Classifier`].
//! - Non-convergence is reported in `TrainingReport::outcome`, never as an
//!   error.
//!
//! Invariants & assumptions
//! ------------------------
//! - The logger defaults to `slog::Discard`; nothing is printed unless the
//!   caller supplies a logger.
//! - Per-iteration optimizer records are emitted only when
//!   `options.mle_opts.verbose` is set.
//!
//! Downstream usage
//! ----------------
//! - Typical flow: `MaxEntTrainer::new(opts)`, a loop of
//!   `add_observation`, then `train()`.
//! - Pass a trained classifier to [`MaxEntTrainer::with_reference`] to
//!   train a second model on top of it.
//!
//! Testing notes
//! -------------
//! - Unit tests here cover logging of rejections and report bookkeeping.
//!   Convergence and persistence are exercised in `tests/`.
use std::sync::Arc;

use slog::{Discard, Logger, info, o, warn};

use crate::{
    encoding::Observation,
    model::{
        classifier::Classifier,
        distribution::ReferenceModel,
        errors::ModelResult,
        evaluator::{Evaluator, Portion},
        options::TrainingOptions,
        sample_store::SampleStore,
    },
    optimization::loglik_optimizer::{OptimOutcome, maximize_logged},
};

/// Summary of one training run.
///
/// - `outcome`: optimizer result (θ̂, objective, status, counters).
/// - `num_parameters` / `num_labels` / `num_features`: model size.
/// - `n_train` / `n_heldout`: sample split.
/// - `train_accuracy`: accuracy on the training portion at θ̂.
/// - `heldout_accuracy`: accuracy on the heldout portion, `None` if empty.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub outcome: OptimOutcome,
    pub num_parameters: usize,
    pub num_labels: usize,
    pub num_features: usize,
    pub n_train: usize,
    pub n_heldout: usize,
    pub train_accuracy: f64,
    pub heldout_accuracy: Option<f64>,
}

/// Collects observations and trains a [`Classifier`].
#[derive(Debug)]
pub struct MaxEntTrainer {
    store: SampleStore,
    options: TrainingOptions,
    logger: Logger,
}

impl MaxEntTrainer {
    pub fn new(options: TrainingOptions) -> Self {
        Self { store: SampleStore::new(), options, logger: Logger::root(Discard, o!()) }
    }

    /// Trainer whose samples are calibrated against `reference`.
    pub fn with_reference(options: TrainingOptions, reference: Arc<dyn ReferenceModel>) -> Self {
        Self { store: SampleStore::with_reference(reference), ..Self::new(options) }
    }

    /// Route training and optimizer logs to `logger`.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn options(&self) -> &TrainingOptions {
        &self.options
    }

    /// Add one training observation.
    ///
    /// # Errors
    /// Same as [`SampleStore::add_observation`]; the trainer is unchanged on
    /// error.
    pub fn add_observation(&mut self, obs: &Observation) -> ModelResult<()> {
        self.store.add_observation(obs).inspect_err(|err| {
            warn!(self.logger, "observation rejected";
                "label" => obs.label(),
                "error" => %err,
            );
        })
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Train on everything added so far.
    ///
    /// # Errors
    /// - `EmptyTrainingSet` / `InvalidHeldout` from freezing.
    /// - `InvalidPriorVariance` / `InvalidInitScale` if the options bypassed
    ///   validation.
    /// - `Optimization(..)` for invalid optimizer settings or a failing
    ///   evaluation.
    pub fn train(self) -> ModelResult<(Classifier, TrainingReport)> {
        let MaxEntTrainer { store, options, logger } = self;
        let set = store.freeze(options.heldout)?;
        info!(logger, "training set frozen";
            "samples" => set.training().len() + set.heldout().len(),
            "heldout" => set.heldout().len(),
            "labels" => set.num_labels(),
            "features" => set.features().len(),
            "parameters" => set.num_parameters(),
        );

        let evaluator = Evaluator::new(options.prior_variance)?;
        let theta0 = options.init.theta0(set.num_parameters())?;
        let outcome = maximize_logged(&evaluator, theta0, &set, &options.mle_opts, &logger)?;

        let train_accuracy =
            evaluator.accuracy(&outcome.theta_hat, &set, Portion::Training).unwrap_or(0.0);
        let heldout_accuracy = evaluator.accuracy(&outcome.theta_hat, &set, Portion::Heldout);
        let report = TrainingReport {
            num_parameters: set.num_parameters(),
            num_labels: set.num_labels(),
            num_features: set.features().len(),
            n_train: set.training().len(),
            n_heldout: set.heldout().len(),
            train_accuracy,
            heldout_accuracy,
            outcome,
        };
        info!(logger, "training finished";
            "status" => %report.outcome.status,
            "iterations" => report.outcome.iterations,
            "objective" => report.outcome.value,
            "train_accuracy" => report.train_accuracy,
            "heldout_accuracy" => ?report.heldout_accuracy,
        );

        let classifier = Classifier::from_training(set, report.outcome.theta_hat.clone())?;
        Ok((classifier, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{errors::ModelError, options::Init};
    use std::sync::Mutex;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Warn-level logging of rejected observations through a custom drain.
    // - Report bookkeeping for the heldout split.
    // - Errors from freezing and from unchecked options surfacing through
    //   `train`.
    // -------------------------------------------------------------------------

    /// Drain that records message texts.
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<String>>>);

    impl slog::Drain for Capture {
        type Ok = ();
        type Err = slog::Never;

        fn log(&self, record: &slog::Record<'_>, _: &slog::OwnedKVList) -> Result<(), slog::Never> {
            if let Ok(mut lines) = self.0.lock() {
                lines.push(record.msg().to_string());
            }
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // A rejected observation is logged and leaves the trainer unchanged.
    //
    // Given
    // -----
    // - One valid observation, then one with an infinite real value.
    //
    // Expect
    // ------
    // - `InvalidFeatureValue`; one sample; an "observation rejected" record.
    fn rejection_is_logged() {
        let capture = Capture::default();
        let logger = Logger::root(capture.clone(), o!());
        let mut trainer = MaxEntTrainer::new(TrainingOptions::default()).with_logger(logger);

        trainer.add_observation(&Observation::new("A").with_feature("x")).unwrap();
        let err = trainer
            .add_observation(&Observation::new("B").with_real("r", f64::INFINITY))
            .unwrap_err();

        assert!(matches!(err, ModelError::InvalidFeatureValue { .. }));
        assert_eq!(trainer.len(), 1);
        assert_eq!(capture.0.lock().unwrap().as_slice(), &["observation rejected"]);
    }

    #[test]
    // Purpose
    // -------
    // The report reflects the split and the model size.
    //
    // Given
    // -----
    // - Four observations (A: x), (B: y), (A: x), (B: z) with heldout = 1.
    //
    // Expect
    // ------
    // - n_train 3, n_heldout 1, two labels, three features, two parameters.
    // - Heldout accuracy is reported (z is unseen, so the tie goes to A).
    fn report_reflects_split() {
        let opts = TrainingOptions { heldout: 1, ..TrainingOptions::default() };
        let mut trainer = MaxEntTrainer::new(opts);
        for (label, feature) in [("A", "x"), ("B", "y"), ("A", "x"), ("B", "z")] {
            trainer.add_observation(&Observation::new(label).with_feature(feature)).unwrap();
        }

        let (classifier, report) = trainer.train().unwrap();

        assert_eq!((report.n_train, report.n_heldout), (3, 1));
        assert_eq!((report.num_labels, report.num_features, report.num_parameters), (2, 3, 2));
        assert_eq!(report.train_accuracy, 1.0);
        assert_eq!(report.heldout_accuracy, Some(0.0));
        assert_eq!(classifier.num_parameters(), 2);
    }

    #[test]
    // Purpose
    // -------
    // Training with nothing added is an error, not a panic.
    //
    // Given
    // -----
    // - A fresh trainer.
    //
    // Expect
    // ------
    // - `EmptyTrainingSet`.
    fn empty_trainer_fails() {
        let err = MaxEntTrainer::new(TrainingOptions::default()).train().unwrap_err();

        assert_eq!(err, ModelError::EmptyTrainingSet);
    }

    #[test]
    // Purpose
    // -------
    // An init scale that skipped `Init::random` is an error, not a panic.
    //
    // Given
    // -----
    // - Options with `Init::Random { seed: 1, scale: NaN }` written out
    //   directly and two valid observations.
    //
    // Expect
    // ------
    // - `InvalidInitScale`.
    fn unchecked_init_scale_fails() {
        let opts = TrainingOptions {
            init: Init::Random { seed: 1, scale: f64::NAN },
            ..TrainingOptions::default()
        };
        let mut trainer = MaxEntTrainer::new(opts);
        trainer.add_observation(&Observation::new("A").with_feature("x")).unwrap();
        trainer.add_observation(&Observation::new("B").with_feature("y")).unwrap();

        let err = trainer.train().unwrap_err();

        assert!(matches!(err, ModelError::InvalidInitScale { .. }));
    }
}
