//! Sample store: ingestion of observations and the frozen training set.
//!
//! Purpose
//! -------
//! Convert external [`Observation`]s into dense integer-indexed samples,
//! own them until training, and freeze them into an immutable
//! [`TrainingSet`] that the evaluator and the optimizer read.
//!
//! Key behaviors
//! -------------
//! - `add_observation` interns the label, then every binary feature, then
//!   every real-valued feature (rejecting non-finite values), asks the
//!   optional reference model for a distribution, and appends the sample.
//! - Any failure truncates both interners back to their length before the
//!   call, so a rejected observation leaves no trace.
//! - `freeze(heldout)` consumes the store. The last `heldout` samples are
//!   kept out of training; joint features are created for every
//!   `(true label, feature)` pair of the training portion only, and
//!   reference distributions are mapped onto log-priors over the final
//!   label set.
//!
//! Invariants & assumptions
//! ------------------------
//! - At most `MAX_LABELS` distinct labels; the check happens before the
//!   label is interned.
//! - Feature ids never exceed `MAX_FEATURE_ID`.
//! - After `freeze`, nothing is interned; the training set is read-only.
//!
//! Conventions
//! -----------
//! - Binary features are stored as `(id, 1.0)` ahead of real-valued ones,
//!   so scoring treats both kinds uniformly.
//! - A feature repeated within one observation contributes once per
//!   occurrence.
//!
//! Downstream usage
//! ----------------
//! - [`MaxEntTrainer`](crate::model::trainer::MaxEntTrainer) wraps a store,
//!   freezes it and hands the [`TrainingSet`] to the evaluator as
//!   `LogLikelihood::Data`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover deterministic ids, rollback on rejected
//!   observations, the heldout split and joint-feature creation.
use std::sync::Arc;

use ndarray::Array1;

use crate::{
    encoding::{
        FeatureId, Interner, JointFeatureEncoder, LabelId, MAX_FEATURE_ID, MAX_LABELS, Observation,
    },
    model::{
        distribution::{LabelDistribution, ReferenceModel},
        errors::{ModelError, ModelResult},
        scoring::{FeatureIndex, log_prior},
    },
};

/// Sample as ingested, before the label set is final.
#[derive(Debug, Clone)]
struct PendingSample {
    label: LabelId,
    positive: Vec<FeatureId>,
    real: Vec<(FeatureId, f64)>,
    reference: Option<LabelDistribution>,
}

/// Frozen sample: label, weighted features and optional log-prior.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub label: LabelId,
    pub features: Vec<(FeatureId, f64)>,
    pub log_prior: Option<Array1<f64>>,
}

/// Mutable store of ingested observations.
#[derive(Debug, Default)]
pub struct SampleStore {
    labels: Interner,
    features: Interner,
    samples: Vec<PendingSample>,
    reference: Option<Arc<dyn ReferenceModel>>,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose observations are calibrated against `reference`.
    pub fn with_reference(reference: Arc<dyn ReferenceModel>) -> Self {
        Self { reference: Some(reference), ..Self::default() }
    }

    /// Ingest one observation.
    ///
    /// # Errors
    /// - [`ModelError::TooManyLabels`] if the label is new and `MAX_LABELS`
    ///   labels already exist.
    /// - [`ModelError::InvalidFeatureValue`] for a NaN or infinite value.
    /// - [`ModelError::FeatureSpaceExhausted`] if a new feature would get an
    ///   id above `MAX_FEATURE_ID`.
    ///
    /// On error, the store is exactly as it was before the call.
    pub fn add_observation(&mut self, obs: &Observation) -> ModelResult<()> {
        let (n_labels, n_features) = (self.labels.len(), self.features.len());
        match self.ingest(obs) {
            Ok(sample) => {
                self.samples.push(sample);
                Ok(())
            }
            Err(err) => {
                self.labels.truncate(n_labels);
                self.features.truncate(n_features);
                Err(err)
            }
        }
    }

    fn ingest(&mut self, obs: &Observation) -> ModelResult<PendingSample> {
        if self.labels.lookup(obs.label()).is_none() && self.labels.len() >= MAX_LABELS {
            return Err(ModelError::TooManyLabels { limit: MAX_LABELS });
        }
        let label = self.labels.put(obs.label());

        let mut positive = Vec::with_capacity(obs.binary_features().len());
        for name in obs.binary_features() {
            positive.push(self.intern_feature(name)?);
        }
        let mut real = Vec::with_capacity(obs.real_features().len());
        for (name, value) in obs.real_features() {
            if !value.is_finite() {
                return Err(ModelError::InvalidFeatureValue {
                    feature: name.clone(),
                    value: *value,
                });
            }
            real.push((self.intern_feature(name)?, *value));
        }

        let reference = self.reference.as_ref().map(|r| r.distribution(obs));
        Ok(PendingSample { label, positive, real, reference })
    }

    fn intern_feature(&mut self, name: &str) -> ModelResult<FeatureId> {
        if self.features.lookup(name).is_none() && self.features.len() > MAX_FEATURE_ID {
            return Err(ModelError::FeatureSpaceExhausted { limit: MAX_FEATURE_ID });
        }
        Ok(self.features.put(name))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn labels(&self) -> &Interner {
        &self.labels
    }

    pub fn features(&self) -> &Interner {
        &self.features
    }

    pub fn reference(&self) -> Option<&Arc<dyn ReferenceModel>> {
        self.reference.as_ref()
    }

    /// Freeze the store, keeping the last `heldout` samples out of training.
    ///
    /// # Errors
    /// - [`ModelError::EmptyTrainingSet`] if no sample was added.
    /// - [`ModelError::InvalidHeldout`] unless `heldout < self.len()`.
    pub fn freeze(self, heldout: usize) -> ModelResult<TrainingSet> {
        if self.samples.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if heldout >= self.samples.len() {
            return Err(ModelError::InvalidHeldout { heldout, samples: self.samples.len() });
        }
        let n_train = self.samples.len() - heldout;

        let mut encoder = JointFeatureEncoder::new();
        for sample in &self.samples[..n_train] {
            let ids = sample.positive.iter().copied().chain(sample.real.iter().map(|(f, _)| *f));
            for feature in ids {
                encoder.put(sample.label, feature)?;
            }
        }
        let index = FeatureIndex::build(&encoder, self.features.len());

        let labels = self.labels;
        let samples = self
            .samples
            .into_iter()
            .map(|s| Sample {
                label: s.label,
                features: s.positive.iter().map(|&f| (f, 1.0)).chain(s.real).collect(),
                log_prior: s.reference.as_ref().map(|d| log_prior(&labels, d)),
            })
            .collect();

        Ok(TrainingSet {
            labels,
            features: self.features,
            encoder,
            index,
            samples,
            n_train,
            reference: self.reference,
        })
    }
}

/// Immutable training data: vocabularies, parameter layout and samples.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    labels: Interner,
    features: Interner,
    encoder: JointFeatureEncoder,
    index: FeatureIndex,
    samples: Vec<Sample>,
    n_train: usize,
    reference: Option<Arc<dyn ReferenceModel>>,
}

impl TrainingSet {
    pub fn labels(&self) -> &Interner {
        &self.labels
    }

    pub fn features(&self) -> &Interner {
        &self.features
    }

    pub fn encoder(&self) -> &JointFeatureEncoder {
        &self.encoder
    }

    pub fn index(&self) -> &FeatureIndex {
        &self.index
    }

    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    /// Number of free parameters (joint features).
    pub fn num_parameters(&self) -> usize {
        self.encoder.len()
    }

    /// Samples used for training.
    pub fn training(&self) -> &[Sample] {
        &self.samples[..self.n_train]
    }

    /// Samples kept out of training.
    pub fn heldout(&self) -> &[Sample] {
        &self.samples[self.n_train..]
    }

    pub fn reference(&self) -> Option<&Arc<dyn ReferenceModel>> {
        self.reference.as_ref()
    }

    /// Split into the parts a classifier keeps.
    pub(crate) fn into_vocabulary(
        self,
    ) -> (Interner, Interner, JointFeatureEncoder, FeatureIndex, Option<Arc<dyn ReferenceModel>>)
    {
        (self.labels, self.features, self.encoder, self.index, self.reference)
    }
}
