//! Classifier: trained weights over a frozen vocabulary.
//!
//! Purpose
//! -------
//! Turn an [`Observation`] into a [`LabelDistribution`] using the weights
//! produced by training. Scoring is the same as during training; features
//! the model never saw contribute nothing.
//!
//! Key behaviors
//! -------------
//! - `classify` resolves feature names through the frozen feature
//!   interner, accumulates label scores, adds the reference log-prior when a
//!   reference model is attached and normalizes with a stable softmax.
//! - `best_label` and `accuracy` skip normalization and compare raw scores.
//! - A classifier is itself a [`ReferenceModel`], so one trained model can
//!   calibrate another training run.
//!
//! Invariants & assumptions
//! ------------------------
//! - At least one label; `weights.len()` equals the number of joint
//!   features; every joint key refers to a known label and feature.
//!   [`Classifier::from_parts`] enforces all three.
//! - The classifier is read-only after construction and `Send + Sync`.
//!
//! Conventions
//! -----------
//! - Real-valued features with a non-finite value at classification time
//!   are ignored like unknown features.
//! - The observation's own label is ignored by `classify`.
use std::sync::Arc;

use ndarray::Array1;

use crate::{
    encoding::{FeatureId, Interner, JointFeatureEncoder, LabelId, Observation},
    model::{
        distribution::{LabelDistribution, ReferenceModel},
        errors::{ModelError, ModelResult},
        sample_store::TrainingSet,
        scoring::{FeatureIndex, accumulate_scores, argmax, log_prior},
    },
    optimization::{loglik_optimizer::Theta, numerical_stability::softmax_in_place},
};

/// Trained maximum-entropy classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    labels: Interner,
    features: Interner,
    encoder: JointFeatureEncoder,
    index: FeatureIndex,
    weights: Theta,
    reference: Option<Arc<dyn ReferenceModel>>,
}

impl Classifier {
    /// Assemble a classifier from its vocabulary, parameter layout and
    /// weights.
    ///
    /// # Errors
    /// - [`ModelError::DimensionMismatch`] if `weights.len() != encoder.len()`.
    /// - [`ModelError::CorruptModelFile`] if there are no labels or a joint
    ///   key refers to an unknown label or feature.
    pub fn from_parts(
        labels: Interner, features: Interner, encoder: JointFeatureEncoder, weights: Theta,
    ) -> ModelResult<Self> {
        if labels.is_empty() {
            return Err(ModelError::CorruptModelFile {
                reason: "model has no labels".to_string(),
            });
        }
        if weights.len() != encoder.len() {
            return Err(ModelError::DimensionMismatch {
                expected: encoder.len(),
                actual: weights.len(),
            });
        }
        if let Some(key) = encoder
            .keys()
            .iter()
            .find(|k| k.label() >= labels.len() || k.feature() >= features.len())
        {
            return Err(ModelError::CorruptModelFile {
                reason: format!(
                    "parameter ({}, {}) is outside {} labels and {} features",
                    key.label(),
                    key.feature(),
                    labels.len(),
                    features.len()
                ),
            });
        }
        let index = FeatureIndex::build(&encoder, features.len());
        Ok(Self { labels, features, encoder, index, weights, reference: None })
    }

    /// Classifier for the weights `theta` trained on `set`.
    ///
    /// Keeps the training set's reference model, if any.
    pub fn from_training(set: TrainingSet, theta: Theta) -> ModelResult<Self> {
        let (labels, features, encoder, _, reference) = set.into_vocabulary();
        let classifier = Self::from_parts(labels, features, encoder, theta)?;
        Ok(Self { reference, ..classifier })
    }

    /// Attach a reference model applied at classification time.
    pub fn with_reference(mut self, reference: Arc<dyn ReferenceModel>) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn reference(&self) -> Option<&Arc<dyn ReferenceModel>> {
        self.reference.as_ref()
    }

    /// Label distribution for `obs`.
    pub fn classify(&self, obs: &Observation) -> LabelDistribution {
        let mut probs = self.scores(obs);
        softmax_in_place(probs.view_mut());
        LabelDistribution::new(
            self.labels.iter().map(str::to_string).zip(probs.iter().copied()).collect(),
        )
    }

    /// Most probable label for `obs`; ties go to the lower label id.
    pub fn best_label(&self, obs: &Observation) -> &str {
        let best = argmax(&self.scores(obs)).unwrap_or(0);
        self.labels.as_slice().get(best).map_or("", String::as_str)
    }

    /// Fraction of `observations` whose best label equals their own label,
    /// or `None` for an empty slice.
    pub fn accuracy(&self, observations: &[Observation]) -> Option<f64> {
        if observations.is_empty() {
            return None;
        }
        let correct = observations.iter().filter(|o| self.best_label(o) == o.label()).count();
        Some(correct as f64 / observations.len() as f64)
    }

    fn scores(&self, obs: &Observation) -> Array1<f64> {
        let features: Vec<(FeatureId, f64)> = obs
            .weighted_features()
            .filter(|(_, v)| v.is_finite())
            .filter_map(|(name, v)| self.features.lookup(name).map(|id| (id, v)))
            .collect();
        let prior = self.reference.as_ref().map(|r| log_prior(&self.labels, &r.distribution(obs)));
        let mut scores = Array1::zeros(self.labels.len());
        accumulate_scores(&self.index, self.weights.view(), &features, prior.as_ref(), &mut scores);
        scores
    }

    pub fn labels(&self) -> &[String] {
        self.labels.as_slice()
    }

    pub fn label_id(&self, label: &str) -> Option<LabelId> {
        self.labels.lookup(label)
    }

    pub fn features(&self) -> &Interner {
        &self.features
    }

    pub fn encoder(&self) -> &JointFeatureEncoder {
        &self.encoder
    }

    pub fn num_parameters(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &Theta {
        &self.weights
    }

    /// Weight of the joint feature `(label, feature)`, if the model has one.
    pub fn weight(&self, label: &str, feature: &str) -> Option<f64> {
        let index =
            self.encoder.lookup(self.labels.lookup(label)?, self.features.lookup(feature)?)?;
        self.weights.get(index).copied()
    }
}

impl ReferenceModel for Classifier {
    fn distribution(&self, obs: &Observation) -> LabelDistribution {
        self.classify(obs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::JointFeatureKey;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction checks in `from_parts`.
    // - Classification with known, unknown and real-valued features.
    // - Reference-model calibration at classification time.
    // -------------------------------------------------------------------------

    /// Labels (A, B); features (x, y); J(A,x)=0, J(B,y)=1.
    fn two_label_model(weights: Theta) -> ModelResult<Classifier> {
        let labels = Interner::from_strings(["A", "B"])?;
        let features = Interner::from_strings(["x", "y"])?;
        let encoder = JointFeatureEncoder::from_keys([
            JointFeatureKey::new(0, 0)?,
            JointFeatureKey::new(1, 1)?,
        ])?;
        Classifier::from_parts(labels, features, encoder, weights)
    }

    #[test]
    // Purpose
    // -------
    // Construction rejects inconsistent parts.
    //
    // Given
    // -----
    // - Three weights for two parameters; a key whose label id is 5.
    //
    // Expect
    // ------
    // - `DimensionMismatch`; `CorruptModelFile`.
    fn from_parts_validates() {
        assert_eq!(
            two_label_model(array![1.0, 2.0, 3.0]).unwrap_err(),
            ModelError::DimensionMismatch { expected: 2, actual: 3 }
        );

        let encoder = JointFeatureEncoder::from_keys([JointFeatureKey::new(5, 0).unwrap()]).unwrap();
        let err = Classifier::from_parts(
            Interner::from_strings(["A"]).unwrap(),
            Interner::from_strings(["x"]).unwrap(),
            encoder,
            array![0.0],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::CorruptModelFile { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Scores follow the weights; unknown features add nothing.
    //
    // Given
    // -----
    // - θ = (2, 1); observations {x}, {y, unseen}, {} and {x: 0.5 real}.
    //
    // Expect
    // ------
    // - p(A | x) = e²/(e² + 1); best label for {y} is B.
    // - Empty observation → uniform.
    // - Real value scales the weight: p(A | x=0.5) = e/(e + 1).
    // - Every distribution sums to 1.
    fn classifies_by_weights() {
        let model = two_label_model(array![2.0, 1.0]).unwrap();

        let dx = model.classify(&Observation::unlabeled().with_feature("x"));
        let dy = Observation::unlabeled().with_feature("y").with_feature("unseen");
        let empty = model.classify(&Observation::unlabeled());
        let real = model.classify(&Observation::unlabeled().with_real("x", 0.5));

        let e2 = 2.0f64.exp();
        assert!((dx.probability("A") - e2 / (e2 + 1.0)).abs() < 1e-12);
        assert_eq!(model.best_label(&dy), "B");
        assert_eq!(empty.probability("A"), 0.5);
        assert!((real.probability("A") - 1f64.exp() / (1f64.exp() + 1.0)).abs() < 1e-12);
        for d in [&dx, &empty, &real] {
            assert!((d.iter().map(|(_, p)| p).sum::<f64>() - 1.0).abs() < 1e-12);
        }
        assert_eq!(model.weight("B", "y"), Some(1.0));
        assert_eq!(model.weight("A", "y"), None);
    }

    #[test]
    // Purpose
    // -------
    // An attached reference model shifts predictions by its log-prior.
    //
    // Given
    // -----
    // - θ = 0 (uniform on its own) and a reference model that is itself a
    //   classifier strongly preferring B for every input.
    //
    // Expect
    // ------
    // - Without reference p(B) = 0.5; with it p(B) matches the reference.
    fn reference_shifts_distribution() {
        let plain = two_label_model(array![0.0, 0.0]).unwrap();
        let labels = Interner::from_strings(["A", "B"]).unwrap();
        let features = Interner::from_strings(["bias"]).unwrap();
        let encoder = JointFeatureEncoder::from_keys([JointFeatureKey::new(1, 0).unwrap()]).unwrap();
        let leaning = Arc::new(Classifier::from_parts(labels, features, encoder, array![3.0]).unwrap());

        let obs = Observation::unlabeled().with_feature("bias").with_feature("x");
        let before = plain.classify(&obs).probability("B");
        let expected = leaning.classify(&obs).probability("B");
        let after = plain.with_reference(leaning).classify(&obs).probability("B");

        assert_eq!(before, 0.5);
        assert!((after - expected).abs() < 1e-12);
        assert!(after > 0.9);
    }
}
