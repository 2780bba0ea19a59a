//! Scoring layout shared by training and classification.
//!
//! Purpose
//! -------
//! Compute log-linear label scores
//! `s(l) = Σ_f v_f · θ[J(l, f)] + ln p_ref(l)` from a sparse feature list,
//! so that the evaluator (during training) and the classifier (after
//! training) score observations identically.
//!
//! Key behaviors
//! -------------
//! - [`FeatureIndex`] inverts the joint-feature encoder: for each feature id
//!   it lists the `(label, parameter)` pairs the feature touches. Scoring a
//!   sample then walks only the parameters that exist instead of probing
//!   the encoder for every label.
//! - [`accumulate_scores`] adds the weighted parameter contributions and the
//!   optional log-prior into a zeroed score buffer.
//! - [`log_prior`] maps a reference distribution onto this model's label
//!   ids, flooring missing or zero probabilities.
//!
//! Invariants & assumptions
//! ------------------------
//! - Feature ids passed to scoring are below `FeatureIndex::len()` or are
//!   skipped; unseen features contribute zero.
//! - Parameter indices in the index are valid for the weight vector the
//!   caller passes (checked once at classifier construction).
use ndarray::{Array1, ArrayView1};

use crate::{
    encoding::{FeatureId, Interner, JointFeatureEncoder, LabelId},
    model::distribution::LabelDistribution,
    optimization::numerical_stability::safe_ln,
};

/// Feature id → `(label id, parameter index)` pairs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureIndex {
    rows: Vec<Vec<(LabelId, usize)>>,
}

impl FeatureIndex {
    /// Invert `encoder` over a vocabulary of `n_features` feature ids.
    ///
    /// Keys whose feature id is `≥ n_features` are ignored.
    pub fn build(encoder: &JointFeatureEncoder, n_features: usize) -> Self {
        let mut rows = vec![Vec::new(); n_features];
        for (param, key) in encoder.keys().iter().enumerate() {
            if let Some(row) = rows.get_mut(key.feature()) {
                row.push((key.label(), param));
            }
        }
        Self { rows }
    }

    /// Parameters touched by `feature` (empty for an unknown id).
    pub fn params(&self, feature: FeatureId) -> &[(LabelId, usize)] {
        self.rows.get(feature).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Add `Σ_f v_f·θ[J(l, f)]` (and `log_prior`, if any) into `scores`.
pub fn accumulate_scores(
    index: &FeatureIndex, theta: ArrayView1<'_, f64>, features: &[(FeatureId, f64)],
    log_prior: Option<&Array1<f64>>, scores: &mut Array1<f64>,
) {
    for &(feature, value) in features {
        for &(label, param) in index.params(feature) {
            scores[label] += value * theta[param];
        }
    }
    if let Some(prior) = log_prior {
        *scores += prior;
    }
}

/// Index of the largest score; ties go to the lower index.
pub fn argmax(scores: &Array1<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &s) in scores.iter().enumerate() {
        if best.is_none_or(|(_, bs)| s > bs) {
            best = Some((i, s));
        }
    }
    best.map(|(i, _)| i)
}

/// `ln p_ref(l)` for every label of `labels`, floored at `PROB_FLOOR`.
pub fn log_prior(labels: &Interner, reference: &LabelDistribution) -> Array1<f64> {
    labels.iter().map(|label| safe_ln(reference.probability(label))).collect()
}
