//! Label distributions and the reference-model seam.
//!
//! [`LabelDistribution`] is what classification returns: one probability
//! per label, in label-id order, non-negative and summing to 1.
//!
//! [`ReferenceModel`] is the optional collaborator that supplies a prior
//! distribution for each observation. When a store or classifier carries
//! one, `ln p_ref(l)` (floored at `PROB_FLOOR`) is added to every label
//! score, so the trained weights model the correction to the reference
//! rather than the full distribution. Any trained [`Classifier`] is a
//! reference model.
//!
//! [`Classifier`]: crate::model::classifier::Classifier
use std::cmp::Ordering;

use crate::encoding::Observation;

/// Source of per-observation reference distributions.
pub trait ReferenceModel: std::fmt::Debug + Send + Sync {
    /// Distribution over the reference model's own labels for `obs`.
    fn distribution(&self, obs: &Observation) -> LabelDistribution;
}

/// Probability per label, in label-id order.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelDistribution {
    entries: Vec<(String, f64)>,
}

impl LabelDistribution {
    /// Build from `(label, probability)` pairs.
    ///
    /// The caller is responsible for the pairs forming a distribution;
    /// classification output always does.
    pub fn new(entries: Vec<(String, f64)>) -> Self {
        Self { entries }
    }

    /// Probability of `label`, or 0 for a label this distribution does not
    /// know.
    pub fn probability(&self, label: &str) -> f64 {
        self.entries.iter().find(|(l, _)| l == label).map_or(0.0, |(_, p)| *p)
    }

    /// Most probable label. Ties go to the lower label id.
    pub fn best(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (label, p) in &self.entries {
            if best.is_none_or(|(_, bp)| *p > bp) {
                best = Some((label.as_str(), *p));
            }
        }
        best
    }

    /// All labels sorted by descending probability (stable on ties).
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut out: Vec<(&str, f64)> = self.iter().collect();
        out.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(l, p)| (l.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
