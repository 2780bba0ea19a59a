//! Evaluator: penalized log-likelihood of the log-linear model.
//!
//! Purpose
//! -------
//! Evaluate the training objective
//!
//! `ℓ(θ) = Σ_{i ∈ train} ln p_θ(y_i | x_i) − ‖θ‖² / (2σ²)`
//!
//! and its gradient over a frozen [`TrainingSet`], and expose both to the
//! optimization layer through [`LogLikelihood`].
//!
//! Key behaviors
//! -------------
//! - Per sample: label scores from [`accumulate_scores`] (weighted
//!   parameters plus the optional log-prior), max-shifted softmax, then
//!   `ln p(y) = s(y) − ln Z`.
//! - Gradient: `∂ℓ/∂θ[J(l,f)] = Σ_i v_if · (1[l = y_i] − p_i(l))`, minus
//!   `θ/σ²` under the Gaussian prior.
//! - `value_and_grad` shares one scoring pass between value and gradient.
//! - The stochastic hooks decompose `ℓ` into one term per training sample
//!   plus the prior as the penalty.
//!
//! Invariants & assumptions
//! ------------------------
//! - `θ.len()` equals the number of joint features; `check` enforces it
//!   before optimization.
//! - The evaluator holds no interior state; every method is `&self` and
//!   allocates its own scratch buffers.
//! - Only the training portion enters the objective. Heldout samples are
//!   used by [`Evaluator::accuracy`] alone.
//!
//! Downstream usage
//! ----------------
//! - [`MaxEntTrainer::train`](crate::model::trainer::MaxEntTrainer::train)
//!   passes an `Evaluator` and its `TrainingSet` to `maximize_logged`.
//!
//! Testing notes
//! -------------
//! - Unit tests compare the analytic gradient with central differences,
//!   check the prior's contribution and the stochastic decomposition.
//!   Convergence on toy data lives in the integration tests.
use ndarray::Array1;

use crate::{
    model::{
        errors::ModelResult,
        options::verify_prior_variance,
        sample_store::{Sample, TrainingSet},
        scoring::{accumulate_scores, argmax},
    },
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Cost, Grad, LogLikelihood, Theta},
        numerical_stability::softmax_in_place,
    },
};

/// Gaussian prior `−θ²/(2σ²)` on every weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianPrior {
    variance: f64,
}

impl GaussianPrior {
    /// # Errors
    /// - [`ModelError::InvalidPriorVariance`](crate::model::errors::ModelError::InvalidPriorVariance)
    ///   unless `variance` is finite and > 0.
    pub fn new(variance: f64) -> ModelResult<Self> {
        verify_prior_variance(variance)?;
        Ok(Self { variance })
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// `‖θ‖² / (2σ²)`, the amount subtracted from the log-likelihood.
    pub fn penalty(&self, theta: &Theta) -> f64 {
        theta.dot(theta) / (2.0 * self.variance)
    }

    /// `−θ/σ²`, the prior's contribution to `∇ℓ`.
    pub fn gradient(&self, theta: &Theta) -> Grad {
        theta * (-1.0 / self.variance)
    }
}

/// Which samples of a [`TrainingSet`] to score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Portion {
    Training,
    Heldout,
}

/// Penalized log-likelihood of a maximum-entropy model.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Evaluator {
    prior: Option<GaussianPrior>,
}

impl Evaluator {
    /// Evaluator with an optional Gaussian prior of variance `prior_variance`.
    ///
    /// # Errors
    /// - `InvalidPriorVariance` for a non-finite or non-positive variance.
    pub fn new(prior_variance: Option<f64>) -> ModelResult<Self> {
        let prior = prior_variance.map(GaussianPrior::new).transpose()?;
        Ok(Self { prior })
    }

    pub fn prior(&self) -> Option<&GaussianPrior> {
        self.prior.as_ref()
    }

    /// Fraction of `portion` whose most probable label under `θ` is the
    /// true one, or `None` when the portion is empty.
    ///
    /// Ties go to the lower label id.
    pub fn accuracy(&self, theta: &Theta, set: &TrainingSet, portion: Portion) -> Option<f64> {
        let samples = match portion {
            Portion::Training => set.training(),
            Portion::Heldout => set.heldout(),
        };
        if samples.is_empty() {
            return None;
        }
        let mut scores = Array1::zeros(set.num_labels());
        let correct = samples
            .iter()
            .filter(|sample| {
                scores.fill(0.0);
                accumulate_scores(
                    set.index(),
                    theta.view(),
                    &sample.features,
                    sample.log_prior.as_ref(),
                    &mut scores,
                );
                argmax(&scores) == Some(sample.label)
            })
            .count();
        Some(correct as f64 / samples.len() as f64)
    }
}

/// Fill `probs` with `p_θ(· | x)` for `sample` and return `ln p_θ(y | x)`.
fn posterior(theta: &Theta, set: &TrainingSet, sample: &Sample, probs: &mut Array1<f64>) -> f64 {
    probs.fill(0.0);
    accumulate_scores(set.index(), theta.view(), &sample.features, sample.log_prior.as_ref(), probs);
    let true_score = probs[sample.label];
    true_score - softmax_in_place(probs.view_mut())
}

/// Add `v·(1[l = y] − p(l))` for every parameter the sample touches.
fn add_sample_grad(set: &TrainingSet, sample: &Sample, probs: &Array1<f64>, grad: &mut Grad) {
    for &(feature, value) in &sample.features {
        for &(label, param) in set.index().params(feature) {
            let observed = if label == sample.label { 1.0 } else { 0.0 };
            grad[param] += value * (observed - probs[label]);
        }
    }
}

impl LogLikelihood for Evaluator {
    type Data = TrainingSet;

    /// `ℓ(θ)` over the training portion, minus the prior penalty.
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost> {
        let mut probs = Array1::zeros(data.num_labels());
        let mut ll: f64 = data.training().iter().map(|s| posterior(theta, data, s, &mut probs)).sum();
        if let Some(prior) = &self.prior {
            ll -= prior.penalty(theta);
        }
        Ok(ll)
    }

    /// Rejects `θ` whose length differs from the number of joint features.
    ///
    /// # Errors
    /// - [`OptError::ThetaLengthMismatch`].
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()> {
        if theta.len() != data.num_parameters() {
            return Err(OptError::ThetaLengthMismatch {
                expected: data.num_parameters(),
                actual: theta.len(),
            });
        }
        Ok(())
    }

    fn grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<Grad> {
        Ok(self.value_and_grad(theta, data)?.1)
    }

    /// Fused evaluation: one softmax per sample feeds both value and
    /// gradient.
    fn value_and_grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<(Cost, Grad)> {
        let mut probs = Array1::zeros(data.num_labels());
        let mut grad = Grad::zeros(theta.len());
        let mut ll = 0.0;
        for sample in data.training() {
            ll += posterior(theta, data, sample, &mut probs);
            add_sample_grad(data, sample, &probs, &mut grad);
        }
        if let Some(prior) = &self.prior {
            ll -= prior.penalty(theta);
            grad.scaled_add(1.0, &prior.gradient(theta));
        }
        Ok((ll, grad))
    }

    /// One term per training sample.
    fn n_terms(&self, data: &Self::Data) -> OptResult<usize> {
        Ok(data.training().len())
    }

    fn term_grad(
        &self, theta: &Theta, data: &Self::Data, term: usize, acc: &mut Grad,
    ) -> OptResult<()> {
        let n = data.training().len();
        let sample = data.training().get(term).ok_or_else(|| OptError::InvalidParameter {
            text: format!("term index {term} out of range for {n} training samples"),
        })?;
        let mut probs = Array1::zeros(data.num_labels());
        posterior(theta, data, sample, &mut probs);
        add_sample_grad(data, sample, &probs, acc);
        Ok(())
    }

    /// `−θ/σ²`, or zeros without a prior.
    fn penalty_grad(&self, theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Ok(match &self.prior {
            Some(prior) => prior.gradient(theta),
            None => Grad::zeros(theta.len()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encoding::Observation, model::sample_store::SampleStore};
    use finitediff::FiniteDiff;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The objective at θ = 0 (uniform distribution).
    // - Analytic gradient against central finite differences, with and
    //   without the prior.
    // - Dimension checking and the stochastic decomposition.
    // - Accuracy on training and heldout portions.
    // -------------------------------------------------------------------------

    fn toy_set(heldout: usize) -> TrainingSet {
        let mut store = SampleStore::new();
        let rows = [
            Observation::new("A").with_feature("x").with_real("r", 0.5),
            Observation::new("B").with_feature("y").with_real("r", -1.5),
            Observation::new("C").with_feature("x").with_feature("y"),
            Observation::new("A").with_feature("x").with_real("r", 2.0),
            Observation::new("B").with_feature("y"),
        ];
        for obs in &rows {
            store.add_observation(obs).unwrap();
        }
        store.freeze(heldout).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // With all weights at zero every label is equally likely.
    //
    // Given
    // -----
    // - Five training samples over three labels, θ = 0, no prior.
    //
    // Expect
    // ------
    // - ℓ(0) = 5·ln(1/3).
    fn zero_weights_give_uniform_likelihood() {
        let set = toy_set(0);
        let theta = Theta::zeros(set.num_parameters());

        let ll = Evaluator::default().value(&theta, &set).unwrap();

        assert!((ll - 5.0 * (1.0f64 / 3.0).ln()).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // The analytic gradient matches central differences of `value`.
    //
    // Given
    // -----
    // - The toy set, a fixed non-zero θ, evaluators with and without a
    //   prior of variance 2.
    //
    // Expect
    // ------
    // - Relative error ≤ 1e-4 per coordinate.
    // - `value_and_grad` returns the same value as `value`.
    fn gradient_matches_finite_differences() {
        let set = toy_set(0);
        let theta: Theta =
            (0..set.num_parameters()).map(|i| 0.3 * (i as f64) - 0.7).collect();

        for evaluator in [Evaluator::default(), Evaluator::new(Some(2.0)).unwrap()] {
            let (v, g) = evaluator.value_and_grad(&theta, &set).unwrap();
            let fd = theta.central_diff(&|t: &Theta| evaluator.value(t, &set).unwrap());

            assert!((v - evaluator.value(&theta, &set).unwrap()).abs() < 1e-12);
            for (a, n) in g.iter().zip(fd.iter()) {
                assert!((a - n).abs() <= 1e-4 * a.abs().max(1.0), "analytic {a}, numeric {n}");
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Per-sample terms plus the penalty reproduce the full gradient.
    //
    // Given
    // -----
    // - The toy set with prior variance 4 and a fixed θ.
    //
    // Expect
    // ------
    // - Σ term_grad + penalty_grad equals `grad` to 1e-12.
    // - An out-of-range term is an error.
    fn stochastic_terms_sum_to_gradient() {
        let set = toy_set(0);
        let evaluator = Evaluator::new(Some(4.0)).unwrap();
        let theta: Theta = (0..set.num_parameters()).map(|i| 0.1 * i as f64).collect();

        let n = evaluator.n_terms(&set).unwrap();
        let mut acc = Grad::zeros(theta.len());
        for term in 0..n {
            evaluator.term_grad(&theta, &set, term, &mut acc).unwrap();
        }
        acc += &evaluator.penalty_grad(&theta, &set).unwrap();
        let full = evaluator.grad(&theta, &set).unwrap();

        assert_eq!(n, 5);
        assert!(acc.iter().zip(full.iter()).all(|(a, b)| (a - b).abs() < 1e-12));
        assert!(evaluator.term_grad(&theta, &set, n, &mut acc).is_err());
    }

    #[test]
    // Purpose
    // -------
    // A parameter vector of the wrong length is rejected.
    //
    // Given
    // -----
    // - θ one entry too short.
    //
    // Expect
    // ------
    // - `ThetaLengthMismatch` with both lengths.
    fn check_rejects_wrong_length() {
        let set = toy_set(0);
        let n = set.num_parameters();

        let err = Evaluator::default().check(&Theta::zeros(n - 1), &set).unwrap_err();

        assert_eq!(err, OptError::ThetaLengthMismatch { expected: n, actual: n - 1 });
    }

    #[test]
    // Purpose
    // -------
    // Accuracy scores each portion separately.
    //
    // Given
    // -----
    // - Labels A/B on features x/y, heldout = 1; θ that favors the true
    //   label on every (label, feature) parameter.
    //
    // Expect
    // ------
    // - Training accuracy 1 and heldout accuracy 1; empty heldout → None.
    fn accuracy_by_portion() {
        let mut store = SampleStore::new();
        for obs in [
            Observation::new("A").with_feature("x"),
            Observation::new("B").with_feature("y"),
            Observation::new("A").with_feature("x"),
        ] {
            store.add_observation(&obs).unwrap();
        }
        let set = store.freeze(1).unwrap();
        let theta = array![1.0, 1.0];
        let evaluator = Evaluator::default();

        assert_eq!(evaluator.accuracy(&theta, &set, Portion::Training), Some(1.0));
        assert_eq!(evaluator.accuracy(&theta, &set, Portion::Heldout), Some(1.0));
        assert_eq!(evaluator.accuracy(&theta, &toy_set(0), Portion::Heldout), None);
    }
}
