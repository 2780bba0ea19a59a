//! Training configuration for the maximum-entropy trainer.
//!
//! Purpose
//! -------
//! Bundle everything a training run needs beyond the data itself: the
//! optimizer options, the Gaussian prior, the heldout split and the
//! parameter initialization policy.
//!
//! Key behaviors
//! -------------
//! - [`TrainingOptions::new`] validates the prior variance; heldout counts
//!   are checked against the data at freeze time.
//! - [`Init`] decides the starting point θ₀: all zeros, or small uniform
//!   values from a seeded `Xoshiro256PlusPlus` generator.
//!
//! Invariants & assumptions
//! ------------------------
//! - A prior variance, when present, is finite and strictly positive.
//! - A random init scale is finite and strictly positive.
//! - The same `Init::Random` seed always yields the same θ₀.
//!
//! Conventions
//! -----------
//! - `prior_variance = None` means an unpenalized likelihood.
//! - Invalid inputs return [`ModelError`] variants rather than panicking.
//!
//! Downstream usage
//! ----------------
//! - Pass a [`TrainingOptions`] to
//!   [`MaxEntTrainer::new`](crate::model::trainer::MaxEntTrainer::new).
//!
//! Testing notes
//! -------------
//! - Unit tests cover validation and seeded reproducibility of `theta0`.
use ndarray::Array1;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::{
    model::errors::{ModelError, ModelResult},
    optimization::loglik_optimizer::{MLEOptions, Theta},
};

/// Init: starting point of the optimizer.
///
/// Variants
/// --------
/// - `Zeros`
///   Every weight starts at 0, i.e. the uniform distribution over labels
///   (or the reference distribution, when one is attached).
/// - `Random { seed, scale }`
///   Each weight drawn uniformly from `[-scale, scale]` with a generator
///   seeded from `seed`. Built through [`Init::random`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Init {
    Zeros,
    Random { seed: u64, scale: f64 },
}

impl Init {
    /// Seeded uniform initialization on `[-scale, scale]`.
    ///
    /// # Errors
    /// - [`ModelError::InvalidInitScale`] unless `scale` is finite and > 0.
    pub fn random(seed: u64, scale: f64) -> ModelResult<Self> {
        verify_init_scale(scale)?;
        Ok(Init::Random { seed, scale })
    }

    /// Starting vector of length `n`.
    ///
    /// # Errors
    /// - [`ModelError::InvalidInitScale`] for a `Random` variant built
    ///   without [`Init::random`] whose scale is not finite and > 0.
    pub fn theta0(&self, n: usize) -> ModelResult<Theta> {
        match *self {
            Init::Zeros => Ok(Array1::zeros(n)),
            Init::Random { seed, scale } => {
                verify_init_scale(scale)?;
                let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
                Ok((0..n).map(|_| rng.gen_range(-scale..=scale)).collect())
            }
        }
    }
}

/// TrainingOptions: configuration of one training run.
///
/// Parameters
/// ----------
/// - `mle_opts`: optimizer options (strategy, tolerances, L1, SGD settings).
/// - `prior_variance`: σ² of the Gaussian prior `−θ²/(2σ²)`; `None`
///   disables it.
/// - `heldout`: number of trailing samples kept out of training.
/// - `init`: starting point policy.
///
/// Default
/// -------
/// `MLEOptions::default()`, no prior, no heldout, `Init::Zeros`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOptions {
    pub mle_opts: MLEOptions,
    pub prior_variance: Option<f64>,
    pub heldout: usize,
    pub init: Init,
}

impl TrainingOptions {
    /// Construct validated options.
    ///
    /// # Errors
    /// - [`ModelError::InvalidPriorVariance`] if `prior_variance` is present
    ///   and not finite and > 0.
    pub fn new(
        mle_opts: MLEOptions, prior_variance: Option<f64>, heldout: usize, init: Init,
    ) -> ModelResult<Self> {
        if let Some(value) = prior_variance {
            verify_prior_variance(value)?;
        }
        Ok(Self { mle_opts, prior_variance, heldout, init })
    }
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self { mle_opts: MLEOptions::default(), prior_variance: None, heldout: 0, init: Init::Zeros }
    }
}

pub(crate) fn verify_prior_variance(value: f64) -> ModelResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ModelError::InvalidPriorVariance { value });
    }
    Ok(())
}

fn verify_init_scale(scale: f64) -> ModelResult<()> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(ModelError::InvalidInitScale { value: scale });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Validation of the prior variance and the random init scale.
    // - Reproducibility and range of seeded initialization.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Non-positive or non-finite settings are rejected.
    //
    // Given
    // -----
    // - prior variance 0 and NaN; init scale -1.
    //
    // Expect
    // ------
    // - `InvalidPriorVariance` and `InvalidInitScale`.
    fn rejects_invalid_settings() {
        let opts = MLEOptions::default();
        assert_eq!(
            TrainingOptions::new(opts.clone(), Some(0.0), 0, Init::Zeros).unwrap_err(),
            ModelError::InvalidPriorVariance { value: 0.0 }
        );
        assert!(matches!(
            TrainingOptions::new(opts, Some(f64::NAN), 0, Init::Zeros),
            Err(ModelError::InvalidPriorVariance { .. })
        ));
        assert_eq!(Init::random(1, -1.0).unwrap_err(), ModelError::InvalidInitScale { value: -1.0 });
    }

    #[test]
    // Purpose
    // -------
    // Seeded initialization is reproducible and stays within the scale.
    //
    // Given
    // -----
    // - `Init::random(42, 0.01)` drawn twice for 50 weights; another seed.
    //
    // Expect
    // ------
    // - Identical draws for the same seed, different for another seed.
    // - Every entry in [-0.01, 0.01].
    fn random_init_is_seeded() {
        let init = Init::random(42, 0.01).unwrap();

        let a = init.theta0(50).unwrap();
        let b = init.theta0(50).unwrap();
        let c = Init::random(43, 0.01).unwrap().theta0(50).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|v| v.abs() <= 0.01));
        assert_eq!(Init::Zeros.theta0(3).unwrap(), Array1::<f64>::zeros(3));
    }

    #[test]
    // Purpose
    // -------
    // A `Random` variant written out directly is still checked when θ₀ is
    // drawn.
    //
    // Given
    // -----
    // - `Init::Random` with scales NaN, +∞ and 0, bypassing `Init::random`.
    //
    // Expect
    // ------
    // - `InvalidInitScale` each time, no panic.
    fn theta0_rechecks_scale() {
        for scale in [f64::NAN, f64::INFINITY, 0.0] {
            let init = Init::Random { seed: 1, scale };

            assert!(matches!(init.theta0(4), Err(ModelError::InvalidInitScale { .. })));
        }
    }
}
