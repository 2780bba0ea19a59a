//! Public API surface for log-likelihood maximization.
//!
//! - [`LogLikelihood`]: trait users implement for their model.
//! - [`MLEOptions`] and [`Tolerances`]: configuration for the optimizer.
//! - [`Strategy`]: which solver runs (L-BFGS, OWL-QN or SGD).
//! - [`SgdOptions`] and [`LearningRate`]: stochastic-strategy settings.
//! - [`OptimOutcome`] and [`StopReason`]: normalized result returned by the
//!   high-level `maximize` API.
//!
//! Convention: we *maximize* a user log-likelihood `ℓ(θ)` by minimizing the cost
//! `c(θ) = -ℓ(θ)`. If an analytic gradient is provided, it should be the gradient
//! of the log-likelihood (`∇ℓ(θ)`); the adapter flips the sign as needed.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Grad, Theta,
        validation::{
            validate_theta_hat, validate_value, verify_batch_size, verify_l1_coeff,
            verify_learning_rate, verify_tol_cost, verify_tol_grad,
        },
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// User-implemented log-likelihood interface.
///
/// You maximize `ℓ(θ)`; internally we minimize the cost `c(θ) = -ℓ(θ)`.
/// If you provide an analytic gradient, return the gradient of the
/// log-likelihood `∇ℓ(θ)` (the adapter flips the sign to match the cost).
///
/// - `type Data`: per-model data carried into `value`/`grad`/`check`.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate `ℓ(θ)`.
/// - `check(&Theta, &Data) -> OptResult<()>`: validation hook to reject
///   obviously invalid `θ`/`data` pairs. Called once before optimization.
///
/// Optional:
/// - `grad(&Theta, &Data) -> OptResult<Grad>`: analytic gradient `∇ℓ(θ)`.
///   If not implemented, finite differences are used automatically.
/// - `value_and_grad`: fused evaluation; defaults to `value` then `grad`.
///   Override it when both share expensive intermediate results.
/// - `n_terms` / `term_grad` / `penalty_grad`: decomposition
///   `ℓ(θ) = Σ_i ℓ_i(θ) + r(θ)` used by the stochastic strategy. Models that
///   do not implement them cannot be trained with [`Strategy::Stochastic`].
pub trait LogLikelihood {
    type Data: 'static;

    // Required methods
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    // Optional methods
    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }

    fn value_and_grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<(Cost, Grad)> {
        Ok((self.value(theta, data)?, self.grad(theta, data)?))
    }

    /// Number of additive terms `ℓ_i` in the log-likelihood.
    fn n_terms(&self, _data: &Self::Data) -> OptResult<usize> {
        Err(OptError::StochasticNotImplemented)
    }

    /// Add `∇ℓ_term(θ)` into `acc`.
    fn term_grad(
        &self, _theta: &Theta, _data: &Self::Data, _term: usize, _acc: &mut Grad,
    ) -> OptResult<()> {
        Err(OptError::StochasticNotImplemented)
    }

    /// Gradient of the non-decomposable part `r(θ)` (e.g., a prior).
    fn penalty_grad(&self, theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Ok(Grad::zeros(theta.len()))
    }
}

/// Choice of optimization algorithm.
///
/// Variants:
/// - `QuasiNewton`: argmin's L-BFGS with backtracking Armijo line search.
/// - `OrthantWise`: argmin's L-BFGS in L1 mode (OWL-QN).
/// - `Stochastic`: mini-batch stochastic gradient ascent.
///
/// Parsing:
/// This enum implements `FromStr` and accepts case-insensitive names
/// (`"lbfgs"`, `"owlqn"`, `"sgd"`). Unknown names return
/// `OptError::InvalidStrategy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    QuasiNewton,
    OrthantWise,
    Stochastic,
}

impl FromStr for Strategy {
    type Err = OptError;

    /// Parse a strategy from a string (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lbfgs" => Ok(Strategy::QuasiNewton),
            "owlqn" => Ok(Strategy::OrthantWise),
            "sgd" => Ok(Strategy::Stochastic),
            _ => Err(OptError::InvalidStrategy {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'lbfgs', 'owlqn' or 'sgd'.",
            }),
        }
    }
}

/// Step-size schedule for the stochastic strategy.
///
/// - `Constant(η)`: fixed rate.
/// - `Exponential { eta0, alpha }`: `η = η₀·α^(t/N)` with `t` samples seen
///   and `N` terms, i.e. decay by `α` once per epoch, smoothly.
/// - `InverseScaling { eta0, decay }`: `η = η₀ / (1 + decay·epoch)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LearningRate {
    Constant(f64),
    Exponential { eta0: f64, alpha: f64 },
    InverseScaling { eta0: f64, decay: f64 },
}

impl LearningRate {
    /// Step size after `samples_seen` updates in epoch `epoch` over `n_terms` terms.
    pub fn rate(&self, samples_seen: u64, epoch: u64, n_terms: usize) -> f64 {
        match *self {
            LearningRate::Constant(eta) => eta,
            LearningRate::Exponential { eta0, alpha } => {
                eta0 * alpha.powf(samples_seen as f64 / n_terms.max(1) as f64)
            }
            LearningRate::InverseScaling { eta0, decay } => eta0 / (1.0 + decay * epoch as f64),
        }
    }
}

/// Settings for [`Strategy::Stochastic`].
///
/// - `schedule`: learning-rate schedule.
/// - `batch_size`: terms per update.
/// - `shuffle_seed`: when `Some`, term order is reshuffled each epoch with a
///   generator seeded from this value; when `None`, terms are visited in
///   natural order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SgdOptions {
    pub schedule: LearningRate,
    pub batch_size: usize,
    pub shuffle_seed: Option<u64>,
}

impl SgdOptions {
    /// Construct validated SGD settings.
    ///
    /// # Errors
    /// - [`OptError::InvalidLearningRate`] for an out-of-range schedule.
    /// - [`OptError::InvalidBatchSize`] if `batch_size == 0`.
    pub fn new(
        schedule: LearningRate, batch_size: usize, shuffle_seed: Option<u64>,
    ) -> OptResult<Self> {
        verify_learning_rate(&schedule)?;
        verify_batch_size(batch_size)?;
        Ok(Self { schedule, batch_size, shuffle_seed })
    }
}

impl Default for SgdOptions {
    fn default() -> Self {
        Self {
            schedule: LearningRate::InverseScaling { eta0: 0.5, decay: 0.05 },
            batch_size: 1,
            shuffle_seed: Some(0),
        }
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols: Tolerances`: numerical tolerances and iteration limits.
/// - `strategy: Strategy`: which solver runs.
/// - `verbose: bool`: if `true`, attaches a slog observer that logs every
///   iteration.
/// - `lbfgs_mem: Option<usize>`: history size for the quasi-Newton
///   strategies (default 7).
/// - `l1_coeff: Option<f64>`: L1 penalty `C` for [`Strategy::OrthantWise`].
/// - `sgd: SgdOptions`: settings for [`Strategy::Stochastic`].
///
/// Default:
/// - `tols`: `tol_grad = 1e-5`, `tol_cost = 1e-9`, `max_iter = 300`
/// - `strategy`: `QuasiNewton`
/// - `verbose`: `false`
/// - `lbfgs_mem`: `None` (uses default of 7)
/// - `l1_coeff`: `None`
/// - `sgd`: [`SgdOptions::default`]
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub strategy: Strategy,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
    pub l1_coeff: Option<f64>,
    pub sgd: SgdOptions,
}

impl MLEOptions {
    /// Create a new set of optimizer options.
    ///
    /// # Errors
    /// - [`OptError::InvalidLBFGSMem`] if `lbfgs_mem == Some(0)`.
    pub fn new(
        tols: Tolerances, strategy: Strategy, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { tols, strategy, verbose, lbfgs_mem, l1_coeff: None, sgd: SgdOptions::default() })
    }

    /// Set the L1 coefficient used by the orthant-wise strategy.
    ///
    /// # Errors
    /// - [`OptError::InvalidL1Coeff`] unless `c` is finite and positive.
    /// - [`OptError::L1RequiresOrthantWise`] if the strategy is not
    ///   [`Strategy::OrthantWise`].
    pub fn with_l1(mut self, c: f64) -> OptResult<Self> {
        verify_l1_coeff(c)?;
        if self.strategy != Strategy::OrthantWise {
            return Err(OptError::L1RequiresOrthantWise);
        }
        self.l1_coeff = Some(c);
        Ok(self)
    }

    /// Replace the stochastic-strategy settings.
    pub fn with_sgd(mut self, sgd: SgdOptions) -> Self {
        self.sgd = sgd;
        self
    }
}

impl Default for MLEOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-5), tol_cost: Some(1e-9), max_iter: Some(300) },
            strategy: Strategy::QuasiNewton,
            verbose: false,
            lbfgs_mem: None,
            l1_coeff: None,
            sgd: SgdOptions::default(),
        }
    }
}

/// Numerical tolerances and iteration limits used by the optimizer.
///
/// - `tol_grad`: terminate when the gradient norm falls below this threshold.
/// - `tol_cost`: terminate when the relative change in cost,
///   `|c_{k-1} − c_k| / max(1, |c_k|)`, falls below this threshold.
/// - `max_iter`: hard cap on the number of iterations.
///
/// Any field can be `None` but **at least one** of the three must be provided
/// (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Rules
    /// - At least one of `tol_grad`, `tol_cost`, or `max_iter` must be `Some`.
    /// - If provided, tolerances must be **finite and strictly positive**.
    /// - If provided, `max_iter` must be `> 0`.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Why a run stopped.
///
/// - `Converged`: a gradient or cost-change tolerance was met.
/// - `MaxIterations`: the iteration cap was reached first.
/// - `Stalled(reason)`: the solver could not make progress (e.g., the line
///   search found no acceptable step) or the run ended for another reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Converged,
    MaxIterations,
    Stalled(String),
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Converged => write!(f, "converged"),
            StopReason::MaxIterations => write!(f, "maximum iterations reached"),
            StopReason::Stalled(reason) => write!(f, "stalled: {reason}"),
        }
    }
}

impl From<&TerminationStatus> for StopReason {
    fn from(status: &TerminationStatus) -> Self {
        match status {
            TerminationStatus::Terminated(
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached,
            ) => StopReason::Converged,
            TerminationStatus::Terminated(TerminationReason::MaxItersReached) => {
                StopReason::MaxIterations
            }
            TerminationStatus::Terminated(reason) => StopReason::Stalled(reason.text().to_string()),
            TerminationStatus::NotTerminated => StopReason::Stalled("not terminated".to_string()),
        }
    }
}

/// Canonical result returned by `maximize`.
///
/// - `theta_hat`: best parameter vector found.
/// - `value`: best **objective** value (not the cost): `ℓ(θ̂)`, or
///   `ℓ(θ̂) − C‖θ̂‖₁` for the orthant-wise strategy.
/// - `converged`: `true` only when `status == StopReason::Converged`.
/// - `status`: normalized stop reason.
/// - `iterations`: number of optimizer iterations performed (epochs for SGD).
/// - `fn_evals`: function-evaluation counters reported by `argmin`.
///   Keys follow the solvers' counters, e.g. `gradient_count`.
/// - `grad_norm`: norm of the last state gradient (the pseudo-gradient for
///   OWL-QN), if present.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: StopReason,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// Performs:
    /// - `theta_hat` check via `validate_theta_hat` (present and all finite).
    /// - `value` check via `validate_value` (finite).
    /// - Maps `TerminationStatus` into `(converged, status)`.
    /// - Computes `grad_norm` if a gradient was provided.
    ///
    /// # Errors
    /// - Propagates any validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: &TerminationStatus,
        iterations: u64, fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let status = StopReason::from(termination);
        let converged = status == StopReason::Converged;
        let iterations = iterations as usize;
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self { theta_hat, value, converged, status, iterations, fn_evals, grad_norm })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Strategy parsing.
    // - Option constructors and the L1 builder.
    // - Learning-rate schedules.
    // - Mapping argmin termination into `StopReason`/`converged`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Strategy names parse case-insensitively; unknown names are reported.
    //
    // Given
    // -----
    // - "LBFGS", "owlqn", "Sgd", "newton".
    //
    // Expect
    // ------
    // - The three known variants, then `InvalidStrategy`.
    fn strategy_parses_case_insensitively() {
        assert_eq!("LBFGS".parse::<Strategy>().unwrap(), Strategy::QuasiNewton);
        assert_eq!("owlqn".parse::<Strategy>().unwrap(), Strategy::OrthantWise);
        assert_eq!("Sgd".parse::<Strategy>().unwrap(), Strategy::Stochastic);
        assert!(matches!("newton".parse::<Strategy>(), Err(OptError::InvalidStrategy { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Constructors enforce their documented rules.
    //
    // Given
    // -----
    // - `Tolerances::new(None, None, None)`, `max_iter = 0`, `lbfgs_mem = 0`,
    //   and `with_l1` on a quasi-Newton configuration.
    //
    // Expect
    // ------
    // - `NoTolerancesProvided`, `InvalidMaxIter`, `InvalidLBFGSMem`,
    //   `L1RequiresOrthantWise`.
    fn option_constructors_validate() {
        assert_eq!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));
        assert!(matches!(
            Tolerances::new(None, None, Some(0)),
            Err(OptError::InvalidMaxIter { .. })
        ));
        let tols = Tolerances::new(Some(1e-6), None, None).unwrap();
        assert!(matches!(
            MLEOptions::new(tols, Strategy::QuasiNewton, false, Some(0)),
            Err(OptError::InvalidLBFGSMem { .. })
        ));
        let opts = MLEOptions::new(tols, Strategy::QuasiNewton, false, None).unwrap();
        assert_eq!(opts.with_l1(0.5), Err(OptError::L1RequiresOrthantWise));

        let owl = MLEOptions::new(tols, Strategy::OrthantWise, false, None).unwrap();
        assert_eq!(owl.with_l1(0.5).unwrap().l1_coeff, Some(0.5));
    }

    #[test]
    // Purpose
    // -------
    // Each schedule follows its closed form.
    //
    // Given
    // -----
    // - Exponential { 1.0, 0.5 } after one full epoch of 4 terms.
    // - InverseScaling { 1.0, 1.0 } in epoch 3.
    //
    // Expect
    // ------
    // - 0.5 and 0.25 respectively.
    fn learning_rate_schedules() {
        let exp = LearningRate::Exponential { eta0: 1.0, alpha: 0.5 };
        let inv = LearningRate::InverseScaling { eta0: 1.0, decay: 1.0 };

        assert!((exp.rate(4, 1, 4) - 0.5).abs() < 1e-12);
        assert!((inv.rate(0, 3, 4) - 0.25).abs() < 1e-12);
        assert_eq!(LearningRate::Constant(0.3).rate(100, 7, 4), 0.3);
    }

    #[test]
    // Purpose
    // -------
    // Only genuine convergence sets `converged`; line-search failures map to
    // `Stalled` with argmin's message.
    //
    // Given
    // -----
    // - SolverConverged, MaxItersReached and SolverExit("no step") statuses.
    //
    // Expect
    // ------
    // - Converged/true, MaxIterations/false, Stalled("no step")/false.
    fn termination_maps_to_stop_reason() {
        let theta = Some(array![1.0]);
        let conv = TerminationStatus::Terminated(TerminationReason::SolverConverged);
        let cap = TerminationStatus::Terminated(TerminationReason::MaxItersReached);
        let exit =
            TerminationStatus::Terminated(TerminationReason::SolverExit("no step".to_string()));

        let a = OptimOutcome::new(theta.clone(), -1.0, &conv, 3, FnEvalMap::new(), None).unwrap();
        let b = OptimOutcome::new(theta.clone(), -1.0, &cap, 3, FnEvalMap::new(), None).unwrap();
        let c = OptimOutcome::new(theta, -1.0, &exit, 3, FnEvalMap::new(), None).unwrap();

        assert!(a.converged && a.status == StopReason::Converged);
        assert!(!b.converged && b.status == StopReason::MaxIterations);
        assert_eq!(c.status, StopReason::Stalled("no step".to_string()));
        assert!(!c.converged);
    }
}
