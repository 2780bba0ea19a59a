//! High-level entry points for maximizing a user-provided `LogLikelihood`.
//!
//! The model is wrapped in an `ArgMinAdapter` (which *minimizes* `-ℓ(θ)`),
//! a solver is built for the requested [`Strategy`], and the run is
//! delegated to `run_solver`.
use slog::{Logger, debug};

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{build_orthant_wise, build_quasi_newton, build_sgd, strategy_name},
        observer::SlogObserver,
        run::run_solver,
        traits::{LogLikelihood, MLEOptions, Strategy},
        validation::verify_strategy,
    },
};

/// Maximize a log-likelihood `ℓ(θ)` with the strategy chosen in `opts`.
///
/// # Behavior
/// - Checks that the strategy and its options agree (`verify_strategy`).
/// - Validates the initial guess via `f.check(theta0, data)`.
/// - Wraps `(f, data)` in an `ArgMinAdapter` exposing `c(θ) = -ℓ(θ)`.
/// - Builds the solver for `opts.strategy`; the stochastic strategy first
///   asks the model for its number of additive terms.
/// - When `opts.verbose` is set and the `obs_slog` feature is enabled,
///   progress is logged to the terminal by `argmin-observer-slog`.
///
/// # Errors
/// - Option mismatches (`InvalidL1Coeff`, `L1RequiresOrthantWise`).
/// - Any error from `f.check`.
/// - `StochasticNotImplemented` when the stochastic strategy is requested
///   for a model without the per-term hooks.
/// - Runtime errors from the solver (e.g., non-finite costs).
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use rust_maxent::optimization::{
///     errors::OptResult,
///     loglik_optimizer::{LogLikelihood, MLEOptions, Theta, maximize},
/// };
///
/// struct Concave;
/// impl LogLikelihood for Concave {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(-theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = maximize(&Concave, array![0.1, -0.2, 0.3], &(), &MLEOptions::default())?;
/// println!("θ̂ = {:?}", out.theta_hat);
/// # Ok::<(), rust_maxent::optimization::errors::OptError>(())
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    dispatch(f, theta0, data, opts, None)
}

/// Like [`maximize`], but reports progress to `logger`.
///
/// Iteration records are emitted only when `opts.verbose` is set; the
/// start and end of the run are always logged at debug level.
pub fn maximize_logged<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions, logger: &Logger,
) -> OptResult<OptimOutcome> {
    let logger = logger.new(slog::o!("strategy" => strategy_name(opts.strategy)));
    debug!(logger, "starting optimization"; "n_params" => theta0.len());
    let observer = opts.verbose.then(|| SlogObserver::new(logger.clone()));
    let outcome = dispatch(f, theta0, data, opts, observer)?;
    debug!(logger, "optimization finished";
        "status" => %outcome.status,
        "iterations" => outcome.iterations,
        "value" => outcome.value,
    );
    Ok(outcome)
}

fn dispatch<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions, observer: Option<SlogObserver>,
) -> OptResult<OptimOutcome> {
    verify_strategy(opts)?;
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.strategy {
        Strategy::QuasiNewton => {
            let solver = build_quasi_newton(opts)?;
            run_solver(theta0, opts, problem, solver, observer)
        }
        Strategy::OrthantWise => {
            let solver = build_orthant_wise(opts)?;
            run_solver(theta0, opts, problem, solver, observer)
        }
        Strategy::Stochastic => {
            let n_terms = f.n_terms(data)?;
            let solver = build_sgd(opts, n_terms)?;
            run_solver(theta0, opts, problem, solver, observer)
        }
    }
}
