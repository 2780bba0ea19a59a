//! Execution helper that runs an argmin solver on a log-likelihood problem and
//! returns a crate-friendly [`OptimOutcome`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
        observer::SlogObserver, types::OptimState,
    },
};
use argmin::core::{Executor, Solver, State, observers::ObserverMode};

/// Run an argmin solver for a log-likelihood problem.
///
/// This is the shared runner used by every strategy. It wires up:
/// - the user model via [`ArgMinAdapter`],
/// - the configured solver (see
///   [`builders`](crate::optimization::loglik_optimizer::builders)),
/// - the initial parameter `theta0`,
/// - an optional [`SlogObserver`] attached with `ObserverMode::Always`; with
///   no observer, `opts.verbose` and the `obs_slog` feature, argmin's
///   non-blocking terminal logger is attached instead,
/// - `opts.tols.max_iter` as the executor's iteration cap,
///
/// then executes the solver and converts the final state into an
/// [`OptimOutcome`].
///
/// # Returns
/// An [`OptimOutcome`] with the best parameters, the best objective value
/// (`−best_cost`), the normalized stop reason, the iteration count, the
/// evaluation counters, and the norm of the last state gradient.
///
/// # Errors
/// - Propagates solver and evaluation errors via `From<argmin::core::Error>`.
/// - Propagates outcome validation errors (non-finite θ̂ or value).
pub fn run_solver<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
    observer: Option<SlogObserver>,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: Solver<ArgMinAdapter<'a, F>, OptimState>,
{
    let mut optimizer = Executor::new(problem, solver).configure(|state| state.param(theta0));
    match observer {
        Some(observer) => optimizer = optimizer.add_observer(observer, ObserverMode::Always),
        #[cfg(feature = "obs_slog")]
        None if opts.verbose => {
            let observer = argmin_observer_slog::SlogLogger::term_noblock();
            optimizer = optimizer.add_observer(observer, ObserverMode::Always);
        }
        None => {}
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let best_cost = result.get_best_cost();
    let grad = result.take_gradient();
    OptimOutcome::new(
        result.take_best_param(),
        -best_cost,
        &termination,
        iterations,
        function_counts,
        grad,
    )
}
