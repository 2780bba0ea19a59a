//! Structured progress logging for optimizer runs.
//!
//! [`SlogObserver`] implements argmin's `Observe` for the crate's solver
//! state and writes one `slog` record per event: solver start, every
//! iteration, and the final state. Values are reported in log-likelihood
//! terms (`objective = −cost`). Solver-specific key/value pairs (step size,
//! learning rate, zero weights, ...) are folded into a single `extra`
//! field with keys in sorted order so that lines are stable across runs.
//!
//! It is attached when the caller supplies a logger; the `obs_slog` terminal
//! output without one comes from `argmin-observer-slog`.
use argmin::core::{Error, KV, State, observers::Observe};
use slog::{Logger, info};

use crate::optimization::loglik_optimizer::types::OptimState;

#[derive(Debug, Clone)]
pub struct SlogObserver {
    logger: Logger,
}

impl SlogObserver {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

fn render(kv: &KV) -> String {
    let mut pairs: Vec<_> = kv.kv.iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(" ")
}

impl Observe<OptimState> for SlogObserver {
    fn observe_init(&mut self, name: &str, state: &OptimState, kv: &KV) -> Result<(), Error> {
        info!(self.logger, "optimizer started";
            "solver" => name,
            "objective" => -state.get_cost(),
            "extra" => render(kv),
        );
        Ok(())
    }

    fn observe_iter(&mut self, state: &OptimState, kv: &KV) -> Result<(), Error> {
        info!(self.logger, "iteration";
            "iter" => state.get_iter(),
            "objective" => -state.get_cost(),
            "best_objective" => -state.get_best_cost(),
            "extra" => render(kv),
        );
        Ok(())
    }

    fn observe_final(&mut self, state: &OptimState) -> Result<(), Error> {
        info!(self.logger, "optimizer finished";
            "iterations" => state.get_iter(),
            "best_objective" => -state.get_best_cost(),
            "status" => %state.get_termination_status(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmin::kv;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Rendering of solver key/values and observer calls against a discarding
    // logger.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Extra key/values render in sorted key order.
    //
    // Given
    // -----
    // - kv with "step" and "memory".
    //
    // Expect
    // ------
    // - "memory=3 step=0.5".
    fn render_sorts_keys() {
        let kv = kv!("step" => 0.5; "memory" => 3u64;);

        assert_eq!(render(&kv), "memory=3 step=0.5");
    }

    #[test]
    // Purpose
    // -------
    // Every observer hook succeeds on a fresh state.
    //
    // Given
    // -----
    // - A `Discard` logger and a default state.
    //
    // Expect
    // ------
    // - All three hooks return `Ok`.
    fn hooks_succeed_with_discard_logger() {
        let mut obs = SlogObserver::new(Logger::root(slog::Discard, slog::o!()));
        let state = OptimState::new();
        let kv = kv!("eta" => 0.1;);

        assert!(obs.observe_init("L-BFGS", &state, &kv).is_ok());
        assert!(obs.observe_iter(&state, &kv).is_ok());
        assert!(obs.observe_final(&state).is_ok());
    }
}
