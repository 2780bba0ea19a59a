//! Mini-batch stochastic gradient descent.
//!
//! One argmin iteration is one epoch over all terms. At the start of each
//! epoch the term order is reshuffled with a seeded `Xoshiro256PlusPlus`
//! generator (or left in natural order when no seed is given); the epoch
//! then walks the order in chunks of `batch_size`, stepping
//! `θ ← θ − η_t·∇c_B(θ)` with the learning rate of the configured schedule.
//! The full cost and gradient are evaluated once at the end of the epoch and
//! feed the shared convergence test.
//!
//! A shrinking learning rate can flatten the cost long before the optimum.
//! When a gradient tolerance is set and the cost test fires while the full
//! gradient norm is still at or above it, the run ends with
//! `TerminationReason::SolverExit` (a stall) rather than as converged.
//!
//! A fixed seed and identical inputs give identical trajectories.
use argmin::{
    core::{Error, KV, Problem, Solver, State, TerminationReason, TerminationStatus},
    kv,
};
use argmin_math::ArgminL2Norm;
use rand::{SeedableRng, seq::SliceRandom};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::optimization::{
    loglik_optimizer::{
        traits::{LearningRate, SgdOptions},
        types::OptimState,
    },
    solvers::{
        Convergence, CostGradient, SampleGradient, Tolerant, convergence_status, missing_param,
    },
};

#[derive(Debug, Clone)]
pub struct Sgd {
    schedule: LearningRate,
    batch_size: usize,
    n_terms: usize,
    rng: Option<Xoshiro256PlusPlus>,
    order: Vec<usize>,
    epoch: u64,
    samples_seen: u64,
    conv: Convergence,
}

impl Sgd {
    /// New solver over `n_terms` additive terms.
    pub fn new(opts: &SgdOptions, n_terms: usize) -> Self {
        Self {
            schedule: opts.schedule,
            batch_size: opts.batch_size.max(1),
            n_terms,
            rng: opts.shuffle_seed.map(Xoshiro256PlusPlus::seed_from_u64),
            order: (0..n_terms).collect(),
            epoch: 0,
            samples_seen: 0,
            conv: Convergence::default(),
        }
    }
}

impl Tolerant for Sgd {
    fn convergence_mut(&mut self) -> &mut Convergence {
        &mut self.conv
    }
}

impl<O: CostGradient + SampleGradient> Solver<O, OptimState> for Sgd {
    const NAME: &'static str = "SGD";

    fn init(
        &mut self, problem: &mut Problem<O>, mut state: OptimState,
    ) -> Result<(OptimState, Option<KV>), Error> {
        let theta = state.take_param().ok_or_else(missing_param)?;
        let (cost, grad) = problem.problem("cost_gradient_count", |p| p.cost_gradient(&theta))?;
        Ok((state.param(theta).cost(cost).gradient(grad), None))
    }

    fn next_iter(
        &mut self, problem: &mut Problem<O>, mut state: OptimState,
    ) -> Result<(OptimState, Option<KV>), Error> {
        let mut theta = state.take_param().ok_or_else(missing_param)?;
        if let Some(rng) = self.rng.as_mut() {
            self.order.shuffle(rng);
        }

        let mut eta = self.schedule.rate(self.samples_seen, self.epoch, self.n_terms);
        for batch in self.order.chunks(self.batch_size) {
            eta = self.schedule.rate(self.samples_seen, self.epoch, self.n_terms);
            let n_terms = self.n_terms;
            let g = problem
                .problem("batch_gradient_count", |p| p.batch_gradient(&theta, batch, n_terms))?;
            theta.scaled_add(-eta, &g);
            self.samples_seen += batch.len() as u64;
        }
        self.epoch += 1;

        let (cost, grad) = problem.problem("cost_gradient_count", |p| p.cost_gradient(&theta))?;
        let kv = kv!("eta" => eta; "epoch" => self.epoch; "grad_norm" => grad.l2_norm(););
        Ok((state.param(theta).cost(cost).gradient(grad), Some(kv)))
    }

    fn terminate(&mut self, state: &OptimState) -> TerminationStatus {
        let grad_norm = state.get_gradient().map(|g| g.l2_norm());
        let status = convergence_status(state, grad_norm, &self.conv);
        let converged =
            matches!(status, TerminationStatus::Terminated(TerminationReason::SolverConverged));
        match (converged, self.conv.tol_grad, grad_norm) {
            (true, Some(tol), Some(norm)) if norm >= tol => {
                TerminationStatus::Terminated(TerminationReason::SolverExit(format!(
                    "cost plateau with gradient norm {norm:.3e} above tolerance {tol:.1e}"
                )))
            }
            _ => status,
        }
    }
}
