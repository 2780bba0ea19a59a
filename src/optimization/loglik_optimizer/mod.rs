//! loglik_optimizer: argmin-powered log-likelihood maximization.
//!
//! Purpose
//! -------
//! Provide a high-level optimization layer for **maximizing
//! log-likelihoods** `ℓ(θ)`. Callers implement a single trait,
//! [`LogLikelihood`], and invoke [`maximize`] (or [`maximize_logged`]) to
//! run L-BFGS, OWL-QN or mini-batch SGD with configurable tolerances and
//! finite-difference fallbacks.
//!
//! Key behaviors
//! -------------
//! - Convert user log-likelihoods `ℓ(θ)` into argmin costs `c(θ) = -ℓ(θ)`
//!   via [`adapter::ArgMinAdapter`].
//! - [`maximize`]:
//!   - checks that the strategy and its options agree,
//!   - validates the initial guess with [`LogLikelihood::check`],
//!   - builds the solver for [`Strategy`] via [`builders`],
//!   - executes it via [`run::run_solver`], and
//!   - normalizes results into an [`OptimOutcome`].
//! - Finite-difference helpers in [`finite_diff`] stand in for missing
//!   analytic gradients.
//! - Progress can be logged through `slog` with [`observer::SlogObserver`].
//!
//! Invariants & assumptions
//! ------------------------
//! - The optimizer **always maximizes** `ℓ(θ)` by minimizing `-ℓ(θ)`;
//!   user code implements `ℓ(θ)` and `∇ℓ(θ)`, never the cost.
//! - [`LogLikelihood::value`] and [`LogLikelihood::grad`] report invalid
//!   inputs as recoverable [`OptError`](crate::optimization::errors::OptError)
//!   values, not panics.
//! - Configuration types ([`Tolerances`], [`MLEOptions`], [`SgdOptions`])
//!   are validated on construction.
//!
//! Conventions
//! -----------
//! - Parameters are an unconstrained [`Theta`] (`Array1<f64>`).
//! - All user-facing values (including [`OptimOutcome::value`]) are in
//!   log-likelihood terms.
//!
//! Downstream usage
//! ----------------
//! - The model layer implements [`LogLikelihood`] for its evaluator and
//!   calls [`maximize_logged`] with its trainer's logger.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover sign conventions in [`adapter`],
//!   solver wiring in [`builders`], finite differences, validation,
//!   configuration invariants in [`traits`], and end-to-end runs of every
//!   strategy in [`api`].

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod observer;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::{maximize, maximize_logged};
pub use self::observer::SlogObserver;
pub use self::traits::{
    LearningRate, LogLikelihood, MLEOptions, OptimOutcome, SgdOptions, StopReason, Strategy,
    Tolerances,
};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};

pub mod prelude {
    pub use super::api::{maximize, maximize_logged};
    pub use super::traits::{
        LearningRate, LogLikelihood, MLEOptions, OptimOutcome, SgdOptions, Strategy, Tolerances,
    };
    pub use super::types::{Cost, Grad, Theta};
}
