//! optimization: MLE stack, numerical helpers, and unified error surface.
//!
//! Purpose
//! -------
//! Provide the optimization layer used to fit the classifier: an
//! argmin-backed log-likelihood maximizer with three interchangeable
//! strategies, the solvers implementing them, shared numerical primitives,
//! and a single error/result surface.
//!
//! Key behaviors
//! -------------
//! - `loglik_optimizer`: the [`LogLikelihood`](loglik_optimizer::LogLikelihood)
//!   contract, options, and the `maximize` entry points.
//! - `solvers`: argmin-backed L-BFGS / OWL-QN and a mini-batch SGD `Solver`.
//! - `numerical_stability`: softmax, log-sum-exp and floored logarithms.
//! - `errors`: [`OptError`](errors::OptError) and `OptResult<T>`, including
//!   the conversion from argmin's error type.
//!
//! Invariants & assumptions
//! ------------------------
//! - Everything here is model-agnostic: it sees parameter vectors, data
//!   payloads and log-likelihood values, never labels or features.
//! - Invalid inputs and numerical failures are reported as `OptError`, not
//!   panics.
//!
//! Conventions
//! -----------
//! - Solvers maximize `ℓ(θ)` by minimizing `c(θ) = -ℓ(θ)`; user-facing
//!   values are expressed in terms of `ℓ`.
//! - The layer logs only through an argmin observer when asked to.
//!
//! Downstream usage
//! ----------------
//! - The model layer implements `LogLikelihood` for its evaluator and
//!   imports the curated surface via `optimization::prelude::*`.
//!
//! Testing notes
//! -------------
//! - Unit tests live beside each submodule; end-to-end strategy runs on
//!   toy objectives are in `loglik_optimizer::api`.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;
pub mod solvers;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
