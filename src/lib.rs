//! # Column Generation
//!
//! A generic column-generation framework for linear and integer programs
//! formulated via Dantzig-Wolfe decomposition.
//!
//! Given a *master problem* with exponentially many variables ("columns")
//! and a user-supplied [`pricing`] oracle that searches for new columns with
//! favorable reduced cost, the framework solves (or heuristically improves)
//! both the continuous relaxation and the integer version of the problem.
//!
//! The core is three tightly coupled pieces:
//! - [`engine`]: the stabilized column-generation loop (Wentges and
//!   directional smoothing, mispricing, dummy-column escalation).
//! - [`heuristics`]: tree-search drivers that call the engine at every
//!   node ([`heuristics::greedy`] diving and [`heuristics::lds`] limited
//!   discrepancy search).
//! - [`model`]: the immutable problem description and the mutable solution
//!   assembly built on top of it.
//!
//! Concrete LP backends ([`backend::LpBackend`]) and concrete pricing
//! problems ([`pricing::PricingOracle`]) are supplied by the caller; this
//! crate only defines the interfaces it consumes.

pub mod backend;
pub mod callback;
pub mod engine;
pub mod error;
pub mod heuristics;
pub(crate) mod linalg;
pub mod model;
pub mod output;
pub mod params;
pub mod pricing;
pub mod terminators;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Floating-point element type used throughout the framework.
pub type E = f64;
/// Row/column index type used throughout the framework.
pub type I = usize;

/// Feasibility and optimality tolerance applied to row bounds, integrality,
/// and reduced-cost checks.
pub const EPSILON: E = 1e-6;

pub use error::Error;
pub use output::Output;

/// Terminal status of a driver invocation.
///
/// Mirrors the status vocabulary of an iterative solver: a driver either
/// converges to a proof of optimality for the relaxation it was tracking,
/// runs out of the resource budget it was given, or is interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    InProgress,
    /// No improving column remains and no dummy column is active.
    Optimal,
    /// The restricted master was proved infeasible, or dummy columns never
    /// cleared after the escalation cap was hit.
    Infeasible,
    /// The time budget elapsed.
    TimeLimit,
    /// `maximum_number_of_iterations` (CG) or tree-search node cap was hit.
    IterationLimit,
    /// A terminator reported an interrupt (e.g. Ctrl-C).
    Interrupted,
}
