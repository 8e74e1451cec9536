//! Per-event hooks invoked by a driver for monitoring or early reaction:
//! `new_solution_callback` and `new_bound_callback` (§6).
//!
//! Mirrors the teacher's `callback::Callback` trait and its `NoOpCallback`/
//! `ConvergenceOutput` pair — one trait per event, a no-op default, and a
//! logging implementation that is this framework's "log sink".

use crate::model::Solution;
use crate::E;

/// Invoked whenever a driver improves its incumbent integer solution.
pub trait NewSolutionCallback {
    fn on_new_solution(&mut self, solution: &Solution);
}

/// Invoked whenever a driver tightens its dual bound.
pub trait NewBoundCallback {
    fn on_new_bound(&mut self, bound: E);
}

/// Does nothing. The default for both callback traits.
pub struct NoOpCallback;

impl NewSolutionCallback for NoOpCallback {
    fn on_new_solution(&mut self, _solution: &Solution) {}
}

impl NewBoundCallback for NoOpCallback {
    fn on_new_bound(&mut self, _bound: E) {}
}

/// Emits a `tracing::info!` event per callback invocation. This is the
/// framework's "log sink": the crate never installs a subscriber itself
/// (see `tests/` for how a caller wires one up), it only emits events.
pub struct LoggingCallback;

impl NewSolutionCallback for LoggingCallback {
    fn on_new_solution(&mut self, solution: &Solution) {
        tracing::info!(
            objective_value = solution.objective_value(),
            feasible = solution.feasible(),
            "new incumbent solution"
        );
    }
}

impl NewBoundCallback for LoggingCallback {
    fn on_new_bound(&mut self, bound: E) {
        tracing::info!(bound, "new dual bound");
    }
}
