//! The pricing oracle plugin contract (C3): a user-supplied subproblem
//! solver that, given dual prices, searches for columns with favorable
//! reduced cost.
//!
//! Mirrors the shape of the teacher's `Callback`/`Terminator` plugin
//! traits: a small interface the engine calls into synchronously, with all
//! mutable state living inside the implementor (the oracle's own per-call
//! scratch, reset at every `initialize_pricing`, per §5).

use crate::model::ColumnHandle;
use crate::E;

/// The result of one `solve_pricing` call.
#[derive(Default)]
pub struct PricingResult {
    /// Candidate columns. May include columns with non-favorable reduced
    /// cost; the engine filters.
    pub columns: Vec<ColumnHandle>,
    /// Optional Lagrangian bound contribution (used by advanced bound
    /// tightening; `0.0` if the oracle doesn't compute one).
    pub overcost: Option<E>,
}

impl PricingResult {
    pub fn new(columns: Vec<ColumnHandle>) -> Self {
        Self {
            columns,
            overcost: None,
        }
    }

    pub fn with_overcost(mut self, overcost: E) -> Self {
        self.overcost = Some(overcost);
        self
    }
}

/// A user-supplied pricing subproblem solver.
///
/// Implementations are free to be heuristic: the engine only requires that
/// `solve_pricing` aim for favorable reduced cost within its own budget,
/// not that it be exact or exhaustive.
pub trait PricingOracle {
    /// Called once per CG root invocation with the currently fixed master
    /// variables (from branching), so the oracle can exclude conflicting
    /// columns from its own search. Returns the subset of the model's
    /// static columns that are now infeasible given those fixings (e.g. a
    /// static column representing a route that conflicts with a fixed
    /// one).
    fn initialize_pricing(&mut self, fixed: &[(ColumnHandle, E)]) -> Vec<ColumnHandle>;

    /// Given a full-length dual vector (indexed by original row id, not
    /// compacted), returns zero or more candidate columns.
    fn solve_pricing(&mut self, duals: &[E]) -> PricingResult;
}
