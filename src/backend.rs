//! The LP backend plugin contract (C2): an opaque restricted-master solver.
//!
//! Mirrors the teacher's [`crate::linalg`]-style solver traits
//! (`analyze`/`factorize`/`solve_in_place` on `linalg::solver::Solver`): a
//! small trait with a `new`-like constructor, incremental mutation calls,
//! and a `solve` that can fail. Concrete backends (Clp, Cplex, Xpress,
//! Knitro, Highs, ...) are out of scope for this crate; only the interface
//! it consumes is defined here. A minimal in-tree implementation for tests
//! lives in [`crate::testing`].

use problemo::Problem;

use crate::model::ObjectiveSense;
use crate::E;

/// A restricted-master LP solver, built once per CG call and grown with
/// `add_column` as pricing discovers new columns.
///
/// Backends must be warm-startable: `solve` may be called repeatedly, each
/// time after one or more `add_column` calls, and is expected to reuse
/// whatever basis/factorization it can rather than solving from scratch.
/// Infinite bounds are passed through as `E::INFINITY`/`E::NEG_INFINITY`;
/// backends translate to their own sentinel as needed.
pub trait LpBackend {
    /// Constructs a restricted master with no columns yet: `objective_sense`
    /// and each row's `(lower_bound, upper_bound)`, in row-id order.
    fn new(objective_sense: ObjectiveSense, row_bounds: &[(E, E)]) -> Self
    where
        Self: Sized;

    /// Adds a column with the given sparse `(row, coefficient)` pairs,
    /// objective coefficient, and variable bounds. Returns a backend-local
    /// column index, stable for the lifetime of this backend instance, to
    /// be passed back to [`LpBackend::primal`].
    fn add_column(&mut self, rows: &[usize], coeffs: &[E], obj: E, lb: E, ub: E) -> usize;

    /// Solves the current restricted master via primal simplex.
    ///
    /// # Errors
    /// Returns [`MasterSolveError::Infeasible`] when the master is proved
    /// infeasible (fatal to the current CG call, per §4.4/§7), or
    /// [`MasterSolveError::Backend`] for any other backend failure, which
    /// bubbles up unchanged as [`crate::error::Error::LpBackendError`].
    fn solve(&mut self) -> Result<(), MasterSolveError>;

    /// The objective value of the last `solve()`.
    fn objective(&self) -> E;

    /// The dual (shadow price) of row `row` after the last `solve()`. Sign
    /// follows the standard primal-dual convention: for the active
    /// `objective_sense`, a row with its dominant bound binding gets a dual
    /// of corresponding sign.
    fn dual(&self, row: usize) -> E;

    /// The primal value of column `col` (as returned by `add_column`) after
    /// the last `solve()`.
    fn primal(&self, col: usize) -> E;
}

/// The two ways [`LpBackend::solve`] can fail.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum MasterSolveError {
    #[display("restricted master infeasible")]
    Infeasible,
    #[display("LP backend error: {_0}")]
    Backend(Problem),
}

impl From<MasterSolveError> for crate::Error {
    fn from(value: MasterSolveError) -> Self {
        match value {
            MasterSolveError::Infeasible => crate::Error::InfeasibleMaster,
            MasterSolveError::Backend(problem) => crate::Error::LpBackendError(problem),
        }
    }
}
