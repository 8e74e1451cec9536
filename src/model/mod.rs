//! The problem description ([`Model`], [`Row`], [`Column`]) and the mutable
//! solution assembly built on top of it ([`Solution`], [`SolutionBuilder`],
//! [`ColumnMap`]).

mod column;
mod row;
mod solution;

pub use column::{Column, ColumnHandle, ColumnType, LinearTerm, StructuralKey};
pub use row::Row;
pub use solution::{ColumnMap, Solution, SolutionBuilder};

use std::cell::RefCell;

use crate::error::PricingContractViolation;
use crate::pricing::PricingOracle;
use crate::{E, EPSILON, I};

/// Direction of optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

impl ObjectiveSense {
    /// Sign applied to the dummy-column objective coefficient: `+M` when
    /// minimizing, `-M` when maximizing (§4.4 step 4).
    pub fn dummy_sign(self) -> E {
        match self {
            ObjectiveSense::Minimize => 1.0,
            ObjectiveSense::Maximize => -1.0,
        }
    }

    /// Whether `value` is a strict improvement over `other` for this sense.
    pub fn improves(self, value: E, other: E, tolerance: E) -> bool {
        match self {
            ObjectiveSense::Minimize => value < other - tolerance,
            ObjectiveSense::Maximize => value > other + tolerance,
        }
    }

    /// Whether a reduced cost is favorable (worth adding to the master) for
    /// this sense, at the given tolerance.
    pub fn favorable_reduced_cost(self, reduced_cost: E, tolerance: E) -> bool {
        match self {
            ObjectiveSense::Minimize => reduced_cost < -tolerance,
            ObjectiveSense::Maximize => reduced_cost > tolerance,
        }
    }
}

/// Immutable description of the master problem: the rows, the pricing
/// oracle that searches for new columns, and the static columns always
/// present in the master.
///
/// Model exclusively owns `rows` and the pricing oracle; `columns` are
/// shared (reference-counted) like every other column in the framework.
/// The pricing oracle is behind a `RefCell` rather than requiring `&mut
/// Model`: the engine shares one `Model` (via `Arc`) across every CG call
/// and tree-search node in a driver invocation (§5), and the oracle's own
/// per-call scratch state is what actually changes, not the model.
pub struct Model {
    pub objective_sense: ObjectiveSense,
    rows: Vec<Row>,
    pricing_solver: RefCell<Box<dyn PricingOracle>>,
    columns: Vec<ColumnHandle>,
}

impl Model {
    pub fn new(
        objective_sense: ObjectiveSense,
        rows: Vec<Row>,
        pricing_solver: Box<dyn PricingOracle>,
        columns: Vec<ColumnHandle>,
    ) -> Self {
        Self {
            objective_sense,
            rows,
            pricing_solver: RefCell::new(pricing_solver),
            columns,
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, r: I) -> Option<&Row> {
        self.rows.get(r)
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[ColumnHandle] {
        &self.columns
    }

    pub fn pricing_solver(&self) -> &RefCell<Box<dyn PricingOracle>> {
        &self.pricing_solver
    }

    /// Validates a column returned by the pricing oracle against the
    /// model's declared rows: every row index must exist, and every
    /// coefficient must lie within that row's declared
    /// `[coefficient_lower_bound, coefficient_upper_bound]`. Never called
    /// on the model's own static columns or on trusted initial columns
    /// (§4.1, §7).
    pub fn check_generated_column(&self, column: &Column) -> Result<(), PricingContractViolation> {
        for term in &column.elements {
            let Some(row) = self.row(term.row) else {
                return Err(PricingContractViolation::UnknownRow(term.row));
            };
            if !row.coefficient_in_range(term.coefficient, EPSILON) {
                return Err(PricingContractViolation::CoefficientOutOfRange {
                    row: term.row,
                    coefficient: term.coefficient,
                    lo: row.coefficient_lower_bound,
                    hi: row.coefficient_upper_bound,
                });
            }
        }
        Ok(())
    }
}

/// `objective_coefficient - sum(duals[row] * coefficient)` over `column`'s
/// elements. `duals` is indexed directly by row id (full length, as
/// returned by the LP backend via [`crate::engine`]).
pub fn compute_reduced_cost(column: &Column, duals: &[E]) -> E {
    let penalty: E = column
        .elements
        .iter()
        .map(|term| duals.get(term.row).copied().unwrap_or(0.0) * term.coefficient)
        .sum();
    column.objective_coefficient - penalty
}

/// Euclidean norm of `vec`, restricted to `indices`.
pub fn norm(indices: &[I], vec: &[E]) -> E {
    crate::linalg::norm_restricted(indices, vec)
}

/// Euclidean norm of `v1 - v2`, restricted to `indices`.
pub fn norm_diff(indices: &[I], v1: &[E], v2: &[E]) -> E {
    crate::linalg::norm_diff_restricted(indices, v1, v2)
}
