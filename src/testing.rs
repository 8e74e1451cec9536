//! In-tree reference implementations used to exercise the framework end to
//! end without a real LP solver or pricing problem wired up.
//!
//! Gated behind `cfg(test)` or the `testing` feature (see `Cargo.toml`):
//! this is not one of the spec's out-of-scope "concrete LP backends", it is
//! test scaffolding, the same role the teacher's own `#[cfg(test)]` helper
//! modules play next to `linalg::solver`.

use std::collections::HashMap;

use problemo::common::IntoCommonProblem;

use crate::backend::{LpBackend, MasterSolveError};
use crate::model::{compute_reduced_cost, ColumnHandle, ObjectiveSense};
use crate::pricing::{PricingOracle, PricingResult};
use crate::E;

/// A pricing oracle that never generates a column. Used wherever a test
/// needs a [`crate::model::Model`] but never exercises pricing.
pub struct NoColumnsOracle;

impl PricingOracle for NoColumnsOracle {
    fn initialize_pricing(&mut self, _fixed: &[(ColumnHandle, E)]) -> Vec<ColumnHandle> {
        Vec::new()
    }

    fn solve_pricing(&mut self, _duals: &[E]) -> PricingResult {
        PricingResult::default()
    }
}

/// A pricing oracle backed by a fixed, pre-enumerated candidate list (the
/// way a toy knapsack or bin-packing pricing problem might be brute-forced
/// for a small test instance rather than solved by a real subproblem
/// solver). Returns every candidate with favorable reduced cost, in list
/// order, on every call; candidates are never consumed.
pub struct EnumeratedPricingOracle {
    sense: ObjectiveSense,
    candidates: Vec<ColumnHandle>,
}

impl EnumeratedPricingOracle {
    pub fn new(sense: ObjectiveSense, candidates: Vec<ColumnHandle>) -> Self {
        Self { sense, candidates }
    }
}

impl PricingOracle for EnumeratedPricingOracle {
    fn initialize_pricing(&mut self, _fixed: &[(ColumnHandle, E)]) -> Vec<ColumnHandle> {
        Vec::new()
    }

    fn solve_pricing(&mut self, duals: &[E]) -> PricingResult {
        let columns: Vec<ColumnHandle> = self
            .candidates
            .iter()
            .filter(|c| {
                self.sense
                    .favorable_reduced_cost(compute_reduced_cost(c, duals), crate::EPSILON)
            })
            .cloned()
            .collect();
        PricingResult::new(columns)
    }
}

#[derive(Clone)]
struct StructuralVar {
    coeffs: HashMap<usize, E>,
    obj: E,
    lower_bound: E,
    upper_bound: E,
}

/// A dense, bounded-variable Big-M primal simplex.
///
/// Built for readability and small instances, not performance: every
/// `solve()` re-solves from scratch rather than warm-starting off the
/// previous basis. Row bounds must be finite (infinite row bounds are out
/// of scope for this reference backend).
pub struct DenseSimplexBackend {
    sense: ObjectiveSense,
    row_bounds: Vec<(E, E)>,
    columns: Vec<StructuralVar>,
    solved: Option<SimplexSolution>,
}

struct SimplexSolution {
    objective: E,
    duals: Vec<E>,
    primal: Vec<E>,
}

const BIG_M: E = 1e7;
const PIVOT_EPSILON: E = 1e-9;
const MAX_ITERATIONS: usize = 10_000;

#[derive(Clone, Copy, PartialEq)]
enum Bound {
    Lower,
    Upper,
}

impl LpBackend for DenseSimplexBackend {
    fn new(objective_sense: ObjectiveSense, row_bounds: &[(E, E)]) -> Self {
        for &(lo, hi) in row_bounds {
            assert!(lo.is_finite() && hi.is_finite(), "DenseSimplexBackend requires finite row bounds");
        }
        Self {
            sense: objective_sense,
            row_bounds: row_bounds.to_vec(),
            columns: Vec::new(),
            solved: None,
        }
    }

    fn add_column(&mut self, rows: &[usize], coeffs: &[E], obj: E, lb: E, ub: E) -> usize {
        let mut map = HashMap::new();
        for (&r, &c) in rows.iter().zip(coeffs) {
            *map.entry(r).or_insert(0.0) += c;
        }
        self.columns.push(StructuralVar {
            coeffs: map,
            obj,
            lower_bound: lb,
            upper_bound: ub,
        });
        self.solved = None;
        self.columns.len() - 1
    }

    fn solve(&mut self) -> Result<(), MasterSolveError> {
        let solution = self.run_simplex()?;
        self.solved = Some(solution);
        Ok(())
    }

    fn objective(&self) -> E {
        self.solved.as_ref().map(|s| s.objective).unwrap_or(0.0)
    }

    fn dual(&self, row: usize) -> E {
        self.solved
            .as_ref()
            .and_then(|s| s.duals.get(row).copied())
            .unwrap_or(0.0)
    }

    fn primal(&self, col: usize) -> E {
        self.solved
            .as_ref()
            .and_then(|s| s.primal.get(col).copied())
            .unwrap_or(0.0)
    }
}

impl DenseSimplexBackend {
    fn run_simplex(&self) -> Result<SimplexSolution, MasterSolveError> {
        let m = self.row_bounds.len();
        let n_struct = self.columns.len();
        let n = n_struct + 2 * m; // structural + slack + artificial
        let slack_offset = n_struct;
        let art_offset = n_struct + m;

        let sign_flip = matches!(self.sense, ObjectiveSense::Maximize);
        let mut cost = vec![0.0; n];
        for (j, col) in self.columns.iter().enumerate() {
            cost[j] = if sign_flip { -col.obj } else { col.obj };
        }
        for a in 0..m {
            cost[art_offset + a] = BIG_M;
        }

        let mut upper = vec![E::INFINITY; n];
        for (j, col) in self.columns.iter().enumerate() {
            upper[j] = col.upper_bound - col.lower_bound;
        }
        for r in 0..m {
            let (lo, hi) = self.row_bounds[r];
            upper[slack_offset + r] = hi - lo;
        }

        let mut tableau = vec![vec![0.0; n + 1]; m];
        let mut row_sign = vec![1.0; m];
        for r in 0..m {
            let shift: E = self
                .columns
                .iter()
                .map(|c| c.coeffs.get(&r).copied().unwrap_or(0.0) * c.lower_bound)
                .sum();
            let rhs_shifted = self.row_bounds[r].0 - shift;
            let sign = if rhs_shifted < 0.0 { -1.0 } else { 1.0 };
            row_sign[r] = sign;
            for (j, col) in self.columns.iter().enumerate() {
                tableau[r][j] = sign * col.coeffs.get(&r).copied().unwrap_or(0.0);
            }
            tableau[r][slack_offset + r] = -sign;
            tableau[r][art_offset + r] = 1.0;
            tableau[r][n] = sign * rhs_shifted;
        }

        let mut basis: Vec<usize> = (0..m).map(|r| art_offset + r).collect();
        let mut status = vec![Bound::Lower; n];

        for _ in 0..MAX_ITERATIONS {
            // reduced costs: cbar_j = cost[j] - sum_r cost[basis[r]] * tableau[r][j]
            let mut reduced = cost.clone();
            for r in 0..m {
                let cb = cost[basis[r]];
                if cb == 0.0 {
                    continue;
                }
                for j in 0..n {
                    reduced[j] -= cb * tableau[r][j];
                }
            }

            let mut entering: Option<(usize, E)> = None;
            for j in 0..n {
                if basis.contains(&j) {
                    continue;
                }
                match status[j] {
                    Bound::Lower if reduced[j] < -PIVOT_EPSILON => {
                        if entering.map(|(_, best)| reduced[j] < best).unwrap_or(true) {
                            entering = Some((j, reduced[j]));
                        }
                    }
                    Bound::Upper if reduced[j] > PIVOT_EPSILON => {
                        if entering.map(|(_, best)| -reduced[j] < best).unwrap_or(true) {
                            entering = Some((j, -reduced[j]));
                        }
                    }
                    _ => {}
                }
            }

            let Some((enter, reduced_enter)) = entering else {
                break;
            };
            let direction = if status[enter] == Bound::Lower { 1.0 } else { -1.0 };
            let _ = reduced_enter;

            // Ratio test over basic variables, plus the entering var's own
            // opposite bound (a "bound flip" with no pivot).
            let mut min_ratio = upper[enter];
            let mut leaving_row: Option<usize> = None;
            for r in 0..m {
                let a = tableau[r][enter] * direction;
                let basic_value = tableau[r][n];
                if a > PIVOT_EPSILON {
                    let ratio = basic_value / a;
                    if ratio < min_ratio - PIVOT_EPSILON {
                        min_ratio = ratio;
                        leaving_row = Some(r);
                    }
                } else if a < -PIVOT_EPSILON {
                    let basic_upper = upper[basis[r]];
                    if basic_upper.is_finite() {
                        let ratio = (basic_upper - basic_value) / (-a);
                        if ratio < min_ratio - PIVOT_EPSILON {
                            min_ratio = ratio;
                            leaving_row = Some(r);
                        }
                    }
                }
            }

            match leaving_row {
                None => {
                    // Bound flip: entering variable moves to its opposite
                    // bound without becoming basic.
                    if !min_ratio.is_finite() {
                        // Unbounded direction with no blocking basic
                        // variable and no finite own bound: the master is
                        // unbounded, which should not happen with properly
                        // bounded dummy columns, but surface it as a
                        // backend error rather than looping forever.
                        return Err(MasterSolveError::Backend(
                            "unbounded restricted master".gloss(),
                        ));
                    }
                    for r in 0..m {
                        tableau[r][n] -= tableau[r][enter] * direction * min_ratio;
                    }
                    status[enter] = if status[enter] == Bound::Lower {
                        Bound::Upper
                    } else {
                        Bound::Lower
                    };
                }
                Some(leave_row) => {
                    // Shift nonbasic values at upper bound into the
                    // equations before pivoting (translate to "from lower
                    // bound" coordinates), then Gauss-Jordan pivot.
                    if direction < 0.0 {
                        for r in 0..m {
                            tableau[r][n] -= tableau[r][enter] * upper[enter];
                        }
                        status[enter] = Bound::Lower;
                        for r in 0..m {
                            tableau[r][enter] = -tableau[r][enter];
                        }
                    }

                    let pivot = tableau[leave_row][enter];
                    for j in 0..=n {
                        tableau[leave_row][j] /= pivot;
                    }
                    for r in 0..m {
                        if r == leave_row {
                            continue;
                        }
                        let factor = tableau[r][enter];
                        if factor.abs() > PIVOT_EPSILON {
                            for j in 0..=n {
                                tableau[r][j] -= factor * tableau[leave_row][j];
                            }
                        }
                    }

                    let leaving_var = basis[leave_row];
                    status[leaving_var] = if (tableau[leave_row][n] - upper[leaving_var]).abs() < PIVOT_EPSILON
                        && upper[leaving_var].is_finite()
                    {
                        Bound::Upper
                    } else {
                        Bound::Lower
                    };
                    basis[leave_row] = enter;
                }
            }
        }

        for r in 0..m {
            if basis[r] >= art_offset && tableau[r][n].abs() > 1e-6 {
                return Err(MasterSolveError::Infeasible);
            }
        }

        let mut var_values = vec![0.0; n];
        for j in 0..n {
            var_values[j] = match status[j] {
                Bound::Lower => 0.0,
                Bound::Upper => upper[j],
            };
        }
        for r in 0..m {
            var_values[basis[r]] = tableau[r][n];
        }

        let mut primal = vec![0.0; n_struct];
        let mut objective_shifted = 0.0;
        for (j, col) in self.columns.iter().enumerate() {
            let actual = var_values[j] + col.lower_bound;
            primal[j] = actual;
            objective_shifted += col.obj * actual;
        }
        let objective = objective_shifted;

        let mut reduced = cost.clone();
        for r in 0..m {
            let cb = cost[basis[r]];
            if cb == 0.0 {
                continue;
            }
            for j in 0..n {
                reduced[j] -= cb * tableau[r][j];
            }
        }
        // Dual of row r is minus the reduced cost of that row's slack
        // variable (the shadow price of relaxing the row by one unit),
        // restored to the caller's sign convention and sense.
        let mut duals = vec![0.0; m];
        for r in 0..m {
            let slack_reduced = reduced[slack_offset + r];
            let dual = row_sign[r] * -slack_reduced;
            duals[r] = if sign_flip { -dual } else { dual };
        }

        Ok(SimplexSolution {
            objective,
            duals,
            primal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ObjectiveSense;

    #[test]
    fn solves_trivial_single_row_minimum() {
        // minimize x, subject to x >= 1, x in [0, 10]
        let mut backend = DenseSimplexBackend::new(ObjectiveSense::Minimize, &[(1.0, 10.0)]);
        backend.add_column(&[0], &[1.0], 1.0, 0.0, 10.0);
        backend.solve().unwrap();
        assert!((backend.objective() - 1.0).abs() < 1e-6);
        assert!((backend.primal(0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn detects_infeasible_master() {
        // row requires value in [5, 5] but only column available caps at 1
        let mut backend = DenseSimplexBackend::new(ObjectiveSense::Minimize, &[(5.0, 5.0)]);
        backend.add_column(&[0], &[1.0], 1.0, 0.0, 1.0);
        let result = backend.solve();
        assert!(matches!(result, Err(MasterSolveError::Infeasible)));
    }

    #[test]
    fn maximize_picks_largest_feasible_value() {
        // maximize x, x in [0,1], subject to x <= 1
        let mut backend = DenseSimplexBackend::new(ObjectiveSense::Maximize, &[(0.0, 1.0)]);
        backend.add_column(&[0], &[1.0], 1.0, 0.0, 1.0);
        backend.solve().unwrap();
        assert!((backend.objective() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn two_columns_share_a_row_within_bound() {
        // minimize x + 2y subject to x + y >= 3, x,y in [0,5]
        let mut backend = DenseSimplexBackend::new(ObjectiveSense::Minimize, &[(3.0, 10.0)]);
        backend.add_column(&[0], &[1.0], 1.0, 0.0, 5.0);
        backend.add_column(&[0], &[1.0], 2.0, 0.0, 5.0);
        backend.solve().unwrap();
        // optimal: x=3, y=0, objective = 3
        assert!((backend.objective() - 3.0).abs() < 1e-6);
    }
}
