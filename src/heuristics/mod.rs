//! Tree-search drivers that repeatedly call [`crate::engine::column_generation`]
//! at each node to turn a fractional relaxation into an integer one.
//!
//! Both [`greedy`] and [`lds`] share the same per-round "fix step" and
//! "rounded trial" (§4.5, reused verbatim by §4.6), kept here rather than
//! duplicated, the way the teacher factors a shared `nlp::linesearch`
//! helper out from under two driver-level modules that both need it.

pub mod greedy;
pub mod lds;

pub use greedy::greedy_dive;
pub use lds::limited_discrepancy_search;

use std::collections::HashSet;
use std::sync::Arc;

use crate::model::{ColumnHandle, ColumnMap, ColumnType, Solution, SolutionBuilder};
use crate::EPSILON;

/// What the §4.5 step-6 "fix step" decided for one round.
enum FixStep {
    /// Every already-nonfractional-enough column (`value >= 1`) is
    /// floor-fixed; no explicit branching happened this round.
    Floor(Vec<(ColumnHandle, crate::E)>),
    /// The single column chosen for branching, and the ceiling value it
    /// would be fixed to.
    Branch(ColumnHandle, crate::E),
    /// Nothing left to fix: the dive (or this tree-search node) is done.
    Stop,
}

/// §4.5 step 6 / §4.6 "fix step". `tabu` holds the pointer identity of
/// columns already branched on along the current ancestor chain (always
/// empty for [`greedy`], which has no ancestor chain); those are never
/// reconsidered for branching.
///
/// Read-only: the caller decides how to apply the result (greedy commits
/// immediately into its single shared [`ColumnMap`]; LDS forks it across
/// two children).
fn fix_step(solution: &Solution, fixed: &ColumnMap, tabu: &HashSet<usize>) -> FixStep {
    let floor: Vec<(ColumnHandle, crate::E)> = solution
        .columns()
        .iter()
        .filter(|(c, v)| *v >= 1.0 - EPSILON && !fixed.contains(c))
        .map(|(c, v)| (c.clone(), v.floor()))
        .collect();
    if !floor.is_empty() {
        return FixStep::Floor(floor);
    }

    let mut best: Option<(ColumnHandle, crate::E)> = None;
    for (column, value) in solution.columns() {
        if column.r#type != ColumnType::Integer {
            continue;
        }
        if fixed.contains(column) {
            continue;
        }
        if tabu.contains(&(Arc::as_ptr(column) as usize)) {
            continue;
        }
        if value.ceil() < 1.0 - EPSILON {
            continue;
        }
        let distance = (value.ceil() - value).abs();
        let is_better = match &best {
            None => true,
            Some((best_column, best_value)) => {
                if column.branching_priority > best_column.branching_priority + EPSILON {
                    true
                } else if (column.branching_priority - best_column.branching_priority).abs() <= EPSILON {
                    distance < (best_value.ceil() - best_value).abs() - EPSILON
                } else {
                    false
                }
            }
        };
        if is_better {
            best = Some((column.clone(), *value));
        }
    }

    match best {
        Some((column, value)) => FixStep::Branch(column, value.ceil()),
        None => FixStep::Stop,
    }
}

/// §4.5 step 5 "rounded trial": every column with a fractional value is
/// rounded to the nearest integer, and the result is rebuilt into a fresh
/// [`Solution`] against the same model so its own feasibility check (row
/// bounds, integrality) decides whether the trial is acceptable.
fn rounded_trial(solution: &Solution) -> Solution {
    let mut builder = SolutionBuilder::new();
    builder.set_model(solution.model().clone());
    for (column, value) in solution.columns() {
        let rounded = if (value - value.round()).abs() > EPSILON {
            value.round()
        } else {
            *value
        };
        if rounded != 0.0 {
            builder.add_column(column.clone(), rounded);
        }
    }
    builder.build()
}

/// Whether `candidate` is worth keeping over whatever `best` currently
/// holds: no incumbent yet, or a strict objective improvement under the
/// model's sense.
fn improves_incumbent(model: &crate::model::Model, candidate: &Solution, best: &Option<Solution>) -> bool {
    match best {
        None => true,
        Some(best) => model
            .objective_sense
            .improves(candidate.objective_value(), best.objective_value(), EPSILON),
    }
}
