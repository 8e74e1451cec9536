//! Limited-discrepancy search (§4.6, C6): a priority-ordered tree search
//! over "follow the greedy fix step" vs "deviate from it" decisions,
//! bounded by a discrepancy budget rather than exhaustive branch-and-bound.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::engine;
use crate::model::{ColumnMap, Model, Solution};
use crate::output::{DriverStatistics, LdsStatistics, Output};
use crate::params::{CgParameters, CommonParameters, LdsParameters};
use crate::{backend::LpBackend, Error, Status, E, EPSILON};

use super::{fix_step, improves_incumbent, rounded_trial, FixStep};

/// One frontier entry: the fixed-column assignment accumulated down to
/// here, the pointer identities branched on along this node's ancestor
/// chain (never reconsidered for branching, §4.6), and the ordering keys.
struct Node {
    fixed: ColumnMap,
    tabu: HashSet<usize>,
    discrepancy: usize,
    depth: usize,
    /// Insertion order, used only to break ties deterministically between
    /// nodes with equal (discrepancy, depth).
    seq: usize,
}

/// Runs the discrepancy-bounded tree search to convergence or until a stop
/// condition fires (§4.6). The frontier is a plain `Vec`, scanned for its
/// minimum `(discrepancy, depth descending, seq)` entry each pop — the
/// ordering the spec documents — rather than a binary heap, since nodes
/// are also removed ahead of the front (pruned) and a `Vec::swap_remove`
/// keeps that simple at the scale a discrepancy-bounded search explores.
pub fn limited_discrepancy_search<B: LpBackend>(
    model: &Arc<Model>,
    common: &mut CommonParameters,
    cg_params: &mut CgParameters,
    lds_params: &LdsParameters,
) -> Result<Output, Error> {
    let start = Instant::now();
    let mut stats = LdsStatistics::default();
    let mut bound: Option<E> = None;
    let mut best: Option<Solution> = None;
    let mut last_relaxation: Option<Solution> = None;
    let mut last_dummy_coefficient = common.dummy_column_objective_coefficient;
    let mut total_iterations = 0usize;
    let mut max_zero_discrepancy_depth = 0usize;
    let mut next_seq = 1usize;
    let mut frontier: Vec<Node> = vec![Node {
        fixed: ColumnMap::new(),
        tabu: HashSet::new(),
        discrepancy: 0,
        depth: 0,
        seq: 0,
    }];

    let final_status = 'search: loop {
        if let Some(status) = common.timer.needs_to_end() {
            break status;
        }

        if let (Some(best_solution), Some(bound_value)) = (&best, bound) {
            if (best_solution.objective_value() - bound_value).abs() < EPSILON {
                break Status::Optimal;
            }
        }

        if lds_params.automatic_stop
            && stats.nodes_explored >= 2
            && stats.nodes_explored >= 4 * max_zero_discrepancy_depth
        {
            break if best.is_some() { Status::Optimal } else { Status::Infeasible };
        }

        let Some(pop_index) = frontier
            .iter()
            .enumerate()
            .min_by_key(|(_, n)| (n.discrepancy, std::cmp::Reverse(n.depth), n.seq))
            .map(|(index, _)| index)
        else {
            break if best.is_some() { Status::Optimal } else { Status::Infeasible };
        };
        let node = frontier.swap_remove(pop_index);

        let exempt = lds_params.continue_until_feasible && best.is_none();
        if node.discrepancy > lds_params.discrepancy_limit && !exempt {
            break if best.is_some() { Status::Optimal } else { Status::Infeasible };
        }

        stats.nodes_explored += 1;
        stats.max_depth = stats.max_depth.max(node.depth);
        stats.max_discrepancy = stats.max_discrepancy.max(node.discrepancy);
        if node.discrepancy == 0 {
            max_zero_discrepancy_depth = max_zero_discrepancy_depth.max(node.depth);
        }

        let saved_fixed = std::mem::replace(&mut common.fixed_columns, node.fixed.clone());
        let cg_result = engine::column_generation::<B>(model, common, cg_params);
        common.fixed_columns = saved_fixed;

        let cg_output = match cg_result {
            Ok(output) => output,
            Err(Error::InfeasibleMaster) => continue 'search,
            Err(other) => return Err(other),
        };

        let cg_stats = match &cg_output.statistics {
            DriverStatistics::ColumnGeneration(cg_stats) => cg_stats.clone(),
            _ => unreachable!("column_generation always reports DriverStatistics::ColumnGeneration"),
        };
        stats.cg.accumulate(&cg_stats);
        total_iterations += cg_output.number_of_column_generation_iterations;
        last_dummy_coefficient = cg_output.dummy_column_objective_coefficient;
        last_relaxation = cg_output.relaxation_solution.clone();

        if node.depth == 0 {
            bound = Some(cg_output.bound);
        }

        if matches!(cg_output.status, Status::TimeLimit | Status::Interrupted) {
            break cg_output.status;
        }

        let Some(relaxation) = last_relaxation.as_ref() else {
            continue 'search;
        };

        if relaxation.feasible() {
            if improves_incumbent(model, relaxation, &best) {
                common.new_solution_callback.on_new_solution(relaxation);
                best = Some(relaxation.clone());
            }
            continue 'search;
        }

        let trial = rounded_trial(relaxation);
        if trial.feasible() && improves_incumbent(model, &trial, &best) {
            common.new_solution_callback.on_new_solution(&trial);
            best = Some(trial);
        }

        if lds_params.bound {
            if let Some(best_solution) = &best {
                if !model.objective_sense.improves(cg_output.bound, best_solution.objective_value(), EPSILON) {
                    continue 'search; // pruned: this subtree cannot beat the incumbent
                }
            }
        }

        match fix_step(relaxation, &node.fixed, &node.tabu) {
            FixStep::Floor(pairs) => {
                let mut child_fixed = node.fixed.clone();
                for (column, value) in pairs {
                    child_fixed.set_column_value(column, value);
                }
                frontier.push(Node {
                    fixed: child_fixed,
                    tabu: node.tabu.clone(),
                    discrepancy: node.discrepancy,
                    depth: node.depth + 1,
                    seq: next_seq,
                });
                next_seq += 1;
            }
            FixStep::Branch(column, value) => {
                let mut left_fixed = node.fixed.clone();
                left_fixed.set_column_value(column.clone(), value);
                frontier.push(Node {
                    fixed: left_fixed,
                    tabu: node.tabu.clone(),
                    discrepancy: node.discrepancy,
                    depth: node.depth + 1,
                    seq: next_seq,
                });
                next_seq += 1;

                let mut right_tabu = node.tabu.clone();
                right_tabu.insert(Arc::as_ptr(&column) as usize);
                frontier.push(Node {
                    fixed: node.fixed.clone(),
                    tabu: right_tabu,
                    discrepancy: node.discrepancy + 1,
                    depth: node.depth + 1,
                    seq: next_seq,
                });
                next_seq += 1;
            }
            FixStep::Stop => {}
        }
    };

    Ok(Output {
        status: final_status,
        solution: best,
        relaxation_solution: last_relaxation,
        bound: bound.unwrap_or(0.0),
        elapsed: start.elapsed(),
        dummy_column_objective_coefficient: last_dummy_coefficient,
        number_of_column_generation_iterations: total_iterations,
        generated_columns: common.column_pool.iter().cloned().collect(),
        statistics: DriverStatistics::Lds(stats),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, ColumnType, LinearTerm, ObjectiveSense, Row};
    use crate::testing::{DenseSimplexBackend, EnumeratedPricingOracle};

    fn model_with_columns(rows: Vec<Row>, columns: Vec<crate::model::ColumnHandle>) -> Arc<Model> {
        Arc::new(Model::new(
            ObjectiveSense::Minimize,
            rows,
            Box::new(EnumeratedPricingOracle::new(ObjectiveSense::Minimize, vec![])),
            columns,
        ))
    }

    #[test]
    fn explores_root_and_closes_gap_on_an_already_integer_relaxation() {
        let column = Column::new(2.0, vec![LinearTerm::new(0, 1.0)])
            .with_type(ColumnType::Integer)
            .with_bounds(0.0, 5.0)
            .into_handle();
        let model = model_with_columns(vec![Row::new(3.0, 3.0, 0.0, 1.0)], vec![column]);

        let mut common = CommonParameters::new();
        let mut cg_params = CgParameters::new();
        let lds_params = LdsParameters::new().with_discrepancy_limit(1);
        let output = limited_discrepancy_search::<DenseSimplexBackend>(&model, &mut common, &mut cg_params, &lds_params).unwrap();

        assert_eq!(output.status, Status::Optimal);
        let solution = output.solution.unwrap();
        assert!(solution.feasible());
        assert!((solution.objective_value() - output.bound).abs() < 1e-4);
        match &output.statistics {
            DriverStatistics::Lds(stats) => assert!(stats.nodes_explored >= 1),
            _ => unreachable!(),
        }
    }

    #[test]
    fn reports_infeasible_when_no_column_can_ever_cover_a_row() {
        let model = model_with_columns(vec![Row::new(1.0, 1.0, 0.0, 1.0)], vec![]);
        let mut common = CommonParameters::new().with_dummy_column_objective_coefficient(10.0);
        let mut cg_params = CgParameters::new();
        let lds_params = LdsParameters::new();
        let output = limited_discrepancy_search::<DenseSimplexBackend>(&model, &mut common, &mut cg_params, &lds_params).unwrap();

        assert_eq!(output.status, Status::Infeasible);
        assert!(output.solution.is_none());
    }
}
