//! Greedy diving (§4.5, C5): a single linear dive that repeatedly calls CG,
//! then rounds or fixes its way toward an integer solution.

use std::collections::HashSet;
use std::sync::Arc;

use crate::engine;
use crate::model::{Model, Solution};
use crate::output::{DriverStatistics, GreedyStatistics, Output};
use crate::params::{CgParameters, CommonParameters};
use crate::{backend::LpBackend, Error, Status};

use super::{fix_step, improves_incumbent, rounded_trial, FixStep};

/// Dives from the root relaxation to an integer solution by repeatedly
/// invoking CG and, each round, either rounding the relaxation to a
/// feasible candidate or fixing one more column toward integrality (§4.5
/// steps 1-7).
pub fn greedy_dive<B: LpBackend>(
    model: &Arc<Model>,
    common: &mut CommonParameters,
    cg_params: &mut CgParameters,
) -> Result<Output, Error> {
    let start = std::time::Instant::now();
    let mut stats = GreedyStatistics::default();
    let mut bound = 0.0;
    let mut best: Option<Solution> = None;
    let mut last_relaxation: Option<Solution> = None;
    let mut last_dummy_coefficient = common.dummy_column_objective_coefficient;
    let mut total_iterations = 0usize;
    let mut final_status = Status::Infeasible;

    loop {
        // Step 1: invoke CG with the current fixed columns and pool.
        let cg_output = match engine::column_generation::<B>(model, common, cg_params) {
            Ok(output) => output,
            Err(Error::InfeasibleMaster) => break,
            Err(other) => return Err(other),
        };

        // Step 2: update statistics (the pool itself is grown in place by
        // `column_generation`, since it mutates `common.column_pool`).
        let cg_stats = match &cg_output.statistics {
            DriverStatistics::ColumnGeneration(cg_stats) => cg_stats.clone(),
            _ => unreachable!("column_generation always reports DriverStatistics::ColumnGeneration"),
        };
        stats.cg.accumulate(&cg_stats);
        total_iterations += cg_output.number_of_column_generation_iterations;
        last_dummy_coefficient = cg_output.dummy_column_objective_coefficient;

        // Step 3: at depth 0 only, and only when CG actually converged.
        if stats.depth_reached == 0 && cg_output.status != Status::IterationLimit {
            bound = cg_output.bound;
        }
        stats.depth_reached += 1;

        last_relaxation = cg_output.relaxation_solution.clone();

        if matches!(cg_output.status, Status::TimeLimit | Status::Interrupted) {
            final_status = cg_output.status;
            break;
        }

        let relaxation = match &last_relaxation {
            Some(relaxation) => relaxation,
            None => break,
        };

        // Step 4: a fully integer-feasible relaxation ends the dive, but
        // only replaces the incumbent if it actually improves on whatever
        // an earlier round's rounded trial already accepted (P5).
        if relaxation.feasible() {
            if improves_incumbent(model, relaxation, &best) {
                common.new_solution_callback.on_new_solution(relaxation);
                best = Some(relaxation.clone());
            }
            final_status = Status::Optimal;
            break;
        }

        // Step 5: rounded trial, kept only if it improves the incumbent.
        let trial = rounded_trial(relaxation);
        if trial.feasible() && improves_incumbent(model, &trial, &best) {
            common.new_solution_callback.on_new_solution(&trial);
            best = Some(trial);
        }

        // Step 6/7: fix step; stop the dive once nothing more can be fixed.
        match fix_step(relaxation, &common.fixed_columns, &HashSet::new()) {
            FixStep::Floor(pairs) => {
                for (column, value) in pairs {
                    common.fixed_columns.set_column_value(column, value);
                }
            }
            FixStep::Branch(column, value) => {
                common.fixed_columns.set_column_value(column, value);
            }
            FixStep::Stop => {
                final_status = if best.is_some() { Status::Optimal } else { Status::Infeasible };
                break;
            }
        }
    }

    if best.is_some() && !matches!(final_status, Status::TimeLimit | Status::Interrupted) {
        final_status = Status::Optimal;
    }

    Ok(Output {
        status: final_status,
        solution: best,
        relaxation_solution: last_relaxation,
        bound,
        elapsed: start.elapsed(),
        dummy_column_objective_coefficient: last_dummy_coefficient,
        number_of_column_generation_iterations: total_iterations,
        generated_columns: common.column_pool.iter().cloned().collect(),
        statistics: DriverStatistics::Greedy(stats),
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
    fn dives_to_an_already_integer_relaxation_immediately() {
        let column = Column::new(2.0, vec![LinearTerm::new(0, 1.0)])
            .with_type(ColumnType::Integer)
            .with_bounds(0.0, 5.0)
            .into_handle();
        let model = model_with_columns(vec![Row::new(3.0, 3.0, 0.0, 1.0)], vec![column]);

        let mut common = CommonParameters::new();
        let mut cg_params = CgParameters::new();
        let output = greedy_dive::<DenseSimplexBackend>(&model, &mut common, &mut cg_params).unwrap();

        assert_eq!(output.status, Status::Optimal);
        let solution = output.solution.unwrap();
        assert!(solution.feasible());
        assert!((solution.row_value(0) - 3.0).abs() < 1e-4);
        match &output.statistics {
            DriverStatistics::Greedy(stats) => assert_eq!(stats.depth_reached, 1),
            _ => unreachable!(),
        }
    }

    #[test]
    fn stops_infeasible_when_no_column_can_ever_cover_a_row() {
        let model = model_with_columns(vec![Row::new(1.0, 1.0, 0.0, 1.0)], vec![]);
        let mut common = CommonParameters::new().with_dummy_column_objective_coefficient(10.0);
        let mut cg_params = CgParameters::new();
        let output = greedy_dive::<DenseSimplexBackend>(&model, &mut common, &mut cg_params).unwrap();

        assert_eq!(output.status, Status::Infeasible);
        assert!(output.solution.is_none());
    }
}
