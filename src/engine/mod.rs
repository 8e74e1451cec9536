//! The stabilized column-generation loop (§4.4) — the heart of the
//! framework: compacts the active row set, installs dummy columns so the
//! restricted master always starts feasible, then alternates LP solves
//! with stabilized pricing calls until no improving column remains,
//! escalating the dummy-column penalty and restarting if one never
//! clears.

pub mod pool;
mod stabilization;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use crate::backend::LpBackend;
use crate::callback::{NewBoundCallback, NewSolutionCallback};
use crate::model::{compute_reduced_cost, Column, ColumnHandle, ColumnType, LinearTerm, Model, Solution, SolutionBuilder};
use crate::output::{CgStatistics, DriverStatistics, Output};
use crate::params::{CgIterationInfo, CgParameters, CommonParameters};
use crate::{Error, Status, E, EPSILON, I};

use stabilization::StabilizationState;

/// Runs the stabilized column-generation algorithm to convergence (or
/// until a resource limit fires), escalating the dummy-column penalty and
/// restarting as needed (§4.4 "Dummy-column escalation").
///
/// `common.fixed_columns` represents a branching decision already made by
/// a caller (e.g. [`crate::heuristics::lds`]); an empty
/// [`crate::model::ColumnMap`] is the ordinary root relaxation.
pub fn column_generation<B: LpBackend>(
    model: &Arc<Model>,
    common: &mut CommonParameters,
    cg_params: &mut CgParameters,
) -> Result<Output, Error> {
    if common.dummy_column_objective_coefficient == 0.0 {
        return Err(crate::error::InvalidArgument::ZeroDummyObjectiveCoefficient.into());
    }

    let start = Instant::now();
    common.timer.initialize();

    let mut dummy_coefficient = common.dummy_column_objective_coefficient;
    let escalation_cap = 100.0 * common.dummy_column_objective_coefficient.abs().max(1.0);
    let mut initial_columns = common.initial_columns.clone();
    let mut total_stats = CgStatistics::default();

    loop {
        let outcome = run_cg_once::<B>(model, common, cg_params, dummy_coefficient, &initial_columns)?;
        total_stats.accumulate(&outcome.stats);
        total_stats.final_dummy_coefficient = dummy_coefficient;

        if matches!(
            outcome.status,
            Status::TimeLimit | Status::IterationLimit | Status::Interrupted
        ) {
            return Ok(finish(common, outcome, total_stats, start));
        }

        if outcome.dummy_active {
            total_stats.dummy_escalations += 1;
            if dummy_coefficient.abs() > escalation_cap {
                let mut infeasible = outcome;
                infeasible.status = Status::Infeasible;
                infeasible.bound = 0.0;
                return Ok(finish(common, infeasible, total_stats, start));
            }
            dummy_coefficient *= 4.0;
            initial_columns = outcome
                .relaxation
                .as_ref()
                .map(|r| r.columns().iter().map(|(c, _)| c.clone()).collect())
                .unwrap_or_default();
            continue;
        }

        return Ok(finish(common, outcome, total_stats, start));
    }
}

fn finish(common: &CommonParameters, outcome: CgRunOutcome, stats: CgStatistics, start: Instant) -> Output {
    let solution = outcome.relaxation.clone().filter(|relaxation| relaxation.feasible());

    Output {
        status: outcome.status,
        solution,
        relaxation_solution: outcome.relaxation,
        bound: outcome.bound,
        elapsed: start.elapsed(),
        dummy_column_objective_coefficient: stats.final_dummy_coefficient,
        number_of_column_generation_iterations: stats.iterations,
        generated_columns: common.column_pool.iter().cloned().collect(),
        statistics: DriverStatistics::ColumnGeneration(stats),
    }
}

struct CgRunOutcome {
    status: Status,
    relaxation: Option<Solution>,
    bound: E,
    dummy_active: bool,
    stats: CgStatistics,
}

/// One CG call at a fixed dummy-column coefficient: preprocessing (§4.4
/// steps 1-7) followed by the main loop (§4.4 "Main loop").
fn run_cg_once<B: LpBackend>(
    model: &Arc<Model>,
    common: &mut CommonParameters,
    cg_params: &mut CgParameters,
    dummy_coefficient: E,
    initial_columns: &[ColumnHandle],
) -> Result<CgRunOutcome, Error> {
    let num_rows = model.num_rows();
    let mut stats = CgStatistics::default();

    // Step 1: fixed contribution per row, and its constant objective share.
    let mut row_values = vec![0.0; num_rows];
    let mut c0 = 0.0;
    for (column, value) in common.fixed_columns.iter() {
        c0 += column.objective_coefficient * value;
        for term in &column.elements {
            if let Some(slot) = row_values.get_mut(term.row) {
                *slot += value * term.coefficient;
            }
        }
    }

    // Step 2: compact the active row set. A row saturated (exactly met) by
    // the fixed contribution alone is dropped; one already over its bound
    // means no completion can ever be feasible.
    let mut active_rows = Vec::new();
    for (r, row) in model.rows().iter().enumerate() {
        if row.is_over_saturated(row_values[r], EPSILON) {
            return Err(Error::InfeasibleMaster);
        }
        if !row.is_saturated(row_values[r], EPSILON) {
            active_rows.push(r);
        }
    }
    let mut position_of: HashMap<I, usize> = HashMap::new();
    for (k, &r) in active_rows.iter().enumerate() {
        position_of.insert(r, k);
    }

    let mut shifted_lb = vec![0.0; num_rows];
    let mut shifted_ub = vec![0.0; num_rows];
    for &r in &active_rows {
        let row = &model.rows()[r];
        shifted_lb[r] = row.lower_bound - row_values[r];
        shifted_ub[r] = row.upper_bound - row_values[r];
    }

    let row_bounds: Vec<(E, E)> = active_rows.iter().map(|&r| (shifted_lb[r], shifted_ub[r])).collect();
    let mut backend = B::new(model.objective_sense, &row_bounds);

    // installed_columns[backend index] is `None` for a dummy column,
    // `Some` for a real model/pool column; the two stay in lockstep with
    // every `backend.add_column` call below.
    let mut installed_columns: Vec<Option<ColumnHandle>> = Vec::new();
    let mut installed_identity: HashSet<usize> = HashSet::new();
    let mut dummy_backend_indices = Vec::new();

    let fixed: Vec<(ColumnHandle, E)> = common.fixed_columns.iter().map(|(c, v)| (c.clone(), v)).collect();
    let infeasible_static = model.pricing_solver().borrow_mut().initialize_pricing(&fixed);
    let infeasible_static: HashSet<usize> = infeasible_static.iter().map(|c| Arc::as_ptr(c) as usize).collect();

    // Step 6: static + initial columns, modulo fixed/infeasible/non-installable.
    let candidate_columns = model.columns().iter().cloned().chain(initial_columns.iter().cloned());
    for column in candidate_columns {
        let ptr = Arc::as_ptr(&column) as usize;
        if common.fixed_columns.contains(&column) || installed_identity.contains(&ptr) {
            continue;
        }
        if infeasible_static.contains(&ptr) {
            continue;
        }
        if column.r#type == ColumnType::Integer && would_overflow_nonnegative_row(&column, model, &row_values) {
            continue;
        }
        let (rows, coeffs) = compacted_terms(&column, &position_of);
        let idx = backend.add_column(&rows, &coeffs, column.objective_coefficient, column.lower_bound, column.upper_bound);
        installed_identity.insert(ptr);
        debug_assert_eq!(idx, installed_columns.len());
        installed_columns.push(Some(column));
    }

    // Step 7: dummy columns for rows with a residual deficit in either
    // direction, penalized at `dummy_coefficient` (sign per objective
    // sense) and unbounded above so they can always restore feasibility.
    let sign = model.objective_sense.dummy_sign();
    for &r in &active_rows {
        if shifted_lb[r] > EPSILON {
            let idx = backend.add_column(&[position_of[&r]], &[shifted_lb[r]], sign * dummy_coefficient, 0.0, E::INFINITY);
            installed_columns.push(None);
            debug_assert_eq!(idx, installed_columns.len() - 1);
            dummy_backend_indices.push(idx);
        }
        if shifted_ub[r] < -EPSILON {
            let idx = backend.add_column(&[position_of[&r]], &[shifted_ub[r]], sign * dummy_coefficient, 0.0, E::INFINITY);
            installed_columns.push(None);
            debug_assert_eq!(idx, installed_columns.len() - 1);
            dummy_backend_indices.push(idx);
        }
    }

    let mut state = StabilizationState::new(
        cg_params.static_wentges_smoothing_parameter,
        cg_params.static_directional_smoothing_parameter,
    );
    let mut duals_in = vec![0.0; num_rows];
    // The subgradient from the previous main-loop iteration, consumed by
    // the directional-smoothing branch of the *next* iteration's pricing
    // attempt (it is not yet known for the iteration that produces it).
    let mut previous_subgradient = vec![0.0; num_rows];

    let mut final_status = Status::Optimal;

    loop {
        if let Some(status) = common.timer.needs_to_end() {
            final_status = status;
            break;
        }
        if let Some(max) = cg_params.maximum_number_of_iterations {
            if stats.iterations >= max {
                final_status = Status::IterationLimit;
                break;
            }
        }

        let solve_start = Instant::now();
        backend.solve()?;
        stats.lp_solve_time += solve_start.elapsed();
        stats.iterations += 1;

        let mut duals_out = vec![0.0; num_rows];
        for (k, &r) in active_rows.iter().enumerate() {
            duals_out[r] = backend.dual(k);
        }
        let relaxation_value = c0 + backend.objective();

        // Pool replay against the true duals, before invoking pricing.
        let mut new_columns: Vec<ColumnHandle> = Vec::new();
        for column in common.column_pool.iter() {
            let ptr = Arc::as_ptr(column) as usize;
            if installed_identity.contains(&ptr) {
                continue;
            }
            if model
                .objective_sense
                .favorable_reduced_cost(compute_reduced_cost(column, &duals_out), EPSILON)
            {
                new_columns.push(column.clone());
            }
        }

        let mut pricing_ran = false;
        let mut duals_sep_final = duals_in.clone();
        if new_columns.is_empty() {
            pricing_ran = true;
            let (found, last_sep) = stabilized_pricing_loop(
                model,
                &mut common.column_pool,
                &mut state,
                &active_rows,
                &duals_in,
                &duals_out,
                &previous_subgradient,
                num_rows,
                stats.iterations > 1,
                cg_params.automatic_directional_smoothing,
                &mut stats,
            )?;
            new_columns = found;
            duals_sep_final = last_sep;
        }

        cg_params.iteration_callback.on_iteration(&CgIterationInfo {
            iteration: stats.iterations,
            relaxation_value,
            new_columns: new_columns.len(),
            mispricings: stats.mispricings,
        });

        if new_columns.is_empty() {
            final_status = Status::Optimal;
            break;
        }

        if pricing_ran {
            let mut a = vec![0.0; num_rows];
            for column in &new_columns {
                for term in &column.elements {
                    if position_of.contains_key(&term.row) {
                        a[term.row] += term.coefficient;
                    }
                }
            }
            let g = stabilization::subgradient(&active_rows, &shifted_lb, &shifted_ub, &a, num_rows);
            if cg_params.self_adjusting_wentges_smoothing {
                state.self_adjust_alpha(&active_rows, &g, &duals_sep_final, &duals_in);
            }
            duals_in = duals_sep_final;
            previous_subgradient = g;
        }

        for column in new_columns {
            let ptr = Arc::as_ptr(&column) as usize;
            if installed_identity.contains(&ptr) {
                continue;
            }
            let (rows, coeffs) = compacted_terms(&column, &position_of);
            let idx = backend.add_column(&rows, &coeffs, column.objective_coefficient, column.lower_bound, column.upper_bound);
            installed_identity.insert(ptr);
            debug_assert_eq!(idx, installed_columns.len());
            installed_columns.push(Some(column));
        }
    }

    // One last solve to make sure the reported relaxation matches the
    // final column set (a no-op unless the loop above broke out via a
    // resource limit on its very first pass, before ever solving).
    backend.solve()?;
    let relaxation_value = c0 + backend.objective();

    let mut builder = SolutionBuilder::new();
    builder.set_model(model.clone());
    for (idx, column) in installed_columns.iter().enumerate() {
        if let Some(handle) = column {
            let value = backend.primal(idx);
            if value.abs() > 0.0 {
                builder.add_column(handle.clone(), value);
            }
        }
    }
    for (column, value) in common.fixed_columns.iter() {
        builder.add_column(column.clone(), value);
    }
    let relaxation = builder.build();

    common.new_bound_callback.on_new_bound(relaxation_value);
    if relaxation.feasible() {
        common.new_solution_callback.on_new_solution(&relaxation);
    }

    let dummy_active = dummy_backend_indices.iter().any(|&idx| backend.primal(idx) > EPSILON);

    stats.final_wentges_alpha = state.alpha;
    stats.final_directional_beta = state.beta;

    Ok(CgRunOutcome {
        status: final_status,
        relaxation: Some(relaxation),
        bound: relaxation_value,
        dummy_active,
        stats,
    })
}

/// The inner mispricing loop (§4.4 "Stabilized pricing inner loop"):
/// escalating Wentges smoothing (and, on the first attempt of a non-root
/// iteration, directional smoothing) until pricing returns an improving
/// column or both smoothing knobs are exhausted.
#[allow(clippy::too_many_arguments)]
fn stabilized_pricing_loop(
    model: &Arc<Model>,
    pool: &mut pool::ColumnPool,
    state: &mut StabilizationState,
    active_rows: &[I],
    duals_in: &[E],
    duals_out: &[E],
    previous_subgradient: &[E],
    len: usize,
    not_first_iteration: bool,
    auto_directional: bool,
    stats: &mut CgStatistics,
) -> Result<(Vec<ColumnHandle>, Vec<E>), Error> {
    let mut attempt = 1usize;
    loop {
        let sep = stabilization::separation_point(
            state,
            active_rows,
            duals_in,
            duals_out,
            previous_subgradient,
            attempt,
            len,
            not_first_iteration,
            auto_directional,
        );

        let pricing_start = Instant::now();
        let result = model.pricing_solver().borrow_mut().solve_pricing(&sep);
        stats.pricing_calls += 1;
        stats.pricing_time += pricing_start.elapsed();

        for column in &result.columns {
            model.check_generated_column(column)?;
        }

        let mut new_columns = Vec::new();
        for column in result.columns {
            let newly_unique = pool.insert(column.clone());
            if newly_unique
                && model
                    .objective_sense
                    .favorable_reduced_cost(compute_reduced_cost(&column, duals_out), EPSILON)
            {
                new_columns.push(column);
            }
        }

        let alpha_k = stabilization::wentges_alpha_k(state.alpha, attempt);
        let no_more_room = alpha_k == 0.0 && state.beta == 0.0;

        if !new_columns.is_empty() || no_more_room {
            if new_columns.is_empty() {
                stats.mispricings += 1;
            }
            return Ok((new_columns, sep));
        }

        stats.mispricings += 1;
        attempt += 1;
    }
}

fn compacted_terms(column: &Column, position_of: &HashMap<I, usize>) -> (Vec<usize>, Vec<E>) {
    let mut rows = Vec::new();
    let mut coeffs = Vec::new();
    for term in &column.elements {
        if let Some(&pos) = position_of.get(&term.row) {
            rows.push(pos);
            coeffs.push(term.coefficient);
        }
    }
    (rows, coeffs)
}

/// Whether installing `column` (an Integer-typed static/initial column)
/// could ever be feasible given the fixed contribution so far: if even a
/// single unit overflows a nonnegative-coefficient row's upper bound, an
/// integer column can never be used, so it is skipped rather than handed
/// to the LP (§4.4 step 6).
fn would_overflow_nonnegative_row(column: &Column, model: &Model, row_values: &[E]) -> bool {
    for LinearTerm { row, coefficient } in &column.elements {
        let Some(row_def) = model.row(*row) else {
            continue;
        };
        if row_def.has_nonnegative_coefficients()
            && row_values.get(*row).copied().unwrap_or(0.0) + coefficient > row_def.upper_bound + EPSILON
        {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Model, ObjectiveSense, Row};
    use crate::params::CommonParameters;
    use crate::testing::{DenseSimplexBackend, EnumeratedPricingOracle};

    fn model_with_columns(rows: Vec<Row>, columns: Vec<ColumnHandle>) -> Arc<Model> {
        Arc::new(Model::new(
            ObjectiveSense::Minimize,
            rows,
            Box::new(EnumeratedPricingOracle::new(ObjectiveSense::Minimize, vec![])),
            columns,
        ))
    }

    #[test]
    fn converges_with_only_static_columns_when_they_already_cover_every_row() {
        let column = Column::new(2.0, vec![LinearTerm::new(0, 1.0)])
            .with_bounds(0.0, 5.0)
            .into_handle();
        let model = model_with_columns(vec![Row::new(1.0, 5.0, 0.0, 1.0)], vec![column]);

        let mut common = CommonParameters::new();
        let mut cg_params = CgParameters::new();
        let output = column_generation::<DenseSimplexBackend>(&model, &mut common, &mut cg_params).unwrap();

        assert_eq!(output.status, Status::Optimal);
        assert!(!output.dummy_column_objective_coefficient.is_nan());
        let relaxation = output.relaxation_solution.unwrap();
        assert!(relaxation.feasible());
        assert!((relaxation.row_value(0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn escalates_dummy_coefficient_when_no_column_can_cover_a_row() {
        // A row that nothing can ever satisfy (no static columns, pricing
        // oracle returns nothing): dummy columns stay active forever and
        // the driver must report infeasibility rather than looping.
        let model = model_with_columns(vec![Row::new(1.0, 1.0, 0.0, 1.0)], vec![]);

        let mut common = CommonParameters::new().with_dummy_column_objective_coefficient(10.0);
        let mut cg_params = CgParameters::new();
        let output = column_generation::<DenseSimplexBackend>(&model, &mut common, &mut cg_params).unwrap();

        assert_eq!(output.status, Status::Infeasible);
        assert_eq!(output.bound, 0.0);
        assert!(output.solution.is_none());
    }
}
