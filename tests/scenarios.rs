//! End-to-end scenarios (§8 E1-E6): small instances whose optimum is known
//! by hand, run through the public driver entry points against the
//! in-tree reference backend.

use std::sync::Arc;

use colgen::heuristics::{greedy_dive, limited_discrepancy_search};
use colgen::model::{Column, ColumnType, LinearTerm, Model, ObjectiveSense, Row};
use colgen::output::DriverStatistics;
use colgen::params::{CgParameters, CommonParameters, LdsParameters};
use colgen::testing::{DenseSimplexBackend, EnumeratedPricingOracle};
use colgen::{engine, Status};

fn cg_stats(statistics: &DriverStatistics) -> colgen::output::CgStatistics {
    match statistics {
        DriverStatistics::ColumnGeneration(stats) => stats.clone(),
        _ => unreachable!("column_generation always reports DriverStatistics::ColumnGeneration"),
    }
}

/// E1: trivial bin packing. Three unit-weight items, each needing exactly
/// one bin (an equality row), and one singleton column per item (a bin
/// holding just that item, cost 1). No pricing is needed at all: every
/// column the restricted master could ever want is already static.
fn e1_model() -> Arc<Model> {
    let rows = vec![
        Row::equality(1.0, 0.0, 1.0),
        Row::equality(1.0, 0.0, 1.0),
        Row::equality(1.0, 0.0, 1.0),
    ];
    let columns = (0..3)
        .map(|item| {
            Column::new(1.0, vec![LinearTerm::new(item, 1.0)])
                .with_type(ColumnType::Integer)
                .with_bounds(0.0, 1.0)
                .into_handle()
        })
        .collect();
    Arc::new(Model::new(
        ObjectiveSense::Minimize,
        rows,
        Box::new(EnumeratedPricingOracle::new(ObjectiveSense::Minimize, vec![])),
        columns,
    ))
}

#[test]
fn e1_trivial_bin_packing_converges_to_three_bins() {
    let model = e1_model();
    let mut common = CommonParameters::new();
    let mut cg_params = CgParameters::new();

    let output = engine::column_generation::<DenseSimplexBackend>(&model, &mut common, &mut cg_params).unwrap();

    assert_eq!(output.status, Status::Optimal);
    let solution = output.solution.unwrap();
    assert!(solution.feasible());
    assert!((solution.objective_value() - 3.0).abs() < 1e-4);
    assert!((output.bound - 3.0).abs() < 1e-4);
    assert!(cg_stats(&output.statistics).iterations <= 4);
}

/// E2: cutting stock with one demand-saturating pattern. A single row
/// with demand 5 and one column whose coefficient can cover up to 5 units
/// per cut; the LP optimum uses that one pattern at value 5.
#[test]
fn e2_cutting_stock_single_pattern_saturates_demand() {
    let row = Row::new(5.0, 5.0, 0.0, 5.0);
    let pattern = Column::new(1.0, vec![LinearTerm::new(0, 5.0)])
        .with_bounds(0.0, 1.0)
        .into_handle();
    let model = Arc::new(Model::new(
        ObjectiveSense::Minimize,
        vec![row],
        Box::new(EnumeratedPricingOracle::new(ObjectiveSense::Minimize, vec![])),
        vec![pattern],
    ));

    let mut common = CommonParameters::new();
    let mut cg_params = CgParameters::new();
    let output = engine::column_generation::<DenseSimplexBackend>(&model, &mut common, &mut cg_params).unwrap();

    assert_eq!(output.status, Status::Optimal);
    let solution = output.solution.unwrap();
    assert!((solution.objective_value() - 1.0).abs() < 1e-4);
    assert_eq!(solution.columns().len(), 1);
    assert!((solution.columns()[0].1 - 1.0).abs() < 1e-4);
    assert!((solution.row_value(0) - 5.0).abs() < 1e-4);
}

/// E3: an equality row no column can ever cover. The dummy column carries
/// the row until the escalation cap is hit, at which point the call is
/// reported infeasible with a zero bound, having escalated more than once.
#[test]
fn e3_unsatisfiable_assignment_escalates_then_reports_infeasible() {
    let row = Row::equality(1.0, 0.0, 1.0);
    let model = Arc::new(Model::new(
        ObjectiveSense::Minimize,
        vec![row],
        Box::new(EnumeratedPricingOracle::new(ObjectiveSense::Minimize, vec![])),
        vec![],
    ));

    let mut common = CommonParameters::new().with_dummy_column_objective_coefficient(10.0);
    let mut cg_params = CgParameters::new();
    let output = engine::column_generation::<DenseSimplexBackend>(&model, &mut common, &mut cg_params).unwrap();

    assert_eq!(output.status, Status::Infeasible);
    assert!(output.solution.is_none());
    assert_eq!(output.bound, 0.0);
    assert!(cg_stats(&output.statistics).dummy_escalations >= 2);
}

/// E4: stabilization convergence. Reusing the E1 instance with a nonzero
/// starting Wentges alpha and self-adjustment enabled: alpha should relax
/// toward zero within a handful of iterations, and never excurse outside
/// `[0, 1)`.
#[test]
fn e4_self_adjusting_wentges_alpha_relaxes_toward_zero() {
    let model = e1_model();
    let mut common = CommonParameters::new();
    let mut cg_params = CgParameters::new()
        .with_static_wentges_smoothing_parameter(0.9)
        .with_self_adjusting_wentges_smoothing(true);

    let output = engine::column_generation::<DenseSimplexBackend>(&model, &mut common, &mut cg_params).unwrap();

    let stats = cg_stats(&output.statistics);
    assert!(stats.iterations <= 10);
    assert!(stats.final_wentges_alpha >= 0.0 && stats.final_wentges_alpha < 0.99);
    assert!(stats.final_wentges_alpha < 0.5);
}

/// E5: limited discrepancy search closes the gap on the E1 instance. The
/// relaxation is already integral at the root, so the very first node
/// explored should already certify optimality.
#[test]
fn e5_lds_finds_integer_optimum_and_closes_gap() {
    let model = e1_model();
    let mut common = CommonParameters::new();
    let mut cg_params = CgParameters::new();
    let lds_params = LdsParameters::new().with_discrepancy_limit(1);

    let output =
        limited_discrepancy_search::<DenseSimplexBackend>(&model, &mut common, &mut cg_params, &lds_params).unwrap();

    assert_eq!(output.status, Status::Optimal);
    let solution = output.solution.unwrap();
    assert!((solution.objective_value() - 3.0).abs() < 1e-4);
    assert!((output.bound - 3.0).abs() < 1e-4);
    assert_eq!(output.absolute_optimality_gap(), 0.0);
    match &output.statistics {
        DriverStatistics::Lds(stats) => assert!(stats.nodes_explored >= 1),
        _ => unreachable!(),
    }
}

/// E6: directional smoothing starting from beta = 0. The E1 instance
/// converges in few iterations, but the point is that enabling automatic
/// directional smoothing from a zero starting beta never produces NaN or
/// infinite objective/bound values along the way.
#[test]
fn e6_directional_smoothing_from_zero_beta_stays_finite() {
    let model = e1_model();
    let mut common = CommonParameters::new();
    let mut cg_params = CgParameters::new()
        .with_static_directional_smoothing_parameter(0.0)
        .with_automatic_directional_smoothing(true);

    let output = engine::column_generation::<DenseSimplexBackend>(&model, &mut common, &mut cg_params).unwrap();

    assert_eq!(output.status, Status::Optimal);
    let stats = cg_stats(&output.statistics);
    assert!(stats.final_directional_beta.is_finite());
    assert!(output.bound.is_finite());
    let solution = output.solution.unwrap();
    assert!(solution.objective_value().is_finite());
}

/// A greedy dive over the E1 instance should also land on the same
/// optimum in a single round, since the relaxation is already integral.
#[test]
fn greedy_dive_matches_lds_on_the_trivial_instance() {
    let model = e1_model();
    let mut common = CommonParameters::new();
    let mut cg_params = CgParameters::new();

    let output = greedy_dive::<DenseSimplexBackend>(&model, &mut common, &mut cg_params).unwrap();

    assert_eq!(output.status, Status::Optimal);
    let solution = output.solution.unwrap();
    assert!((solution.objective_value() - 3.0).abs() < 1e-4);
    match &output.statistics {
        DriverStatistics::Greedy(stats) => assert_eq!(stats.depth_reached, 1),
        _ => unreachable!(),
    }
}
