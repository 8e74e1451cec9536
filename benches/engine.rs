//! Benchmarks for the core CG loop and the two tree-search drivers, against
//! the in-tree reference LP backend (`testing` feature).

use std::sync::Arc;

use colgen::heuristics::{greedy_dive, limited_discrepancy_search};
use colgen::model::{Column, ColumnType, LinearTerm, Model, ObjectiveSense, Row};
use colgen::params::{CgParameters, CommonParameters, LdsParameters};
use colgen::testing::{DenseSimplexBackend, EnumeratedPricingOracle};
use colgen::{engine, E};

fn main() {
    divan::main();
}

/// A small bin-packing-style instance: `n` unit-demand rows, one singleton
/// column per row (always feasible and already integral), plus a handful
/// of "combo" columns the pricing oracle can hand back so CG actually does
/// more than one main-loop iteration.
fn bin_packing_model(n: usize) -> Arc<Model> {
    let rows: Vec<Row> = (0..n).map(|_| Row::equality(1.0, 0.0, 1.0)).collect();

    let mut columns = Vec::new();
    for item in 0..n {
        columns.push(
            Column::new(1.0, vec![LinearTerm::new(item, 1.0)])
                .with_type(ColumnType::Integer)
                .with_bounds(0.0, 1.0)
                .into_handle(),
        );
    }

    let mut candidates = Vec::new();
    for pair in 0..n.saturating_sub(1) {
        candidates.push(
            Column::new(1.0, vec![LinearTerm::new(pair, 1.0), LinearTerm::new(pair + 1, 1.0)])
                .with_type(ColumnType::Integer)
                .with_bounds(0.0, 1.0)
                .into_handle(),
        );
    }

    Arc::new(Model::new(
        ObjectiveSense::Minimize,
        rows,
        Box::new(EnumeratedPricingOracle::new(ObjectiveSense::Minimize, candidates)),
        columns,
    ))
}

/// A single fractional-capacity knapsack row forcing at least one
/// branching round, used to exercise the heuristics' dive/search loop
/// rather than a root-converges-immediately instance.
fn knapsack_model() -> Arc<Model> {
    let row = Row::new(0.0, 5.0, 0.0, 5.0);
    let a = Column::new(-5.0, vec![LinearTerm::new(0, 3.0)])
        .with_type(ColumnType::Integer)
        .with_bounds(0.0, 3.0)
        .into_handle();
    let b = Column::new(-4.0, vec![LinearTerm::new(0, 2.0)])
        .with_type(ColumnType::Integer)
        .with_bounds(0.0, 3.0)
        .into_handle();
    Arc::new(Model::new(
        ObjectiveSense::Minimize,
        vec![row],
        Box::new(EnumeratedPricingOracle::new(ObjectiveSense::Minimize, vec![])),
        vec![a, b],
    ))
}

#[divan::bench(args = [8, 32, 128])]
fn column_generation(bencher: divan::Bencher, n: usize) {
    bencher
        .with_inputs(|| bin_packing_model(n))
        .bench_values(|model| {
            let mut common = CommonParameters::new();
            let mut cg_params = CgParameters::new();
            engine::column_generation::<DenseSimplexBackend>(&model, &mut common, &mut cg_params).unwrap()
        });
}

#[divan::bench]
fn greedy_dive_on_knapsack(bencher: divan::Bencher) {
    bencher
        .with_inputs(knapsack_model)
        .bench_values(|model| {
            let mut common = CommonParameters::new();
            let mut cg_params = CgParameters::new();
            greedy_dive::<DenseSimplexBackend>(&model, &mut common, &mut cg_params).unwrap()
        });
}

#[divan::bench(args = [1usize, 4])]
fn lds_on_knapsack(bencher: divan::Bencher, discrepancy_limit: usize) {
    bencher
        .with_inputs(knapsack_model)
        .bench_values(|model| {
            let mut common = CommonParameters::new();
            let mut cg_params = CgParameters::new();
            let lds_params = LdsParameters::new().with_discrepancy_limit(discrepancy_limit);
            limited_discrepancy_search::<DenseSimplexBackend>(&model, &mut common, &mut cg_params, &lds_params).unwrap()
        });
}

#[allow(dead_code)]
fn unused_e_reference(_: E) {}
