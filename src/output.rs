//! The `Output` every driver entry point returns (§6), and the
//! per-algorithm statistics folded into it.

use std::time::Duration;

use crate::model::{ColumnHandle, Solution};
use crate::{Status, E};

/// Statistics from a single [`crate::engine::column_generation`] call.
#[derive(Debug, Clone, Default)]
pub struct CgStatistics {
    pub iterations: usize,
    pub mispricings: usize,
    pub pricing_calls: usize,
    pub lp_solve_time: Duration,
    pub pricing_time: Duration,
    pub dummy_escalations: usize,
    pub final_dummy_coefficient: E,
    /// The Wentges smoothing parameter α as it stood when the CG call
    /// stopped (E4): starts at `static_wentges_smoothing_parameter` and
    /// only ever changes when `self_adjusting_wentges_smoothing` is on.
    pub final_wentges_alpha: E,
    /// The directional smoothing parameter β as it stood when the CG call
    /// stopped (E6).
    pub final_directional_beta: E,
}

impl CgStatistics {
    pub fn accumulate(&mut self, other: &CgStatistics) {
        self.iterations += other.iterations;
        self.mispricings += other.mispricings;
        self.pricing_calls += other.pricing_calls;
        self.lp_solve_time += other.lp_solve_time;
        self.pricing_time += other.pricing_time;
        self.dummy_escalations += other.dummy_escalations;
        self.final_dummy_coefficient = other.final_dummy_coefficient;
        self.final_wentges_alpha = other.final_wentges_alpha;
        self.final_directional_beta = other.final_directional_beta;
    }
}

/// Statistics from [`crate::heuristics::greedy`].
#[derive(Debug, Clone, Default)]
pub struct GreedyStatistics {
    pub depth_reached: usize,
    pub cg: CgStatistics,
}

/// Statistics from [`crate::heuristics::lds`].
#[derive(Debug, Clone, Default)]
pub struct LdsStatistics {
    pub nodes_explored: usize,
    pub max_depth: usize,
    pub max_discrepancy: usize,
    pub cg: CgStatistics,
}

/// Per-driver statistics, folded into one [`Output`].
#[derive(Debug, Clone)]
pub enum DriverStatistics {
    ColumnGeneration(CgStatistics),
    Greedy(GreedyStatistics),
    Lds(LdsStatistics),
}

/// What every driver entry point returns.
///
/// `solution` and `bound` together answer whether a feasible integer
/// solution was found and how tight the proven bound is; every other field
/// is diagnostic. A driver always returns an `Output`, never propagates a
/// timeout as an error (§7).
pub struct Output {
    pub status: Status,
    /// The best integer solution found, if any (`None` before the first
    /// feasible solution is discovered).
    pub solution: Option<Solution>,
    /// The relaxation built at the root of this driver invocation.
    pub relaxation_solution: Option<Solution>,
    /// Dual bound on the optimal objective value.
    pub bound: E,
    pub elapsed: Duration,
    pub dummy_column_objective_coefficient: E,
    pub number_of_column_generation_iterations: usize,
    /// Every column generated across the whole driver invocation (the
    /// final contents of the column pool).
    pub generated_columns: Vec<ColumnHandle>,
    pub statistics: DriverStatistics,
}

impl Output {
    /// `|incumbent objective - bound|`, or `E::INFINITY` when there is no
    /// incumbent yet.
    pub fn absolute_optimality_gap(&self) -> E {
        match &self.solution {
            Some(solution) if solution.feasible() => {
                (solution.objective_value() - self.bound).abs()
            }
            _ => E::INFINITY,
        }
    }
}
