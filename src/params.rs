//! Driver parameters (§6).
//!
//! Built with `Default` + chained `with_*` methods, following the
//! `QPSolverBuilder` pattern already used by the teacher at its outermost
//! driver-construction layer (`qp::QPSolverBuilder`), rather than the
//! teacher's bespoke `#[explicit_options]` proc-macro option registry (that
//! registry's macro source was unavailable to ground faithfully; a plain
//! builder is equally idiomatic Rust).

use crate::callback::{NewBoundCallback, NewSolutionCallback, NoOpCallback};
use crate::engine::pool::ColumnPool;
use crate::model::{ColumnHandle, ColumnMap};
use crate::terminators::{NeverTimer, Timer};
use crate::E;

/// `internal_diving` (§4.4 "Internal diving"): whether the engine greedily
/// fixes pricing output to integral multiplicities between pricing calls,
/// to diversify the columns it generates without touching the LP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InternalDiving {
    #[default]
    Off,
    /// Only at the root CG call of a driver invocation.
    RootOnly,
    /// At every CG call.
    Always,
}

/// Per-CG-iteration information handed to [`IterationCallback`].
pub struct CgIterationInfo {
    pub iteration: usize,
    pub relaxation_value: E,
    pub new_columns: usize,
    pub mispricings: usize,
}

/// Invoked once per CG main-loop iteration (`iteration_callback`, §6).
pub trait IterationCallback {
    fn on_iteration(&mut self, info: &CgIterationInfo);
}

/// Does nothing. The default.
pub struct NoOpIterationCallback;

impl IterationCallback for NoOpIterationCallback {
    fn on_iteration(&mut self, _info: &CgIterationInfo) {}
}

/// Parameters shared by every driver entry point.
pub struct CommonParameters {
    pub timer: Box<dyn Timer>,
    pub new_solution_callback: Box<dyn NewSolutionCallback>,
    pub new_bound_callback: Box<dyn NewBoundCallback>,
    /// `M`: the dummy-column objective coefficient. Must be nonzero.
    pub dummy_column_objective_coefficient: E,
    pub column_pool: ColumnPool,
    pub initial_columns: Vec<ColumnHandle>,
    pub fixed_columns: ColumnMap,
    pub internal_diving: InternalDiving,
}

impl Default for CommonParameters {
    fn default() -> Self {
        Self {
            timer: Box::new(NeverTimer),
            new_solution_callback: Box::new(NoOpCallback),
            new_bound_callback: Box::new(NoOpCallback),
            dummy_column_objective_coefficient: 1e6,
            column_pool: ColumnPool::new(),
            initial_columns: Vec::new(),
            fixed_columns: ColumnMap::new(),
            internal_diving: InternalDiving::Off,
        }
    }
}

impl CommonParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timer(mut self, timer: Box<dyn Timer>) -> Self {
        self.timer = timer;
        self
    }

    pub fn with_new_solution_callback(mut self, cb: Box<dyn NewSolutionCallback>) -> Self {
        self.new_solution_callback = cb;
        self
    }

    pub fn with_new_bound_callback(mut self, cb: Box<dyn NewBoundCallback>) -> Self {
        self.new_bound_callback = cb;
        self
    }

    pub fn with_dummy_column_objective_coefficient(mut self, m: E) -> Self {
        self.dummy_column_objective_coefficient = m;
        self
    }

    pub fn with_initial_columns(mut self, columns: Vec<ColumnHandle>) -> Self {
        self.initial_columns = columns;
        self
    }

    pub fn with_fixed_columns(mut self, fixed: ColumnMap) -> Self {
        self.fixed_columns = fixed;
        self
    }

    pub fn with_internal_diving(mut self, diving: InternalDiving) -> Self {
        self.internal_diving = diving;
        self
    }
}

/// CG-specific parameters (§6). `lp_backend_choice` from the source spec is
/// not represented here: this crate selects the backend at compile time via
/// the [`crate::backend::LpBackend`] generic parameter on
/// [`crate::engine::ColumnGenerationEngine`] rather than a runtime registry,
/// matching how the teacher's own solver family is generic over its linear
/// solver (`InteriorPointMethod<LinSolve, ...>`).
pub struct CgParameters {
    /// `None` means unbounded (`-1` in the source spec).
    pub maximum_number_of_iterations: Option<usize>,
    pub static_wentges_smoothing_parameter: E,
    pub self_adjusting_wentges_smoothing: bool,
    pub static_directional_smoothing_parameter: E,
    pub automatic_directional_smoothing: bool,
    pub iteration_callback: Box<dyn IterationCallback>,
}

impl Default for CgParameters {
    fn default() -> Self {
        Self {
            maximum_number_of_iterations: None,
            static_wentges_smoothing_parameter: 0.0,
            self_adjusting_wentges_smoothing: false,
            static_directional_smoothing_parameter: 0.0,
            automatic_directional_smoothing: false,
            iteration_callback: Box::new(NoOpIterationCallback),
        }
    }
}

impl CgParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_maximum_number_of_iterations(mut self, max: Option<usize>) -> Self {
        self.maximum_number_of_iterations = max;
        self
    }

    pub fn with_static_wentges_smoothing_parameter(mut self, alpha0: E) -> Self {
        self.static_wentges_smoothing_parameter = alpha0;
        self
    }

    pub fn with_self_adjusting_wentges_smoothing(mut self, enabled: bool) -> Self {
        self.self_adjusting_wentges_smoothing = enabled;
        self
    }

    pub fn with_static_directional_smoothing_parameter(mut self, beta0: E) -> Self {
        self.static_directional_smoothing_parameter = beta0;
        self
    }

    pub fn with_automatic_directional_smoothing(mut self, enabled: bool) -> Self {
        self.automatic_directional_smoothing = enabled;
        self
    }

    pub fn with_iteration_callback(mut self, cb: Box<dyn IterationCallback>) -> Self {
        self.iteration_callback = cb;
        self
    }
}

/// LDS-specific parameters (§6).
pub struct LdsParameters {
    pub discrepancy_limit: usize,
    pub automatic_stop: bool,
    pub continue_until_feasible: bool,
    /// Enable bound pruning against the incumbent.
    pub bound: bool,
}

impl Default for LdsParameters {
    fn default() -> Self {
        Self {
            discrepancy_limit: usize::MAX,
            automatic_stop: false,
            continue_until_feasible: false,
            bound: true,
        }
    }
}

impl LdsParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_discrepancy_limit(mut self, limit: usize) -> Self {
        self.discrepancy_limit = limit;
        self
    }

    pub fn with_automatic_stop(mut self, enabled: bool) -> Self {
        self.automatic_stop = enabled;
        self
    }

    pub fn with_continue_until_feasible(mut self, enabled: bool) -> Self {
        self.continue_until_feasible = enabled;
        self
    }

    pub fn with_bound(mut self, enabled: bool) -> Self {
        self.bound = enabled;
        self
    }
}
