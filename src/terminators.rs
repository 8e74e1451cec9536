//! Cooperative early-termination hooks.
//!
//! This is the spec's `timer.needs_to_end()`: the sole mechanism by which a
//! caller requests early termination between the two long-running calls a
//! driver makes (`lp.solve()` and `pricing.solve_pricing()`). There is no
//! forced interruption; the current iteration is always allowed to finish.
//!
//! Closely mirrors the teacher's `terminators::Terminator` trait
//! (`InterruptTerminator`, `TimeOutTerminator`, `MultipleTerminators`),
//! renamed to the spec's vocabulary (`Timer`/`needs_to_end`) and extended
//! with an iteration-cap variant.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::Status;

/// Polled at every loop boundary. Returns the terminal [`Status`] that
/// should be reported once the caller is ready to stop, or `None` to keep
/// going.
pub trait Timer {
    fn initialize(&mut self) {}

    fn needs_to_end(&mut self) -> Option<Status>;
}

/// Never asks to stop. The default when no time/iteration budget applies.
pub struct NeverTimer;

impl Timer for NeverTimer {
    fn needs_to_end(&mut self) -> Option<Status> {
        None
    }
}

/// Responds to Ctrl-C (SIGINT) or a programmatic interrupt.
///
/// Only one instance can be constructed per process: it installs a global
/// signal handler, and a second call to `ctrlc::set_handler` panics.
pub struct InterruptTimer {
    interrupted: Arc<AtomicBool>,
}

impl InterruptTimer {
    pub fn new() -> Self {
        let interrupted = Arc::new(AtomicBool::new(false));
        ctrlc::set_handler({
            let interrupted = interrupted.clone();
            move || {
                interrupted.store(true, Ordering::SeqCst);
            }
        })
        .expect("error installing Ctrl-C handler");
        Self { interrupted }
    }

    /// Requests interruption programmatically, without needing an actual
    /// signal.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }
}

impl Default for InterruptTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for InterruptTimer {
    fn needs_to_end(&mut self) -> Option<Status> {
        if self.interrupted.load(Ordering::SeqCst) {
            Some(Status::Interrupted)
        } else {
            None
        }
    }
}

/// Ends once `max_time` has elapsed since `initialize`.
pub struct TimeOutTimer {
    max_time: std::time::Duration,
    start: std::time::Instant,
}

impl TimeOutTimer {
    pub fn new(max_time: std::time::Duration) -> Self {
        Self {
            max_time,
            start: std::time::Instant::now(),
        }
    }
}

impl Timer for TimeOutTimer {
    fn initialize(&mut self) {
        self.start = std::time::Instant::now();
    }

    fn needs_to_end(&mut self) -> Option<Status> {
        if self.start.elapsed() >= self.max_time {
            Some(Status::TimeLimit)
        } else {
            None
        }
    }
}

/// Ends once a maximum iteration count is reached. The caller is
/// responsible for calling [`IterationCapTimer::record_iteration`] once per
/// unit of work (a CG iteration, a tree-search node, ...).
pub struct IterationCapTimer {
    max_iterations: usize,
    iterations: usize,
}

impl IterationCapTimer {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            iterations: 0,
        }
    }

    pub fn record_iteration(&mut self) {
        self.iterations += 1;
    }
}

impl Timer for IterationCapTimer {
    fn initialize(&mut self) {
        self.iterations = 0;
    }

    fn needs_to_end(&mut self) -> Option<Status> {
        if self.iterations >= self.max_iterations {
            Some(Status::IterationLimit)
        } else {
            None
        }
    }
}

/// Combines several timers; ends as soon as any of them does, reporting
/// that timer's status.
pub struct CompositeTimer {
    timers: Vec<Box<dyn Timer>>,
}

impl CompositeTimer {
    pub fn new(timers: Vec<Box<dyn Timer>>) -> Self {
        Self { timers }
    }
}

impl Timer for CompositeTimer {
    fn initialize(&mut self) {
        for timer in &mut self.timers {
            timer.initialize();
        }
    }

    fn needs_to_end(&mut self) -> Option<Status> {
        for timer in &mut self.timers {
            if let Some(status) = timer.needs_to_end() {
                return Some(status);
            }
        }
        None
    }
}
