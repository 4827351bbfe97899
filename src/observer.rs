//! Step observer trait for monitoring simulation progress.

/// Hooks into the phases of a tick.
///
/// Implement this trait to monitor solver progress (debug overlays,
/// profiling, convergence plots). All methods default to no-ops.
pub trait StepObserver {
    /// Called after forces are applied and positions integrated.
    fn on_integrate(&mut self) {}

    /// Called after each collision round. Rounds are skipped, and not
    /// reported, when there is nothing to collide against.
    fn on_collision_iteration(&mut self, _iteration: usize) {}

    /// Called after each spring relaxation round.
    fn on_constraint_iteration(&mut self, _iteration: usize) {}

    /// Called when a tick is fully complete.
    fn on_step_complete(&mut self) {}
}

/// A no-op observer that does nothing. Use as default when no observation needed.
pub struct NoOpStepObserver;

impl StepObserver for NoOpStepObserver {}
