use super::SolveError;

/// Configuration for the [`NewtonSolver`](super::NewtonSolver).
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Maximum number of Newton iterations.
    pub max_iters: usize,

    /// Convergence tolerance on the infinity norm of the scaled residuals.
    pub residual_tol: f64,

    /// Relative distance used to move free variables off their bounds
    /// before the first iteration.
    pub bound_push: f64,

    /// Fraction of the distance to a bound a single step may cover.
    pub boundary_fraction: f64,

    /// Maximum number of step halvings per iteration.
    pub max_backtracks: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iters: 100,
            residual_tol: 1e-8,
            bound_push: 1e-10,
            boundary_fraction: 0.995,
            max_backtracks: 20,
        }
    }
}

impl SolverConfig {
    pub(super) fn validate(&self) -> Result<(), SolveError> {
        let invalid = |reason| Err(SolveError::InvalidConfig { reason });

        if !(self.residual_tol.is_finite() && self.residual_tol > 0.0) {
            return invalid("residual_tol must be positive and finite");
        }
        if !(self.bound_push.is_finite() && self.bound_push >= 0.0) {
            return invalid("bound_push must be non-negative and finite");
        }
        if !(self.boundary_fraction > 0.0 && self.boundary_fraction <= 1.0) {
            return invalid("boundary_fraction must be in (0, 1]");
        }
        Ok(())
    }
}
