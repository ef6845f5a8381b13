use twine_solvers::equation::bisection;
use uom::si::{f64::MassRate, mass_rate::kilogram_per_second};

use crate::support::solver::SolverConfig;

/// Solver configuration for matching a target outlet water flow.
#[derive(Debug, Clone, Copy)]
pub struct GivenOutletFlowConfig {
    /// Maximum iteration count for the bisection solve.
    pub max_iters: usize,

    /// Absolute tolerance on the recovery fraction.
    pub recovery_tol: f64,

    /// Absolute tolerance on the outlet water flow residual (achieved - target).
    pub flow_tol: MassRate,

    /// Newton configuration for each local solve of the unit.
    pub newton: SolverConfig,
}

impl Default for GivenOutletFlowConfig {
    fn default() -> Self {
        Self {
            max_iters: 100,
            recovery_tol: 1e-12,
            flow_tol: MassRate::new::<kilogram_per_second>(1e-10),
            newton: SolverConfig::default(),
        }
    }
}

impl GivenOutletFlowConfig {
    /// Converts this configuration into a bisection solver configuration.
    pub(super) fn bisection(&self) -> bisection::Config {
        bisection::Config {
            max_iters: self.max_iters,
            x_abs_tol: self.recovery_tol,
            x_rel_tol: 0.0,
            residual_tol: self.flow_tol.get::<kilogram_per_second>(),
        }
    }
}
