//! Newton solver for square equation systems.
//!
//! The solver works on the scaled system: each residual is multiplied by its
//! equation's scaling factor and each variable by its own factor, so a
//! well-chosen set of factors brings every row and column to order one.
//! Steps are truncated so free variables stay strictly inside their bounds,
//! then shortened by backtracking until the residual norm decreases.
//!
//! ```
//! use twine_treatment::support::solver::{NewtonSolver, check_optimal_termination};
//! use twine_treatment::support::system::{System, VarSpec};
//! use twine_treatment::support::units::Dimension;
//!
//! let mut system = System::new();
//! let x = system.add_var("x", VarSpec::new(Dimension::NONE).with_value(1.0));
//! system.add_equation("square", x * x, 4.0);
//!
//! let results = NewtonSolver::default().solve(&mut system).unwrap();
//! assert!(check_optimal_termination(&results));
//! assert!((system.value(x) - 2.0).abs() < 1e-8);
//! ```

mod config;
mod error;
mod results;
mod scaled;

pub use config::SolverConfig;
pub use error::SolveError;
pub use results::{SolveResults, TerminationCondition, check_optimal_termination};

use nalgebra::DVector;
use tracing::{debug, info, warn};

use crate::support::system::{Bounds, EquationId, System};

use scaled::ScaledProblem;

/// Damped Newton solver with bound-respecting steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewtonSolver {
    config: SolverConfig,
}

impl NewtonSolver {
    #[must_use]
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solves every active equation of the system.
    ///
    /// Final values are written back into `system` whatever the termination.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::NotSquare`] if the degrees of freedom are not zero,
    /// or [`SolveError::InvalidConfig`] for an invalid configuration.
    pub fn solve(&self, system: &mut System) -> Result<SolveResults, SolveError> {
        let equations = system.active_equations();
        self.solve_equations(system, &equations)
    }

    /// Solves the subsystem formed by the given equations.
    ///
    /// Inactive equations in `equations` are skipped. Variables that do not
    /// appear in the subsystem are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::NotSquare`] if the subsystem's degrees of freedom
    /// are not zero, or [`SolveError::InvalidConfig`] for an invalid configuration.
    pub fn solve_equations(
        &self,
        system: &mut System,
        equations: &[EquationId],
    ) -> Result<SolveResults, SolveError> {
        self.config.validate()?;

        let equations: Vec<EquationId> = equations
            .iter()
            .copied()
            .filter(|id| system.equation(*id).is_active())
            .collect();

        let dof = system.degrees_of_freedom_of(&equations);
        if dof != 0 {
            return Err(SolveError::NotSquare { dof });
        }

        if equations.is_empty() {
            return Ok(SolveResults {
                termination: TerminationCondition::Optimal,
                iters: 0,
                residual: 0.0,
            });
        }

        let vars = system.free_variables_of(&equations);
        let bounds: Vec<Bounds> = vars.iter().map(|id| system.var(*id).bounds()).collect();

        let mut values = system.values();
        for (id, b) in vars.iter().zip(&bounds) {
            let x = &mut values[id.index()];
            *x = push_inside(*x, *b, self.config.bound_push);
        }

        let results = {
            let problem = ScaledProblem::new(system, &equations, &vars);
            self.iterate(&problem, &bounds, &mut values)
        };
        system.store_values(&vars, &values);

        if results.is_optimal() {
            info!(
                iters = results.iters,
                residual = results.residual,
                "newton solve converged"
            );
        } else {
            warn!(
                iters = results.iters,
                residual = results.residual,
                termination = %results.termination,
                "newton solve did not converge"
            );
        }

        Ok(results)
    }

    fn iterate(
        &self,
        problem: &ScaledProblem<'_>,
        bounds: &[Bounds],
        values: &mut Vec<f64>,
    ) -> SolveResults {
        let finish = |termination, iters, residual| SolveResults {
            termination,
            iters,
            residual,
        };

        let mut residuals = problem.residuals(values);

        let mut iter = 0;
        loop {
            let norm = inf_norm(&residuals);
            debug!(iter, residual = norm, "newton iteration");

            if !norm.is_finite() {
                return finish(TerminationCondition::NonFinite, iter, norm);
            }
            if norm <= self.config.residual_tol {
                return finish(TerminationCondition::Optimal, iter, norm);
            }
            if iter == self.config.max_iters {
                return finish(TerminationCondition::MaxIterations, iter, norm);
            }

            let Some(scaled_step) = problem.jacobian(values).lu().solve(&(-&residuals)) else {
                return finish(TerminationCondition::SingularJacobian, iter, norm);
            };
            let step = problem.unscale_step(&scaled_step);
            if step.iter().any(|dx| !dx.is_finite()) {
                return finish(TerminationCondition::NonFinite, iter, norm);
            }

            let alpha = self.max_step_length(problem, bounds, values, &step);
            let (next_values, next_residuals) =
                self.backtrack(problem, values, &step, alpha, &residuals);
            *values = next_values;
            residuals = next_residuals;
            iter += 1;
        }
    }

    /// Longest step fraction in `[0, 1]` that keeps free variables inside their bounds.
    fn max_step_length(
        &self,
        problem: &ScaledProblem<'_>,
        bounds: &[Bounds],
        values: &[f64],
        step: &[f64],
    ) -> f64 {
        let tau = self.config.boundary_fraction;
        let mut alpha: f64 = 1.0;

        for ((id, b), &dx) in problem.vars().iter().zip(bounds).zip(step) {
            let x = values[id.index()];
            if dx < 0.0
                && let Some(lower) = b.lower
                && x + dx < lower
            {
                alpha = alpha.min(tau * (x - lower) / -dx);
            }
            if dx > 0.0
                && let Some(upper) = b.upper
                && x + dx > upper
            {
                alpha = alpha.min(tau * (upper - x) / dx);
            }
        }

        alpha.max(0.0)
    }

    /// Halves the step until the squared residual norm shows sufficient decrease.
    ///
    /// The last trial point is returned even if no trial satisfied the test.
    fn backtrack(
        &self,
        problem: &ScaledProblem<'_>,
        values: &[f64],
        step: &[f64],
        alpha_max: f64,
        residuals: &DVector<f64>,
    ) -> (Vec<f64>, DVector<f64>) {
        let phi0 = residuals.norm_squared();
        let mut alpha = alpha_max;

        let mut trial = values.to_vec();
        let mut trial_residuals = residuals.clone();

        for _ in 0..=self.config.max_backtracks {
            trial.copy_from_slice(values);
            for (id, dx) in problem.vars().iter().zip(step) {
                trial[id.index()] += alpha * dx;
            }
            trial_residuals = problem.residuals(&trial);

            let phi = trial_residuals.norm_squared();
            if phi.is_finite() && phi <= (1.0 - 1e-4 * alpha) * phi0 {
                break;
            }
            alpha *= 0.5;
        }

        (trial, trial_residuals)
    }
}

/// Moves `x` strictly inside its bounds by a push relative to the bound magnitude.
fn push_inside(x: f64, bounds: Bounds, push: f64) -> f64 {
    let mut x = x;
    if let Some(lower) = bounds.lower {
        let floor = lower + push * lower.abs().max(1.0);
        if x < floor {
            x = floor;
        }
    }
    if let Some(upper) = bounds.upper {
        let ceiling = upper - push * upper.abs().max(1.0);
        if x > ceiling {
            x = ceiling;
        }
    }
    x
}

/// Infinity norm, or NaN if any entry is not finite.
fn inf_norm(v: &DVector<f64>) -> f64 {
    if v.iter().any(|x| !x.is_finite()) {
        return f64::NAN;
    }
    v.iter().fold(0.0, |max, x| max.max(x.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::support::{system::VarSpec, units::Dimension};

    fn dimensionless(value: f64) -> VarSpec {
        VarSpec::new(Dimension::NONE).with_value(value)
    }

    #[test]
    fn solves_a_linear_system_in_one_step() {
        let mut system = System::new();
        let x = system.add_var("x", dimensionless(0.0));
        let y = system.add_var("y", dimensionless(0.0));
        system.add_equation("sum", x + y, 3.0);
        system.add_equation("diff", x - y, 1.0);

        let results = NewtonSolver::default().solve(&mut system).unwrap();

        assert!(results.is_optimal());
        assert_eq!(results.iters, 1);
        assert_relative_eq!(system.value(x), 2.0);
        assert_relative_eq!(system.value(y), 1.0);
    }

    #[test]
    fn respects_lower_bounds() {
        // x^2 = 4 has a root at -2, but x is bounded below by zero.
        let mut system = System::new();
        let x = system.add_var(
            "x",
            dimensionless(0.5).with_bounds(Bounds::non_negative()),
        );
        system.add_equation("square", x * x, 4.0);

        let results = NewtonSolver::default().solve(&mut system).unwrap();

        assert!(results.is_optimal());
        assert_relative_eq!(system.value(x), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn scaling_changes_the_convergence_test() {
        // A residual of 1e-10 is converged unscaled but not once the
        // equation is scaled up by 1e5.
        let mut system = System::new();
        let x = system.add_var("x", dimensionless(0.0));
        let eq = system.add_equation("spec", x, 1e-10);

        let no_iters = NewtonSolver::new(SolverConfig {
            max_iters: 0,
            ..SolverConfig::default()
        });
        assert!(no_iters.solve(&mut system).unwrap().is_optimal());

        system.set_equation_scaling_factor(eq, 1e5).unwrap();
        let results = no_iters.solve(&mut system).unwrap();
        assert_eq!(results.termination, TerminationCondition::MaxIterations);

        let results = NewtonSolver::default().solve(&mut system).unwrap();
        assert!(results.is_optimal());
        assert_relative_eq!(system.value(x), 1e-10);
    }

    #[test]
    fn refuses_non_square_systems() {
        let mut system = System::new();
        let x = system.add_var("x", dimensionless(0.0));
        let y = system.add_var("y", dimensionless(0.0));
        system.add_equation("sum", x + y, 3.0);

        let err = NewtonSolver::default().solve(&mut system).unwrap_err();
        assert_eq!(err, SolveError::NotSquare { dof: 1 });
    }

    #[test]
    fn detects_a_singular_jacobian() {
        let mut system = System::new();
        let x = system.add_var("x", dimensionless(1.0));
        let y = system.add_var("y", dimensionless(1.0));
        system.add_equation("a", x + y, 3.0);
        system.add_equation("b", x + y, 4.0);

        let results = NewtonSolver::default().solve(&mut system).unwrap();
        assert_eq!(results.termination, TerminationCondition::SingularJacobian);
    }

    #[test]
    fn fixed_variables_are_not_moved() {
        let mut system = System::new();
        let x = system.add_var("x", dimensionless(0.0));
        let y = system.add_var("y", dimensionless(0.0));
        system.fix(x, 5.0);
        system.add_equation("link", y, x * 2.0);

        NewtonSolver::default().solve(&mut system).unwrap();

        assert_relative_eq!(system.value(x), 5.0);
        assert_relative_eq!(system.value(y), 10.0);
    }

    #[test]
    fn empty_systems_are_trivially_optimal() {
        let mut system = System::new();
        let results = NewtonSolver::default().solve(&mut system).unwrap();
        assert!(check_optimal_termination(&results));
        assert_eq!(results.iters, 0);
    }

    #[test]
    fn bound_push_moves_values_off_the_bound() {
        let pushed = push_inside(0.0, Bounds::unit_interval(), 1e-3);
        assert_relative_eq!(pushed, 1e-3);

        let pushed = push_inside(2.0, Bounds::unit_interval(), 1e-3);
        assert_relative_eq!(pushed, 1.0 - 1e-3);

        assert_relative_eq!(push_inside(0.5, Bounds::unit_interval(), 1e-3), 0.5);
    }
}
