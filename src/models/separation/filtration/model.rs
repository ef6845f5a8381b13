//! [`twine_core::Model`] adapter for a single filtration flowsheet.

use thiserror::Error;
use twine_core::Model;

use crate::support::{
    flowsheet::{Flowsheet, FlowsheetError, UnitReport},
    properties::{PropertyPackage, StreamState},
    solver::{
        NewtonSolver, SolveError, SolveResults, TerminationCondition, check_optimal_termination,
    },
    system::SystemError,
};

use super::core::{Filtration, FiltrationError, Fraction};

/// Name of the unit built by [`FiltrationModel`].
const UNIT_NAME: &str = "unit";

/// Feed and operating point of a filtration run.
#[derive(Debug, Clone, PartialEq)]
pub struct FiltrationInput {
    pub feed: StreamState,
    pub recovery_frac_mass_solvent: Fraction,

    /// Removal fraction of every solute, by solute name.
    pub removal_frac_mass_comp: Vec<(String, Fraction)>,
}

/// Converged streams of a filtration run.
#[derive(Debug, Clone, PartialEq)]
pub struct FiltrationResults {
    pub outlet: StreamState,
    pub waste: StreamState,
    pub solve: SolveResults,
    pub report: UnitReport,
}

/// Errors that can occur while running a filtration flowsheet.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FiltrationModelError {
    #[error(transparent)]
    Filtration(#[from] FiltrationError),

    #[error(transparent)]
    Flowsheet(#[from] FlowsheetError),

    #[error("units check failed")]
    Units(#[from] SystemError),

    #[error("solve could not start")]
    Solve(#[from] SolveError),

    /// The fixed inputs do not close the flowsheet.
    #[error("expected zero degrees of freedom, found {dof}")]
    DegreesOfFreedom { dof: i64 },

    /// The flowsheet solve did not terminate optimally.
    #[error("solve terminated with {termination}")]
    NotOptimal { termination: TerminationCondition },
}

/// Builds, checks and solves a flowsheet holding one filtration unit.
///
/// Each call starts from a fresh flowsheet bound to a copy of the property
/// package, so default scaling factors registered on the package apply to
/// every run.
#[derive(Debug, Clone)]
pub struct FiltrationModel<P> {
    properties: P,
    solver: NewtonSolver,
}

impl<P: PropertyPackage + Clone> FiltrationModel<P> {
    #[must_use]
    pub fn new(properties: P) -> Self {
        Self {
            properties,
            solver: NewtonSolver::default(),
        }
    }

    #[must_use]
    pub fn with_solver(self, solver: NewtonSolver) -> Self {
        Self { solver, ..self }
    }
}

impl<P: PropertyPackage + Clone> Model for FiltrationModel<P> {
    type Input = FiltrationInput;
    type Output = FiltrationResults;
    type Error = FiltrationModelError;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        let mut fs = Flowsheet::new(self.properties.clone());
        let unit = Filtration::build(&mut fs, UNIT_NAME)?;

        let system = fs.system_mut();
        unit.fix_inlet(system, &input.feed)?;
        unit.fix_recovery(system, input.recovery_frac_mass_solvent)?;
        for (solute, removal) in &input.removal_frac_mass_comp {
            unit.fix_removal(system, solute, *removal)?;
        }

        fs.calculate_scaling_factors()?;
        fs.assert_units_consistent()?;

        let dof = fs.degrees_of_freedom();
        if dof != 0 {
            return Err(FiltrationModelError::DegreesOfFreedom { dof });
        }

        fs.initialize(&self.solver)?;
        let solve = fs.solve(&self.solver)?;
        if !check_optimal_termination(&solve) {
            return Err(FiltrationModelError::NotOptimal {
                termination: solve.termination,
            });
        }

        Ok(FiltrationResults {
            outlet: unit.outlet().read_state(fs.system()),
            waste: unit.waste().read_state(fs.system()),
            solve,
            report: fs.report(unit.name())?,
        })
    }
}
