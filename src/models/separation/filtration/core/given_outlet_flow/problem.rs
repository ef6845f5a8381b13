//! Problem formulation for outlet water flow matching.

use std::convert::Infallible;

use twine_core::EquationProblem;
use twine_core::Model;
use uom::si::{
    f64::{MassRate, Ratio},
    mass_rate::kilogram_per_second,
    ratio::ratio,
};

use crate::{
    models::separation::filtration::core::{Filtration, initialize::initialize},
    support::{
        flowsheet::InitializeError,
        solver::NewtonSolver,
        system::{System, VarId},
    },
};

/// Model adapter exposing the water recovery fraction as the sole input.
///
/// Each call solves the unit's own equations on a copy of the system, so the
/// caller's system is untouched until a solution is accepted.
pub(super) struct GivenOutletFlowModel<'a> {
    unit: &'a Filtration,
    system: &'a System,
    solver: NewtonSolver,
}

impl<'a> GivenOutletFlowModel<'a> {
    pub(super) fn new(unit: &'a Filtration, system: &'a System, solver: NewtonSolver) -> Self {
        Self {
            unit,
            system,
            solver,
        }
    }
}

impl Model for GivenOutletFlowModel<'_> {
    type Input = Ratio;
    type Output = System;
    type Error = InitializeError;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        let mut system = self.system.clone();
        system.fix(self.unit.recovery_frac_mass_solvent, input.get::<ratio>());
        initialize(self.unit, &mut system, &self.solver)?;
        Ok(system)
    }
}

/// Equation problem definition for outlet water flow matching.
///
/// Computes the residual as `achieved_flow - target_flow`.
pub(super) struct GivenOutletFlowProblem {
    outlet_water: VarId,
    target: MassRate,
}

impl GivenOutletFlowProblem {
    pub(super) fn new(outlet_water: VarId, target: MassRate) -> Self {
        Self {
            outlet_water,
            target,
        }
    }
}

impl EquationProblem<1> for GivenOutletFlowProblem {
    type Input = Ratio;
    type Output = System;
    type Error = Infallible;

    fn input(&self, x: &[f64; 1]) -> Result<Self::Input, Self::Error> {
        Ok(Ratio::new::<ratio>(x[0]))
    }

    fn residuals(
        &self,
        _input: &Self::Input,
        output: &Self::Output,
    ) -> Result<[f64; 1], Self::Error> {
        let achieved = output.value(self.outlet_water);
        let target = self.target.get::<kilogram_per_second>();
        Ok([achieved - target])
    }
}
