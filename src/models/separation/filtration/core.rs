//! Equation-oriented filtration unit.
//!
//! The unit declares three state blocks (`properties_in`, `properties_out`,
//! `properties_waste`) exposed as the `inlet`, `outlet` and `waste` ports,
//! plus its performance fractions. Equations:
//!
//! - water recovery: `out[H2O] = recovery · in[H2O]`
//! - solute removal: `waste[j] = removal[j] · in[j]`
//! - mass balance: `in[j] = out[j] + waste[j]` for every component
//! - outlet and waste temperature and pressure equal the inlet's

mod equations;
mod error;
mod given_outlet_flow;
mod initialize;
mod scaling;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::FiltrationError;
pub use given_outlet_flow::{GivenOutletFlowConfig, GivenOutletFlowError};

use uom::si::f64::{MassRate, Ratio};

use crate::support::{
    constraint::{Constrained, NonNegative, UnitInterval},
    flowsheet::{Flowsheet, FlowsheetError, InitializeError, UnitModel},
    properties::{PropertyError, PropertyPackage, StateBlock, StreamState},
    solver::NewtonSolver,
    system::{Bounds, EquationId, System, VarId, VarSpec},
    units::{Dimension, Dimensioned},
};

use equations::{Connections, Equations};

/// A recovery or removal fraction in `[0, 1]`.
pub type Fraction = Constrained<Ratio, UnitInterval>;

const FRACTION_INITIAL: f64 = 0.5;

/// Handle to a filtration unit built into a [`Flowsheet`].
///
/// The handle holds ids into the flowsheet's system; a copy is registered
/// with the flowsheet when the unit is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Filtration {
    name: String,
    solvent: String,
    properties_in: StateBlock,
    properties_out: StateBlock,
    properties_waste: StateBlock,
    recovery_frac_mass_solvent: VarId,
    removal_frac_mass_comp: Vec<(String, VarId)>,
    equations: Equations,
}

impl Filtration {
    /// Builds a filtration unit named `name` into `fs`.
    ///
    /// # Errors
    ///
    /// Returns [`FiltrationError::Flowsheet`] if a unit of the same name exists.
    pub fn build<P: PropertyPackage>(
        fs: &mut Flowsheet<P>,
        name: &str,
    ) -> Result<Self, FiltrationError> {
        let name = fs.child_name(name);
        if fs.has_unit(&name) {
            return Err(FlowsheetError::DuplicateUnit { name }.into());
        }

        let (system, properties) = fs.parts_mut();
        let solvent = properties.solvent().to_string();

        let properties_in = properties.build_state_block(system, &format!("{name}.properties_in"));
        let properties_out =
            properties.build_state_block(system, &format!("{name}.properties_out"));
        let properties_waste =
            properties.build_state_block(system, &format!("{name}.properties_waste"));

        let fraction = || {
            VarSpec::new(Dimension::NONE)
                .with_value(FRACTION_INITIAL)
                .with_bounds(Bounds::unit_interval())
        };

        let recovery_frac_mass_solvent =
            system.add_var(format!("{name}.recovery_frac_mass_{solvent}"), fraction());

        let removal_frac_mass_comp: Vec<(String, VarId)> = properties
            .solutes()
            .iter()
            .map(|j| {
                let id = system.add_var(format!("{name}.removal_frac_mass_comp[{j}]"), fraction());
                (j.clone(), id)
            })
            .collect();

        let equations = equations::add(
            system,
            &name,
            &Connections {
                inlet: &properties_in,
                outlet: &properties_out,
                waste: &properties_waste,
                solvent: &solvent,
                recovery: recovery_frac_mass_solvent,
                removal: &removal_frac_mass_comp,
            },
        )?;

        let unit = Self {
            name,
            solvent,
            properties_in,
            properties_out,
            properties_waste,
            recovery_frac_mass_solvent,
            removal_frac_mass_comp,
            equations,
        };
        fs.add_unit(unit.clone())?;
        Ok(unit)
    }

    /// Full name of the unit, such as `fs.unit`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Feed state block (`properties_in`).
    #[must_use]
    pub fn inlet(&self) -> &StateBlock {
        &self.properties_in
    }

    /// Product state block (`properties_out`).
    #[must_use]
    pub fn outlet(&self) -> &StateBlock {
        &self.properties_out
    }

    /// Reject state block (`properties_waste`).
    #[must_use]
    pub fn waste(&self) -> &StateBlock {
        &self.properties_waste
    }

    /// Mass fraction of the feed solvent recovered in the outlet.
    #[must_use]
    pub fn recovery_frac_mass_solvent(&self) -> VarId {
        self.recovery_frac_mass_solvent
    }

    /// Mass fraction of a feed solute removed to the waste.
    #[must_use]
    pub fn removal_frac_mass_comp(&self, solute: &str) -> Option<VarId> {
        self.removal_frac_mass_comp
            .iter()
            .find(|(j, _)| j == solute)
            .map(|(_, id)| *id)
    }

    /// Every equation declared by the unit.
    #[must_use]
    pub fn equations(&self) -> Vec<EquationId> {
        self.equations.all()
    }

    /// Fixes the feed state.
    ///
    /// # Errors
    ///
    /// Returns [`FiltrationError::Property`] if the components of `feed` do
    /// not match the unit's.
    pub fn fix_inlet(&self, system: &mut System, feed: &StreamState) -> Result<(), FiltrationError> {
        Ok(self.properties_in.fix_state(system, feed)?)
    }

    /// Fixes the water recovery fraction.
    ///
    /// # Errors
    ///
    /// Returns [`FiltrationError::System`] if the variable is not dimensionless.
    pub fn fix_recovery(&self, system: &mut System, recovery: Fraction) -> Result<(), FiltrationError> {
        Ok(system.fix_quantity(self.recovery_frac_mass_solvent, recovery.into_inner())?)
    }

    /// Fixes the removal fraction of one solute.
    ///
    /// # Errors
    ///
    /// Returns [`FiltrationError::UnknownSolute`] if `solute` is not removed by this unit.
    pub fn fix_removal(
        &self,
        system: &mut System,
        solute: &str,
        removal: Fraction,
    ) -> Result<(), FiltrationError> {
        let id = self
            .removal_frac_mass_comp(solute)
            .ok_or_else(|| FiltrationError::UnknownSolute {
                name: solute.to_string(),
            })?;
        Ok(system.fix_quantity(id, removal.into_inner())?)
    }

    /// Component mass entering minus mass leaving through both outlets.
    #[must_use]
    pub fn mass_balance_residual(&self, system: &System, component: &str) -> Option<MassRate> {
        let flow = |block: &StateBlock| block.flow_mass_phase_comp(component).map(|id| system.value(id));
        let residual =
            flow(&self.properties_in)? - flow(&self.properties_out)? - flow(&self.properties_waste)?;
        Some(MassRate::from_si(residual))
    }

    /// Finds the water recovery fraction that delivers `target` outlet water flow.
    ///
    /// Bisection runs over the recovery fraction with the inlet held at its
    /// current state. On success the flowsheet holds the converged unit state
    /// and the recovery fraction stays fixed at the returned value.
    ///
    /// # Errors
    ///
    /// Returns [`GivenOutletFlowError::Unreachable`] if `target` exceeds the
    /// inlet water flow, or another [`GivenOutletFlowError`] if the search fails.
    pub fn given_outlet_water_flow<P: PropertyPackage>(
        &self,
        fs: &mut Flowsheet<P>,
        target: Constrained<MassRate, NonNegative>,
        config: GivenOutletFlowConfig,
    ) -> Result<Ratio, GivenOutletFlowError> {
        given_outlet_flow::given_outlet_water_flow(self, fs.system_mut(), target, config)
    }
}

impl<P: PropertyPackage> UnitModel<P> for Filtration {
    fn name(&self) -> &str {
        &self.name
    }

    fn ports(&self) -> Vec<(&str, &StateBlock)> {
        vec![
            ("inlet", &self.properties_in),
            ("outlet", &self.properties_out),
            ("waste", &self.properties_waste),
        ]
    }

    fn performance_vars(&self) -> Vec<VarId> {
        let mut vars = vec![self.recovery_frac_mass_solvent];
        vars.extend(self.removal_frac_mass_comp.iter().map(|(_, id)| *id));
        vars
    }

    fn calculate_scaling_factors(
        &self,
        system: &mut System,
        properties: &P,
    ) -> Result<(), PropertyError> {
        scaling::calculate_scaling_factors(self, system, properties)
    }

    fn initialize(
        &self,
        system: &mut System,
        _properties: &P,
        solver: &NewtonSolver,
    ) -> Result<(), InitializeError> {
        initialize::initialize(self, system, solver).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{mass_rate::kilogram_per_second, ratio::ratio};

    use crate::support::solver::{SolveError, SolverConfig, TerminationCondition};

    use super::test_support::{flowsheet, fraction, kg_s, properties};

    fn flow(system: &System, block: &StateBlock, j: &str) -> f64 {
        system.value(block.flow_mass_phase_comp(j).unwrap())
    }

    #[test]
    fn build_declares_variables_and_equations() {
        let mut fs = Flowsheet::new(properties());
        let unit = Filtration::build(&mut fs, "unit").unwrap();
        let system = fs.system();

        assert_eq!(unit.name(), "fs.unit");
        assert_eq!(system.n_vars(), 18);
        assert_eq!(system.n_equations(), 10);
        assert_eq!(
            system.find_var("fs.unit.recovery_frac_mass_H2O"),
            Some(unit.recovery_frac_mass_solvent())
        );
        assert_eq!(
            system.find_var("fs.unit.properties_waste.flow_mass_phase_comp[Liq,TSS]"),
            unit.waste().flow_mass_phase_comp("TSS")
        );
        assert_eq!(unit.removal_frac_mass_comp("H2O"), None);
        assert_eq!(fs.degrees_of_freedom(), 8);
        fs.assert_units_consistent().unwrap();
    }

    #[test]
    fn build_rejects_duplicate_names() {
        let (mut fs, _) = flowsheet();
        assert_eq!(
            Filtration::build(&mut fs, "unit"),
            Err(FiltrationError::Flowsheet(FlowsheetError::DuplicateUnit {
                name: "fs.unit".to_string()
            }))
        );
    }

    #[test]
    fn fixing_feed_and_fractions_closes_the_unit() {
        let (mut fs, unit) = flowsheet();
        assert_eq!(fs.degrees_of_freedom(), 0);

        assert_eq!(
            unit.fix_removal(fs.system_mut(), "Ca", fraction(0.5)),
            Err(FiltrationError::UnknownSolute {
                name: "Ca".to_string()
            })
        );
    }

    #[test]
    fn scaling_follows_the_inlet() {
        let (mut fs, unit) = flowsheet();
        let user = unit.outlet().flow_mass_phase_comp("NaCl").unwrap();
        fs.system_mut().set_scaling_factor(user, 5.0).unwrap();

        fs.calculate_scaling_factors().unwrap();
        let system = fs.system();
        let sf = |id| system.scaling_factor(id);

        assert_eq!(sf(unit.outlet().flow_mass_phase_comp("H2O").unwrap()), Some(1.0));
        assert_eq!(sf(unit.waste().flow_mass_phase_comp("TSS").unwrap()), Some(1e2));
        assert_eq!(sf(user), Some(5.0));
        assert_eq!(sf(unit.waste().temperature()), Some(1e-2));
        assert_eq!(sf(unit.outlet().pressure()), Some(1e-5));
        assert_eq!(sf(unit.recovery_frac_mass_solvent()), Some(1.0));

        let eq = |name: &str| {
            system
                .equations()
                .find(|(_, e)| e.name() == name)
                .map(|(id, _)| id)
                .unwrap()
        };
        let esf = |name| system.equation_scaling_factor(eq(name));
        assert_eq!(esf("fs.unit.water_recovery_equation"), Some(1.0));
        assert_eq!(esf("fs.unit.solute_removal_equation[NaCl]"), Some(1e2));
        assert_eq!(esf("fs.unit.mass_balance[TSS]"), Some(1e2));
        assert_eq!(esf("fs.unit.eq_temperature_waste"), Some(1e-2));
        assert_eq!(esf("fs.unit.eq_pressure_outlet"), Some(1e-5));
    }

    #[test]
    fn initialize_solves_the_unit_locally() {
        let (mut fs, unit) = flowsheet();
        fs.calculate_scaling_factors().unwrap();
        fs.initialize(&NewtonSolver::default()).unwrap();

        let system = fs.system();
        assert_relative_eq!(flow(system, unit.outlet(), "H2O"), 0.5, epsilon = 1e-12);
        assert_relative_eq!(flow(system, unit.outlet(), "NaCl"), 0.0099, epsilon = 1e-12);
        assert_relative_eq!(flow(system, unit.waste(), "TSS"), 0.009, epsilon = 1e-12);
        assert!(system.max_residual() < 1e-10);
    }

    #[test]
    fn initialize_restores_inlet_fixedness() {
        let (mut fs, unit) = flowsheet();
        for id in unit.inlet().state_vars() {
            fs.system_mut().unfix(id);
        }
        let dof = fs.degrees_of_freedom();

        let (system, properties) = fs.parts_mut();
        UnitModel::initialize(&unit, system, properties, &NewtonSolver::default()).unwrap();

        assert!(unit.inlet().state_vars().iter().all(|id| !fs.system().is_fixed(*id)));
        assert_eq!(fs.degrees_of_freedom(), dof);
        assert_relative_eq!(flow(fs.system(), unit.waste(), "H2O"), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn initialize_needs_fixed_fractions() {
        let (mut fs, unit) = flowsheet();
        fs.system_mut().unfix(unit.recovery_frac_mass_solvent());

        let (system, properties) = fs.parts_mut();
        let err = UnitModel::initialize(&unit, system, properties, &NewtonSolver::default())
            .unwrap_err();
        assert_eq!(err, InitializeError::Solve(SolveError::NotSquare { dof: 1 }));
        assert!(fs.system().is_fixed(unit.inlet().temperature()));
    }

    #[test]
    fn initialize_reports_non_optimal_termination() {
        let (mut fs, unit) = flowsheet();
        let water = unit.inlet().flow_mass_phase_comp("H2O").unwrap();
        fs.system_mut().fix(water, f64::NAN);

        let (system, properties) = fs.parts_mut();
        let err = UnitModel::initialize(&unit, system, properties, &NewtonSolver::default())
            .unwrap_err();
        assert_eq!(
            err,
            InitializeError::NotOptimal {
                termination: TerminationCondition::NonFinite
            }
        );
    }

    #[test]
    fn initialize_uses_the_given_solver() {
        let (mut fs, unit) = flowsheet();
        let solver = NewtonSolver::new(SolverConfig {
            residual_tol: -1.0,
            ..SolverConfig::default()
        });

        let (system, properties) = fs.parts_mut();
        let err = UnitModel::initialize(&unit, system, properties, &solver).unwrap_err();
        assert!(matches!(
            err,
            InitializeError::Solve(SolveError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn solve_conserves_mass() {
        let (mut fs, unit) = flowsheet();
        fs.calculate_scaling_factors().unwrap();
        let results = fs.solve(&NewtonSolver::default()).unwrap();
        assert!(results.is_optimal());

        for j in ["H2O", "NaCl", "TSS"] {
            let residual = unit.mass_balance_residual(fs.system(), j).unwrap();
            assert!(residual.get::<kilogram_per_second>().abs() < 1e-12);
        }
        assert_eq!(unit.mass_balance_residual(fs.system(), "Ca"), None);
    }

    #[test]
    fn given_outlet_water_flow_finds_the_recovery() {
        let (mut fs, unit) = flowsheet();
        fs.calculate_scaling_factors().unwrap();

        let recovery = unit
            .given_outlet_water_flow(
                &mut fs,
                NonNegative::new(kg_s(0.8)).unwrap(),
                GivenOutletFlowConfig::default(),
            )
            .unwrap();

        assert_relative_eq!(recovery.get::<ratio>(), 0.8, epsilon = 1e-9);
        let system = fs.system();
        assert!(system.is_fixed(unit.recovery_frac_mass_solvent()));
        assert_relative_eq!(flow(system, unit.outlet(), "H2O"), 0.8, epsilon = 1e-9);
        assert_relative_eq!(flow(system, unit.waste(), "H2O"), 0.2, epsilon = 1e-9);
        assert_eq!(fs.degrees_of_freedom(), 0);
    }

    #[test]
    fn given_outlet_water_flow_rejects_unreachable_targets() {
        let (mut fs, unit) = flowsheet();

        let err = unit
            .given_outlet_water_flow(
                &mut fs,
                NonNegative::new(kg_s(1.5)).unwrap(),
                GivenOutletFlowConfig::default(),
            )
            .unwrap_err();

        assert!(matches!(err, GivenOutletFlowError::Unreachable { .. }));
    }

    #[test]
    fn given_outlet_water_flow_reports_an_unfixed_removal() {
        let (mut fs, unit) = flowsheet();
        let tss = unit.removal_frac_mass_comp("TSS").unwrap();
        fs.system_mut().unfix(tss);
        let before: Vec<f64> = unit
            .outlet()
            .state_vars()
            .into_iter()
            .map(|id| fs.system().value(id))
            .collect();

        let err = unit
            .given_outlet_water_flow(
                &mut fs,
                NonNegative::new(kg_s(0.8)).unwrap(),
                GivenOutletFlowConfig::default(),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            GivenOutletFlowError::Initialize(InitializeError::Solve(SolveError::NotSquare {
                dof: 1
            }))
        ));
        let system = fs.system();
        assert!(!system.is_fixed(tss));
        assert_relative_eq!(system.value(unit.recovery_frac_mass_solvent()), 0.5);
        for (id, value) in unit.outlet().state_vars().into_iter().zip(before) {
            assert_relative_eq!(system.value(id), value);
        }
    }
}
