use uom::si::f64::{
    MassDensity, MassRate, Pressure, Ratio, ThermodynamicTemperature, VolumeRate,
};

use crate::support::{
    system::{Bounds, System, VarId, VarSpec},
    units::{Dimension, Dimensioned},
};

use super::{LIQ, PropertyError, StreamState};

const TEMPERATURE_BOUNDS: Bounds = Bounds {
    lower: Some(273.15),
    upper: Some(373.15),
};

const PRESSURE_BOUNDS: Bounds = Bounds {
    lower: Some(1e3),
    upper: Some(5e7),
};

const TEMPERATURE_INITIAL: f64 = 298.15;
const PRESSURE_INITIAL: f64 = 101_325.0;

/// State variables of one liquid stream.
///
/// Variables are named after the block, for example
/// `fs.unit.properties_in.flow_mass_phase_comp[Liq,H2O]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateBlock {
    name: String,
    components: Vec<String>,
    flow_mass_phase_comp: Vec<VarId>,
    temperature: VarId,
    pressure: VarId,
}

impl StateBlock {
    /// Declares the state variables of a new block in `system`.
    pub fn build(system: &mut System, name: impl Into<String>, components: &[String]) -> Self {
        let name = name.into();

        let flow_mass_phase_comp = components
            .iter()
            .map(|j| {
                system.add_var(
                    format!("{name}.flow_mass_phase_comp[{LIQ},{j}]"),
                    VarSpec::new(Dimension::MASS_RATE).with_bounds(Bounds::non_negative()),
                )
            })
            .collect();

        let temperature = system.add_var(
            format!("{name}.temperature"),
            VarSpec::new(Dimension::TEMPERATURE)
                .with_value(TEMPERATURE_INITIAL)
                .with_bounds(TEMPERATURE_BOUNDS),
        );

        let pressure = system.add_var(
            format!("{name}.pressure"),
            VarSpec::new(Dimension::PRESSURE)
                .with_value(PRESSURE_INITIAL)
                .with_bounds(PRESSURE_BOUNDS),
        );

        Self {
            name,
            components: components.to_vec(),
            flow_mass_phase_comp,
            temperature,
            pressure,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Liquid-phase mass flow variable of a component.
    #[must_use]
    pub fn flow_mass_phase_comp(&self, component: &str) -> Option<VarId> {
        self.components
            .iter()
            .position(|j| j == component)
            .map(|i| self.flow_mass_phase_comp[i])
    }

    /// Component names paired with their flow variables.
    pub fn flows(&self) -> impl Iterator<Item = (&str, VarId)> {
        self.components
            .iter()
            .map(String::as_str)
            .zip(self.flow_mass_phase_comp.iter().copied())
    }

    #[must_use]
    pub fn temperature(&self) -> VarId {
        self.temperature
    }

    #[must_use]
    pub fn pressure(&self) -> VarId {
        self.pressure
    }

    /// Every state variable: component flows, then temperature and pressure.
    #[must_use]
    pub fn state_vars(&self) -> Vec<VarId> {
        let mut vars = self.flow_mass_phase_comp.clone();
        vars.push(self.temperature);
        vars.push(self.pressure);
        vars
    }

    /// Fixes every state variable to the values of `state`.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::MissingComponent`] if `state` lacks a flow for
    /// one of the block's components, or [`PropertyError::UnknownComponent`] if
    /// it names a component the block does not carry. Nothing is fixed on error.
    pub fn fix_state(&self, system: &mut System, state: &StreamState) -> Result<(), PropertyError> {
        if let Some((name, _)) = state
            .flow_mass_comp
            .iter()
            .find(|(name, _)| !self.components.contains(name))
        {
            return Err(PropertyError::UnknownComponent { name: name.clone() });
        }

        let mut flows = Vec::with_capacity(self.components.len());
        for (j, id) in self.flows() {
            let flow = state
                .flow(j)
                .ok_or_else(|| PropertyError::MissingComponent { name: j.to_string() })?;
            flows.push((id, flow));
        }

        for (id, flow) in flows {
            system.fix_quantity(id, flow)?;
        }
        system.fix_quantity(self.temperature, state.temperature)?;
        system.fix_quantity(self.pressure, state.pressure)?;
        Ok(())
    }

    /// Reads the current values of the block into a [`StreamState`].
    #[must_use]
    pub fn read_state(&self, system: &System) -> StreamState {
        let state = StreamState::new(
            ThermodynamicTemperature::from_si(system.value(self.temperature)),
            Pressure::from_si(system.value(self.pressure)),
        );
        self.flows().fold(state, |state, (j, id)| {
            state.with_flow(j, MassRate::from_si(system.value(id)))
        })
    }

    #[must_use]
    pub fn flow_mass_total(&self, system: &System) -> MassRate {
        MassRate::from_si(self.flow_total_si(system))
    }

    /// Mass fraction of a component in the liquid phase.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::UnknownComponent`] for a component the block
    /// does not carry, or [`PropertyError::NoFlow`] when the total flow is zero.
    pub fn mass_frac_phase_comp(
        &self,
        system: &System,
        component: &str,
    ) -> Result<Ratio, PropertyError> {
        let id = self.component_flow(component)?;
        let total = self.flow_total_si(system);
        if total <= 0.0 {
            return Err(PropertyError::NoFlow {
                block: self.name.clone(),
            });
        }
        Ok(Ratio::from_si(system.value(id) / total))
    }

    /// Volumetric flow at a constant mass density.
    #[must_use]
    pub fn flow_vol(&self, system: &System, dens_mass: MassDensity) -> VolumeRate {
        VolumeRate::from_si(self.flow_total_si(system) / dens_mass.to_si())
    }

    /// Mass concentration of a component at a constant mass density.
    ///
    /// # Errors
    ///
    /// Fails like [`StateBlock::mass_frac_phase_comp`].
    pub fn conc_mass_phase_comp(
        &self,
        system: &System,
        component: &str,
        dens_mass: MassDensity,
    ) -> Result<MassDensity, PropertyError> {
        let frac = self.mass_frac_phase_comp(system, component)?;
        Ok(MassDensity::from_si(frac.to_si() * dens_mass.to_si()))
    }

    fn component_flow(&self, component: &str) -> Result<VarId, PropertyError> {
        self.flow_mass_phase_comp(component)
            .ok_or_else(|| PropertyError::UnknownComponent {
                name: component.to_string(),
            })
    }

    fn flow_total_si(&self, system: &System) -> f64 {
        self.flow_mass_phase_comp
            .iter()
            .map(|id| system.value(*id))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{
        mass_density::kilogram_per_cubic_meter, mass_rate::kilogram_per_second,
        pressure::pascal, ratio::ratio, thermodynamic_temperature::kelvin,
        volume_rate::cubic_meter_per_second,
    };

    fn components() -> Vec<String> {
        vec!["H2O".to_string(), "NaCl".to_string()]
    }

    fn feed() -> StreamState {
        StreamState::new(
            ThermodynamicTemperature::new::<kelvin>(298.15),
            Pressure::new::<pascal>(101_325.0),
        )
        .with_flow("H2O", MassRate::new::<kilogram_per_second>(0.75))
        .with_flow("NaCl", MassRate::new::<kilogram_per_second>(0.25))
    }

    #[test]
    fn declares_named_variables() {
        let mut system = System::new();
        let block = StateBlock::build(&mut system, "fs.feed", &components());

        assert_eq!(system.n_vars(), 4);
        let id = system
            .find_var("fs.feed.flow_mass_phase_comp[Liq,NaCl]")
            .unwrap();
        assert_eq!(block.flow_mass_phase_comp("NaCl"), Some(id));
        assert_eq!(system.find_var("fs.feed.pressure"), Some(block.pressure()));
        assert_eq!(system.var(block.temperature()).bounds(), TEMPERATURE_BOUNDS);
    }

    #[test]
    fn fix_and_read_state() {
        let mut system = System::new();
        let block = StateBlock::build(&mut system, "fs.feed", &components());

        block.fix_state(&mut system, &feed()).unwrap();

        assert!(block.state_vars().iter().all(|id| system.is_fixed(*id)));
        assert_eq!(block.read_state(&system), feed());
    }

    #[test]
    fn fix_state_rejects_mismatched_components() {
        let mut system = System::new();
        let block = StateBlock::build(&mut system, "fs.feed", &components());

        let extra = feed().with_flow("TSS", MassRate::new::<kilogram_per_second>(0.1));
        assert_eq!(
            block.fix_state(&mut system, &extra),
            Err(PropertyError::UnknownComponent {
                name: "TSS".to_string()
            })
        );

        let mut missing = feed();
        missing.flow_mass_comp.pop();
        assert_eq!(
            block.fix_state(&mut system, &missing),
            Err(PropertyError::MissingComponent {
                name: "NaCl".to_string()
            })
        );
        assert!(block.state_vars().iter().all(|id| !system.is_fixed(*id)));
    }

    #[test]
    fn derived_properties() {
        let mut system = System::new();
        let block = StateBlock::build(&mut system, "fs.feed", &components());
        block.fix_state(&mut system, &feed()).unwrap();
        let dens = MassDensity::new::<kilogram_per_cubic_meter>(1000.0);

        assert_relative_eq!(
            block.flow_mass_total(&system).get::<kilogram_per_second>(),
            1.0
        );
        assert_relative_eq!(
            block
                .mass_frac_phase_comp(&system, "NaCl")
                .unwrap()
                .get::<ratio>(),
            0.25
        );
        assert_relative_eq!(
            block.flow_vol(&system, dens).get::<cubic_meter_per_second>(),
            1e-3
        );
        assert_relative_eq!(
            block
                .conc_mass_phase_comp(&system, "NaCl", dens)
                .unwrap()
                .get::<kilogram_per_cubic_meter>(),
            250.0
        );
    }

    #[test]
    fn mass_fraction_needs_flow() {
        let mut system = System::new();
        let block = StateBlock::build(&mut system, "fs.empty", &components());

        assert_eq!(
            block.mass_frac_phase_comp(&system, "H2O"),
            Err(PropertyError::NoFlow {
                block: "fs.empty".to_string()
            })
        );
        assert!(matches!(
            block.mass_frac_phase_comp(&system, "TSS"),
            Err(PropertyError::UnknownComponent { .. })
        ));
    }
}
