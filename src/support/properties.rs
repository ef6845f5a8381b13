//! Property packages and the state blocks they build.
//!
//! A property package defines the components and phases of a material and
//! builds a [`StateBlock`] of state variables wherever a unit model needs one.
//! It also owns the default scaling factors applied to those variables.

mod error;
mod state_block;
mod stream;
mod water;

pub use error::PropertyError;
pub use state_block::StateBlock;
pub use stream::StreamState;
pub use water::{SOLVENT, WaterParameterBlock};

use tracing::warn;
use uom::si::f64::MassDensity;

use crate::support::system::{System, VarId};

/// Name of the liquid phase.
pub const LIQ: &str = "Liq";

/// A set of components, phases and state relations shared by unit models.
pub trait PropertyPackage {
    fn name(&self) -> &str;

    fn solvent(&self) -> &str;

    /// All components, solvent first.
    fn components(&self) -> &[String];

    /// Components other than the solvent.
    fn solutes(&self) -> &[String] {
        let components = self.components();
        components
            .iter()
            .position(|j| j == self.solvent())
            .map_or(components, |i| &components[i + 1..])
    }

    fn phases(&self) -> &[&'static str] {
        &[LIQ]
    }

    /// Constant liquid mass density.
    fn dens_mass(&self) -> MassDensity;

    /// Default scaling factor for a state variable and index, if registered.
    fn default_scaling(&self, var: &str, index: &[&str]) -> Option<f64>;

    /// Declares a new state block named `name` in `system`.
    fn build_state_block(&self, system: &mut System, name: &str) -> StateBlock {
        StateBlock::build(system, name, self.components())
    }

    /// Scales the variables of `block` from the package defaults.
    ///
    /// Variables that already carry a factor keep it. Variables without a
    /// registered default are left unscaled and logged.
    ///
    /// # Errors
    ///
    /// Returns a [`PropertyError::System`] if a default is rejected by the system.
    fn calculate_scaling_factors(
        &self,
        system: &mut System,
        block: &StateBlock,
    ) -> Result<(), PropertyError> {
        for (j, id) in block.flows() {
            let default = self.default_scaling("flow_mass_phase_comp", &[LIQ, j]);
            apply_default_scaling(system, id, default)?;
        }
        apply_default_scaling(
            system,
            block.temperature(),
            self.default_scaling("temperature", &[]),
        )?;
        apply_default_scaling(
            system,
            block.pressure(),
            self.default_scaling("pressure", &[]),
        )
    }
}

fn apply_default_scaling(
    system: &mut System,
    id: VarId,
    default: Option<f64>,
) -> Result<(), PropertyError> {
    if system.scaling_factor(id).is_some() {
        return Ok(());
    }
    match default {
        Some(factor) => system.set_scaling_factor(id, factor)?,
        None => warn!(var = system.var(id).name(), "missing default scaling factor"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_uses_defaults_and_keeps_user_factors() {
        let mut properties = WaterParameterBlock::new(["NaCl", "TSS"]).unwrap();
        properties
            .set_default_scaling("flow_mass_phase_comp", 1.0, &[LIQ, "H2O"])
            .unwrap();
        properties
            .set_default_scaling("flow_mass_phase_comp", 1e2, &[LIQ, "NaCl"])
            .unwrap();

        let mut system = System::new();
        let block = properties.build_state_block(&mut system, "fs.feed");
        let tss = block.flow_mass_phase_comp("TSS").unwrap();
        let pressure = block.pressure();
        system.set_scaling_factor(pressure, 1e-3).unwrap();

        properties
            .calculate_scaling_factors(&mut system, &block)
            .unwrap();

        let sf = |id| system.scaling_factor(id);
        assert_eq!(sf(block.flow_mass_phase_comp("H2O").unwrap()), Some(1.0));
        assert_eq!(sf(block.flow_mass_phase_comp("NaCl").unwrap()), Some(1e2));
        assert_eq!(sf(tss), None);
        assert_eq!(sf(block.temperature()), Some(1e-2));
        assert_eq!(sf(pressure), Some(1e-3));
    }
}
