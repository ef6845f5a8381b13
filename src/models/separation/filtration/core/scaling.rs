//! Scaling factors for the filtration unit.
//!
//! The inlet block is scaled by the property package. Outlet and waste flows
//! inherit the inlet factor of the same component, and each equation takes
//! the factor of the inlet variable it balances. Factors the user has
//! already set are never replaced.

use crate::support::{
    properties::{PropertyError, PropertyPackage},
    system::{EquationId, System, VarId},
};

use super::Filtration;

const FRACTION_SCALING: f64 = 1.0;

pub(super) fn calculate_scaling_factors<P: PropertyPackage>(
    unit: &Filtration,
    system: &mut System,
    properties: &P,
) -> Result<(), PropertyError> {
    let inlet = &unit.properties_in;
    properties.calculate_scaling_factors(system, inlet)?;

    for block in [&unit.properties_out, &unit.properties_waste] {
        for (j, id) in block.flows() {
            let inherited = inlet
                .flow_mass_phase_comp(j)
                .and_then(|inlet_id| system.scaling_factor(inlet_id));
            set_if_unscaled(system, id, inherited)?;
        }
        properties.calculate_scaling_factors(system, block)?;
    }

    set_if_unscaled(system, unit.recovery_frac_mass_solvent, Some(FRACTION_SCALING))?;
    for (_, id) in &unit.removal_frac_mass_comp {
        set_if_unscaled(system, *id, Some(FRACTION_SCALING))?;
    }

    let equations = &unit.equations;
    let inlet_flow_factor = |system: &System, j: &str| {
        inlet
            .flow_mass_phase_comp(j)
            .and_then(|id| system.scaling_factor(id))
    };

    let factor = inlet_flow_factor(system, &unit.solvent);
    scale_equation_if_unscaled(system, equations.water_recovery, factor)?;

    for (j, id) in equations.solute_removal.iter().chain(&equations.mass_balance) {
        let factor = inlet_flow_factor(system, j);
        scale_equation_if_unscaled(system, *id, factor)?;
    }

    let factor = system.scaling_factor(inlet.temperature());
    scale_equation_if_unscaled(system, equations.isothermal_outlet, factor)?;
    scale_equation_if_unscaled(system, equations.isothermal_waste, factor)?;

    let factor = system.scaling_factor(inlet.pressure());
    scale_equation_if_unscaled(system, equations.isobaric_outlet, factor)?;
    scale_equation_if_unscaled(system, equations.isobaric_waste, factor)?;

    Ok(())
}

fn set_if_unscaled(system: &mut System, id: VarId, factor: Option<f64>) -> Result<(), PropertyError> {
    if let Some(factor) = factor
        && system.scaling_factor(id).is_none()
    {
        system.set_scaling_factor(id, factor)?;
    }
    Ok(())
}

fn scale_equation_if_unscaled(
    system: &mut System,
    id: EquationId,
    factor: Option<f64>,
) -> Result<(), PropertyError> {
    if let Some(factor) = factor
        && system.equation_scaling_factor(id).is_none()
    {
        system.set_equation_scaling_factor(id, factor)?;
    }
    Ok(())
}
