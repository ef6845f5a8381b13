//! Equations of the filtration unit.

use crate::support::{
    properties::{PropertyError, StateBlock},
    system::{EquationId, System, VarId},
};

/// Ids of the unit's equations, grouped by role.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Equations {
    pub(super) water_recovery: EquationId,
    pub(super) solute_removal: Vec<(String, EquationId)>,
    pub(super) mass_balance: Vec<(String, EquationId)>,
    pub(super) isothermal_outlet: EquationId,
    pub(super) isothermal_waste: EquationId,
    pub(super) isobaric_outlet: EquationId,
    pub(super) isobaric_waste: EquationId,
}

impl Equations {
    pub(super) fn all(&self) -> Vec<EquationId> {
        let mut ids = vec![self.water_recovery];
        ids.extend(self.solute_removal.iter().map(|(_, id)| *id));
        ids.extend(self.mass_balance.iter().map(|(_, id)| *id));
        ids.extend([
            self.isothermal_outlet,
            self.isothermal_waste,
            self.isobaric_outlet,
            self.isobaric_waste,
        ]);
        ids
    }
}

/// Stream blocks and performance variables the equations connect.
pub(super) struct Connections<'a> {
    pub(super) inlet: &'a StateBlock,
    pub(super) outlet: &'a StateBlock,
    pub(super) waste: &'a StateBlock,
    pub(super) solvent: &'a str,
    pub(super) recovery: VarId,
    pub(super) removal: &'a [(String, VarId)],
}

/// Declares the unit's equations.
///
/// # Errors
///
/// Returns [`PropertyError::UnknownComponent`] if a block lacks the solvent
/// or one of the solutes.
pub(super) fn add(
    system: &mut System,
    name: &str,
    c: &Connections<'_>,
) -> Result<Equations, PropertyError> {
    let flow = |block: &StateBlock, j: &str| {
        block
            .flow_mass_phase_comp(j)
            .ok_or_else(|| PropertyError::UnknownComponent {
                name: j.to_string(),
            })
    };

    let water_recovery = system.add_equation(
        format!("{name}.water_recovery_equation"),
        flow(c.outlet, c.solvent)?,
        c.recovery * flow(c.inlet, c.solvent)?,
    );

    let mut solute_removal = Vec::with_capacity(c.removal.len());
    for (j, removal) in c.removal {
        let id = system.add_equation(
            format!("{name}.solute_removal_equation[{j}]"),
            flow(c.waste, j)?,
            *removal * flow(c.inlet, j)?,
        );
        solute_removal.push((j.clone(), id));
    }

    let mut mass_balance = Vec::with_capacity(c.inlet.components().len());
    for j in c.inlet.components() {
        let id = system.add_equation(
            format!("{name}.mass_balance[{j}]"),
            flow(c.inlet, j)?,
            flow(c.outlet, j)? + flow(c.waste, j)?,
        );
        mass_balance.push((j.clone(), id));
    }

    let isothermal_outlet = system.add_equation(
        format!("{name}.eq_temperature_outlet"),
        c.outlet.temperature(),
        c.inlet.temperature(),
    );
    let isothermal_waste = system.add_equation(
        format!("{name}.eq_temperature_waste"),
        c.waste.temperature(),
        c.inlet.temperature(),
    );
    let isobaric_outlet = system.add_equation(
        format!("{name}.eq_pressure_outlet"),
        c.outlet.pressure(),
        c.inlet.pressure(),
    );
    let isobaric_waste = system.add_equation(
        format!("{name}.eq_pressure_waste"),
        c.waste.pressure(),
        c.inlet.pressure(),
    );

    Ok(Equations {
        water_recovery,
        solute_removal,
        mass_balance,
        isothermal_outlet,
        isothermal_waste,
        isobaric_outlet,
        isobaric_waste,
    })
}
