//! Initialization routine for the filtration unit.

use tracing::debug;

use crate::support::{
    flowsheet::InitializeError,
    solver::{NewtonSolver, SolveResults},
    system::{System, VarId},
};

use super::Filtration;

/// Initializes the unit from its current inlet state.
///
/// The inlet is held fixed while outlet and waste states are estimated from
/// the fraction values and the unit's own equations are solved. Inlet
/// fixedness is restored before returning, whether or not the solve succeeded.
pub(super) fn initialize(
    unit: &Filtration,
    system: &mut System,
    solver: &NewtonSolver,
) -> Result<SolveResults, InitializeError> {
    let inlet_vars = unit.properties_in.state_vars();
    let released: Vec<VarId> = inlet_vars
        .iter()
        .copied()
        .filter(|id| !system.is_fixed(*id))
        .collect();
    for id in &released {
        let value = system.value(*id);
        system.fix(*id, value);
    }

    estimate_outlets(unit, system);
    let results = solver.solve_equations(system, &unit.equations.all());

    for id in released {
        system.unfix(id);
    }

    let results = results?;
    if !results.is_optimal() {
        return Err(InitializeError::NotOptimal {
            termination: results.termination,
        });
    }
    debug!(unit = unit.name.as_str(), iters = results.iters, "local solve converged");
    Ok(results)
}

/// Sets unfixed outlet and waste variables from the inlet and the fractions.
fn estimate_outlets(unit: &Filtration, system: &mut System) {
    let recovery = system.value(unit.recovery_frac_mass_solvent);

    let streams = unit
        .properties_in
        .flows()
        .zip(unit.properties_out.flows())
        .zip(unit.properties_waste.flows());

    for (((j, inlet), (_, outlet)), (_, waste)) in streams {
        let feed = system.value(inlet);
        let to_outlet = if j == unit.solvent {
            recovery * feed
        } else {
            let removal = unit
                .removal_frac_mass_comp(j)
                .map_or(0.0, |id| system.value(id));
            (1.0 - removal) * feed
        };
        set_if_free(system, outlet, to_outlet);
        set_if_free(system, waste, feed - to_outlet);
    }

    let temperature = system.value(unit.properties_in.temperature());
    let pressure = system.value(unit.properties_in.pressure());
    for block in [&unit.properties_out, &unit.properties_waste] {
        set_if_free(system, block.temperature(), temperature);
        set_if_free(system, block.pressure(), pressure);
    }
}

fn set_if_free(system: &mut System, id: VarId, value: f64) {
    if !system.is_fixed(id) {
        system.set_value(id, value);
    }
}
