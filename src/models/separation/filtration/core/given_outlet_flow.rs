//! Iterative solver for a target outlet water flow.
//!
//! Varies the water recovery fraction over `[0, 1]` by bisection until the
//! outlet water flow matches the target. Each candidate fraction is checked
//! by solving the unit's own equations with the inlet held fixed.

mod config;
mod error;
mod problem;

pub use config::GivenOutletFlowConfig;
pub use error::GivenOutletFlowError;

use tracing::info;
use twine_core::Model;
use twine_solvers::equation::bisection;
use uom::si::{
    f64::{MassRate, Ratio},
    mass_rate::kilogram_per_second,
    ratio::ratio,
};

use crate::support::{
    constraint::{Constrained, NonNegative},
    properties::{PropertyError, StateBlock},
    solver::NewtonSolver,
    system::System,
};

use super::Filtration;

use problem::{GivenOutletFlowModel, GivenOutletFlowProblem};

/// Finds the recovery fraction that delivers `target` outlet water flow.
///
/// On success the converged state is written into `system` with the recovery
/// fraction fixed at the value found. A unit that cannot be solved locally,
/// such as one with an unfixed removal fraction, fails with
/// [`GivenOutletFlowError::Initialize`] before any bisection step.
pub(super) fn given_outlet_water_flow(
    unit: &Filtration,
    system: &mut System,
    target: Constrained<MassRate, NonNegative>,
    config: GivenOutletFlowConfig,
) -> Result<Ratio, GivenOutletFlowError> {
    let target = target.into_inner();

    let solvent_flow = |block: &StateBlock| {
        block
            .flow_mass_phase_comp(&unit.solvent)
            .ok_or_else(|| PropertyError::UnknownComponent {
                name: unit.solvent.clone(),
            })
    };
    let inlet_water = solvent_flow(&unit.properties_in)?;
    let outlet_water = solvent_flow(&unit.properties_out)?;

    let available = MassRate::new::<kilogram_per_second>(system.value(inlet_water));
    if target > available {
        return Err(GivenOutletFlowError::Unreachable { target, available });
    }

    let model = GivenOutletFlowModel::new(unit, system, NewtonSolver::new(config.newton));
    let problem = GivenOutletFlowProblem::new(outlet_water, target);

    // The observer below cannot report why a local solve failed, so check the
    // unit once at the upper bracket first.
    model.call(&Ratio::new::<ratio>(1.0))?;

    let solution = bisection::solve(
        &model,
        &problem,
        [0.0, 1.0],
        &config.bisection(),
        |event: &bisection::Event<'_, _, _>| {
            // A failed local solve leaves no usable residual.
            if event.result().is_err() {
                return Some(bisection::Action::StopEarly);
            }
            None
        },
    )?;

    if solution.status != bisection::Status::Converged {
        return Err(GivenOutletFlowError::NotConverged {
            residual: MassRate::new::<kilogram_per_second>(solution.residual),
            iters: solution.iters,
        });
    }

    let recovery = solution.snapshot.input;
    *system = solution.snapshot.output;
    info!(
        unit = unit.name.as_str(),
        recovery = recovery.get::<ratio>(),
        iters = solution.iters,
        "matched outlet water flow"
    );
    Ok(recovery)
}
