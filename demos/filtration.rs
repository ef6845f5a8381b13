//! Builds and solves a flowsheet with one filtration unit.
//!
//! Run with `cargo run --example filtration`. Set `RUST_LOG=debug` to follow
//! the Newton iterations.

use std::error::Error;

use tracing_subscriber::EnvFilter;
use twine_treatment::{
    models::separation::filtration::Filtration,
    support::{
        constraint::UnitInterval,
        flowsheet::Flowsheet,
        properties::{LIQ, WaterParameterBlock},
        solver::{NewtonSolver, check_optimal_termination},
    },
};
use uom::si::{
    f64::{MassRate, Pressure, Ratio, ThermodynamicTemperature},
    mass_rate::kilogram_per_second,
    pressure::pascal,
    ratio::ratio,
    thermodynamic_temperature::kelvin,
};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut fs = Flowsheet::new(WaterParameterBlock::new(["NaCl", "TSS"])?);
    let unit = Filtration::build(&mut fs, "unit")?;

    let inlet = unit.inlet();
    fs.fix(inlet.pressure(), Pressure::new::<pascal>(101_325.0))?;
    fs.fix(inlet.temperature(), ThermodynamicTemperature::new::<kelvin>(298.15))?;
    for (j, flow) in [("H2O", 1.0), ("NaCl", 0.01), ("TSS", 0.01)] {
        if let Some(id) = inlet.flow_mass_phase_comp(j) {
            fs.fix(id, MassRate::new::<kilogram_per_second>(flow))?;
        }
    }

    let fraction = |value| UnitInterval::new(Ratio::new::<ratio>(value));
    unit.fix_recovery(fs.system_mut(), fraction(0.5)?)?;
    unit.fix_removal(fs.system_mut(), "NaCl", fraction(0.01)?)?;
    unit.fix_removal(fs.system_mut(), "TSS", fraction(0.9)?)?;

    let properties = fs.properties_mut();
    properties.set_default_scaling("flow_mass_phase_comp", 1.0, &[LIQ, "H2O"])?;
    properties.set_default_scaling("flow_mass_phase_comp", 1e2, &[LIQ, "NaCl"])?;
    properties.set_default_scaling("flow_mass_phase_comp", 1e2, &[LIQ, "TSS"])?;
    fs.calculate_scaling_factors()?;

    fs.assert_units_consistent()?;
    assert_eq!(fs.degrees_of_freedom(), 0);

    let results = fs.solve(&NewtonSolver::default())?;
    assert!(check_optimal_termination(&results));

    println!("{}", fs.report(unit.name())?);
    Ok(())
}
