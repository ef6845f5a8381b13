//! Fixtures for filtration tests.

use uom::si::{
    f64::{MassRate, Pressure, Ratio, ThermodynamicTemperature},
    mass_rate::kilogram_per_second,
    pressure::pascal,
    ratio::ratio,
    thermodynamic_temperature::kelvin,
};

use crate::support::{
    constraint::UnitInterval,
    flowsheet::Flowsheet,
    properties::{LIQ, StreamState, WaterParameterBlock},
};

use super::{Filtration, Fraction};

pub(crate) fn kg_s(value: f64) -> MassRate {
    MassRate::new::<kilogram_per_second>(value)
}

pub(crate) fn fraction(value: f64) -> Fraction {
    UnitInterval::new(Ratio::new::<ratio>(value)).unwrap()
}

/// Water with NaCl and TSS, with flow defaults registered.
pub(crate) fn properties() -> WaterParameterBlock {
    let mut properties = WaterParameterBlock::new(["NaCl", "TSS"]).unwrap();
    for (j, factor) in [("H2O", 1.0), ("NaCl", 1e2), ("TSS", 1e2)] {
        properties
            .set_default_scaling("flow_mass_phase_comp", factor, &[LIQ, j])
            .unwrap();
    }
    properties
}

pub(crate) fn feed() -> StreamState {
    StreamState::new(
        ThermodynamicTemperature::new::<kelvin>(298.15),
        Pressure::new::<pascal>(101_325.0),
    )
    .with_flow("H2O", kg_s(1.0))
    .with_flow("NaCl", kg_s(0.01))
    .with_flow("TSS", kg_s(0.01))
}

/// A flowsheet holding one unit with its feed and fractions fixed.
pub(crate) fn flowsheet() -> (Flowsheet<WaterParameterBlock>, Filtration) {
    let mut fs = Flowsheet::new(properties());
    let unit = Filtration::build(&mut fs, "unit").unwrap();

    let system = fs.system_mut();
    unit.fix_inlet(system, &feed()).unwrap();
    unit.fix_recovery(system, fraction(0.5)).unwrap();
    unit.fix_removal(system, "NaCl", fraction(0.01)).unwrap();
    unit.fix_removal(system, "TSS", fraction(0.9)).unwrap();

    (fs, unit)
}
