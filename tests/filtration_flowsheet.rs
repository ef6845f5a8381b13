use approx::assert_relative_eq;
use twine_core::Model;
use twine_treatment::{
    models::separation::filtration::{Filtration, FiltrationInput, FiltrationModel},
    support::{
        constraint::UnitInterval,
        flowsheet::Flowsheet,
        properties::{LIQ, PropertyPackage, StreamState, WaterParameterBlock},
        solver::{NewtonSolver, check_optimal_termination},
    },
};
use uom::si::{
    f64::{MassRate, Pressure, Ratio, ThermodynamicTemperature},
    mass_density::kilogram_per_cubic_meter,
    mass_rate::kilogram_per_second,
    pressure::pascal,
    ratio::ratio,
    thermodynamic_temperature::kelvin,
};

fn kg_s(value: f64) -> MassRate {
    MassRate::new::<kilogram_per_second>(value)
}

fn properties() -> WaterParameterBlock {
    let mut properties = WaterParameterBlock::new(["NaCl", "TSS"]).unwrap();
    for (j, factor) in [("H2O", 1.0), ("NaCl", 1e2), ("TSS", 1e2)] {
        properties
            .set_default_scaling("flow_mass_phase_comp", factor, &[LIQ, j])
            .unwrap();
    }
    properties
}

fn feed() -> StreamState {
    StreamState::new(
        ThermodynamicTemperature::new::<kelvin>(298.15),
        Pressure::new::<pascal>(101_325.0),
    )
    .with_flow("H2O", kg_s(1.0))
    .with_flow("NaCl", kg_s(0.01))
    .with_flow("TSS", kg_s(0.01))
}

const TUTORIAL_REPORT: &str = r"====================================================================================
Unit : fs.unit                                                             Time: 0.0
------------------------------------------------------------------------------------
    Unit Performance

    Variables: 

    Key                          : Value      : Units         : Fixed : Bounds
    recovery_frac_mass_H2O       : 0.50000    : dimensionless :  true : (0, 1)
    removal_frac_mass_comp[NaCl] : 0.010000   : dimensionless :  true : (0, 1)
    removal_frac_mass_comp[TSS]  : 0.90000    : dimensionless :  true : (0, 1)

------------------------------------------------------------------------------------
    Stream Table
                                          Units      inlet     outlet      waste
    flow_mass_phase_comp[Liq,H2O]       kg·s^-1     1.0000    0.50000    0.50000
    flow_mass_phase_comp[Liq,NaCl]      kg·s^-1   0.010000  0.0099000 0.00010000
    flow_mass_phase_comp[Liq,TSS]       kg·s^-1   0.010000  0.0010000  0.0090000
    temperature                               K     298.15     298.15     298.15
    pressure                       kg·m^-1·s^-2   1.0132e5   1.0132e5   1.0132e5
====================================================================================
";

#[test]
fn filtration_workflow() {
    let mut fs = Flowsheet::new(properties());
    let unit = Filtration::build(&mut fs, "unit").unwrap();
    let fraction = |value| UnitInterval::new(Ratio::new::<ratio>(value)).unwrap();

    unit.fix_inlet(fs.system_mut(), &feed()).unwrap();
    unit.fix_recovery(fs.system_mut(), fraction(0.5)).unwrap();
    unit.fix_removal(fs.system_mut(), "NaCl", fraction(0.01)).unwrap();
    unit.fix_removal(fs.system_mut(), "TSS", fraction(0.9)).unwrap();

    fs.calculate_scaling_factors().unwrap();
    fs.assert_units_consistent().unwrap();
    assert_eq!(fs.degrees_of_freedom(), 0);

    let results = fs.solve(&NewtonSolver::default()).unwrap();
    assert!(check_optimal_termination(&results));

    let outlet = unit.outlet().read_state(fs.system());
    let waste = unit.waste().read_state(fs.system());
    let expected = [
        ("H2O", 0.5, 0.5),
        ("NaCl", 0.0099, 0.0001),
        ("TSS", 0.001, 0.009),
    ];
    for (j, out, rejected) in expected {
        let flow = |stream: &StreamState| stream.flow(j).unwrap().get::<kilogram_per_second>();
        assert_relative_eq!(flow(&outlet), out, epsilon = 1e-10);
        assert_relative_eq!(flow(&waste), rejected, epsilon = 1e-10);
    }
    for stream in [&outlet, &waste] {
        assert_relative_eq!(stream.temperature.get::<kelvin>(), 298.15, epsilon = 1e-9);
        assert_relative_eq!(stream.pressure.get::<pascal>(), 101_325.0, epsilon = 1e-6);
    }

    let total_in = feed().flow_mass_total().get::<kilogram_per_second>();
    let total_out = outlet.flow_mass_total().get::<kilogram_per_second>()
        + waste.flow_mass_total().get::<kilogram_per_second>();
    assert_relative_eq!(total_in, total_out, epsilon = 1e-12);

    let dens = fs.properties().dens_mass();
    let conc = unit
        .outlet()
        .conc_mass_phase_comp(fs.system(), "NaCl", dens)
        .unwrap();
    assert_relative_eq!(
        conc.get::<kilogram_per_cubic_meter>(),
        0.0099 / 0.5109 * 1000.0,
        epsilon = 1e-6
    );

    let report = fs.report(unit.name()).unwrap();
    assert_eq!(report.streams.ports, ["inlet", "outlet", "waste"]);
    assert_relative_eq!(
        report
            .streams
            .value("flow_mass_phase_comp[Liq,TSS]", "waste")
            .unwrap(),
        0.009,
        epsilon = 1e-10
    );
    let keys: Vec<&str> = report.performance.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(
        keys,
        [
            "recovery_frac_mass_H2O",
            "removal_frac_mass_comp[NaCl]",
            "removal_frac_mass_comp[TSS]",
        ]
    );
    assert!(report.performance.iter().all(|e| e.fixed));

    assert_eq!(report.to_string(), TUTORIAL_REPORT);
}

#[test]
fn model_adapter_matches_the_flowsheet() {
    let fraction = |value| UnitInterval::new(Ratio::new::<ratio>(value)).unwrap();
    let input = FiltrationInput {
        feed: feed(),
        recovery_frac_mass_solvent: fraction(0.7),
        removal_frac_mass_comp: vec![
            ("NaCl".to_string(), fraction(0.05)),
            ("TSS".to_string(), fraction(0.99)),
        ],
    };

    let results = FiltrationModel::new(properties()).call(&input).unwrap();

    assert!(results.solve.is_optimal());
    let outlet = |j| results.outlet.flow(j).unwrap().get::<kilogram_per_second>();
    assert_relative_eq!(outlet("H2O"), 0.7, epsilon = 1e-10);
    assert_relative_eq!(outlet("NaCl"), 0.0095, epsilon = 1e-10);
    assert_relative_eq!(outlet("TSS"), 0.0001, epsilon = 1e-10);
}
