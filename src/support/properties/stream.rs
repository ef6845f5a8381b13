use uom::{
    ConstZero,
    si::f64::{MassRate, Pressure, ThermodynamicTemperature},
};

/// Plain-data view of a material stream.
///
/// Used to fix feed conditions on a state block and to read converged
/// results back out of a flowsheet.
///
/// # Example
///
/// ```
/// use twine_treatment::support::properties::StreamState;
/// use uom::si::{
///     f64::{MassRate, Pressure, ThermodynamicTemperature},
///     mass_rate::kilogram_per_second,
///     pressure::pascal,
///     thermodynamic_temperature::kelvin,
/// };
///
/// let feed = StreamState::new(
///     ThermodynamicTemperature::new::<kelvin>(298.15),
///     Pressure::new::<pascal>(101_325.0),
/// )
/// .with_flow("H2O", MassRate::new::<kilogram_per_second>(1.0))
/// .with_flow("NaCl", MassRate::new::<kilogram_per_second>(0.01));
///
/// assert_eq!(feed.flow_mass_total().get::<kilogram_per_second>(), 1.01);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StreamState {
    /// Component mass flows in the liquid phase, in insertion order.
    pub flow_mass_comp: Vec<(String, MassRate)>,
    pub temperature: ThermodynamicTemperature,
    pub pressure: Pressure,
}

impl StreamState {
    /// Creates a stream with no component flows.
    #[must_use]
    pub fn new(temperature: ThermodynamicTemperature, pressure: Pressure) -> Self {
        Self {
            flow_mass_comp: Vec::new(),
            temperature,
            pressure,
        }
    }

    /// Sets the mass flow of a component, replacing any previous value.
    #[must_use]
    pub fn with_flow(mut self, component: impl Into<String>, flow: MassRate) -> Self {
        let component = component.into();
        match self.flow_mass_comp.iter_mut().find(|(name, _)| *name == component) {
            Some((_, existing)) => *existing = flow,
            None => self.flow_mass_comp.push((component, flow)),
        }
        self
    }

    /// Mass flow of a component, if the stream specifies one.
    #[must_use]
    pub fn flow(&self, component: &str) -> Option<MassRate> {
        self.flow_mass_comp
            .iter()
            .find(|(name, _)| name == component)
            .map(|(_, flow)| *flow)
    }

    #[must_use]
    pub fn flow_mass_total(&self) -> MassRate {
        self.flow_mass_comp
            .iter()
            .fold(MassRate::ZERO, |total, (_, flow)| total + *flow)
    }
}
