use uom::si::{
    f64::{MassDensity, MassRate, Pressure, Ratio, ThermodynamicTemperature, VolumeRate},
    mass_density::kilogram_per_cubic_meter,
    mass_rate::kilogram_per_second,
    pressure::pascal,
    ratio::ratio,
    thermodynamic_temperature::kelvin,
    volume_rate::cubic_meter_per_second,
};

use super::Dimension;

/// A [`uom`] quantity that can be stored in an equation system.
///
/// Implementations convert to and from the quantity's SI base unit and
/// report the matching runtime [`Dimension`].
pub trait Dimensioned: Sized {
    /// Runtime dimension of this quantity.
    const DIMENSION: Dimension;

    /// Returns the value in SI base units.
    fn to_si(self) -> f64;

    /// Creates the quantity from a value in SI base units.
    fn from_si(value: f64) -> Self;
}

macro_rules! impl_dimensioned {
    ($($quantity:ident => $unit:ty, $dimension:expr;)*) => {
        $(
            impl Dimensioned for $quantity {
                const DIMENSION: Dimension = $dimension;

                fn to_si(self) -> f64 {
                    self.get::<$unit>()
                }

                fn from_si(value: f64) -> Self {
                    $quantity::new::<$unit>(value)
                }
            }
        )*
    };
}

impl_dimensioned! {
    MassRate => kilogram_per_second, Dimension::MASS_RATE;
    Pressure => pascal, Dimension::PRESSURE;
    ThermodynamicTemperature => kelvin, Dimension::TEMPERATURE;
    Ratio => ratio, Dimension::NONE;
    MassDensity => kilogram_per_cubic_meter, Dimension::MASS_DENSITY;
    VolumeRate => cubic_meter_per_second, Dimension::VOLUME_RATE;
}
