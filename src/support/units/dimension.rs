use std::{
    fmt,
    ops::{Div, Mul},
};

/// Exponents of the seven SI base dimensions.
///
/// Field order follows [`uom`]'s `ISQ` parameters: length, mass, time,
/// electric current, thermodynamic temperature, amount of substance, and
/// luminous intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimension {
    pub length: i8,
    pub mass: i8,
    pub time: i8,
    pub current: i8,
    pub temperature: i8,
    pub amount: i8,
    pub luminosity: i8,
}

impl Dimension {
    pub const NONE: Self = Self::new(0, 0, 0, 0, 0, 0, 0);
    pub const MASS_RATE: Self = Self::new(0, 1, -1, 0, 0, 0, 0);
    pub const PRESSURE: Self = Self::new(-1, 1, -2, 0, 0, 0, 0);
    pub const TEMPERATURE: Self = Self::new(0, 0, 0, 0, 1, 0, 0);
    pub const MASS_DENSITY: Self = Self::new(-3, 1, 0, 0, 0, 0, 0);
    pub const VOLUME_RATE: Self = Self::new(3, 0, -1, 0, 0, 0, 0);

    #[must_use]
    pub const fn new(
        length: i8,
        mass: i8,
        time: i8,
        current: i8,
        temperature: i8,
        amount: i8,
        luminosity: i8,
    ) -> Self {
        Self {
            length,
            mass,
            time,
            current,
            temperature,
            amount,
            luminosity,
        }
    }

    #[must_use]
    pub fn is_dimensionless(&self) -> bool {
        *self == Self::NONE
    }

    /// Raises the dimension to an integer power.
    #[must_use]
    pub fn powi(self, n: i8) -> Self {
        Self::new(
            self.length * n,
            self.mass * n,
            self.time * n,
            self.current * n,
            self.temperature * n,
            self.amount * n,
            self.luminosity * n,
        )
    }

    fn exponents(&self) -> [(&'static str, i8); 7] {
        [
            ("kg", self.mass),
            ("m", self.length),
            ("s", self.time),
            ("A", self.current),
            ("K", self.temperature),
            ("mol", self.amount),
            ("cd", self.luminosity),
        ]
    }
}

impl Mul for Dimension {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.length + rhs.length,
            self.mass + rhs.mass,
            self.time + rhs.time,
            self.current + rhs.current,
            self.temperature + rhs.temperature,
            self.amount + rhs.amount,
            self.luminosity + rhs.luminosity,
        )
    }
}

impl Div for Dimension {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        self * rhs.powi(-1)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return f.write_str("dimensionless");
        }

        let mut first = true;
        for (symbol, exponent) in self.exponents() {
            if exponent == 0 {
                continue;
            }
            if !first {
                f.write_str("·")?;
            }
            first = false;
            if exponent == 1 {
                f.write_str(symbol)?;
            } else {
                write!(f, "{symbol}^{exponent}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_over_density_is_volume_rate() {
        assert_eq!(
            Dimension::MASS_RATE / Dimension::MASS_DENSITY,
            Dimension::VOLUME_RATE
        );
    }

    #[test]
    fn mass_rate_times_ratio_is_unchanged() {
        assert_eq!(Dimension::MASS_RATE * Dimension::NONE, Dimension::MASS_RATE);
        assert!((Dimension::PRESSURE / Dimension::PRESSURE).is_dimensionless());
    }

    #[test]
    fn display() {
        assert_eq!(Dimension::MASS_RATE.to_string(), "kg·s^-1");
        assert_eq!(Dimension::PRESSURE.to_string(), "kg·m^-1·s^-2");
        assert_eq!(Dimension::TEMPERATURE.to_string(), "K");
        assert_eq!(Dimension::NONE.to_string(), "dimensionless");
    }
}
