use std::cmp::Ordering;

use num_traits::Zero;

use super::{Constrained, Constraint, ConstraintError};

/// Marker type enforcing that a value is strictly positive (greater than zero).
///
/// Scaling factors and property constants such as density use this
/// constraint.
///
/// # Examples
///
/// ```
/// use twine_treatment::support::constraint::StrictlyPositive;
///
/// let sf = StrictlyPositive::new(1e-5).unwrap();
/// assert_eq!(sf.into_inner(), 1e-5);
///
/// assert!(StrictlyPositive::new(0.0).is_err());
/// assert!(StrictlyPositive::new(-1.0).is_err());
/// assert!(StrictlyPositive::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StrictlyPositive;

impl StrictlyPositive {
    /// Constructs a [`Constrained<T, StrictlyPositive>`] if the value is strictly positive.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is zero, negative, or not a number (`NaN`).
    pub fn new<T: PartialOrd + Zero>(
        value: T,
    ) -> Result<Constrained<T, StrictlyPositive>, ConstraintError> {
        Constrained::<T, StrictlyPositive>::new(value)
    }
}

impl<T: PartialOrd + Zero> Constraint<T> for StrictlyPositive {
    fn check(value: &T) -> Result<(), ConstraintError> {
        match value.partial_cmp(&T::zero()) {
            Some(Ordering::Greater) => Ok(()),
            Some(Ordering::Equal) => Err(ConstraintError::Zero),
            Some(Ordering::Less) => Err(ConstraintError::Negative),
            None => Err(ConstraintError::NotANumber),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use uom::si::{f64::MassDensity, mass_density::kilogram_per_cubic_meter};

    #[test]
    fn densities() {
        let rho = MassDensity::new::<kilogram_per_cubic_meter>(1000.0);
        assert!(StrictlyPositive::new(rho).is_ok());

        let rho = MassDensity::new::<kilogram_per_cubic_meter>(0.0);
        assert_eq!(StrictlyPositive::new(rho).unwrap_err(), ConstraintError::Zero);
    }

    #[test]
    fn infinity_passes_the_sign_check() {
        assert!(StrictlyPositive::new(f64::INFINITY).is_ok());
    }
}
