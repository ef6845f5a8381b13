use std::cmp::Ordering;

use num_traits::Zero;

use super::{Constrained, Constraint, ConstraintError};

/// Marker type enforcing that a value is non-negative (zero or greater).
///
/// Feed component flows use this constraint: a stream may carry none of a
/// solute, but never a negative amount.
///
/// # Examples
///
/// ```
/// use twine_treatment::support::constraint::NonNegative;
/// use uom::si::{f64::MassRate, mass_rate::kilogram_per_second};
///
/// let flow = NonNegative::new(MassRate::new::<kilogram_per_second>(0.01)).unwrap();
/// assert_eq!(flow.into_inner().get::<kilogram_per_second>(), 0.01);
///
/// assert!(NonNegative::new(MassRate::new::<kilogram_per_second>(-1.0)).is_err());
/// assert!(NonNegative::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NonNegative;

impl NonNegative {
    /// Constructs a [`Constrained<T, NonNegative>`] if the value is non-negative.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is negative or not a number (`NaN`).
    pub fn new<T: PartialOrd + Zero>(
        value: T,
    ) -> Result<Constrained<T, NonNegative>, ConstraintError> {
        Constrained::<T, NonNegative>::new(value)
    }
}

impl<T: PartialOrd + Zero> Constraint<T> for NonNegative {
    fn check(value: &T) -> Result<(), ConstraintError> {
        match value.partial_cmp(&T::zero()) {
            Some(Ordering::Greater | Ordering::Equal) => Ok(()),
            Some(Ordering::Less) => Err(ConstraintError::Negative),
            None => Err(ConstraintError::NotANumber),
        }
    }
}
