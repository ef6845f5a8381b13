//! Extensions to [`uom`] for equation-oriented models.
//!
//! This crate uses [`uom`] for all physical quantities at its public
//! boundaries (feed flows, temperatures, pressures, fractions). Inside an
//! equation system, values are stored as SI `f64`s tagged with a runtime
//! [`Dimension`], which is what makes a units-consistency check possible
//! after equations have been assembled.
//!
//! The [`Dimensioned`] trait bridges the two representations:
//!
//! ```
//! use twine_treatment::support::units::{Dimension, Dimensioned};
//! use uom::si::{f64::Pressure, pressure::pascal};
//!
//! let p = Pressure::new::<pascal>(101_325.0);
//! assert_eq!(p.to_si(), 101_325.0);
//! assert_eq!(Pressure::DIMENSION, Dimension::PRESSURE);
//! ```

mod dimension;
mod quantity;

pub use dimension::Dimension;
pub use quantity::Dimensioned;
