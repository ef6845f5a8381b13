//! Filtration unit model.
//!
//! A filtration unit splits one liquid feed into a product (`outlet`) and a
//! reject (`waste`) stream. Performance is set by two kinds of fractions:
//!
//! - `recovery_frac_mass_H2O`: share of the feed water leaving in the outlet
//! - `removal_frac_mass_comp[j]`: share of each solute leaving in the waste
//!
//! Together with component mass balances and isothermal, isobaric operation
//! these close the unit's equations once the feed and fractions are fixed.
//!
//! [`Filtration`] is the unit itself, built into a
//! [`Flowsheet`](crate::support::flowsheet::Flowsheet).
//! [`FiltrationModel`] is a [`twine_core::Model`] adapter that runs the full
//! build, fix, scale, check, initialize and solve workflow for one unit.

pub(crate) mod core;
mod model;

pub use core::{
    Filtration, FiltrationError, Fraction, GivenOutletFlowConfig, GivenOutletFlowError,
};
pub use model::{FiltrationInput, FiltrationModel, FiltrationModelError, FiltrationResults};
