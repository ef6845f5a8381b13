//! # Twine Treatment
//!
//! Equation-oriented water treatment flowsheets and unit models for
//! [Twine](https://github.com/isentropic-dev/twine).
//!
//! ## Crate layout
//!
//! - [`models`]: Unit models and their [`twine_core::Model`] adapters.
//! - [`support`]: The equation system, solver, property packages and
//!   flowsheet container the models are built on.
//!
//! ## Workflow
//!
//! A flowsheet is assembled and solved in a fixed sequence:
//!
//! 1. Create a [`Flowsheet`](support::flowsheet::Flowsheet) with a property package
//! 2. Build unit models into it
//! 3. Fix the feed and operating variables
//! 4. Register default scaling factors and calculate the rest
//! 5. Check units and degrees of freedom
//! 6. Initialize, solve, and check for optimal termination
//!
//! [`FiltrationModel`](models::separation::filtration::FiltrationModel) runs
//! the whole sequence for a single filtration unit.
//!
//! Note: [`support`] APIs are not stable. Breaking changes may occur as needed.

pub mod models;
pub mod support;
