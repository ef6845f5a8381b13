//! Public unit models.
//!
//! # Organization
//!
//! Models are organized into domain-specific submodules (e.g., `separation`)
//! based on an opinionated taxonomy. This organization may evolve as more
//! models are added.
//!
//! # Model structure
//!
//! Each model lives in its own module and contains an internal `core` submodule
//! where the equations, scaling and initialization live. The unit type built
//! into a flowsheet is re-exported from `core`, while the
//! [`twine_core::Model`] implementation is a thin adapter that runs the full
//! flowsheet workflow around it.

pub mod separation;
