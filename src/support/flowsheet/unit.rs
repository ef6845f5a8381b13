use crate::support::{
    properties::{PropertyError, PropertyPackage, StateBlock},
    solver::NewtonSolver,
    system::{System, VarId},
};

use super::InitializeError;

/// A unit model registered in a [`Flowsheet`](super::Flowsheet).
///
/// Implementations hold ids into the flowsheet's [`System`] rather than the
/// variables themselves, so a cheap handle can be kept by the caller while a
/// copy lives in the flowsheet.
pub trait UnitModel<P: PropertyPackage> {
    /// Full name of the unit, such as `fs.unit`.
    fn name(&self) -> &str;

    /// Named state blocks exposed for connection and reporting.
    fn ports(&self) -> Vec<(&str, &StateBlock)>;

    /// Variables reported in the unit performance table.
    fn performance_vars(&self) -> Vec<VarId>;

    /// Assigns scaling factors to the unit's variables and equations.
    ///
    /// # Errors
    ///
    /// Returns a [`PropertyError`] if a factor is rejected.
    fn calculate_scaling_factors(
        &self,
        system: &mut System,
        properties: &P,
    ) -> Result<(), PropertyError>;

    /// Brings the unit's variables close to a solution of its own equations.
    ///
    /// Fixedness of every variable must be the same on return as on entry.
    ///
    /// # Errors
    ///
    /// Returns an [`InitializeError`] if the unit could not be initialized.
    fn initialize(
        &self,
        system: &mut System,
        properties: &P,
        solver: &NewtonSolver,
    ) -> Result<(), InitializeError>;
}
