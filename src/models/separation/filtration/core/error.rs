use thiserror::Error;

use crate::support::{flowsheet::FlowsheetError, properties::PropertyError, system::SystemError};

/// Errors raised while building or configuring a [`Filtration`](super::Filtration) unit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FiltrationError {
    #[error(transparent)]
    Flowsheet(#[from] FlowsheetError),

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error(transparent)]
    System(#[from] SystemError),

    /// The component is not a solute of the unit's property package.
    #[error("{name} is not a solute of this unit")]
    UnknownSolute { name: String },
}
