use thiserror::Error;

use crate::support::{
    properties::PropertyError,
    solver::{SolveError, TerminationCondition},
};

/// Errors raised while assembling or preparing a flowsheet.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowsheetError {
    #[error("unit {name} already exists")]
    DuplicateUnit { name: String },

    #[error("unknown unit {name}")]
    UnknownUnit { name: String },

    #[error("failed to scale {unit}")]
    Scaling {
        unit: String,
        #[source]
        source: PropertyError,
    },

    #[error("failed to initialize {unit}")]
    Initialize {
        unit: String,
        #[source]
        source: InitializeError,
    },
}

/// Errors raised by a unit model's initialization routine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InitializeError {
    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error(transparent)]
    Solve(#[from] SolveError),

    /// The unit's local solve did not reach an optimal point.
    #[error("local solve terminated with {termination}")]
    NotOptimal { termination: TerminationCondition },

    /// Initialization left the flowsheet with different degrees of freedom.
    #[error("degrees of freedom changed from {before} to {after}")]
    DegreesOfFreedomChanged { before: i64, after: i64 },
}
