use thiserror::Error;

use crate::support::{constraint::ConstraintError, system::SystemError};

/// Errors raised by property packages and their state blocks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    /// A component name is empty or contains a reserved character.
    #[error("invalid component name: {name:?}")]
    InvalidComponentName { name: String },

    /// A component was declared more than once.
    #[error("duplicate component: {name}")]
    DuplicateComponent { name: String },

    /// The component is not part of the package.
    #[error("unknown component: {name}")]
    UnknownComponent { name: String },

    /// A stream did not specify a flow for one of the package's components.
    #[error("missing flow for component {name}")]
    MissingComponent { name: String },

    /// A derived property needs a non-zero total flow.
    #[error("state block {block} has no flow")]
    NoFlow { block: String },

    /// A default scaling factor or density was rejected.
    #[error("invalid value for {name}")]
    InvalidValue {
        name: String,
        #[source]
        source: ConstraintError,
    },

    #[error(transparent)]
    System(#[from] SystemError),
}
