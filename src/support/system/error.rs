use thiserror::Error;

use crate::support::units::Dimension;

/// Errors raised while manipulating an equation system.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SystemError {
    /// A scaling factor was zero, negative, or not finite.
    #[error("invalid scaling factor for {name}: {value}")]
    InvalidScalingFactor { name: String, value: f64 },

    /// A quantity was read from or written to a variable of another dimension.
    #[error("dimension mismatch for {name}: variable is {expected}, quantity is {found}")]
    DimensionMismatch {
        name: String,
        expected: Dimension,
        found: Dimension,
    },

    /// Terms of an equation do not share a dimension.
    #[error("inconsistent units in {equation}: {left} vs {right}")]
    InconsistentUnits {
        equation: String,
        left: Dimension,
        right: Dimension,
    },
}
