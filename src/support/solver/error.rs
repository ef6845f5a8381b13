use thiserror::Error;

/// Structural errors that prevent a solve from starting.
///
/// A solve that starts but fails to converge is not an error; it is reported
/// through [`SolveResults::termination`](super::SolveResults::termination).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// The equations do not form a square system.
    #[error("system is not square: {dof} degrees of freedom")]
    NotSquare { dof: i64 },

    /// The solver configuration is invalid.
    #[error("invalid solver config: {reason}")]
    InvalidConfig { reason: &'static str },
}
