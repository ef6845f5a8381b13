use thiserror::Error;
use twine_solvers::equation::bisection;
use uom::si::f64::MassRate;

use crate::support::{flowsheet::InitializeError, properties::PropertyError};

/// Errors that can occur while solving for a target outlet water flow.
#[derive(Debug, Error)]
pub enum GivenOutletFlowError {
    /// The target exceeds the water entering the unit.
    #[error("target outlet flow {target:?} exceeds inlet flow {available:?}")]
    Unreachable {
        target: MassRate,
        available: MassRate,
    },

    #[error(transparent)]
    Property(#[from] PropertyError),

    /// The unit's local solve failed at a bracket endpoint.
    #[error("local solve failed")]
    Initialize(#[from] InitializeError),

    /// The bisection solver encountered an error.
    #[error("bisection solver error")]
    Bisection(#[from] bisection::Error),

    /// The solver stopped without converging.
    #[error("solver did not converge: residual={residual:?}")]
    NotConverged {
        /// Outlet water flow residual at the best recovery found.
        residual: MassRate,

        /// Iteration count performed by the solver.
        iters: usize,
    },
}
