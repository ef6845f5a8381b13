use std::fmt;

/// Why the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationCondition {
    /// Scaled residuals are within tolerance.
    Optimal,

    /// The iteration limit was reached first.
    MaxIterations,

    /// The Jacobian could not be factorized.
    SingularJacobian,

    /// A residual or step evaluated to NaN or infinity.
    NonFinite,
}

impl fmt::Display for TerminationCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Optimal => "optimal",
            Self::MaxIterations => "maximum iterations",
            Self::SingularJacobian => "singular jacobian",
            Self::NonFinite => "non-finite evaluation",
        };
        f.write_str(text)
    }
}

/// Outcome of a Newton solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveResults {
    pub termination: TerminationCondition,

    /// Newton iterations performed.
    pub iters: usize,

    /// Infinity norm of the scaled residuals at the final point.
    pub residual: f64,
}

impl SolveResults {
    #[must_use]
    pub fn is_optimal(&self) -> bool {
        self.termination == TerminationCondition::Optimal
    }
}

/// Returns `true` if the solve terminated with an optimal status.
#[must_use]
pub fn check_optimal_termination(results: &SolveResults) -> bool {
    results.is_optimal()
}
