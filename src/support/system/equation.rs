use std::collections::BTreeSet;

use super::{Expr, VarId};

/// Index of an equation within a [`System`](super::System).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EquationId(pub(super) usize);

impl EquationId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named equality constraint `lhs == rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub(super) name: String,
    pub(super) lhs: Expr,
    pub(super) rhs: Expr,
    pub(super) active: bool,
    pub(super) scaling_factor: Option<f64>,
    vars: Vec<VarId>,
}

impl Equation {
    pub(super) fn new(name: String, lhs: Expr, rhs: Expr) -> Self {
        let mut vars = BTreeSet::new();
        lhs.collect_vars(&mut vars);
        rhs.collect_vars(&mut vars);
        Self {
            name,
            lhs,
            rhs,
            active: true,
            scaling_factor: None,
            vars: vars.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn scaling_factor(&self) -> Option<f64> {
        self.scaling_factor
    }

    /// Variables referenced by either side, in index order.
    #[must_use]
    pub fn variables(&self) -> &[VarId] {
        &self.vars
    }

    /// Unscaled residual `lhs - rhs`.
    pub(super) fn residual(&self, values: &[f64]) -> f64 {
        self.lhs.eval(values) - self.rhs.eval(values)
    }

    /// Partial derivative of the residual with respect to `wrt`.
    pub(super) fn partial(&self, values: &[f64], wrt: VarId) -> f64 {
        let (_, d_lhs) = self.lhs.eval_partial(values, wrt);
        let (_, d_rhs) = self.rhs.eval_partial(values, wrt);
        d_lhs - d_rhs
    }
}
