use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};

use crate::support::system::{EquationId, System, VarId};

/// A square subsystem viewed through its scaling factors.
///
/// Residuals are multiplied by equation factors and variables by their own
/// factors. A missing factor counts as 1.
pub(super) struct ScaledProblem<'a> {
    system: &'a System,
    equations: &'a [EquationId],
    vars: &'a [VarId],
    columns: HashMap<VarId, usize>,
    eq_scale: Vec<f64>,
    var_scale: Vec<f64>,
}

impl<'a> ScaledProblem<'a> {
    pub(super) fn new(system: &'a System, equations: &'a [EquationId], vars: &'a [VarId]) -> Self {
        let columns = vars.iter().enumerate().map(|(j, id)| (*id, j)).collect();
        let eq_scale = equations
            .iter()
            .map(|id| system.equation_scaling_factor(*id).unwrap_or(1.0))
            .collect();
        let var_scale = vars
            .iter()
            .map(|id| system.scaling_factor(*id).unwrap_or(1.0))
            .collect();
        Self {
            system,
            equations,
            vars,
            columns,
            eq_scale,
            var_scale,
        }
    }

    pub(super) fn vars(&self) -> &[VarId] {
        self.vars
    }

    pub(super) fn residuals(&self, values: &[f64]) -> DVector<f64> {
        DVector::from_iterator(
            self.equations.len(),
            self.equations
                .iter()
                .zip(&self.eq_scale)
                .map(|(id, s)| s * self.system.residual_at(*id, values)),
        )
    }

    /// Jacobian of the scaled residuals with respect to the scaled variables.
    pub(super) fn jacobian(&self, values: &[f64]) -> DMatrix<f64> {
        let n = self.equations.len();
        let mut jacobian = DMatrix::zeros(n, self.vars.len());
        for (i, id) in self.equations.iter().enumerate() {
            for var in self.system.equation(*id).variables() {
                if let Some(&j) = self.columns.get(var) {
                    jacobian[(i, j)] = self.eq_scale[i] * self.system.partial_at(*id, values, *var)
                        / self.var_scale[j];
                }
            }
        }
        jacobian
    }

    /// Converts a step in scaled variables back to SI units.
    pub(super) fn unscale_step(&self, step: &DVector<f64>) -> Vec<f64> {
        step.iter()
            .zip(&self.var_scale)
            .map(|(dx, v)| dx / v)
            .collect()
    }
}
