//! Equation-oriented model storage.
//!
//! A [`System`] owns every variable and equation of a flowsheet. Unit models
//! and property packages declare their variables and equations into it, and
//! the workflow then fixes inputs, assigns scaling factors, checks units and
//! degrees of freedom, and hands the system to a
//! [`NewtonSolver`](crate::support::solver::NewtonSolver).
//!
//! Values are stored in SI units. Use [`System::fix_quantity`] and
//! [`System::quantity`] to cross the boundary with [`uom`] quantities.

mod equation;
mod error;
mod expr;
mod var;

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

pub use equation::{Equation, EquationId};
pub use error::SystemError;
pub use expr::Expr;
pub use var::{Bounds, VarId, VarSpec, Variable};

use crate::support::{
    constraint::{Constraint, StrictlyPositive},
    units::{Dimension, Dimensioned},
};

/// Variables and equations of an algebraic model.
#[derive(Debug, Clone, Default)]
pub struct System {
    vars: Vec<Variable>,
    equations: Vec<Equation>,
    names: HashMap<String, VarId>,
}

impl System {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a new variable.
    ///
    /// Names are expected to be unique within a system. A repeated name still
    /// declares a new variable, but [`System::find_var`] keeps resolving to
    /// the first one.
    pub fn add_var(&mut self, name: impl Into<String>, spec: VarSpec) -> VarId {
        let name = name.into();
        let id = VarId(self.vars.len());
        if self.names.contains_key(&name) {
            warn!(name = name.as_str(), "duplicate variable name");
        } else {
            self.names.insert(name.clone(), id);
        }
        self.vars.push(Variable::new(name, spec));
        id
    }

    /// Declares a new active equation `lhs == rhs`.
    pub fn add_equation(
        &mut self,
        name: impl Into<String>,
        lhs: impl Into<Expr>,
        rhs: impl Into<Expr>,
    ) -> EquationId {
        let id = EquationId(self.equations.len());
        self.equations
            .push(Equation::new(name.into(), lhs.into(), rhs.into()));
        id
    }

    #[must_use]
    pub fn var(&self, id: VarId) -> &Variable {
        &self.vars[id.0]
    }

    #[must_use]
    pub fn equation(&self, id: EquationId) -> &Equation {
        &self.equations[id.0]
    }

    /// Looks up a variable by its full name.
    #[must_use]
    pub fn find_var(&self, name: &str) -> Option<VarId> {
        self.names.get(name).copied()
    }

    pub fn variables(&self) -> impl Iterator<Item = (VarId, &Variable)> {
        self.vars.iter().enumerate().map(|(i, v)| (VarId(i), v))
    }

    pub fn equations(&self) -> impl Iterator<Item = (EquationId, &Equation)> {
        self.equations
            .iter()
            .enumerate()
            .map(|(i, e)| (EquationId(i), e))
    }

    #[must_use]
    pub fn n_vars(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn n_equations(&self) -> usize {
        self.equations.len()
    }

    /// Current SI value of a variable.
    #[must_use]
    pub fn value(&self, id: VarId) -> f64 {
        self.vars[id.0].value
    }

    /// Sets the SI value of a variable without changing whether it is fixed.
    pub fn set_value(&mut self, id: VarId, value: f64) {
        self.vars[id.0].value = value;
    }

    /// Reads a variable as a [`uom`] quantity.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::DimensionMismatch`] if `Q` has another dimension.
    pub fn quantity<Q: Dimensioned>(&self, id: VarId) -> Result<Q, SystemError> {
        let var = &self.vars[id.0];
        check_dimension::<Q>(var)?;
        Ok(Q::from_si(var.value))
    }

    /// Fixes a variable at an SI value.
    pub fn fix(&mut self, id: VarId, value: f64) {
        let var = &mut self.vars[id.0];
        var.value = value;
        var.fixed = true;
    }

    /// Fixes a variable at the value of a [`uom`] quantity.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::DimensionMismatch`] if `Q` has another dimension.
    pub fn fix_quantity<Q: Dimensioned>(&mut self, id: VarId, quantity: Q) -> Result<(), SystemError> {
        check_dimension::<Q>(&self.vars[id.0])?;
        self.fix(id, quantity.to_si());
        Ok(())
    }

    pub fn unfix(&mut self, id: VarId) {
        self.vars[id.0].fixed = false;
    }

    #[must_use]
    pub fn is_fixed(&self, id: VarId) -> bool {
        self.vars[id.0].fixed
    }

    pub fn set_bounds(&mut self, id: VarId, bounds: Bounds) {
        self.vars[id.0].bounds = bounds;
    }

    pub fn activate(&mut self, id: EquationId) {
        self.equations[id.0].active = true;
    }

    pub fn deactivate(&mut self, id: EquationId) {
        self.equations[id.0].active = false;
    }

    /// Sets the scaling factor of a variable.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::InvalidScalingFactor`] unless the factor is
    /// strictly positive and finite.
    pub fn set_scaling_factor(&mut self, id: VarId, factor: f64) -> Result<(), SystemError> {
        let var = &mut self.vars[id.0];
        validate_scaling_factor(&var.name, factor)?;
        var.scaling_factor = Some(factor);
        Ok(())
    }

    #[must_use]
    pub fn scaling_factor(&self, id: VarId) -> Option<f64> {
        self.vars[id.0].scaling_factor
    }

    /// Sets the scaling factor applied to an equation's residual.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::InvalidScalingFactor`] unless the factor is
    /// strictly positive and finite.
    pub fn set_equation_scaling_factor(
        &mut self,
        id: EquationId,
        factor: f64,
    ) -> Result<(), SystemError> {
        let equation = &mut self.equations[id.0];
        validate_scaling_factor(&equation.name, factor)?;
        equation.scaling_factor = Some(factor);
        Ok(())
    }

    #[must_use]
    pub fn equation_scaling_factor(&self, id: EquationId) -> Option<f64> {
        self.equations[id.0].scaling_factor
    }

    /// Active equations in declaration order.
    #[must_use]
    pub fn active_equations(&self) -> Vec<EquationId> {
        self.equations()
            .filter(|(_, e)| e.active)
            .map(|(id, _)| id)
            .collect()
    }

    /// Unfixed variables appearing in any of the given equations, in index order.
    #[must_use]
    pub fn free_variables_of(&self, equations: &[EquationId]) -> Vec<VarId> {
        let mut vars = BTreeSet::new();
        for id in equations {
            vars.extend(
                self.equations[id.0]
                    .variables()
                    .iter()
                    .filter(|v| !self.vars[v.0].fixed),
            );
        }
        vars.into_iter().collect()
    }

    /// Unfixed variables in active equations minus the number of active equations.
    #[must_use]
    pub fn degrees_of_freedom(&self) -> i64 {
        self.degrees_of_freedom_of(&self.active_equations())
    }

    /// Degrees of freedom of the subsystem formed by the given equations.
    #[must_use]
    pub fn degrees_of_freedom_of(&self, equations: &[EquationId]) -> i64 {
        let free = self.free_variables_of(equations).len();
        to_i64(free) - to_i64(equations.len())
    }

    /// Checks that both sides and every sum in every equation share a dimension.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::InconsistentUnits`] for the first offending equation.
    pub fn assert_units_consistent(&self) -> Result<(), SystemError> {
        let dimension_of = |id: VarId| self.vars[id.0].dimension;
        for equation in &self.equations {
            let inconsistent = |left: Dimension, right: Dimension| SystemError::InconsistentUnits {
                equation: equation.name.clone(),
                left,
                right,
            };
            let lhs = equation
                .lhs
                .dimension(&dimension_of)
                .map_err(|c| inconsistent(c.left, c.right))?;
            let rhs = equation
                .rhs
                .dimension(&dimension_of)
                .map_err(|c| inconsistent(c.left, c.right))?;
            if lhs != rhs {
                return Err(inconsistent(lhs, rhs));
            }
        }
        Ok(())
    }

    /// Unscaled residual of an equation at the current values.
    #[must_use]
    pub fn residual(&self, id: EquationId) -> f64 {
        self.equations[id.0].residual(&self.values())
    }

    /// Largest absolute unscaled residual over the active equations.
    #[must_use]
    pub fn max_residual(&self) -> f64 {
        let values = self.values();
        self.equations
            .iter()
            .filter(|e| e.active)
            .map(|e| e.residual(&values).abs())
            .fold(0.0, f64::max)
    }

    pub(crate) fn values(&self) -> Vec<f64> {
        self.vars.iter().map(|v| v.value).collect()
    }

    /// Writes back values for the given variables from a full value vector.
    pub(crate) fn store_values(&mut self, vars: &[VarId], values: &[f64]) {
        for id in vars {
            self.vars[id.0].value = values[id.0];
        }
    }

    pub(crate) fn residual_at(&self, id: EquationId, values: &[f64]) -> f64 {
        self.equations[id.0].residual(values)
    }

    pub(crate) fn partial_at(&self, id: EquationId, values: &[f64], wrt: VarId) -> f64 {
        self.equations[id.0].partial(values, wrt)
    }
}

fn check_dimension<Q: Dimensioned>(var: &Variable) -> Result<(), SystemError> {
    if var.dimension == Q::DIMENSION {
        Ok(())
    } else {
        Err(SystemError::DimensionMismatch {
            name: var.name.clone(),
            expected: var.dimension,
            found: Q::DIMENSION,
        })
    }
}

fn validate_scaling_factor(name: &str, factor: f64) -> Result<(), SystemError> {
    if StrictlyPositive::check(&factor).is_err() || !factor.is_finite() {
        return Err(SystemError::InvalidScalingFactor {
            name: name.to_string(),
            value: factor,
        });
    }
    Ok(())
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
