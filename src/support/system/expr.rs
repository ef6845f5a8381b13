use std::{
    collections::BTreeSet,
    ops::{Add, Div, Mul, Neg, Sub},
};

use crate::support::units::{Dimension, Dimensioned};

use super::VarId;

/// An algebraic expression over system variables.
///
/// Expressions are built with the usual arithmetic operators on [`Expr`]
/// and [`VarId`]:
///
/// ```
/// use twine_treatment::support::system::{Expr, System, VarSpec};
/// use twine_treatment::support::units::Dimension;
///
/// let mut system = System::new();
/// let flow_in = system.add_var("flow_in", VarSpec::new(Dimension::MASS_RATE));
/// let recovery = system.add_var("recovery", VarSpec::new(Dimension::NONE));
///
/// let recovered: Expr = recovery * flow_in;
/// # let _ = recovered;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Var(VarId),
    Const { value: f64, dimension: Dimension },
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
}

/// Which operands of a sum disagree on their dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct DimensionConflict {
    pub(super) left: Dimension,
    pub(super) right: Dimension,
}

impl Expr {
    /// A dimensionless constant.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::Const {
            value,
            dimension: Dimension::NONE,
        }
    }

    /// A dimensioned constant taken from a [`uom`] quantity.
    #[must_use]
    pub fn quantity<Q: Dimensioned>(quantity: Q) -> Self {
        Self::Const {
            value: quantity.to_si(),
            dimension: Q::DIMENSION,
        }
    }

    /// Evaluates the expression for the given variable values.
    pub(super) fn eval(&self, values: &[f64]) -> f64 {
        match self {
            Self::Var(id) => values[id.0],
            Self::Const { value, .. } => *value,
            Self::Add(a, b) => a.eval(values) + b.eval(values),
            Self::Sub(a, b) => a.eval(values) - b.eval(values),
            Self::Mul(a, b) => a.eval(values) * b.eval(values),
            Self::Div(a, b) => a.eval(values) / b.eval(values),
            Self::Neg(a) => -a.eval(values),
        }
    }

    /// Evaluates the expression and its partial derivative with respect to `wrt`.
    ///
    /// Returns `(value, derivative)` using forward-mode differentiation.
    pub(super) fn eval_partial(&self, values: &[f64], wrt: VarId) -> (f64, f64) {
        match self {
            Self::Var(id) => (values[id.0], if *id == wrt { 1.0 } else { 0.0 }),
            Self::Const { value, .. } => (*value, 0.0),
            Self::Add(a, b) => {
                let (va, da) = a.eval_partial(values, wrt);
                let (vb, db) = b.eval_partial(values, wrt);
                (va + vb, da + db)
            }
            Self::Sub(a, b) => {
                let (va, da) = a.eval_partial(values, wrt);
                let (vb, db) = b.eval_partial(values, wrt);
                (va - vb, da - db)
            }
            Self::Mul(a, b) => {
                let (va, da) = a.eval_partial(values, wrt);
                let (vb, db) = b.eval_partial(values, wrt);
                (va * vb, da * vb + va * db)
            }
            Self::Div(a, b) => {
                let (va, da) = a.eval_partial(values, wrt);
                let (vb, db) = b.eval_partial(values, wrt);
                (va / vb, (da * vb - va * db) / (vb * vb))
            }
            Self::Neg(a) => {
                let (va, da) = a.eval_partial(values, wrt);
                (-va, -da)
            }
        }
    }

    /// Infers the dimension of the expression.
    ///
    /// # Errors
    ///
    /// Returns the first conflict found between the operands of a sum or difference.
    pub(super) fn dimension(
        &self,
        dimension_of: &impl Fn(VarId) -> Dimension,
    ) -> Result<Dimension, DimensionConflict> {
        match self {
            Self::Var(id) => Ok(dimension_of(*id)),
            Self::Const { dimension, .. } => Ok(*dimension),
            Self::Add(a, b) | Self::Sub(a, b) => {
                let left = a.dimension(dimension_of)?;
                let right = b.dimension(dimension_of)?;
                if left == right {
                    Ok(left)
                } else {
                    Err(DimensionConflict { left, right })
                }
            }
            Self::Mul(a, b) => Ok(a.dimension(dimension_of)? * b.dimension(dimension_of)?),
            Self::Div(a, b) => Ok(a.dimension(dimension_of)? / b.dimension(dimension_of)?),
            Self::Neg(a) => a.dimension(dimension_of),
        }
    }

    /// Adds every variable referenced by the expression to `out`.
    pub(super) fn collect_vars(&self, out: &mut BTreeSet<VarId>) {
        match self {
            Self::Var(id) => {
                out.insert(*id);
            }
            Self::Const { .. } => {}
            Self::Add(a, b) | Self::Sub(a, b) | Self::Mul(a, b) | Self::Div(a, b) => {
                a.collect_vars(out);
                b.collect_vars(out);
            }
            Self::Neg(a) => a.collect_vars(out),
        }
    }
}

impl From<VarId> for Expr {
    fn from(id: VarId) -> Self {
        Self::Var(id)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

macro_rules! impl_binary_op {
    ($($op:ident, $method:ident, $variant:ident;)*) => {
        $(
            impl<R: Into<Expr>> $op<R> for Expr {
                type Output = Expr;

                fn $method(self, rhs: R) -> Expr {
                    Expr::$variant(Box::new(self), Box::new(rhs.into()))
                }
            }

            impl<R: Into<Expr>> $op<R> for VarId {
                type Output = Expr;

                fn $method(self, rhs: R) -> Expr {
                    Expr::$variant(Box::new(Expr::Var(self)), Box::new(rhs.into()))
                }
            }
        )*
    };
}

impl_binary_op! {
    Add, add, Add;
    Sub, sub, Sub;
    Mul, mul, Mul;
    Div, div, Div;
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Neg(Box::new(self))
    }
}

impl Neg for VarId {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Neg(Box::new(Expr::Var(self)))
    }
}
