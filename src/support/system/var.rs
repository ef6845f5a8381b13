use std::fmt;

use crate::support::units::Dimension;

/// Index of a variable within a [`System`](super::System).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub(super) usize);

impl VarId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Optional lower and upper bounds on a variable, in SI units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl Bounds {
    pub const UNBOUNDED: Self = Self {
        lower: None,
        upper: None,
    };

    #[must_use]
    pub fn new(lower: Option<f64>, upper: Option<f64>) -> Self {
        Self { lower, upper }
    }

    /// Bounds for a non-negative quantity.
    #[must_use]
    pub fn non_negative() -> Self {
        Self::new(Some(0.0), None)
    }

    /// Bounds for a fraction in `[0, 1]`.
    #[must_use]
    pub fn unit_interval() -> Self {
        Self::new(Some(0.0), Some(1.0))
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.lower.is_none_or(|lower| value >= lower)
            && self.upper.is_none_or(|upper| value <= upper)
    }
}

/// `(lower, upper)` with `None` for a missing bound.
impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |bound: Option<f64>| bound.map_or_else(|| "None".to_string(), |b| b.to_string());
        write!(f, "({}, {})", show(self.lower), show(self.upper))
    }
}

/// Declaration of a new variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarSpec {
    pub dimension: Dimension,
    pub value: f64,
    pub bounds: Bounds,
}

impl VarSpec {
    /// An unbounded variable of the given dimension initialized to zero.
    #[must_use]
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            value: 0.0,
            bounds: Bounds::UNBOUNDED,
        }
    }

    #[must_use]
    pub fn with_value(self, value: f64) -> Self {
        Self { value, ..self }
    }

    #[must_use]
    pub fn with_bounds(self, bounds: Bounds) -> Self {
        Self { bounds, ..self }
    }
}

/// A variable stored in a [`System`](super::System).
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub(super) name: String,
    pub(super) value: f64,
    pub(super) fixed: bool,
    pub(super) bounds: Bounds,
    pub(super) dimension: Dimension,
    pub(super) scaling_factor: Option<f64>,
}

impl Variable {
    pub(super) fn new(name: String, spec: VarSpec) -> Self {
        Self {
            name,
            value: spec.value,
            fixed: false,
            bounds: spec.bounds,
            dimension: spec.dimension,
            scaling_factor: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value in SI units.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[must_use]
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    #[must_use]
    pub fn scaling_factor(&self) -> Option<f64> {
        self.scaling_factor
    }
}
