//! Steady-state flowsheet container.
//!
//! A [`Flowsheet`] owns one property package, one equation [`System`] and the
//! unit models built into it. Unit models add their variables and equations
//! to the shared system when they are built and register themselves so the
//! flowsheet can scale, initialize and report them.

mod error;
mod report;
mod unit;

pub use error::{FlowsheetError, InitializeError};
pub use report::{PerformanceEntry, StreamRow, StreamTable, UnitReport};
pub use unit::UnitModel;

use tracing::debug;

use crate::support::{
    properties::PropertyPackage,
    solver::{NewtonSolver, SolveError, SolveResults},
    system::{System, SystemError, VarId},
    units::Dimensioned,
};

/// Name given to the top-level flowsheet block.
pub const FLOWSHEET_NAME: &str = "fs";

/// A steady-state flowsheet bound to one property package.
pub struct Flowsheet<P: PropertyPackage> {
    properties: P,
    system: System,
    units: Vec<Box<dyn UnitModel<P>>>,
}

impl<P: PropertyPackage> Flowsheet<P> {
    #[must_use]
    pub fn new(properties: P) -> Self {
        Self {
            properties,
            system: System::new(),
            units: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        FLOWSHEET_NAME
    }

    #[must_use]
    pub fn properties(&self) -> &P {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut P {
        &mut self.properties
    }

    #[must_use]
    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut System {
        &mut self.system
    }

    /// Fixes a variable at a [`uom`] quantity.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::DimensionMismatch`] if `Q` has another dimension.
    pub fn fix<Q: Dimensioned>(&mut self, id: VarId, quantity: Q) -> Result<(), SystemError> {
        self.system.fix_quantity(id, quantity)
    }

    #[must_use]
    pub fn degrees_of_freedom(&self) -> i64 {
        self.system.degrees_of_freedom()
    }

    /// Checks the units of every equation in the flowsheet.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::InconsistentUnits`] for the first offending equation.
    pub fn assert_units_consistent(&self) -> Result<(), SystemError> {
        self.system.assert_units_consistent()
    }

    /// Full name of a child block, such as `fs.unit`.
    #[must_use]
    pub fn child_name(&self, name: &str) -> String {
        format!("{FLOWSHEET_NAME}.{name}")
    }

    /// Registers a unit model.
    ///
    /// # Errors
    ///
    /// Returns [`FlowsheetError::DuplicateUnit`] if a unit of the same name exists.
    pub fn add_unit(&mut self, unit: impl UnitModel<P> + 'static) -> Result<(), FlowsheetError> {
        if self.has_unit(unit.name()) {
            return Err(FlowsheetError::DuplicateUnit {
                name: unit.name().to_string(),
            });
        }
        self.units.push(Box::new(unit));
        Ok(())
    }

    /// Whether a unit with the given full name is registered.
    #[must_use]
    pub fn has_unit(&self, name: &str) -> bool {
        self.units.iter().any(|u| u.name() == name)
    }

    /// Scales every unit's variables and equations.
    ///
    /// Factors the user has already set are kept.
    ///
    /// # Errors
    ///
    /// Returns [`FlowsheetError::Scaling`] naming the unit that failed.
    pub fn calculate_scaling_factors(&mut self) -> Result<(), FlowsheetError> {
        for unit in &self.units {
            unit.calculate_scaling_factors(&mut self.system, &self.properties)
                .map_err(|source| FlowsheetError::Scaling {
                    unit: unit.name().to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Initializes every unit in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`FlowsheetError::Initialize`] naming the unit that failed,
    /// including a unit whose routine changed the degrees of freedom.
    pub fn initialize(&mut self, solver: &NewtonSolver) -> Result<(), FlowsheetError> {
        for unit in &self.units {
            let failed = |source| FlowsheetError::Initialize {
                unit: unit.name().to_string(),
                source,
            };

            let before = self.system.degrees_of_freedom();
            unit.initialize(&mut self.system, &self.properties, solver)
                .map_err(failed)?;
            let after = self.system.degrees_of_freedom();
            if before != after {
                return Err(failed(InitializeError::DegreesOfFreedomChanged {
                    before,
                    after,
                }));
            }
            debug!(unit = unit.name(), "initialized");
        }
        Ok(())
    }

    /// Solves every active equation in the flowsheet.
    ///
    /// # Errors
    ///
    /// Returns a [`SolveError`] if the solve could not start.
    pub fn solve(&mut self, solver: &NewtonSolver) -> Result<SolveResults, SolveError> {
        solver.solve(&mut self.system)
    }

    /// Report for the unit with the given full name.
    ///
    /// # Errors
    ///
    /// Returns [`FlowsheetError::UnknownUnit`] if no such unit exists.
    pub fn report(&self, name: &str) -> Result<UnitReport, FlowsheetError> {
        self.units
            .iter()
            .find(|u| u.name() == name)
            .map(|unit| UnitReport::new(&self.system, unit.as_ref()))
            .ok_or_else(|| FlowsheetError::UnknownUnit {
                name: name.to_string(),
            })
    }

    /// Reports for every unit in registration order.
    #[must_use]
    pub fn reports(&self) -> Vec<UnitReport> {
        self.units
            .iter()
            .map(|unit| UnitReport::new(&self.system, unit.as_ref()))
            .collect()
    }

    /// Splits the borrow between the system and the property package.
    pub(crate) fn parts_mut(&mut self) -> (&mut System, &P) {
        (&mut self.system, &self.properties)
    }
}
