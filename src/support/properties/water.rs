use std::collections::HashMap;

use uom::si::{f64::MassDensity, mass_density::kilogram_per_cubic_meter};

use crate::support::constraint::{Constraint, ConstraintError, StrictlyPositive};

use super::{PropertyError, PropertyPackage};

/// Name of the solvent component.
pub const SOLVENT: &str = "H2O";

const DENS_MASS: f64 = 1000.0;
const TEMPERATURE_SCALING: f64 = 1e-2;
const PRESSURE_SCALING: f64 = 1e-5;

/// Liquid water carrying a user-defined set of solutes.
///
/// Density is constant. Default scaling factors for temperature and pressure
/// are preset; flow defaults must be registered with
/// [`set_default_scaling`](Self::set_default_scaling).
///
/// # Example
///
/// ```
/// use twine_treatment::support::properties::{PropertyPackage, WaterParameterBlock};
///
/// let mut properties = WaterParameterBlock::new(["NaCl", "TSS"]).unwrap();
/// properties
///     .set_default_scaling("flow_mass_phase_comp", 1e2, &["Liq", "NaCl"])
///     .unwrap();
///
/// assert_eq!(properties.components(), ["H2O", "NaCl", "TSS"]);
/// assert_eq!(
///     properties.default_scaling("flow_mass_phase_comp", &["Liq", "NaCl"]),
///     Some(1e2),
/// );
/// assert_eq!(properties.default_scaling("pressure", &[]), Some(1e-5));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WaterParameterBlock {
    components: Vec<String>,
    dens_mass: MassDensity,
    default_scaling: HashMap<(String, String), f64>,
}

impl WaterParameterBlock {
    /// Creates a package with `H2O` as solvent followed by `solutes`.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::InvalidComponentName`] for an empty name or one
    /// containing brackets, commas, dots or whitespace, and
    /// [`PropertyError::DuplicateComponent`] for a repeated name or a solute
    /// named like the solvent.
    pub fn new<I, S>(solutes: I) -> Result<Self, PropertyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut components = vec![SOLVENT.to_string()];
        for solute in solutes {
            let name = solute.into();
            if !is_valid_name(&name) {
                return Err(PropertyError::InvalidComponentName { name });
            }
            if components.contains(&name) {
                return Err(PropertyError::DuplicateComponent { name });
            }
            components.push(name);
        }

        let default_scaling = HashMap::from([
            (key("temperature", &[]), TEMPERATURE_SCALING),
            (key("pressure", &[]), PRESSURE_SCALING),
        ]);

        Ok(Self {
            components,
            dens_mass: MassDensity::new::<kilogram_per_cubic_meter>(DENS_MASS),
            default_scaling,
        })
    }

    /// Replaces the constant mass density.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::InvalidValue`] unless the density is strictly
    /// positive and finite.
    pub fn with_dens_mass(mut self, dens_mass: MassDensity) -> Result<Self, PropertyError> {
        check_positive_finite(dens_mass.value).map_err(|source| PropertyError::InvalidValue {
            name: "dens_mass".to_string(),
            source,
        })?;
        self.dens_mass = dens_mass;
        Ok(self)
    }

    /// Registers the default scaling factor for a state variable.
    ///
    /// `index` holds the variable's index values, such as `["Liq", "H2O"]`,
    /// and is empty for scalar variables.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::InvalidValue`] unless `value` is strictly
    /// positive and finite.
    pub fn set_default_scaling(
        &mut self,
        var: &str,
        value: f64,
        index: &[&str],
    ) -> Result<(), PropertyError> {
        let key = key(var, index);
        check_positive_finite(value).map_err(|source| PropertyError::InvalidValue {
            name: display_key(&key),
            source,
        })?;
        self.default_scaling.insert(key, value);
        Ok(())
    }
}

impl PropertyPackage for WaterParameterBlock {
    fn name(&self) -> &str {
        "water"
    }

    fn solvent(&self) -> &str {
        SOLVENT
    }

    fn components(&self) -> &[String] {
        &self.components
    }

    fn dens_mass(&self) -> MassDensity {
        self.dens_mass
    }

    fn default_scaling(&self, var: &str, index: &[&str]) -> Option<f64> {
        self.default_scaling.get(&key(var, index)).copied()
    }
}

fn key(var: &str, index: &[&str]) -> (String, String) {
    (var.to_string(), index.join(","))
}

fn display_key((var, index): &(String, String)) -> String {
    if index.is_empty() {
        var.clone()
    } else {
        format!("{var}[{index}]")
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '[' | ']' | ',' | '.'))
}

fn check_positive_finite(value: f64) -> Result<(), ConstraintError> {
    StrictlyPositive::check(&value)?;
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConstraintError::AboveMaximum)
    }
}
