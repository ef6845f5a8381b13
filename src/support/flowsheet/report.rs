use std::fmt;

use crate::support::{
    properties::{PropertyPackage, StateBlock},
    system::{Bounds, System},
    units::Dimension,
};

use super::UnitModel;

const WIDTH: usize = 84;

/// Snapshot of a unit's performance variables and port streams.
///
/// The [`Display`](fmt::Display) output follows the usual unit report
/// layout: a performance table followed by a stream table with one column
/// per port.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitReport {
    pub unit: String,
    pub performance: Vec<PerformanceEntry>,
    pub streams: StreamTable,
}

/// One row of the unit performance table.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceEntry {
    pub key: String,
    pub value: f64,
    pub units: Dimension,
    pub fixed: bool,
    pub bounds: Bounds,
}

/// State variables of every port, one column per port.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreamTable {
    pub ports: Vec<String>,
    pub rows: Vec<StreamRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamRow {
    pub key: String,
    pub units: Dimension,
    pub values: Vec<f64>,
}

impl StreamTable {
    /// Value of a row at a port.
    #[must_use]
    pub fn value(&self, key: &str, port: &str) -> Option<f64> {
        let column = self.ports.iter().position(|p| p == port)?;
        let row = self.rows.iter().find(|r| r.key == key)?;
        row.values.get(column).copied()
    }
}

impl UnitReport {
    pub(super) fn new<P: PropertyPackage>(system: &System, unit: &dyn UnitModel<P>) -> Self {
        let prefix = format!("{}.", unit.name());

        let performance = unit
            .performance_vars()
            .into_iter()
            .map(|id| {
                let var = system.var(id);
                PerformanceEntry {
                    key: strip(var.name(), &prefix),
                    value: var.value(),
                    units: var.dimension(),
                    fixed: var.is_fixed(),
                    bounds: var.bounds(),
                }
            })
            .collect();

        Self {
            unit: unit.name().to_string(),
            performance,
            streams: stream_table(system, &unit.ports()),
        }
    }
}

fn stream_table(system: &System, ports: &[(&str, &StateBlock)]) -> StreamTable {
    let Some((_, first)) = ports.first() else {
        return StreamTable::default();
    };
    let prefix = format!("{}.", first.name());

    let rows = first
        .state_vars()
        .into_iter()
        .enumerate()
        .map(|(i, id)| {
            let var = system.var(id);
            StreamRow {
                key: strip(var.name(), &prefix),
                units: var.dimension(),
                values: ports
                    .iter()
                    .map(|(_, block)| {
                        block
                            .state_vars()
                            .get(i)
                            .map_or(f64::NAN, |id| system.value(*id))
                    })
                    .collect(),
            }
        })
        .collect();

    StreamTable {
        ports: ports.iter().map(|(name, _)| (*name).to_string()).collect(),
        rows,
    }
}

fn strip(name: &str, prefix: &str) -> String {
    name.strip_prefix(prefix).unwrap_or(name).to_string()
}

impl fmt::Display for UnitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heavy = "=".repeat(WIDTH);
        let light = "-".repeat(WIDTH);

        writeln!(f, "{heavy}")?;
        let title = format!("Unit : {}", self.unit);
        writeln!(f, "{title}{:>width$}", "Time: 0.0", width = WIDTH.saturating_sub(title.len()))?;
        writeln!(f, "{light}")?;

        writeln!(f, "    Unit Performance")?;
        writeln!(f)?;
        writeln!(f, "    Variables: ")?;
        writeln!(f)?;
        let key_width = self
            .performance
            .iter()
            .map(|e| e.key.chars().count())
            .max()
            .unwrap_or(0)
            .max(3);
        let units_width = self
            .performance
            .iter()
            .map(|e| e.units.to_string().chars().count())
            .max()
            .unwrap_or(0)
            .max(5);
        writeln!(
            f,
            "    {:<key_width$} : {:<10} : {:<units_width$} : Fixed : Bounds",
            "Key", "Value", "Units"
        )?;
        for entry in &self.performance {
            writeln!(
                f,
                "    {:<key_width$} : {:<10} : {:<units_width$} : {:>5} : {}",
                entry.key,
                sig_figs(entry.value),
                entry.units.to_string(),
                entry.fixed,
                entry.bounds,
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{light}")?;

        writeln!(f, "    Stream Table")?;
        let key_width = self
            .streams
            .rows
            .iter()
            .map(|r| r.key.chars().count())
            .max()
            .unwrap_or(0);
        let units_width = self
            .streams
            .rows
            .iter()
            .map(|r| r.units.to_string().chars().count())
            .max()
            .unwrap_or(0)
            .max(5);
        write!(f, "    {:<key_width$} {:>units_width$}", "", "Units")?;
        for port in &self.streams.ports {
            write!(f, " {port:>10}")?;
        }
        writeln!(f)?;
        for row in &self.streams.rows {
            write!(
                f,
                "    {:<key_width$} {:>units_width$}",
                row.key,
                row.units.to_string()
            )?;
            for value in &row.values {
                write!(f, " {:>10}", sig_figs(*value))?;
            }
            writeln!(f)?;
        }
        writeln!(f, "{heavy}")
    }
}

/// Formats a value with five significant figures.
///
/// The exponent is read back from the rounded scientific form, so a value
/// that rounds up to the next power of ten keeps five digits.
fn sig_figs(value: f64) -> String {
    const DIGITS: i32 = 5;

    if value == 0.0 || !value.is_finite() {
        return format!("{value:.4}");
    }
    let scientific = format!("{value:.4e}");
    let Some(exponent) = scientific
        .rsplit_once('e')
        .and_then(|(_, exponent)| exponent.parse::<i32>().ok())
    else {
        return scientific;
    };
    if !(-4..DIGITS).contains(&exponent) {
        return scientific;
    }
    // exponent is in [-4, 5), so this is in [0, 8].
    let decimals = usize::try_from(DIGITS - 1 - exponent).unwrap_or(0);
    format!("{value:.decimals$}")
}
