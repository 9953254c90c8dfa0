//! Unit normalisation for parameter filters and parameter values.
//!
//! Quantities are expressed in SI base units the same way the backing store records
//! `valueSI` / `unitSI`: derived and prefixed units are expanded into base units listed in the
//! order mass, length, time, current, temperature, luminous intensity, amount, angle, bit.
//! So `5 mm` becomes `0.005 m` and `1 kN` becomes `1000 (kg m) / s^2`.
pub mod dimension;
pub mod expr;
pub mod registry;

use scibridge_error::FilterError;

pub use dimension::{BaseDimension, Dimension};
pub use expr::UnitExpr;

/// Significant digits kept when re-expressing a value in a caller-chosen unit.
pub const DISPLAY_PRECISION: u32 = 3;

/// A magnitude together with the unit it is expressed in.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: String,
}

impl Quantity {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }
}

/// SI base-unit rendering of a dimension, e.g. `kg / (m s^2)`.
pub fn si_unit_for(dimension: Dimension) -> String {
    expr::format_parts(
        dimension
            .components()
            .map(|(base, power)| (base.si_symbol().to_string(), power))
            .collect(),
    )
}

/// Normalises `value unit` to SI base units.
pub fn convert_to_si(value: f64, unit: &str) -> Result<Quantity, FilterError> {
    let expr = UnitExpr::parse(unit)?;
    Ok(Quantity::new(expr.to_base(value), si_unit_for(expr.dimension()?)))
}

/// Re-expresses `value from` in `to`, rounded to [`DISPLAY_PRECISION`] significant digits.
pub fn convert_to_unit(value: f64, from: &str, to: &str) -> Result<Quantity, FilterError> {
    let source = UnitExpr::parse(from)?;
    let target = UnitExpr::parse(to)?;
    if source.dimension()? != target.dimension()? {
        return Err(FilterError::IncompatibleUnits {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    let converted = target.from_base(source.to_base(value));
    Ok(Quantity::new(
        round_significant(converted, DISPLAY_PRECISION),
        target.format(),
    ))
}

/// Rounds to `digits` significant digits; zero and non-finite values pass through.
pub fn round_significant(value: f64, digits: u32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    // Go through the decimal rendering so 0.1 + 0.2 style noise does not survive.
    let rendered = format!("{:.*e}", digits.saturating_sub(1) as usize, value);
    rendered.parse().unwrap_or(value)
}
