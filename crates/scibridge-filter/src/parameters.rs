//! Scientific-metadata predicates: `{name, value, unit}` to native `valueSI` / `unitSI` paths.
use serde_json::{Map, Value};

use scibridge_core::native::{self, metadata_path};
use scibridge_core::WhereNode;
use scibridge_error::FilterError;
use scibridge_units::{convert_to_si, Quantity};

const NAME: &str = "name";
const VALUE: &str = "value";
const UNIT: &str = "unit";

/// One predicate on a named metadata quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterPredicate {
    pub name: String,
    /// A scalar, or an operator object such as `{"gt": 5}` or `{"between": [1, 2]}`.
    pub value: Value,
    pub unit: Option<String>,
}

/// Whatever `name`, `value` and `unit` conditions a parameter `where` carries.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParameterParts<'a> {
    pub name: Option<&'a str>,
    pub value: Option<&'a Value>,
    pub unit: Option<&'a str>,
}

impl<'a> ParameterParts<'a> {
    /// Reads the parts from a conjunction or a single leaf. Disjunctions carry no parts.
    pub fn scan(node: &'a WhereNode) -> Self {
        Self {
            name: node.find_condition(NAME).and_then(Value::as_str),
            value: node.find_condition(VALUE).filter(|v| !v.is_null()),
            unit: node
                .find_condition(UNIT)
                .and_then(Value::as_str)
                .filter(|u| !u.trim().is_empty()),
        }
    }
}

impl ParameterPredicate {
    pub fn extract(node: &WhereNode) -> Result<Self, FilterError> {
        let parts = ParameterParts::scan(node);
        let name = parts.name.ok_or(FilterError::MissingParameterName)?;
        let value = parts.value.ok_or(FilterError::MissingParameterValue)?;
        Ok(Self {
            name: name.to_string(),
            value: value.clone(),
            unit: parts.unit.map(str::to_string),
        })
    }

    /// Native form: `And([valueSI, unitSI])` with a unit, a single `value` leaf without.
    pub fn to_native(&self) -> Result<WhereNode, FilterError> {
        let Some(unit) = self.unit.as_deref() else {
            return Ok(WhereNode::leaf(
                metadata_path(&self.name, native::VALUE),
                self.value.clone(),
            ));
        };
        let (value_si, unit_si) = normalise_value(&self.value, unit)?;
        Ok(WhereNode::And(vec![
            WhereNode::leaf(metadata_path(&self.name, native::VALUE_SI), value_si),
            WhereNode::leaf(metadata_path(&self.name, native::UNIT_SI), unit_si),
        ]))
    }
}

/// Translates a `parameters` scope: one predicate, or an `Or` of predicates recombined with `Or`.
pub fn translate_parameters(node: &WhereNode) -> Result<WhereNode, FilterError> {
    match node {
        WhereNode::Or(arms) => arms
            .iter()
            .map(|arm| ParameterPredicate::extract(arm)?.to_native())
            .collect::<Result<Vec<_>, _>>()
            .map(WhereNode::Or),
        other => ParameterPredicate::extract(other)?.to_native(),
    }
}

fn number(value: &Value) -> Result<f64, FilterError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| FilterError::NonNumericValue(value.to_string())),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| FilterError::NonNumericValue(s.clone())),
        other => Err(FilterError::NonNumericValue(other.to_string())),
    }
}

fn si(value: &Value, unit: &str) -> Result<Quantity, FilterError> {
    convert_to_si(number(value)?, unit)
}

fn si_value(quantity: &Quantity) -> Value {
    Value::from(quantity.value)
}

/// Normalises a scalar or a keyed range object; every element shares the returned SI unit.
fn normalise_value(value: &Value, unit: &str) -> Result<(Value, String), FilterError> {
    match value {
        Value::Object(range) => {
            let mut converted = Map::new();
            let mut unit_si = None;
            for (key, bound) in range {
                let bound_si = match bound {
                    Value::Array(items) => {
                        let quantities = items
                            .iter()
                            .map(|item| si(item, unit))
                            .collect::<Result<Vec<_>, _>>()?;
                        if let Some(last) = quantities.last() {
                            unit_si = Some(last.unit.clone());
                        }
                        Value::Array(quantities.iter().map(si_value).collect())
                    }
                    scalar => {
                        let quantity = si(scalar, unit)?;
                        let out = si_value(&quantity);
                        unit_si = Some(quantity.unit);
                        out
                    }
                };
                converted.insert(key.clone(), bound_si);
            }
            // An empty range still needs the SI unit of the requested quantity.
            let unit_si = match unit_si {
                Some(unit_si) => unit_si,
                None => convert_to_si(1.0, unit)?.unit,
            };
            Ok((Value::Object(converted), unit_si))
        }
        scalar => {
            let quantity = si(scalar, unit)?;
            Ok((si_value(&quantity), quantity.unit))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn predicate(raw: Value) -> WhereNode {
        WhereNode::try_from(raw).unwrap()
    }

    #[test]
    fn extracts_from_and_list() {
        let node = predicate(json!({"and": [
            {"name": "temperature"}, {"value": 20}, {"unit": "degC"}
        ]}));
        let p = ParameterPredicate::extract(&node).unwrap();
        assert_eq!(p.name, "temperature");
        assert_eq!(p.value, json!(20));
        assert_eq!(p.unit.as_deref(), Some("degC"));
    }

    #[test]
    fn extracts_from_single_leaf() {
        let node = predicate(json!({"name": "mode", "value": "fast"}));
        let p = ParameterPredicate::extract(&node).unwrap();
        assert_eq!(p.unit, None);
        assert_eq!(p.value, json!("fast"));
    }

    #[test]
    fn missing_parts_are_filter_errors() {
        let no_name = predicate(json!({"and": [{"value": 1}, {"unit": "m"}]}));
        assert_eq!(
            ParameterPredicate::extract(&no_name),
            Err(FilterError::MissingParameterName)
        );
        let no_value = predicate(json!({"and": [{"name": "p"}, {"unit": "m"}]}));
        assert_eq!(
            ParameterPredicate::extract(&no_value),
            Err(FilterError::MissingParameterValue)
        );
        let null_value = predicate(json!({"and": [{"name": "p"}, {"value": null}]}));
        assert_eq!(
            ParameterPredicate::extract(&null_value),
            Err(FilterError::MissingParameterValue)
        );
    }

    #[test]
    fn scalar_with_unit_normalises_to_si() {
        let node = predicate(json!({"and": [{"name": "p"}, {"value": 5}, {"unit": "mm"}]}));
        assert_eq!(
            translate_parameters(&node).unwrap(),
            WhereNode::And(vec![
                WhereNode::leaf("scientificMetadata.p.valueSI", 0.005),
                WhereNode::leaf("scientificMetadata.p.unitSI", "m"),
            ])
        );
    }

    #[test]
    fn range_keeps_its_keys() {
        let node = predicate(json!({"and": [
            {"name": "wavelength"},
            {"value": {"between": [1000, 2000]}},
            {"unit": "mm"}
        ]}));
        let native = translate_parameters(&node).unwrap();
        assert_eq!(
            Value::from(native),
            json!({"and": [
                {"scientificMetadata.wavelength.valueSI": {"between": [1.0, 2.0]}},
                {"scientificMetadata.wavelength.unitSI": "m"}
            ]})
        );

        let node = predicate(json!({"and": [
            {"name": "energy"}, {"value": {"gt": 2}}, {"unit": "kJ"}
        ]}));
        assert_eq!(
            Value::from(translate_parameters(&node).unwrap()),
            json!({"and": [
                {"scientificMetadata.energy.valueSI": {"gt": 2000.0}},
                {"scientificMetadata.energy.unitSI": "(kg m^2) / s^2"}
            ]})
        );
    }

    #[test]
    fn without_unit_matches_raw_value() {
        let node = predicate(json!({"and": [{"name": "sample_state"}, {"value": "solid"}]}));
        assert_eq!(
            translate_parameters(&node).unwrap(),
            WhereNode::leaf("scientificMetadata.sample_state.value", "solid")
        );
    }

    #[test]
    fn disjunction_translates_each_arm() {
        let node = predicate(json!({"or": [
            {"and": [{"name": "a"}, {"value": 1000}, {"unit": "mm"}]},
            {"and": [{"name": "b"}, {"value": "x"}]}
        ]}));
        assert_eq!(
            Value::from(translate_parameters(&node).unwrap()),
            json!({"or": [
                {"and": [
                    {"scientificMetadata.a.valueSI": 1.0},
                    {"scientificMetadata.a.unitSI": "m"}
                ]},
                {"scientificMetadata.b.value": "x"}
            ]})
        );
    }

    #[test]
    fn non_numeric_value_with_unit_is_rejected() {
        let node = predicate(json!({"and": [{"name": "p"}, {"value": "warm"}, {"unit": "K"}]}));
        assert_eq!(
            translate_parameters(&node),
            Err(FilterError::NonNumericValue("warm".into()))
        );
    }

    #[test]
    fn unknown_unit_is_rejected() {
        let node = predicate(json!({"and": [{"name": "p"}, {"value": 1}, {"unit": "smoot"}]}));
        assert!(matches!(
            translate_parameters(&node),
            Err(FilterError::UnknownUnit(_))
        ));
    }
}
