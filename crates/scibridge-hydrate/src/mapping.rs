//! Record-local mappings: everything that can be produced from the raw record alone.
use serde_json::{Map, Value, json};

use scibridge_core::native;
use scibridge_core::{EntityKind, FilterSpec, Record, Relation};
use scibridge_error::InternalError;
use scibridge_filter::ParameterParts;
use scibridge_units::{Quantity, convert_to_unit};

use crate::LOG_TARGET;

/// Copies the dictionary fields present on `raw` under their public names and adds the
/// constant fields of `kind`.
pub fn base_mapping(kind: EntityKind, raw: &Record) -> Result<Map<String, Value>, InternalError> {
    let dictionary = kind
        .collection()
        .and(kind.dictionary())
        .ok_or_else(|| {
            InternalError::InvalidState(format!("`{kind}` records are not stored on their own"))
        })?;

    let mut mapped = Map::new();
    for (public, native) in dictionary.entries() {
        if let Some(value) = raw.get(native) {
            mapped.insert(public.to_string(), value.clone());
        }
    }
    if kind == EntityKind::Document {
        mapped.insert("isPublic".to_string(), Value::Bool(true));
        mapped.insert("type".to_string(), Value::from("publication"));
    }
    Ok(mapped)
}

/// Truthy in the loose sense the store's clients use: not null, not `false`, not `""`.
pub(crate) fn is_present(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false)) && value.as_str() != Some("")
}

/// One flat file entry per sub-file of every block, carrying the owning block's id.
pub fn files_of(raw: &Record) -> Vec<Record> {
    let blocks = raw.get(native::ORIG_DATABLOCKS).and_then(Value::as_array);
    blocks
        .into_iter()
        .flatten()
        .flat_map(|block| {
            let id = block.get("id").cloned().unwrap_or(Value::Null);
            let list = block.get(native::DATA_FILE_LIST).and_then(Value::as_array);
            list.into_iter()
                .flatten()
                .map(move |file| file_entry(&id, file))
        })
        .collect()
}

fn file_entry(block_id: &Value, file: &Value) -> Record {
    let full_path = file.get("path").and_then(Value::as_str).unwrap_or_default();
    let (path, name) = full_path.rsplit_once('/').unwrap_or(("", full_path));
    json!({
        "id": block_id,
        "name": name,
        "path": path,
        "size": file.get("size").cloned().unwrap_or(Value::Null),
    })
}

/// The dataset's embedded instrument, see [`instrument_fields`].
pub fn instrument(raw: &Record, facility: &str) -> Value {
    Value::Object(instrument_fields(raw.get(native::INSTRUMENT), facility))
}

/// `{pid, name, facility}` when the instrument record has both id and name, else empty.
pub fn instrument_fields(record: Option<&Value>, facility: &str) -> Map<String, Value> {
    let pid = record.and_then(|i| i.get("pid")).filter(|v| is_present(v));
    let name = record.and_then(|i| i.get("name")).filter(|v| is_present(v));
    let mut fields = Map::new();
    if let (Some(pid), Some(name)) = (pid, name) {
        fields.insert("pid".to_string(), pid.clone());
        fields.insert("name".to_string(), name.clone());
        fields.insert("facility".to_string(), Value::from(facility));
    }
    fields
}

pub fn techniques(raw: &Record) -> Value {
    raw.get(native::TECHNIQUES)
        .filter(|v| is_present(v))
        .cloned()
        .unwrap_or_else(|| json!([]))
}

/// Creators then authors, as `{person: {fullName}}`. Empty unless `person` was requested.
pub fn members(raw: &Record, scope: &FilterSpec) -> Value {
    if scope.inclusion(Relation::Person.as_str()).is_none() {
        return json!([]);
    }
    let names = |field: &str| {
        raw.get(field)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .cloned()
    };
    names(native::CREATOR)
        .chain(names(native::AUTHORS))
        .map(|name| json!({"person": {"fullName": name}}))
        .collect()
}

/// One `{name, value, unit}` entry per metadata key. When the scope pins a parameter name
/// together with a unit, that parameter is re-expressed in the requested unit.
pub fn parameters(raw: &Record, scope: &FilterSpec) -> Value {
    let Some(metadata) = raw.get(native::SCIENTIFIC_METADATA).and_then(Value::as_object) else {
        return json!([]);
    };
    let requested = scope
        .where_clause
        .as_ref()
        .map(ParameterParts::scan)
        .unwrap_or_default();

    metadata
        .iter()
        .map(|(name, entry)| {
            let target = requested.unit.filter(|_| requested.name == Some(name.as_str()));
            parameter(name, entry, target)
        })
        .collect()
}

fn parameter(name: &str, entry: &Value, target_unit: Option<&str>) -> Value {
    let (mut value, mut unit) = match entry {
        Value::Object(fields) => (
            fields.get(native::VALUE).cloned().unwrap_or(Value::Null),
            fields
                .get(native::UNIT)
                .and_then(Value::as_str)
                .map(str::to_string),
        ),
        other => (other.clone(), None),
    };

    if let Some(target) = target_unit {
        match reexpress(&value, unit.as_deref(), target) {
            Some(Ok(quantity)) => {
                value = Value::from(quantity.value);
                unit = Some(quantity.unit);
            }
            Some(Err(error)) => tracing::warn!(
                target: LOG_TARGET,
                parameter = name,
                %error,
                "keeping stored value"
            ),
            None => tracing::warn!(
                target: LOG_TARGET,
                parameter = name,
                requested = target,
                "stored value has no numeric magnitude and unit; keeping it"
            ),
        }
    }

    let mut out = Map::new();
    out.insert("name".to_string(), Value::from(name));
    out.insert("value".to_string(), value);
    if let Some(unit) = unit {
        out.insert("unit".to_string(), Value::from(unit));
    }
    Value::Object(out)
}

fn reexpress(
    value: &Value,
    unit: Option<&str>,
    target: &str,
) -> Option<Result<Quantity, scibridge_error::FilterError>> {
    let magnitude = value.as_f64()?;
    let unit = unit?;
    Some(convert_to_unit(magnitude, unit, target))
}

/// Drops a duplicated leading namespace: `A/A/1` becomes `A/1`.
pub fn clean_pid(pid: &str) -> &str {
    let mut segments = pid.splitn(3, '/');
    match (segments.next(), segments.next()) {
        (Some(first), Some(second)) if first == second => &pid[first.len() + 1..],
        _ => pid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scibridge_core::{Inclusion, WhereNode};
    use scibridge_test_utils::fixtures;

    #[test]
    fn dataset_fields_are_renamed() {
        let mapped = base_mapping(EntityKind::Dataset, &fixtures::lysozyme_dataset()).unwrap();
        assert_eq!(mapped["pid"], fixtures::LYSOZYME_PID);
        assert_eq!(mapped["title"], "Lysozyme");
        assert_eq!(mapped["isPublic"], true);
        assert_eq!(mapped["creationDate"], "2021-03-01T00:00:00Z");
        assert!(!mapped.contains_key("datasetName"));
        assert!(!mapped.contains_key("owner"));
    }

    #[test]
    fn documents_are_public_publications() {
        let mapped = base_mapping(EntityKind::Document, &fixtures::publication()).unwrap();
        assert_eq!(mapped["pid"], fixtures::PUBLICATION_DOI);
        assert_eq!(mapped["doi"], fixtures::PUBLICATION_DOI);
        assert_eq!(mapped["summary"], "Two proteins, two temperatures.");
        assert_eq!(mapped["isPublic"], true);
        assert_eq!(mapped["type"], "publication");
    }

    #[test]
    fn embedded_kinds_have_no_base_mapping() {
        assert!(base_mapping(EntityKind::File, &json!({})).is_err());
        assert!(base_mapping(EntityKind::Member, &json!({})).is_err());
    }

    #[test]
    fn files_split_name_and_path() {
        let files = files_of(&fixtures::lysozyme_dataset());
        assert_eq!(
            files,
            vec![
                json!({"id": "blk-1", "name": "a.nxs", "path": "raw/run1", "size": 100}),
                json!({"id": "blk-1", "name": "b.log", "path": "", "size": 5}),
            ]
        );
        assert!(files_of(&fixtures::ferritin_dataset()).is_empty());
        assert!(files_of(&json!({"pid": "x"})).is_empty());
    }

    #[test]
    fn instrument_needs_pid_and_name() {
        let raw = fixtures::lysozyme_dataset();
        assert_eq!(
            instrument(&raw, "ESS"),
            json!({"pid": "i-loki", "name": "LoKI", "facility": "ESS"})
        );
        let partial = json!({"instrument": {"pid": "i-loki"}});
        assert_eq!(instrument(&partial, "ESS"), json!({}));
        assert_eq!(instrument(&json!({}), "ESS"), json!({}));
    }

    #[test]
    fn techniques_pass_through() {
        assert_eq!(
            techniques(&fixtures::lysozyme_dataset()),
            json!([{"pid": "t-sans", "name": "SANS"}])
        );
        assert_eq!(techniques(&fixtures::ferritin_dataset()), json!([]));
    }

    #[test]
    fn members_list_creators_before_authors() {
        let raw = fixtures::publication();
        let scope = FilterSpec {
            include: vec![Inclusion::new("person")],
            ..FilterSpec::default()
        };
        assert_eq!(
            members(&raw, &scope),
            json!([
                {"person": {"fullName": "Ada Lovelace"}},
                {"person": {"fullName": "Grace Hopper"}},
                {"person": {"fullName": "Alan Turing"}}
            ])
        );
        assert_eq!(members(&raw, &FilterSpec::default()), json!([]));
    }

    #[test]
    fn parameters_keep_stored_units_by_default() {
        let params = parameters(&fixtures::lysozyme_dataset(), &FilterSpec::default());
        let params = params.as_array().unwrap();
        assert_eq!(params.len(), 3);
        assert!(params.contains(&json!({"name": "temperature", "value": 20, "unit": "degC"})));
        assert!(params.contains(&json!({"name": "mode", "value": "fast"})));
    }

    #[test]
    fn requested_parameter_is_reexpressed() {
        let scope = FilterSpec::with_where(WhereNode::And(vec![
            WhereNode::leaf("name", "temperature"),
            WhereNode::leaf("value", json!({"gt": 250})),
            WhereNode::leaf("unit", "K"),
        ]));
        let params = parameters(&fixtures::lysozyme_dataset(), &scope);
        let temperature = params
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["name"] == "temperature")
            .unwrap();
        assert_eq!(temperature["value"].as_f64(), Some(293.0));
        assert_eq!(temperature["unit"], "K");

        let wavelength = params
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["name"] == "wavelength")
            .unwrap();
        assert_eq!(wavelength["unit"], "angstrom");
    }

    #[test]
    fn failed_reexpression_keeps_stored_value() {
        let scope = FilterSpec::with_where(WhereNode::And(vec![
            WhereNode::leaf("name", "temperature"),
            WhereNode::leaf("value", 5),
            WhereNode::leaf("unit", "m"),
        ]));
        let params = parameters(&fixtures::lysozyme_dataset(), &scope);
        assert!(
            params
                .as_array()
                .unwrap()
                .contains(&json!({"name": "temperature", "value": 20, "unit": "degC"}))
        );
    }

    #[test]
    fn duplicated_namespace_is_dropped() {
        assert_eq!(clean_pid("A/A/1"), "A/1");
        assert_eq!(clean_pid("B/2"), "B/2");
        assert_eq!(clean_pid("20.500.12269/20.500.12269/ds-1"), "20.500.12269/ds-1");
        assert_eq!(clean_pid("plain"), "plain");
    }
}
