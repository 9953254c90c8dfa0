//! Inclusion pruning.
//!
//! A relation requested with its own `where` is a filtering join: a top-level record whose
//! hydrated relation came back empty did not match and is removed. For a relation nested one
//! level deeper, emptiness is checked per element of the parent relation first, and the
//! parent relation is then checked as a whole.
use std::collections::BTreeMap;

use serde_json::Value;

use scibridge_core::{EntityKind, FilterSpec, Record};

use crate::path::{HydrationPath, Step};

/// Absent, `null`, `[]` and `{}` count as empty.
pub fn is_empty_relation(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(fields)) => fields.is_empty(),
        Some(_) => false,
    }
}

/// Keeps the records whose `primary` relation is non-empty.
pub fn filter_on_primary(records: Vec<Record>, primary: &str) -> Vec<Record> {
    records
        .into_iter()
        .filter(|record| !is_empty_relation(record.get(primary)))
        .collect()
}

/// Drops `primary` elements whose `secondary` relation is empty, then drops records left
/// with an empty `primary`.
pub fn filter_on_secondary(records: Vec<Record>, primary: &str, secondary: &str) -> Vec<Record> {
    records
        .into_iter()
        .filter_map(|mut record| {
            let keep = match record.get_mut(primary) {
                Some(Value::Array(children)) => {
                    children.retain(|child| !is_empty_relation(child.get(secondary)));
                    !children.is_empty()
                }
                Some(Value::Object(child)) => !is_empty_relation(child.get(secondary)),
                _ => false,
            };
            keep.then_some(record)
        })
        .collect()
}

/// Applies [`filter_on_secondary`] when `secondary` is given, [`filter_on_primary`]
/// otherwise.
pub fn prune_relation(records: Vec<Record>, primary: &str, secondary: Option<&str>) -> Vec<Record> {
    match secondary {
        Some(secondary) => filter_on_secondary(records, primary, secondary),
        None => filter_on_primary(records, primary),
    }
}

/// Relations that filter a record of `kind`, mapped to their nested relations whose scope
/// has a `where`.
///
/// Only relations the hydrator expands count: a relation unknown to `kind`, or whose target is
/// already on the path, is left out of the record and cannot filter it. An expanded relation
/// filters when its scope has a `where` or nested inclusions that are expanded in turn.
pub fn inclusion_names(kind: EntityKind, filter: &FilterSpec) -> BTreeMap<String, Vec<String>> {
    let root = HydrationPath::root(kind);
    let mut names = BTreeMap::new();
    for (name, scope) in filter.inclusions() {
        let Step::Expand(relation, next) = root.step(kind, name) else {
            continue;
        };
        let nested: Vec<(&str, FilterSpec)> = scope
            .inclusions()
            .into_iter()
            .filter(|(nested, _)| {
                matches!(next.step(relation.target(), nested), Step::Expand(..))
            })
            .collect();
        if scope.where_clause.is_none() && nested.is_empty() {
            continue;
        }
        let secondaries = nested
            .into_iter()
            .filter(|(_, nested_scope)| nested_scope.where_clause.is_some())
            .map(|(nested, _)| nested.to_string())
            .collect();
        names.insert(name.to_string(), secondaries);
    }
    names
}

/// Removes the records of `kind` that fail a filtering inclusion of `filter`.
pub fn prune(records: Vec<Record>, kind: EntityKind, filter: &FilterSpec) -> Vec<Record> {
    inclusion_names(kind, filter)
        .iter()
        .fold(records, |records, (primary, secondaries)| {
            if secondaries.is_empty() {
                filter_on_primary(records, primary)
            } else {
                secondaries.iter().fold(records, |records, secondary| {
                    filter_on_secondary(records, primary, secondary)
                })
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scibridge_core::{Inclusion, WhereNode};
    use serde_json::{Value, json};

    fn scoped(relation: &str, scope: FilterSpec) -> Inclusion {
        Inclusion::with_scope(relation, scope)
    }

    #[test]
    fn empty_values() {
        assert!(is_empty_relation(None));
        assert!(is_empty_relation(Some(&json!(null))));
        assert!(is_empty_relation(Some(&json!([]))));
        assert!(is_empty_relation(Some(&json!({}))));
        assert!(!is_empty_relation(Some(&json!([1]))));
        assert!(!is_empty_relation(Some(&json!(0))));
    }

    #[test]
    fn primary_pruning_drops_empty_relations() {
        let records = vec![
            json!({"r": []}),
            json!({"r": [1]}),
            json!({"r": {}}),
            json!({"r": {"a": 1}}),
        ];
        assert_eq!(
            filter_on_primary(records, "r"),
            vec![json!({"r": [1]}), json!({"r": {"a": 1}})]
        );
    }

    #[test]
    fn secondary_pruning_trims_children_first() {
        let records = vec![
            json!({"id": 1, "datasets": [
                {"pid": "a", "parameters": []},
                {"pid": "b", "parameters": [{"name": "t"}]}
            ]}),
            json!({"id": 2, "datasets": [{"pid": "c", "parameters": []}]}),
            json!({"id": 3, "datasets": []}),
            json!({"id": 4, "datasets": {"pid": "d", "parameters": [{"name": "t"}]}}),
        ];
        let pruned = filter_on_secondary(records, "datasets", "parameters");
        assert_eq!(
            pruned,
            vec![
                json!({"id": 1, "datasets": [{"pid": "b", "parameters": [{"name": "t"}]}]}),
                json!({"id": 4, "datasets": {"pid": "d", "parameters": [{"name": "t"}]}}),
            ]
        );
        assert_eq!(
            prune_relation(vec![json!({"r": []})], "r", None),
            Vec::<Record>::new()
        );
    }

    fn filter(raw: Value) -> FilterSpec {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn only_scoped_relations_filter() {
        let filter = FilterSpec {
            include: vec![
                Inclusion::new("files"),
                scoped(
                    "samples",
                    FilterSpec::with_where(WhereNode::leaf("name", "x")),
                ),
                scoped(
                    "document",
                    FilterSpec {
                        include: vec![
                            Inclusion::new("members"),
                            scoped(
                                "parameters",
                                FilterSpec::with_where(WhereNode::leaf("name", "t")),
                            ),
                        ],
                        ..FilterSpec::default()
                    },
                ),
            ],
            ..FilterSpec::default()
        };
        let names = inclusion_names(EntityKind::Dataset, &filter);
        assert_eq!(names.len(), 2);
        assert!(names["samples"].is_empty());
        assert_eq!(names["document"], vec!["parameters".to_string()]);
        assert!(!names.contains_key("files"));
    }

    #[test]
    fn relations_left_out_of_the_record_never_filter() {
        let unknown = filter(json!({"include": [
            {"relation": "nonsense", "scope": {"where": {"x": 1}}}
        ]}));
        assert!(inclusion_names(EntityKind::Dataset, &unknown).is_empty());

        let foreign = filter(json!({"include": [
            {"relation": "datasets", "scope": {"where": {"title": "Lysozyme"}}}
        ]}));
        assert!(inclusion_names(EntityKind::Instrument, &foreign).is_empty());
        assert!(inclusion_names(EntityKind::Dataset, &foreign).is_empty());

        // A dataset's document never re-expands its datasets.
        let revisit = filter(json!({"include": [
            {"relation": "document", "scope": {"include": [
                {"relation": "datasets", "scope": {"where": {"title": "Lysozyme"}}}
            ]}}
        ]}));
        assert!(inclusion_names(EntityKind::Dataset, &revisit).is_empty());

        let records = vec![json!({"pid": "a", "document": {}}), json!({"pid": "i"})];
        assert_eq!(prune(records.clone(), EntityKind::Dataset, &unknown), records);
        assert_eq!(prune(records.clone(), EntityKind::Dataset, &revisit), records);
    }

    #[test]
    fn nested_filter_only_counts_expanded_relations() {
        let mixed = filter(json!({"include": [
            {"relation": "datasets", "scope": {"include": [
                {"relation": "document", "scope": {"where": {"title": "t"}}},
                {"relation": "parameters", "scope": {"where": {"name": "t"}}}
            ]}}
        ]}));
        let names = inclusion_names(EntityKind::Document, &mixed);
        assert_eq!(names["datasets"], vec!["parameters".to_string()]);
    }

    #[test]
    fn prune_applies_every_filtering_relation() {
        let filter = FilterSpec {
            include: vec![
                scoped(
                    "samples",
                    FilterSpec::with_where(WhereNode::leaf("name", "x")),
                ),
                Inclusion::new("files"),
            ],
            ..FilterSpec::default()
        };
        let records = vec![
            json!({"pid": "a", "samples": [{"name": "x"}], "files": []}),
            json!({"pid": "b", "samples": [], "files": [{"name": "f"}]}),
        ];
        let pruned = prune(records, EntityKind::Dataset, &filter);
        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned[0]["pid"], "a");

        let untouched = vec![json!({"pid": "c", "files": []})];
        assert_eq!(
            prune(untouched.clone(), EntityKind::Dataset, &FilterSpec::default()),
            untouched
        );
    }
}
