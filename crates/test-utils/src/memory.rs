//! An in-memory [`RecordFetcher`] that evaluates native filters against stored records.
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use scibridge_core::{Collection, FilterSpec, Record, WhereNode};
use scibridge_error::FetchError;
use scibridge_fetch::RecordFetcher;

/// A native call the fetcher received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Find(FilterSpec),
    FindById(String, FilterSpec),
    Count(Option<WhereNode>),
}

#[derive(Debug)]
pub struct InMemoryCollection {
    collection: Collection,
    records: Vec<Record>,
    calls: Mutex<Vec<Call>>,
    fail_with: Option<FetchError>,
}

impl InMemoryCollection {
    pub fn new(collection: Collection, records: Vec<Record>) -> Self {
        Self {
            collection,
            records,
            calls: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    pub fn empty(collection: Collection) -> Self {
        Self::new(collection, Vec::new())
    }

    /// A collection whose every call fails with `error`.
    pub fn failing(collection: Collection, error: FetchError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::empty(collection)
        }
    }

    /// Calls received so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Filters passed to `find`, oldest first.
    pub fn find_filters(&self) -> Vec<FilterSpec> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Find(filter) => Some(filter),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> Result<(), FetchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn matching<'a>(&'a self, where_clause: Option<&'a WhereNode>) -> impl Iterator<Item = &'a Record> {
        self.records
            .iter()
            .filter(move |record| where_clause.is_none_or(|node| matches_where(record, node)))
    }
}

#[async_trait]
impl RecordFetcher for InMemoryCollection {
    fn collection(&self) -> Collection {
        self.collection
    }

    async fn find(&self, filter: &FilterSpec) -> Result<Vec<Record>, FetchError> {
        self.record(Call::Find(filter.clone()))?;
        let skip = filter.skip.unwrap_or(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |l| l as usize);
        Ok(self
            .matching(filter.where_clause.as_ref())
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_by_id(
        &self,
        id: &str,
        filter: &FilterSpec,
    ) -> Result<Option<Record>, FetchError> {
        self.record(Call::FindById(id.to_string(), filter.clone()))?;
        let id_field = self.collection.id_field();
        Ok(self
            .records
            .iter()
            .find(|record| record.get(id_field).and_then(Value::as_str) == Some(id))
            .cloned())
    }

    async fn count(&self, where_clause: Option<&WhereNode>) -> Result<u64, FetchError> {
        self.record(Call::Count(where_clause.cloned()))?;
        Ok(self.matching(where_clause).count() as u64)
    }
}

/// Evaluates a native `where` the way the store would for the operators the bridge emits.
pub fn matches_where(record: &Value, node: &WhereNode) -> bool {
    match node {
        WhereNode::And(nodes) => nodes.iter().all(|n| matches_where(record, n)),
        WhereNode::Or(nodes) => nodes.iter().any(|n| matches_where(record, n)),
        WhereNode::Leaf(leaf) => leaf.iter().all(|(path, condition)| {
            let found = lookup(record, path);
            found.iter().any(|value| satisfies(value, condition))
        }),
    }
}

/// Every value reachable along a dotted path, flattening arrays on the way.
fn lookup<'a>(record: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![record];
    for segment in path.split('.') {
        current = current
            .into_iter()
            .flat_map(|value| match value {
                Value::Array(items) => items.iter().filter_map(|i| i.get(segment)).collect(),
                other => other.get(segment).into_iter().collect::<Vec<_>>(),
            })
            .collect();
    }
    current
        .into_iter()
        .flat_map(|value| match value {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        })
        .collect()
}

fn satisfies(value: &Value, condition: &Value) -> bool {
    let Value::Object(ops) = condition else {
        return value == condition;
    };
    ops.iter().all(|(op, operand)| match (op.as_str(), operand) {
        ("gt", bound) => compare(value, bound).is_some_and(|o| o.is_gt()),
        ("gte", bound) => compare(value, bound).is_some_and(|o| o.is_ge()),
        ("lt", bound) => compare(value, bound).is_some_and(|o| o.is_lt()),
        ("lte", bound) => compare(value, bound).is_some_and(|o| o.is_le()),
        ("neq", other) => value != other,
        ("inq", Value::Array(options)) => options.contains(value),
        ("between", Value::Array(bounds)) if bounds.len() == 2 => {
            compare(value, &bounds[0]).is_some_and(|o| o.is_ge())
                && compare(value, &bounds[1]).is_some_and(|o| o.is_le())
        }
        _ => value == condition,
    })
}

fn compare(value: &Value, bound: &Value) -> Option<std::cmp::Ordering> {
    match (value, bound) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(raw: Value) -> WhereNode {
        WhereNode::try_from(raw).unwrap()
    }

    #[test]
    fn dotted_paths_reach_into_arrays() {
        let record = json!({
            "techniques": [{"name": "SANS"}, {"name": "SAXS"}],
            "pidArray": ["a/1", "b/2"],
            "scientificMetadata": {"t": {"valueSI": 300.0, "unitSI": "K"}}
        });
        assert!(matches_where(&record, &node(json!({"techniques.name": "SAXS"}))));
        assert!(matches_where(&record, &node(json!({"pidArray": "b/2"}))));
        assert!(matches_where(
            &record,
            &node(json!({"and": [
                {"scientificMetadata.t.valueSI": {"between": [250, 350]}},
                {"scientificMetadata.t.unitSI": "K"}
            ]}))
        ));
        assert!(!matches_where(&record, &node(json!({"scientificMetadata.t.valueSI": {"gt": 300}}))));
    }

    #[tokio::test]
    async fn records_calls_and_applies_paging() {
        let store = InMemoryCollection::new(
            Collection::Samples,
            vec![json!({"sampleId": "s1"}), json!({"sampleId": "s2"}), json!({"sampleId": "s3"})],
        );
        let filter = FilterSpec {
            skip: Some(1),
            limit: Some(1),
            ..FilterSpec::default()
        };
        let found = store.find(&filter).await.unwrap();
        assert_eq!(found, vec![json!({"sampleId": "s2"})]);
        assert_eq!(store.find_filters(), vec![filter]);
        assert_eq!(
            store.find_by_id("s3", &FilterSpec::default()).await.unwrap(),
            Some(json!({"sampleId": "s3"}))
        );
        assert_eq!(store.count(None).await.unwrap(), 3);
    }
}
