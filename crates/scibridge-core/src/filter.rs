//! LoopBack-style filter objects.
//!
//! ```json
//! { "where": { "and": [ { "title": "x" }, { "or": [ ... ] } ] },
//!   "include": [ { "relation": "files", "scope": { "where": { ... } } } ],
//!   "skip": 0, "limit": 10 }
//! ```
use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A conjunction of `field -> value` conditions. Values may be scalars or operator objects
/// such as `{"gt": 5}` or `{"between": [1, 2]}`.
pub type Leaf = Map<String, Value>;

const AND: &str = "and";
const OR: &str = "or";

#[derive(Debug, Clone, PartialEq)]
pub enum WhereNode {
    And(Vec<WhereNode>),
    Or(Vec<WhereNode>),
    Leaf(Leaf),
}

impl WhereNode {
    /// Single-condition leaf.
    pub fn leaf(field: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut map = Leaf::new();
        map.insert(field.into(), value.into());
        WhereNode::Leaf(map)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            WhereNode::And(nodes) | WhereNode::Or(nodes) => nodes.is_empty(),
            WhereNode::Leaf(map) => map.is_empty(),
        }
    }

    /// The node as a list of conjuncts: the children of an `And`, otherwise the node itself.
    pub fn into_conjuncts(self) -> Vec<WhereNode> {
        match self {
            WhereNode::And(nodes) => nodes,
            other => vec![other],
        }
    }

    /// Whether this node is a leaf mentioning `field`.
    pub fn leaf_has(&self, field: &str) -> bool {
        matches!(self, WhereNode::Leaf(map) if map.contains_key(field))
    }

    /// Looks up `field` in a leaf, or in the first leaf child of an `And` that carries it.
    pub fn find_condition(&self, field: &str) -> Option<&Value> {
        match self {
            WhereNode::Leaf(map) => map.get(field),
            WhereNode::And(nodes) => nodes.iter().find_map(|node| match node {
                WhereNode::Leaf(map) => map.get(field),
                _ => None,
            }),
            WhereNode::Or(_) => None,
        }
    }
}

impl Serialize for WhereNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WhereNode::And(nodes) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(AND, nodes)?;
                map.end()
            }
            WhereNode::Or(nodes) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(OR, nodes)?;
                map.end()
            }
            WhereNode::Leaf(leaf) => leaf.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for WhereNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        WhereNode::try_from(value).map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereShapeError(String);

impl fmt::Display for WhereShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid where clause: {}", self.0)
    }
}

impl std::error::Error for WhereShapeError {}

impl TryFrom<Value> for WhereNode {
    type Error = WhereShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut map) = value else {
            return Err(WhereShapeError(format!("expected an object, got `{value}`")));
        };
        let and = map.remove(AND);
        let or = map.remove(OR);
        let (branch, is_and) = match (and, or) {
            (Some(_), Some(_)) => {
                return Err(WhereShapeError(
                    "a node cannot be both `and` and `or`".to_string(),
                ));
            }
            (Some(and), None) => (and, true),
            (None, Some(or)) => (or, false),
            (None, None) => return Ok(WhereNode::Leaf(map)),
        };
        let Value::Array(items) = branch else {
            return Err(WhereShapeError(format!(
                "`{}` must hold an array",
                if is_and { AND } else { OR }
            )));
        };
        let children = items
            .into_iter()
            .map(WhereNode::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        // Sibling keys next to a combinator are an implicit conjunction.
        match (is_and, map.is_empty()) {
            (true, true) => Ok(WhereNode::And(children)),
            (true, false) => {
                let mut nodes = children;
                nodes.push(WhereNode::Leaf(map));
                Ok(WhereNode::And(nodes))
            }
            (false, true) => Ok(WhereNode::Or(children)),
            (false, false) => Ok(WhereNode::And(vec![
                WhereNode::Leaf(map),
                WhereNode::Or(children),
            ])),
        }
    }
}

impl From<WhereNode> for Value {
    fn from(node: WhereNode) -> Self {
        match node {
            WhereNode::And(nodes) => {
                Value::Object(Map::from_iter([(AND.to_string(), nodes_to_value(nodes))]))
            }
            WhereNode::Or(nodes) => {
                Value::Object(Map::from_iter([(OR.to_string(), nodes_to_value(nodes))]))
            }
            WhereNode::Leaf(leaf) => Value::Object(leaf),
        }
    }
}

fn nodes_to_value(nodes: Vec<WhereNode>) -> Value {
    Value::Array(nodes.into_iter().map(Value::from).collect())
}

/// Request to embed a related entity, optionally narrowed by its own filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inclusion {
    pub relation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<FilterSpec>,
}

impl Inclusion {
    pub fn new(relation: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            scope: None,
        }
    }

    pub fn with_scope(relation: impl Into<String>, scope: FilterSpec) -> Self {
        Self {
            relation: relation.into(),
            scope: Some(scope),
        }
    }

    pub fn scope_where(&self) -> Option<&WhereNode> {
        self.scope.as_ref().and_then(|s| s.where_clause.as_ref())
    }
}

/// LoopBack accepts `"files"`, `{"relation": "files"}` and `{"relation": ..., "scope": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawInclusion {
    Name(String),
    Full {
        relation: String,
        #[serde(default)]
        scope: Option<FilterSpec>,
    },
}

impl<'de> Deserialize<'de> for Inclusion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawInclusion::deserialize(deserializer)? {
            RawInclusion::Name(relation) => Inclusion::new(relation),
            RawInclusion::Full { relation, scope } => Inclusion { relation, scope },
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Inclusion),
    Many(Vec<Inclusion>),
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Inclusion>, D::Error> {
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(inclusion)) => vec![inclusion],
        Some(OneOrMany::Many(inclusions)) => inclusions,
    })
}

/// One query intent, in either dialect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<WhereNode>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub include: Vec<Inclusion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl FilterSpec {
    pub fn with_where(where_clause: WhereNode) -> Self {
        Self {
            where_clause: Some(where_clause),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.where_clause.is_none()
            && self.include.is_empty()
            && self.skip.is_none()
            && self.limit.is_none()
    }

    /// First inclusion requesting `relation`.
    pub fn inclusion(&self, relation: &str) -> Option<&Inclusion> {
        self.include.iter().find(|i| i.relation == relation)
    }

    /// Inclusions in request order. A relation requested twice keeps its first inclusion, as
    /// [`Self::inclusion`] does.
    pub fn distinct_include(&self) -> Vec<&Inclusion> {
        let mut distinct: Vec<&Inclusion> = Vec::new();
        for inclusion in &self.include {
            if !distinct.iter().any(|seen| seen.relation == inclusion.relation) {
                distinct.push(inclusion);
            }
        }
        distinct
    }

    /// Relation name with its requested scope (an empty scope when none was given).
    pub fn inclusions(&self) -> Vec<(&str, FilterSpec)> {
        self.distinct_include()
            .into_iter()
            .map(|i| (i.relation.as_str(), i.scope.clone().unwrap_or_default()))
            .collect()
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_nested_where_tree() {
        let filter: FilterSpec = serde_json::from_value(json!({
            "where": {"and": [{"title": "x"}, {"or": [{"size": 1}, {"size": 2}]}]},
            "limit": 5
        }))
        .unwrap();
        let expected = WhereNode::And(vec![
            WhereNode::leaf("title", "x"),
            WhereNode::Or(vec![WhereNode::leaf("size", 1), WhereNode::leaf("size", 2)]),
        ]);
        assert_eq!(filter.where_clause, Some(expected));
        assert_eq!(filter.limit, Some(5));
        assert!(filter.include.is_empty());
    }

    #[test]
    fn serializes_back_to_loopback_shape() {
        let node = WhereNode::Or(vec![
            WhereNode::leaf("creator", "Ada"),
            WhereNode::leaf("authors", "Ada"),
        ]);
        let value = serde_json::to_value(FilterSpec::with_where(node)).unwrap();
        assert_eq!(
            value,
            json!({"where": {"or": [{"creator": "Ada"}, {"authors": "Ada"}]}})
        );
    }

    #[test]
    fn rejects_node_that_is_both_and_and_or() {
        let err = WhereNode::try_from(json!({"and": [], "or": []})).unwrap_err();
        assert!(err.to_string().contains("both"));
    }

    #[test]
    fn sibling_keys_next_to_or_become_a_conjunction() {
        let node = WhereNode::try_from(json!({"or": [{"a": 1}], "b": 2})).unwrap();
        assert_eq!(
            node,
            WhereNode::And(vec![
                WhereNode::leaf("b", 2),
                WhereNode::Or(vec![WhereNode::leaf("a", 1)]),
            ])
        );
    }

    #[test]
    fn include_accepts_string_object_and_list_forms() {
        let one: FilterSpec = serde_json::from_value(json!({"include": "files"})).unwrap();
        assert_eq!(one.include, vec![Inclusion::new("files")]);

        let many: FilterSpec = serde_json::from_value(json!({
            "include": ["instrument", {"relation": "parameters", "scope": {"where": {"name": "p"}}}]
        }))
        .unwrap();
        assert_eq!(many.include.len(), 2);
        assert_eq!(many.include[0].relation, "instrument");
        assert_eq!(
            many.include[1].scope_where(),
            Some(&WhereNode::leaf("name", "p"))
        );
    }

    #[test]
    fn inclusions_default_to_empty_scope() {
        let filter: FilterSpec = serde_json::from_value(json!({
            "include": [{"relation": "a"}, {"relation": "b", "scope": {"where": {"x": 1}}}]
        }))
        .unwrap();
        let inclusions = filter.inclusions();
        assert_eq!(inclusions[0], ("a", FilterSpec::default()));
        assert_eq!(inclusions[1].0, "b");
        assert_eq!(inclusions[1].1.where_clause, Some(WhereNode::leaf("x", 1)));
    }

    #[test]
    fn repeated_relation_keeps_its_first_scope() {
        let filter: FilterSpec = serde_json::from_value(json!({
            "include": [
                {"relation": "samples", "scope": {"where": {"name": "first"}}},
                "files",
                {"relation": "samples", "scope": {"where": {"name": "second"}}}
            ]
        }))
        .unwrap();
        let inclusions = filter.inclusions();
        assert_eq!(inclusions.len(), 2);
        assert_eq!(inclusions[0].0, "samples");
        assert_eq!(
            inclusions[0].1.where_clause,
            Some(WhereNode::leaf("name", "first"))
        );
        assert_eq!(
            filter.inclusion("samples").and_then(Inclusion::scope_where),
            inclusions[0].1.where_clause.as_ref()
        );
    }

    #[test]
    fn find_condition_looks_into_and_leaves() {
        let node = WhereNode::And(vec![
            WhereNode::leaf("name", "temperature"),
            WhereNode::leaf("value", 5),
        ]);
        assert_eq!(node.find_condition("value"), Some(&json!(5)));
        assert_eq!(node.find_condition("unit"), None);
    }
}
