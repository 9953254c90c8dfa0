//! Public filter → native filter.
//!
//! Field names go through the entity's [`FieldDictionary`]; relations the native store cannot
//! scope per row are folded into the parent `where`; relations resolved by secondary fetches
//! during hydration are removed from the native `include`. Anything without a native
//! counterpart is dropped with a debug event.
use scibridge_core::native;
use scibridge_core::{
    EntityKind, FieldDictionary, FilterSpec, Inclusion, Leaf, Relation, WhereNode,
};
use scibridge_error::FilterError;

use crate::LOG_TARGET;
use crate::members::translate_members;
use crate::merge::merge_into_parent;
use crate::parameters::translate_parameters;

/// Public fields the native dialect has no notion of, per entity. Conditions on them hold for
/// every native record and are removed before renaming.
fn implied_fields(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Document => &["isPublic", "type"],
        EntityKind::Instrument => &["facility"],
        _ => &[],
    }
}

/// Translates a full filter for a top-level fetch of `kind`.
pub fn translate(kind: EntityKind, filter: &FilterSpec) -> Result<FilterSpec, FilterError> {
    let mut where_clause = match &filter.where_clause {
        Some(node) => translate_where(kind, node)?,
        None => None,
    };
    let mut include = Vec::new();

    for inclusion in filter.distinct_include() {
        let relation = match inclusion.relation.parse::<Relation>() {
            Ok(relation) if kind.has_relation(relation) => relation,
            _ => {
                tracing::debug!(
                    target: LOG_TARGET,
                    entity = %kind,
                    relation = %inclusion.relation,
                    "dropping relation without native counterpart"
                );
                continue;
            }
        };
        match (kind, relation) {
            (EntityKind::Dataset, Relation::Files) => {
                include.push(scoped_inclusion(
                    native::ORIG_DATABLOCKS,
                    EntityKind::File,
                    inclusion,
                )?);
            }
            (EntityKind::Dataset, Relation::Instrument) => {
                include.push(scoped_inclusion(
                    native::INSTRUMENT,
                    EntityKind::Instrument,
                    inclusion,
                )?);
            }
            (EntityKind::Dataset, Relation::Parameters | Relation::Techniques) => {
                if let Some(child) = inclusion_where(relation.target(), inclusion)? {
                    where_clause = Some(merge_into_parent(where_clause, child));
                }
            }
            (EntityKind::Document, Relation::Members) => {
                let person = inclusion
                    .scope
                    .as_ref()
                    .and_then(|scope| scope.inclusion(Relation::Person.as_str()));
                let child = person
                    .map(|p| inclusion_where(EntityKind::Member, p))
                    .transpose()?
                    .flatten();
                if let Some(child) = child {
                    where_clause = Some(merge_into_parent(where_clause, child));
                }
            }
            // Resolved by secondary fetches while hydrating.
            (_, Relation::Samples | Relation::Document | Relation::Datasets) => {}
            (_, other) => {
                tracing::debug!(
                    target: LOG_TARGET,
                    entity = %kind,
                    relation = %other,
                    "relation has no native filter form"
                );
            }
        }
    }

    Ok(FilterSpec {
        where_clause,
        include,
        skip: filter.skip,
        limit: filter.limit,
    })
}

/// Translates a bare `where`, as used by count endpoints and nested scopes.
///
/// Returns `None` when nothing survives translation, meaning "match everything".
pub fn translate_where(
    kind: EntityKind,
    node: &WhereNode,
) -> Result<Option<WhereNode>, FilterError> {
    match kind {
        EntityKind::Parameter => translate_parameters(node).map(Some),
        EntityKind::Member | EntityKind::Person => translate_members(node),
        _ => match kind.dictionary() {
            Some(dictionary) => Ok(rename(kind, dictionary, node, implied_fields(kind))),
            None => Ok(None),
        },
    }
}

/// Native filter for the dataset files endpoint: the dataset with its file blocks, narrowed
/// by the given file filter.
pub fn translate_files(filter: Option<&FilterSpec>) -> FilterSpec {
    let scope = filter
        .and_then(|f| f.where_clause.as_ref())
        .and_then(|node| rename(EntityKind::File, &scibridge_core::fields::FILE, node, &[]))
        .map(FilterSpec::with_where);
    FilterSpec {
        include: vec![Inclusion {
            relation: native::ORIG_DATABLOCKS.to_string(),
            scope,
        }],
        ..FilterSpec::default()
    }
}

fn inclusion_where(
    kind: EntityKind,
    inclusion: &Inclusion,
) -> Result<Option<WhereNode>, FilterError> {
    match inclusion.scope_where() {
        Some(node) => translate_where(kind, node),
        None => Ok(None),
    }
}

/// A native inclusion whose scope keeps only the translated `where`.
fn scoped_inclusion(
    native_relation: &str,
    target: EntityKind,
    inclusion: &Inclusion,
) -> Result<Inclusion, FilterError> {
    let scope = match &inclusion.scope {
        None => None,
        Some(_) => Some(
            inclusion_where(target, inclusion)?
                .map(FilterSpec::with_where)
                .unwrap_or_default(),
        ),
    };
    Ok(Inclusion {
        relation: native_relation.to_string(),
        scope,
    })
}

fn rename(
    kind: EntityKind,
    dictionary: &FieldDictionary,
    node: &WhereNode,
    implied: &[&str],
) -> Option<WhereNode> {
    match node {
        WhereNode::And(children) => {
            rename_list(kind, dictionary, children, implied).map(WhereNode::And)
        }
        WhereNode::Or(children) => {
            rename_list(kind, dictionary, children, implied).map(WhereNode::Or)
        }
        WhereNode::Leaf(leaf) => {
            rename_leaf(kind, dictionary, leaf, implied).map(WhereNode::Leaf)
        }
    }
}

/// Drops list members that test an implied field, renames the rest, and collapses to `None`
/// when nothing is left.
fn rename_list(
    kind: EntityKind,
    dictionary: &FieldDictionary,
    children: &[WhereNode],
    implied: &[&str],
) -> Option<Vec<WhereNode>> {
    let renamed: Vec<_> = children
        .iter()
        .filter(|child| !implied.iter().any(|field| child.leaf_has(field)))
        .filter_map(|child| rename(kind, dictionary, child, implied))
        .collect();
    (!renamed.is_empty()).then_some(renamed)
}

fn rename_leaf(
    kind: EntityKind,
    dictionary: &FieldDictionary,
    leaf: &Leaf,
    implied: &[&str],
) -> Option<Leaf> {
    let mut out = Leaf::new();
    for (field, value) in leaf {
        if implied.contains(&field.as_str()) {
            continue;
        }
        match dictionary.native(field) {
            Some(native) => {
                out.insert(native.to_string(), value.clone());
            }
            None => {
                tracing::debug!(
                    target: LOG_TARGET,
                    entity = %kind,
                    %field,
                    "dropping unmapped field"
                );
            }
        }
    }
    (!out.is_empty()).then_some(out)
}
