use scibridge_core::native;
use scibridge_core::WhereNode;
use scibridge_error::FilterError;

use crate::LOG_TARGET;

const FULL_NAME: &str = "fullName";

/// Translates a `person` scope under `members`.
///
/// A person may appear among a publication's creators or its authors, so `{fullName: v}`
/// becomes `Or([{creator: v}, {authors: v}])`. Combinations of person predicates have no
/// faithful native form and are rejected.
pub fn translate_members(node: &WhereNode) -> Result<Option<WhereNode>, FilterError> {
    match node {
        WhereNode::And(_) => Err(FilterError::UnsupportedMemberFilter { combinator: "and" }),
        WhereNode::Or(_) => Err(FilterError::UnsupportedMemberFilter { combinator: "or" }),
        WhereNode::Leaf(leaf) => {
            for field in leaf.keys().filter(|k| *k != FULL_NAME) {
                tracing::debug!(target: LOG_TARGET, %field, "dropping unmapped person field");
            }
            Ok(leaf.get(FULL_NAME).map(|name| {
                WhereNode::Or(vec![
                    WhereNode::leaf(native::CREATOR, name.clone()),
                    WhereNode::leaf(native::AUTHORS, name.clone()),
                ])
            }))
        }
    }
}
