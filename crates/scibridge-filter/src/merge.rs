//! Combining translated predicates into an existing native `where`.
use scibridge_core::WhereNode;

/// Folds a child relation's predicates into its parent's `where`.
///
/// A parent `And` is extended in place; any other parent becomes the first conjunct of a new
/// `And`. Without a parent the child stands alone.
pub fn merge_into_parent(parent: Option<WhereNode>, child: WhereNode) -> WhereNode {
    match parent {
        None => child,
        Some(WhereNode::And(mut nodes)) => {
            nodes.extend(child.into_conjuncts());
            WhereNode::And(nodes)
        }
        Some(other) => {
            let mut nodes = vec![other];
            nodes.extend(child.into_conjuncts());
            WhereNode::And(nodes)
        }
    }
}

/// Pins a secondary fetch to one record while keeping any extra predicates, identity first.
pub fn pin_identity(identity: WhereNode, extra: Option<WhereNode>) -> WhereNode {
    match extra {
        None => identity,
        Some(WhereNode::And(nodes)) => {
            let mut pinned = Vec::with_capacity(nodes.len() + 1);
            pinned.push(identity);
            pinned.extend(nodes);
            WhereNode::And(pinned)
        }
        Some(other) => WhereNode::And(vec![identity, other]),
    }
}
