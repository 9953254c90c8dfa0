use scibridge_core::{EntityKind, Relation};

/// Entity kinds entered on the way from the top-level record to the one being hydrated.
///
/// A relation is only expanded when its target kind is not already on the path, so a
/// dataset's document never re-expands that document's datasets. Depth is therefore bounded
/// by [`EntityKind::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydrationPath {
    kinds: Vec<EntityKind>,
}

impl HydrationPath {
    pub fn root(kind: EntityKind) -> Self {
        Self { kinds: vec![kind] }
    }

    pub fn contains(&self, kind: EntityKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn depth(&self) -> usize {
        self.kinds.len()
    }

    /// Resolves a requested relation name on a record of `kind` at the end of this path.
    pub fn step(&self, kind: EntityKind, name: &str) -> Step {
        match name.parse::<Relation>() {
            Ok(relation) if kind.has_relation(relation) => match self.follow(relation) {
                Some(next) => Step::Expand(relation, next),
                None => Step::Revisit(relation),
            },
            _ => Step::Unknown,
        }
    }

    /// The path extended across `relation`, or `None` when its target was already visited.
    pub fn follow(&self, relation: Relation) -> Option<Self> {
        let target = relation.target();
        if self.contains(target) {
            return None;
        }
        let mut kinds = self.kinds.clone();
        kinds.push(target);
        Some(Self { kinds })
    }
}

/// What the hydrator does with one requested relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Hydrated, with nested inclusions resolved under the extended path.
    Expand(Relation, HydrationPath),
    /// Not a relation of the record's kind; left out of the record.
    Unknown,
    /// Target kind already on the path; left out of the record.
    Revisit(Relation),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_refuses_to_reenter_a_kind() {
        let path = HydrationPath::root(EntityKind::Dataset);
        let document = path.follow(Relation::Document).unwrap();
        assert!(document.contains(EntityKind::Document));
        assert_eq!(document.depth(), 2);
        assert!(document.follow(Relation::Datasets).is_none());
        assert!(document.follow(Relation::Members).is_some());
    }

    #[test]
    fn step_classifies_requested_relations() {
        let path = HydrationPath::root(EntityKind::Dataset);
        assert!(matches!(
            path.step(EntityKind::Dataset, "samples"),
            Step::Expand(Relation::Samples, _)
        ));
        assert_eq!(path.step(EntityKind::Dataset, "nonsense"), Step::Unknown);
        assert_eq!(path.step(EntityKind::Dataset, "members"), Step::Unknown);
        assert_eq!(
            HydrationPath::root(EntityKind::Instrument).step(EntityKind::Instrument, "datasets"),
            Step::Unknown
        );

        let Step::Expand(_, document) = path.step(EntityKind::Dataset, "document") else {
            panic!("document should expand");
        };
        assert_eq!(
            document.step(EntityKind::Document, "datasets"),
            Step::Revisit(Relation::Datasets)
        );
    }

    #[test]
    fn depth_is_bounded_by_entity_kinds() {
        let mut path = HydrationPath::root(EntityKind::Document);
        let chain = [Relation::Datasets, Relation::Samples, Relation::Document];
        for relation in chain {
            if let Some(next) = path.follow(relation) {
                path = next;
            }
        }
        assert_eq!(path.depth(), 3);
        assert!(path.depth() <= EntityKind::ALL.len());
    }
}
