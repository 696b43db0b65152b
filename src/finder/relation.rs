use crate::document::Candidate;
use crate::locator::RelationKind;

/// Narrow `candidates` by their position relative to `anchor`.
///
/// `parent` looks up the structural parent of the anchor; it is only called
/// for [`RelationKind::ParentOf`].
pub fn select_relative(
    candidates: Vec<Candidate>,
    anchor: &Candidate,
    relation: RelationKind,
    parent: impl FnOnce(&Candidate) -> Option<Candidate>,
) -> Vec<Candidate> {
    match relation {
        RelationKind::AllOccurrencesWithin => candidates
            .into_iter()
            .filter(|c| c.is_within(anchor))
            .collect(),
        RelationKind::FirstOccurrenceAfter => {
            let mut after: Vec<Candidate> = candidates
                .into_iter()
                .filter(|c| c.start > anchor.end)
                .collect();
            after.sort_by_key(|c| c.start);
            after.into_iter().take(1).collect()
        }
        RelationKind::ParentOf => {
            let Some(parent) = parent(anchor) else {
                return Vec::new();
            };
            // The parent only counts if it is one of the requested nodes.
            candidates
                .into_iter()
                .filter(|c| c.kind == parent.kind && (c.start, c.end) == (parent.start, parent.end))
                .take(1)
                .collect()
        }
        RelationKind::ImmediatelyFollowing => {
            let mut nearest: Option<Candidate> = None;
            for c in candidates {
                if c.start > anchor.end && nearest.as_ref().map_or(true, |n| c.start < n.start) {
                    nearest = Some(c);
                }
            }
            nearest.into_iter().collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeKind;

    fn node(start: usize, end: usize) -> Candidate {
        Candidate::new(NodeKind::Paragraph, start, end)
    }

    fn bounds(found: &[Candidate]) -> Vec<(usize, usize)> {
        found.iter().map(|c| (c.start, c.end)).collect()
    }

    fn no_parent(_: &Candidate) -> Option<Candidate> {
        None
    }

    #[test]
    fn within_requires_containment() {
        let found = select_relative(
            vec![node(0, 5), node(10, 12), node(18, 25)],
            &node(8, 20),
            RelationKind::AllOccurrencesWithin,
            no_parent,
        );
        assert_eq!(bounds(&found), [(10, 12)]);
    }

    #[test]
    fn first_after_takes_smallest_start() {
        let candidates = vec![node(30, 35), node(21, 25), node(20, 22), node(0, 5)];
        let found = select_relative(
            candidates.clone(),
            &node(10, 20),
            RelationKind::FirstOccurrenceAfter,
            no_parent,
        );
        assert_eq!(bounds(&found), [(21, 25)]);

        let found = select_relative(
            candidates,
            &node(10, 20),
            RelationKind::ImmediatelyFollowing,
            no_parent,
        );
        assert_eq!(bounds(&found), [(21, 25)]);
    }

    #[test]
    fn nothing_after_is_empty() {
        let found = select_relative(
            vec![node(0, 5)],
            &node(10, 20),
            RelationKind::ImmediatelyFollowing,
            no_parent,
        );
        assert!(found.is_empty());
    }

    #[test]
    fn parent_must_be_a_candidate() {
        let table = Candidate::new(NodeKind::Table, 0, 30);
        let cell = Candidate::new(NodeKind::Cell, 0, 4);
        let lookup = |_: &Candidate| Some(Candidate::new(NodeKind::Table, 0, 30));

        let found = select_relative(vec![table], &cell, RelationKind::ParentOf, lookup);
        assert_eq!(found[0].kind, NodeKind::Table);

        let found = select_relative(vec![node(0, 30)], &cell, RelationKind::ParentOf, lookup);
        assert!(found.is_empty());
    }
}
