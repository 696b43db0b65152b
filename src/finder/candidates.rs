//! Candidate retrieval per object type.

use crate::document::{Candidate, DocumentBackend, Edge, NodeKind, ShapeKind};
use crate::locator::ObjectType;

/// Every node of `object_type`, in document order.
pub fn global(backend: &dyn DocumentBackend, object_type: ObjectType) -> Vec<Candidate> {
    match object_type {
        ObjectType::Paragraph => backend.nodes(NodeKind::Paragraph),
        ObjectType::Table => backend.nodes(NodeKind::Table),
        ObjectType::Cell => backend.nodes(NodeKind::Cell),
        ObjectType::InlineShape => backend.nodes(NodeKind::InlineShape),
        ObjectType::Image => backend
            .nodes(NodeKind::InlineShape)
            .into_iter()
            .filter(|c| c.attrs.shape == Some(ShapeKind::Picture))
            .collect(),
        ObjectType::Comment => backend.nodes(NodeKind::Comment),
        ObjectType::Document | ObjectType::Range => vec![backend.content()],
        ObjectType::DocumentStart => vec![backend.collapse(&backend.content(), Edge::Start)],
        ObjectType::DocumentEnd => vec![backend.collapse(&backend.content(), Edge::End)],
        ObjectType::Selection => backend.selection().into_iter().collect(),
    }
}

/// Nodes of `object_type` overlapping `anchor`.
pub fn scoped(
    backend: &dyn DocumentBackend,
    object_type: ObjectType,
    anchor: &Candidate,
) -> Vec<Candidate> {
    global(backend, object_type)
        .into_iter()
        .filter(|c| c.overlaps(anchor))
        .collect()
}
