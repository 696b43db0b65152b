//! Anchor identifiers.
//!
//! An identifier is tried against these forms, first match wins:
//!
//! | form                | resolves to                                        |
//! |---------------------|----------------------------------------------------|
//! | `document_start`    | content collapsed to its start                     |
//! | `document_end`      | content collapsed to its end                       |
//! | `current_selection` | the user selection                                 |
//! | `active_range`      | the active window range                            |
//! | `bookmark:<name>`   | the bookmark's range                               |
//! | `heading:<text>`    | first heading paragraph containing `text`          |
//! | `<digits>`          | 0-based over paragraphs, then tables, then comments |
//! | anything else       | first paragraph containing the text                |

use crate::document::{Candidate, DocumentBackend, Edge, NodeKind};
use crate::locator::schema::is_all_digits;

/// Resolve an anchor identifier, or `None` if nothing matches.
pub fn find_by_id(backend: &dyn DocumentBackend, id: &str) -> Option<Candidate> {
    match id {
        "document_start" => return Some(backend.collapse(&backend.content(), Edge::Start)),
        "document_end" => return Some(backend.collapse(&backend.content(), Edge::End)),
        "current_selection" => return backend.selection(),
        "active_range" => return backend.active_range(),
        _ => {}
    }

    if let Some(name) = id.strip_prefix("bookmark:") {
        return backend.bookmark(name.trim());
    }

    if let Some(text) = id.strip_prefix("heading:") {
        let needle = text.trim().to_lowercase();
        return backend
            .nodes(NodeKind::Paragraph)
            .into_iter()
            .find(|p| p.is_heading() && contains_lowercase(p, &needle));
    }

    if is_all_digits(id) {
        let found = id.parse::<usize>().ok().and_then(|n| {
            [NodeKind::Paragraph, NodeKind::Table, NodeKind::Comment]
                .into_iter()
                .flat_map(|kind| backend.nodes(kind))
                .nth(n)
        });
        if found.is_some() {
            return found;
        }
    }

    let needle = id.to_lowercase();
    backend
        .nodes(NodeKind::Paragraph)
        .into_iter()
        .find(|p| contains_lowercase(p, &needle))
}

fn contains_lowercase(node: &Candidate, needle: &str) -> bool {
    node.text()
        .is_some_and(|text| text.to_lowercase().contains(needle))
}
