//! Locator resolution against a document backend.
//!
//! Resolution runs in a fixed order:
//!
//! 1. draw candidates for the object type (document-wide, or scoped to the
//!    anchor for containment relations)
//! 2. apply filters in list order
//! 3. narrow by the relation to the anchor
//! 4. apply filters again on the relation's output
//! 5. apply the locator value as an index or a text search (unanchored only)
//!
//! The finder never fails on an empty result; deciding whether "nothing"
//! is an error is up to the engine.

pub mod anchor;
pub mod candidates;
pub mod errors;
pub mod filters;
pub mod normalize;
pub mod relation;

pub use errors::SelectorError;
pub use normalize::Normalized;

use crate::document::{Candidate, DocumentBackend, NodeKind, ShapeKind};
use crate::locator::{Anchor, FilterKind, FilterSpec, Locator, ObjectType};
use tracing::debug;

const SNIPPET_CHARS: usize = 50;

pub struct ObjectFinder<'a> {
    backend: &'a dyn DocumentBackend,
}

impl<'a> ObjectFinder<'a> {
    pub fn new(backend: &'a dyn DocumentBackend) -> Self {
        Self { backend }
    }

    /// Candidates matching `locator`, in document order.
    pub fn resolve(&self, locator: &Locator) -> Result<Vec<Candidate>, SelectorError> {
        let Some(clause) = &locator.anchor else {
            let found = self.candidates(locator.object_type, None);
            let found = self.apply_filters(found, &locator.filters);
            let found = apply_value(found, locator);
            debug!(locator = %locator, count = found.len(), "resolved");
            return Ok(found);
        };

        let anchor = self.find_anchor(&clause.target)?;
        let scope = clause.relation.scopes_candidates().then_some(&anchor);
        let pool = self.candidates(locator.object_type, scope);

        let attribute_filters: Vec<FilterSpec> = locator
            .filters
            .iter()
            .filter(|f| !f.kind.is_positional())
            .cloned()
            .collect();
        let pool = self.apply_filters(pool, &attribute_filters);

        let related = relation::select_relative(pool, &anchor, clause.relation, |node| {
            self.backend.parent(node)
        });
        let found = self.apply_filters(related, &locator.filters);
        debug!(
            locator = %locator,
            anchor_start = anchor.start,
            anchor_end = anchor.end,
            count = found.len(),
            "resolved relative to anchor"
        );
        Ok(found)
    }

    /// Nodes of `object_type`, optionally restricted to those overlapping
    /// `scope`.
    pub fn candidates(&self, object_type: ObjectType, scope: Option<&Candidate>) -> Vec<Candidate> {
        match scope {
            Some(anchor) => candidates::scoped(self.backend, object_type, anchor),
            None => candidates::global(self.backend, object_type),
        }
    }

    /// Apply filters in order, stopping early once nothing is left.
    pub fn apply_filters(&self, mut candidates: Vec<Candidate>, filters: &[FilterSpec]) -> Vec<Candidate> {
        for filter in filters {
            if candidates.is_empty() {
                break;
            }
            candidates = filters::apply(candidates, filter);
        }
        candidates
    }

    pub fn find_anchor(&self, anchor: &Anchor) -> Result<Candidate, SelectorError> {
        let found = match anchor {
            Anchor::Id(id) => anchor::find_by_id(self.backend, id),
            Anchor::Locator(nested) => self.resolve(nested)?.into_iter().next(),
        };
        found.ok_or_else(|| SelectorError::AnchorNotFound {
            anchor: match anchor {
                Anchor::Id(id) => id.clone(),
                Anchor::Locator(nested) => nested.canonical(),
            },
        })
    }

    pub fn normalize(&self, candidates: Vec<Candidate>) -> Normalized {
        normalize::normalize(self.backend, candidates)
    }

    /// A locator that would find `candidate`: its type, a short text
    /// snippet, and its style.
    pub fn suggest_locator(&self, candidate: &Candidate) -> Locator {
        let object_type = match candidate.kind {
            NodeKind::Paragraph => ObjectType::Paragraph,
            NodeKind::Table => ObjectType::Table,
            NodeKind::Cell => ObjectType::Cell,
            NodeKind::InlineShape if candidate.attrs.shape == Some(ShapeKind::Picture) => {
                ObjectType::Image
            }
            NodeKind::InlineShape => ObjectType::InlineShape,
            NodeKind::Comment => ObjectType::Comment,
            NodeKind::Range => ObjectType::Range,
            NodeKind::Selection => ObjectType::Selection,
        };

        let mut locator = Locator::new(object_type);
        let snippet: String = candidate
            .text()
            .unwrap_or_default()
            .trim()
            .chars()
            .take(SNIPPET_CHARS)
            .collect();
        let snippet = snippet.trim_end();

        if !snippet.is_empty() {
            // An all-digit value would be read back as an index.
            if object_type.supports_text() && !snippet.bytes().all(|b| b.is_ascii_digit()) {
                locator = locator.with_value(snippet);
            } else {
                locator = locator.with_filter(FilterKind::ContainsText, snippet);
            }
        }
        if let Some(style) = candidate.style.as_deref().filter(|s| !s.is_empty()) {
            locator = locator.with_filter(FilterKind::HasStyle, style);
        }
        locator
    }
}

/// A digit-only or flagged value is a 1-based index. Otherwise text-bearing
/// types search for it; other types ignore it.
fn apply_value(mut candidates: Vec<Candidate>, locator: &Locator) -> Vec<Candidate> {
    let Some(value) = locator.value.as_deref() else {
        return candidates;
    };

    if locator.value_is_index() {
        return match value.trim().parse::<usize>() {
            Ok(n) if n >= 1 && n <= candidates.len() => vec![candidates.swap_remove(n - 1)],
            _ => Vec::new(),
        };
    }

    if locator.object_type.supports_text() {
        let needle = value.to_lowercase();
        candidates.retain(|c| c.text().is_some_and(|t| t.to_lowercase().contains(&needle)));
    }
    candidates
}
