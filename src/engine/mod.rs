//! Public entry point: parse a locator, resolve it, enforce the result
//! constraints and cache the selection.

pub mod cache;

pub use cache::SelectionCache;

use crate::config::EngineConfig;
use crate::document::{Candidate, DocumentBackend, Edge};
use crate::finder::{ObjectFinder, SelectorError};
use crate::locator::{cache_key, Locator, LocatorInput, LocatorParser, ObjectType};
use crate::selection::Selection;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct SelectorEngine {
    parser: LocatorParser,
    cache: SelectionCache,
}

impl Default for SelectorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectorEngine {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            parser: LocatorParser::new()
                .strict(config.locator.strict)
                .unknown_filters(config.locator.unknown_filters),
            cache: SelectionCache::new(config.cache.enabled, config.cache.capacity),
        }
    }

    pub fn parser(&self) -> &LocatorParser {
        &self.parser
    }

    /// Resolve `locator` into a selection.
    ///
    /// Fails with [`SelectorError::ObjectNotFound`] when nothing matches, and
    /// with [`SelectorError::AmbiguousLocator`] when `expect_single` is set
    /// and more than one range survives normalization.
    pub fn select(
        &mut self,
        document: &dyn DocumentBackend,
        locator: impl Into<LocatorInput>,
        expect_single: bool,
    ) -> Result<Selection, SelectorError> {
        let locator = self.parser.parse(locator)?;
        self.select_locator(document, &locator, expect_single)
    }

    /// Like [`select`](Self::select) for a locator that is already parsed.
    pub fn select_locator(
        &mut self,
        document: &dyn DocumentBackend,
        locator: &Locator,
        expect_single: bool,
    ) -> Result<Selection, SelectorError> {
        let revision = document.revision().to_string();
        let key = cache_key(
            locator,
            &[("document", document.document_id()), ("revision", revision.as_str())],
        );

        if let Some(selection) = self.cache.get(&key) {
            debug!(%key, "selection cache hit");
            check_single(selection.len(), locator, expect_single)?;
            return Ok(selection);
        }

        let finder = ObjectFinder::new(document);
        let candidates = match locator.object_type {
            ObjectType::DocumentStart => vec![collapse_content(document, Edge::Start)],
            ObjectType::DocumentEnd => vec![collapse_content(document, Edge::End)],
            _ => finder.resolve(locator)?,
        };

        if candidates.is_empty() {
            return Err(not_found(locator));
        }

        let normalized = finder.normalize(candidates);
        if normalized.ranges.is_empty() {
            return Err(not_found(locator));
        }

        let selection = Selection::new(
            Arc::from(document.document_id()),
            normalized.ranges,
            normalized.warnings,
        );
        self.cache.insert(key, selection.clone());
        check_single(selection.len(), locator, expect_single)?;
        Ok(selection)
    }

    /// Matching candidates without normalization or the empty/ambiguous
    /// checks.
    pub fn resolve(
        &self,
        document: &dyn DocumentBackend,
        locator: impl Into<LocatorInput>,
    ) -> Result<Vec<Candidate>, SelectorError> {
        let locator = self.parser.parse(locator)?;
        ObjectFinder::new(document).resolve(&locator)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

fn collapse_content(document: &dyn DocumentBackend, edge: Edge) -> Candidate {
    document.collapse(&document.content(), edge)
}

fn not_found(locator: &Locator) -> SelectorError {
    SelectorError::ObjectNotFound {
        locator: locator.canonical(),
    }
}

fn check_single(count: usize, locator: &Locator, expect_single: bool) -> Result<(), SelectorError> {
    if expect_single && count > 1 {
        return Err(SelectorError::AmbiguousLocator {
            count,
            locator: locator.canonical(),
        });
    }
    Ok(())
}
