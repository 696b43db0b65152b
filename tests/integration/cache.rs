use super::report;
use docsel::document::{Block, Edge, RangeRef};
use docsel::{
    BackendError, Candidate, DocumentBackend, EngineConfig, MemoryDocument, NodeKind,
    SelectorEngine, SelectorError,
};
use std::cell::Cell;

/// Counts every call that reads document content.
struct CountingBackend {
    inner: MemoryDocument,
    queries: Cell<usize>,
}

impl CountingBackend {
    fn new(inner: MemoryDocument) -> Self {
        Self {
            inner,
            queries: Cell::new(0),
        }
    }

    fn hit(&self) {
        self.queries.set(self.queries.get() + 1);
    }
}

impl DocumentBackend for CountingBackend {
    fn document_id(&self) -> &str {
        self.inner.document_id()
    }

    fn revision(&self) -> u64 {
        self.inner.revision()
    }

    fn nodes(&self, kind: NodeKind) -> Vec<Candidate> {
        self.hit();
        self.inner.nodes(kind)
    }

    fn content(&self) -> Candidate {
        self.hit();
        self.inner.content()
    }

    fn collapse(&self, node: &Candidate, edge: Edge) -> Candidate {
        self.hit();
        self.inner.collapse(node, edge)
    }

    fn selection(&self) -> Option<Candidate> {
        self.hit();
        self.inner.selection()
    }

    fn active_range(&self) -> Option<Candidate> {
        self.hit();
        self.inner.active_range()
    }

    fn bookmark(&self, name: &str) -> Option<Candidate> {
        self.hit();
        self.inner.bookmark(name)
    }

    fn parent(&self, node: &Candidate) -> Option<Candidate> {
        self.hit();
        self.inner.parent(node)
    }

    fn materialize(&self, start: usize, end: usize) -> Result<RangeRef, BackendError> {
        self.hit();
        self.inner.materialize(start, end)
    }

    fn is_live(&self, range: &RangeRef) -> bool {
        self.hit();
        self.inner.is_live(range)
    }
}

#[test]
fn test_cache_hit_skips_backend() {
    let doc = CountingBackend::new(report());
    let mut engine = SelectorEngine::new();
    let locator = "paragraph@bookmark:outlook[all_occurrences_within]";

    let first = engine.select(&doc, locator, false).unwrap();
    let after_first = doc.queries.get();
    assert!(after_first > 0);

    let second = engine.select(&doc, locator, false).unwrap();
    assert_eq!(doc.queries.get(), after_first);
    assert!(first.ptr_eq(&second));
}

#[test]
fn test_equivalent_locators_share_an_entry() {
    let doc = CountingBackend::new(report());
    let mut engine = SelectorEngine::new();

    engine.select(&doc, "paragraph[contains_text=revenue]", false).unwrap();
    let queries = doc.queries.get();
    engine
        .select(&doc, r#" paragraph [contains_text="revenue"] "#, false)
        .unwrap();
    assert_eq!(doc.queries.get(), queries);
    assert_eq!(engine.cache_len(), 1);
}

#[test]
fn test_clear_cache_forces_resolution() {
    let doc = CountingBackend::new(report());
    let mut engine = SelectorEngine::new();

    engine.select(&doc, "table:1", true).unwrap();
    let queries = doc.queries.get();
    engine.clear_cache();
    assert_eq!(engine.cache_len(), 0);

    engine.select(&doc, "table:1", true).unwrap();
    assert!(doc.queries.get() > queries);
}

#[test]
fn test_mutation_invalidates_entries() {
    let mut doc = report();
    let mut engine = SelectorEngine::new();

    let before = engine.select(&doc, "paragraph:Costs", true).unwrap();
    doc.push_block(Block::paragraph("Costs rise later")).unwrap();

    let err = engine.select(&doc, "paragraph:Costs", true).unwrap_err();
    assert!(matches!(err, SelectorError::AmbiguousLocator { count: 2, .. }));
    assert_eq!(before.len(), 1);
}

#[test]
fn test_single_check_applies_to_cached_results() {
    let doc = report();
    let mut engine = SelectorEngine::new();

    engine.select(&doc, "cell", false).unwrap();
    let err = engine.select(&doc, "cell", true).unwrap_err();
    assert!(matches!(err, SelectorError::AmbiguousLocator { count: 6, .. }));
}

#[test]
fn test_capacity_bounds_entries() {
    let doc = report();
    let mut config = EngineConfig::default();
    config.cache.capacity = 2;
    let mut engine = SelectorEngine::with_config(&config);

    for n in 1..=3 {
        engine.select(&doc, format!("paragraph:{n}"), true).unwrap();
    }
    assert_eq!(engine.cache_len(), 1);
}
