//! Per-engine cache of resolved selections.
//!
//! Keys carry the document id and revision, so entries for an older
//! revision are never hit again. The cache is capped and cleared wholesale
//! once full.

use crate::selection::Selection;
use std::collections::HashMap;

#[derive(Debug)]
pub struct SelectionCache {
    enabled: bool,
    capacity: usize,
    entries: HashMap<String, Selection>,
}

impl SelectionCache {
    pub fn new(enabled: bool, capacity: usize) -> Self {
        Self {
            enabled,
            capacity,
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Selection> {
        if !self.enabled {
            return None;
        }
        self.entries.get(key).cloned()
    }

    pub fn insert(&mut self, key: String, selection: Selection) {
        if !self.enabled || self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            tracing::debug!(entries = self.entries.len(), "selection cache full, clearing");
            self.entries.clear();
        }
        self.entries.insert(key, selection);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
