//! Immutable result sets produced by the engine.

use crate::document::NodeKind;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

const PREVIEW_CHARS: usize = 50;

/// A resolved span of a specific document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedRange {
    pub kind: NodeKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// Id of the document the range belongs to.
    pub document: Arc<str>,
}

impl PositionedRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Ordered, immutable list of ranges. Clones share storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    inner: Arc<Inner>,
}

#[derive(Debug, PartialEq, Eq)]
struct Inner {
    document: Arc<str>,
    ranges: Vec<PositionedRange>,
    warnings: Vec<String>,
}

impl Selection {
    pub fn new(document: Arc<str>, ranges: Vec<PositionedRange>, warnings: Vec<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                document,
                ranges,
                warnings,
            }),
        }
    }

    pub fn ranges(&self) -> &[PositionedRange] {
        &self.inner.ranges
    }

    pub fn len(&self) -> usize {
        self.inner.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.ranges.is_empty()
    }

    pub fn first(&self) -> Option<&PositionedRange> {
        self.inner.ranges.first()
    }

    pub fn document_id(&self) -> &str {
        &self.inner.document
    }

    /// Candidates dropped while normalizing, one message each.
    pub fn warnings(&self) -> &[String] {
        &self.inner.warnings
    }

    /// How many ranges of each node kind the selection holds.
    pub fn node_kinds(&self) -> BTreeMap<NodeKind, usize> {
        let mut counts = BTreeMap::new();
        for range in self.ranges() {
            *counts.entry(range.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Whether two selections share the same storage.
    pub fn ptr_eq(&self, other: &Selection) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn describe(&self) -> SelectionInfo {
        SelectionInfo {
            document: self.document_id().to_string(),
            count: self.len(),
            node_kinds: self.node_kinds(),
            ranges: self
                .ranges()
                .iter()
                .map(|range| RangeInfo {
                    kind: range.kind,
                    start: range.start,
                    end: range.end,
                    preview: preview(&range.text),
                })
                .collect(),
            warnings: self.warnings().to_vec(),
        }
    }
}

/// Serializable summary of a [`Selection`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionInfo {
    pub document: String,
    pub count: usize,
    pub node_kinds: BTreeMap<NodeKind, usize>,
    pub ranges: Vec<RangeInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeInfo {
    pub kind: NodeKind,
    pub start: usize,
    pub end: usize,
    pub preview: String,
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(kind: NodeKind, text: &str, start: usize) -> PositionedRange {
        PositionedRange {
            kind,
            text: text.to_string(),
            start,
            end: start + text.chars().count(),
            document: Arc::from("doc"),
        }
    }

    #[test]
    fn counts_node_kinds() {
        let selection = Selection::new(
            Arc::from("doc"),
            vec![
                range(NodeKind::Paragraph, "a", 0),
                range(NodeKind::Table, "b", 2),
                range(NodeKind::Paragraph, "c", 4),
            ],
            Vec::new(),
        );
        let kinds = selection.node_kinds();
        assert_eq!(kinds[&NodeKind::Paragraph], 2);
        assert_eq!(kinds[&NodeKind::Table], 1);
    }

    #[test]
    fn describe_truncates_long_text() {
        let long = "x".repeat(80);
        let selection = Selection::new(
            Arc::from("doc"),
            vec![range(NodeKind::Paragraph, &long, 0)],
            Vec::new(),
        );
        let info = selection.describe();
        assert_eq!(info.ranges[0].preview.chars().count(), PREVIEW_CHARS + 3);

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["node_kinds"]["paragraph"], 1);
        assert!(json.get("warnings").is_none());
    }

    #[test]
    fn clones_share_storage() {
        let selection = Selection::new(Arc::from("doc"), Vec::new(), Vec::new());
        assert!(selection.clone().ptr_eq(&selection));
        assert!(selection.is_empty());
    }
}
