//! Document backend contract consumed by the resolver.
//!
//! The engine never owns or mutates the document. Everything it needs is
//! expressed through [`DocumentBackend`], which hands out [`Candidate`]
//! snapshots of nodes and materializes ranges from character positions.

pub mod errors;
pub mod memory;

pub use errors::BackendError;
pub use memory::{Block, CommentSpec, DocumentSpec, MemoryDocument, SpanSpec};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of node a backend can enumerate or synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Paragraph,
    Table,
    Cell,
    InlineShape,
    Comment,
    /// A plain range: document content, a collapsed position, a bookmark.
    Range,
    Selection,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Paragraph => "paragraph",
            NodeKind::Table => "table",
            NodeKind::Cell => "cell",
            NodeKind::InlineShape => "inline_shape",
            NodeKind::Comment => "comment",
            NodeKind::Range => "range",
            NodeKind::Selection => "selection",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inline shape kinds, named the way word processors report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Picture,
    LinkedPicture,
    Chart,
    Diagram,
    #[serde(rename = "OLEControlObject")]
    OleControlObject,
    #[serde(rename = "OLEObject")]
    OleObject,
    #[serde(rename = "ActiveXControl")]
    ActiveXControl,
    SmartArt,
    #[serde(rename = "3DModel")]
    Model3d,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 9] = [
        ShapeKind::Picture,
        ShapeKind::LinkedPicture,
        ShapeKind::Chart,
        ShapeKind::Diagram,
        ShapeKind::OleControlObject,
        ShapeKind::OleObject,
        ShapeKind::ActiveXControl,
        ShapeKind::SmartArt,
        ShapeKind::Model3d,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Picture => "Picture",
            ShapeKind::LinkedPicture => "LinkedPicture",
            ShapeKind::Chart => "Chart",
            ShapeKind::Diagram => "Diagram",
            ShapeKind::OleControlObject => "OLEControlObject",
            ShapeKind::OleObject => "OLEObject",
            ShapeKind::ActiveXControl => "ActiveXControl",
            ShapeKind::SmartArt => "SmartArt",
            ShapeKind::Model3d => "3DModel",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Which end of a range to collapse onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

/// A span of document text at character positions `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRef {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl RangeRef {
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// Type-specific node attributes. Absent values never match a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeAttrs {
    pub rows: Option<usize>,
    pub columns: Option<usize>,
    /// 1-based row of a cell.
    pub row_index: Option<usize>,
    /// 1-based column of a cell.
    pub column_index: Option<usize>,
    /// 1-based position of the table owning a cell (or of the table itself).
    pub table_index: Option<usize>,
    pub shape: Option<ShapeKind>,
    pub author: Option<String>,
    pub bold: Option<bool>,
    /// List numbering label ("1.", "•"); empty or absent for plain paragraphs.
    pub list_label: Option<String>,
}

/// Snapshot of a document node taken for one resolution call.
///
/// A backend exposes a node's position in up to three ways, tried in this
/// order when the node is normalized into a
/// [`PositionedRange`](crate::selection::PositionedRange):
///
/// 1. `native`: the node is itself a range (document content, selection).
/// 2. `range`: a range-valued attribute (the span a paragraph covers).
/// 3. `start`/`end`: raw bounds the backend can materialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: NodeKind,
    pub start: usize,
    pub end: usize,
    /// Searchable text used by text filters.
    pub text: Option<String>,
    pub style: Option<String>,
    pub native: Option<RangeRef>,
    pub range: Option<RangeRef>,
    pub attrs: NodeAttrs,
}

impl Candidate {
    /// A node with bounds only.
    pub fn new(kind: NodeKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            start,
            end,
            text: None,
            style: None,
            native: None,
            range: None,
            attrs: NodeAttrs::default(),
        }
    }

    /// A node that is itself a range.
    pub fn from_range(kind: NodeKind, range: RangeRef) -> Self {
        let mut node = Self::new(kind, range.start, range.end);
        node.native = Some(range);
        node
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_range(mut self, range: RangeRef) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_attrs(mut self, attrs: NodeAttrs) -> Self {
        self.attrs = attrs;
        self
    }

    /// Text used for matching: own text, then native range text, then
    /// attribute range text.
    pub fn text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .or_else(|| self.native.as_ref().map(|r| r.text.as_str()))
            .or_else(|| self.range.as_ref().map(|r| r.text.as_str()))
    }

    /// Whether the style name denotes a heading.
    pub fn is_heading(&self) -> bool {
        self.style.as_deref().is_some_and(is_heading_style)
    }

    /// Whether `[start, end)` lies within `outer`.
    pub fn is_within(&self, outer: &Candidate) -> bool {
        self.start >= outer.start && self.end <= outer.end
    }

    /// Interval overlap used to scope candidates to an anchor: either bound
    /// falls inside the anchor, or the node contains the anchor entirely.
    pub fn overlaps(&self, anchor: &Candidate) -> bool {
        let starts_inside = self.start >= anchor.start && self.start <= anchor.end;
        let ends_inside = self.end >= anchor.start && self.end <= anchor.end;
        let contains = self.start <= anchor.start && self.end >= anchor.end;
        starts_inside || ends_inside || contains
    }

    /// Copy restricted to `[start, end)`. The copy carries no range, so it is
    /// re-materialized from its bounds during normalization.
    pub fn clipped(&self, start: usize, end: usize) -> Candidate {
        Candidate {
            kind: self.kind,
            start,
            end,
            text: None,
            style: self.style.clone(),
            native: None,
            range: None,
            attrs: self.attrs.clone(),
        }
    }
}

/// Heading styles are named "Heading N" (or the localized "标题 N").
pub fn is_heading_style(style: &str) -> bool {
    style.starts_with("Heading") || style.starts_with("标题")
}

/// Read-only view of a live document.
///
/// Implementations answer every call from the current state of the document.
/// The engine calls them strictly sequentially and assumes the document is
/// not mutated while a single resolution is running.
pub trait DocumentBackend {
    /// Stable identifier of the document (path, name, handle).
    fn document_id(&self) -> &str;

    /// Changes whenever the document content or structure changes.
    fn revision(&self) -> u64;

    /// All nodes of `kind` in document order. Synthetic kinds
    /// ([`NodeKind::Range`], [`NodeKind::Selection`]) yield nothing.
    fn nodes(&self, kind: NodeKind) -> Vec<Candidate>;

    /// The whole document content as a single range node.
    fn content(&self) -> Candidate;

    /// Collapse a node onto one of its edges.
    fn collapse(&self, node: &Candidate, edge: Edge) -> Candidate {
        let at = match edge {
            Edge::Start => node.start,
            Edge::End => node.end,
        };
        Candidate::from_range(NodeKind::Range, RangeRef::new("", at, at))
    }

    /// The current user selection, if the document has one.
    fn selection(&self) -> Option<Candidate>;

    /// The range of the active window, if any.
    fn active_range(&self) -> Option<Candidate>;

    fn bookmark(&self, name: &str) -> Option<Candidate>;

    /// Structural parent of a node.
    fn parent(&self, node: &Candidate) -> Option<Candidate>;

    /// Materialize the text between two character positions.
    fn materialize(&self, start: usize, end: usize) -> Result<RangeRef, BackendError>;

    /// Whether a range still refers to valid content.
    fn is_live(&self, range: &RangeRef) -> bool;
}
