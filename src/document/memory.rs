//! In-memory document backend.
//!
//! Lays blocks out sequentially into one character buffer, each block
//! terminated by `\n`. Table cells are laid out row by row, one cell per
//! line, and inline images occupy a single U+FFFC placeholder character.

use crate::document::errors::BackendError;
use crate::document::{
    Candidate, DocumentBackend, NodeAttrs, NodeKind, RangeRef, ShapeKind,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use xxhash_rust::xxh3::xxh3_64;

const OBJECT_PLACEHOLDER: char = '\u{FFFC}';
const DEFAULT_STYLE: &str = "Normal";

/// Serializable description of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSpec {
    pub id: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub comments: Vec<CommentSpec>,
    #[serde(default)]
    pub bookmarks: BTreeMap<String, SpanSpec>,
    #[serde(default)]
    pub selection: Option<SpanSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        text: String,
        #[serde(default)]
        style: Option<String>,
        #[serde(default)]
        bold: bool,
        #[serde(default)]
        list_label: Option<String>,
    },
    Table {
        rows: Vec<Vec<String>>,
    },
    Image {
        #[serde(default = "default_shape")]
        shape: ShapeKind,
    },
}

fn default_shape() -> ShapeKind {
    ShapeKind::Picture
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph {
            text: text.into(),
            style: None,
            bold: false,
            list_label: None,
        }
    }

    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        Block::Paragraph {
            text: text.into(),
            style: Some(format!("Heading {level}")),
            bold: true,
            list_label: None,
        }
    }

    pub fn list_item(text: impl Into<String>, label: impl Into<String>) -> Self {
        Block::Paragraph {
            text: text.into(),
            style: Some("List Paragraph".to_string()),
            bold: false,
            list_label: Some(label.into()),
        }
    }

    pub fn table<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Block::Table {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn image(shape: ShapeKind) -> Self {
        Block::Image { shape }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentSpec {
    pub author: String,
    pub text: String,
    /// The commented span of the document.
    pub scope: SpanSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanSpec {
    pub start: usize,
    pub end: usize,
}

impl SpanSpec {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Default)]
struct Layout {
    chars: Vec<char>,
    paragraphs: Vec<Candidate>,
    tables: Vec<Candidate>,
    cells: Vec<Candidate>,
    shapes: Vec<Candidate>,
    comments: Vec<Candidate>,
}

/// A document held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    spec: DocumentSpec,
    layout: Layout,
    revision: u64,
}

impl MemoryDocument {
    pub fn new(spec: DocumentSpec) -> Result<Self, BackendError> {
        let layout = build_layout(&spec)?;
        let revision = fingerprint(&spec);
        Ok(Self {
            spec,
            layout,
            revision,
        })
    }

    /// A document made of plain paragraphs.
    pub fn from_paragraphs<I, S>(id: impl Into<String>, paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = DocumentSpec {
            id: id.into(),
            blocks: paragraphs.into_iter().map(Block::paragraph).collect(),
            ..DocumentSpec::default()
        };
        let layout = build_blocks(&spec.blocks);
        let revision = fingerprint(&spec);
        Self {
            spec,
            layout,
            revision,
        }
    }

    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        let spec: DocumentSpec = serde_json::from_str(input)?;
        Self::new(spec).map_err(<serde_json::Error as serde::de::Error>::custom)
    }

    pub fn spec(&self) -> &DocumentSpec {
        &self.spec
    }

    /// Full text of the document.
    pub fn text(&self) -> String {
        self.layout.chars.iter().collect()
    }

    pub fn len_chars(&self) -> usize {
        self.layout.chars.len()
    }

    /// Append a block at the end of the document.
    pub fn push_block(&mut self, block: Block) -> Result<(), BackendError> {
        let mut spec = self.spec.clone();
        spec.blocks.push(block);
        self.replace(spec)
    }

    pub fn add_comment(&mut self, comment: CommentSpec) -> Result<(), BackendError> {
        let mut spec = self.spec.clone();
        spec.comments.push(comment);
        self.replace(spec)
    }

    pub fn add_bookmark(&mut self, name: impl Into<String>, span: SpanSpec) -> Result<(), BackendError> {
        let mut spec = self.spec.clone();
        spec.bookmarks.insert(name.into(), span);
        self.replace(spec)
    }

    pub fn set_selection(&mut self, span: Option<SpanSpec>) -> Result<(), BackendError> {
        let mut spec = self.spec.clone();
        spec.selection = span;
        self.replace(spec)
    }

    fn replace(&mut self, spec: DocumentSpec) -> Result<(), BackendError> {
        self.layout = build_layout(&spec)?;
        self.revision = fingerprint(&spec);
        self.spec = spec;
        Ok(())
    }

    fn slice(&self, start: usize, end: usize) -> Result<String, BackendError> {
        slice_chars(&self.layout.chars, start, end)
    }

    fn span_node(&self, kind: NodeKind, span: SpanSpec) -> Option<Candidate> {
        let text = self.slice(span.start, span.end).ok()?;
        Some(Candidate::from_range(
            kind,
            RangeRef::new(text, span.start, span.end),
        ))
    }
}

fn fingerprint(spec: &DocumentSpec) -> u64 {
    xxh3_64(format!("{spec:?}").as_bytes())
}

fn slice_chars(chars: &[char], start: usize, end: usize) -> Result<String, BackendError> {
    if start > end || end > chars.len() {
        return Err(BackendError::InvalidRange {
            start,
            end,
            len: chars.len(),
        });
    }
    Ok(chars[start..end].iter().collect())
}

fn build_layout(spec: &DocumentSpec) -> Result<Layout, BackendError> {
    let mut layout = build_blocks(&spec.blocks);

    for comment in &spec.comments {
        let scope = slice_chars(&layout.chars, comment.scope.start, comment.scope.end)?;
        let node = Candidate::new(NodeKind::Comment, comment.scope.start, comment.scope.end)
            .with_text(comment.text.clone())
            .with_range(RangeRef::new(scope, comment.scope.start, comment.scope.end))
            .with_attrs(NodeAttrs {
                author: Some(comment.author.clone()),
                ..NodeAttrs::default()
            });
        layout.comments.push(node);
    }

    let spans = spec.bookmarks.values().chain(spec.selection.iter());
    for span in spans {
        slice_chars(&layout.chars, span.start, span.end)?;
    }

    Ok(layout)
}

fn build_blocks(blocks: &[Block]) -> Layout {
    let mut layout = Layout::default();

    for block in blocks {
        match block {
            Block::Paragraph {
                text,
                style,
                bold,
                list_label,
            } => {
                let start = layout.chars.len();
                layout.chars.extend(text.chars());
                let end = layout.chars.len();
                layout.chars.push('\n');

                let node = Candidate::new(NodeKind::Paragraph, start, end)
                    .with_text(text.clone())
                    .with_style(style.clone().unwrap_or_else(|| DEFAULT_STYLE.to_string()))
                    .with_range(RangeRef::new(text.clone(), start, end))
                    .with_attrs(NodeAttrs {
                        bold: Some(*bold),
                        list_label: list_label.clone(),
                        ..NodeAttrs::default()
                    });
                layout.paragraphs.push(node);
            }
            Block::Table { rows } => {
                let table_index = layout.tables.len() + 1;
                let table_start = layout.chars.len();
                let mut table_end = table_start;
                let mut cell_texts = Vec::new();

                for (row, cells) in rows.iter().enumerate() {
                    for (column, text) in cells.iter().enumerate() {
                        let start = layout.chars.len();
                        layout.chars.extend(text.chars());
                        let end = layout.chars.len();
                        layout.chars.push('\n');
                        table_end = end;
                        cell_texts.push(text.as_str());

                        let node = Candidate::new(NodeKind::Cell, start, end)
                            .with_text(text.clone())
                            .with_range(RangeRef::new(text.clone(), start, end))
                            .with_attrs(NodeAttrs {
                                row_index: Some(row + 1),
                                column_index: Some(column + 1),
                                table_index: Some(table_index),
                                ..NodeAttrs::default()
                            });
                        layout.cells.push(node);
                    }
                }

                if rows.iter().all(Vec::is_empty) {
                    layout.chars.push('\n');
                }

                let span: String = layout.chars[table_start..table_end].iter().collect();
                let node = Candidate::new(NodeKind::Table, table_start, table_end)
                    .with_text(cell_texts.join("\t"))
                    .with_style("Table Grid")
                    .with_range(RangeRef::new(span, table_start, table_end))
                    .with_attrs(NodeAttrs {
                        rows: Some(rows.len()),
                        columns: Some(rows.iter().map(Vec::len).max().unwrap_or(0)),
                        table_index: Some(table_index),
                        ..NodeAttrs::default()
                    });
                layout.tables.push(node);
            }
            Block::Image { shape } => {
                let start = layout.chars.len();
                layout.chars.push(OBJECT_PLACEHOLDER);
                layout.chars.push('\n');

                // Shapes expose bounds only; their range is materialized.
                let node = Candidate::new(NodeKind::InlineShape, start, start + 1).with_attrs(
                    NodeAttrs {
                        shape: Some(*shape),
                        ..NodeAttrs::default()
                    },
                );
                layout.shapes.push(node);
            }
        }
    }

    layout
}

impl DocumentBackend for MemoryDocument {
    fn document_id(&self) -> &str {
        &self.spec.id
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn nodes(&self, kind: NodeKind) -> Vec<Candidate> {
        match kind {
            NodeKind::Paragraph => self.layout.paragraphs.clone(),
            NodeKind::Table => self.layout.tables.clone(),
            NodeKind::Cell => self.layout.cells.clone(),
            NodeKind::InlineShape => self.layout.shapes.clone(),
            NodeKind::Comment => self.layout.comments.clone(),
            NodeKind::Range | NodeKind::Selection => Vec::new(),
        }
    }

    fn content(&self) -> Candidate {
        Candidate::from_range(
            NodeKind::Range,
            RangeRef::new(self.text(), 0, self.len_chars()),
        )
    }

    fn selection(&self) -> Option<Candidate> {
        self.span_node(NodeKind::Selection, self.spec.selection?)
    }

    fn active_range(&self) -> Option<Candidate> {
        self.span_node(NodeKind::Range, self.spec.selection?)
    }

    fn bookmark(&self, name: &str) -> Option<Candidate> {
        let span = self.spec.bookmarks.get(name)?;
        self.span_node(NodeKind::Range, *span)
    }

    fn parent(&self, node: &Candidate) -> Option<Candidate> {
        let containers = self
            .layout
            .cells
            .iter()
            .chain(self.layout.tables.iter())
            .chain(self.layout.paragraphs.iter());

        let enclosing = containers
            .filter(|c| node.is_within(c) && (c.start, c.end) != (node.start, node.end))
            .min_by_key(|c| c.end - c.start)
            .cloned();

        if enclosing.is_some() {
            return enclosing;
        }

        let content = self.content();
        if (node.start, node.end) == (content.start, content.end) {
            None
        } else {
            Some(content)
        }
    }

    fn materialize(&self, start: usize, end: usize) -> Result<RangeRef, BackendError> {
        let text = self.slice(start, end)?;
        Ok(RangeRef::new(text, start, end))
    }

    fn is_live(&self, range: &RangeRef) -> bool {
        self.slice(range.start, range.end)
            .is_ok_and(|text| text == range.text)
    }
}
