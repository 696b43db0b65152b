//! docsel: locator queries over position-addressable documents
//!
//! A locator is a small query such as `paragraph:3`,
//! `cell[table_index=1][row_index=2]` or
//! `paragraph@heading:Summary[first_occurrence_after]`. The engine parses it,
//! resolves it against a [`DocumentBackend`] and returns a [`Selection`] of
//! ranges addressed by character position.
//!
//! # Architecture
//!
//! - [`locator`]: grammar, structured form, validation, canonical form
//! - [`finder`]: candidates, filters, anchors, relations, normalization
//! - [`engine`]: entry point with the not-found/ambiguous checks and a
//!   revision-scoped result cache
//! - [`document`]: the backend contract and an in-memory backend
//!
//! # Example
//!
//! ```
//! use docsel::{MemoryDocument, SelectorEngine};
//!
//! let doc = MemoryDocument::from_paragraphs("notes", ["Intro", "Total: 12", "Outro"]);
//! let mut engine = SelectorEngine::new();
//!
//! let selection = engine.select(&doc, r#"paragraph[contains_text="total"]"#, true)?;
//! assert_eq!(selection.first().map(|r| r.text.as_str()), Some("Total: 12"));
//! # Ok::<(), docsel::SelectorError>(())
//! ```

pub mod cache;
pub mod config;
pub mod document;
pub mod engine;
pub mod finder;
pub mod locator;
pub mod selection;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, EngineConfig};
pub use document::{BackendError, Candidate, DocumentBackend, MemoryDocument, NodeKind};
pub use engine::SelectorEngine;
pub use finder::{ObjectFinder, SelectorError};
pub use locator::{
    cache_key, Locator, LocatorInput, LocatorParser, LocatorSyntaxError, RawLocator,
    UnknownFilterPolicy,
};
pub use selection::{PositionedRange, Selection, SelectionInfo};
