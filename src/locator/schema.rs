use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Deepest chain of nested locator anchors accepted.
pub const MAX_ANCHOR_DEPTH: usize = 8;

/// Node types a locator can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Paragraph,
    Table,
    Cell,
    InlineShape,
    Image,
    Comment,
    Range,
    Selection,
    Document,
    DocumentStart,
    DocumentEnd,
}

impl ObjectType {
    pub const ALL: [ObjectType; 11] = [
        ObjectType::Paragraph,
        ObjectType::Table,
        ObjectType::Cell,
        ObjectType::InlineShape,
        ObjectType::Image,
        ObjectType::Comment,
        ObjectType::Range,
        ObjectType::Selection,
        ObjectType::Document,
        ObjectType::DocumentStart,
        ObjectType::DocumentEnd,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Paragraph => "paragraph",
            ObjectType::Table => "table",
            ObjectType::Cell => "cell",
            ObjectType::InlineShape => "inline_shape",
            ObjectType::Image => "image",
            ObjectType::Comment => "comment",
            ObjectType::Range => "range",
            ObjectType::Selection => "selection",
            ObjectType::Document => "document",
            ObjectType::DocumentStart => "document_start",
            ObjectType::DocumentEnd => "document_end",
        }
    }

    /// Case-insensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|ty| ty.as_str() == name)
    }

    /// Types whose textual `value` falls back to a substring search.
    pub fn supports_text(self) -> bool {
        matches!(self, ObjectType::Paragraph | ObjectType::Comment)
    }

    /// Types resolved to one synthetic range rather than an enumeration.
    pub fn is_synthetic(self) -> bool {
        matches!(
            self,
            ObjectType::Range
                | ObjectType::Selection
                | ObjectType::Document
                | ObjectType::DocumentStart
                | ObjectType::DocumentEnd
        )
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Index,
    ContainsText,
    TextMatchesRegex,
    ShapeType,
    Style,
    HasStyle,
    IsBold,
    RowIndex,
    ColumnIndex,
    TableIndex,
    IsListItem,
    RangeStart,
    RangeEnd,
}

impl FilterKind {
    pub const ALL: [FilterKind; 13] = [
        FilterKind::Index,
        FilterKind::ContainsText,
        FilterKind::TextMatchesRegex,
        FilterKind::ShapeType,
        FilterKind::Style,
        FilterKind::HasStyle,
        FilterKind::IsBold,
        FilterKind::RowIndex,
        FilterKind::ColumnIndex,
        FilterKind::TableIndex,
        FilterKind::IsListItem,
        FilterKind::RangeStart,
        FilterKind::RangeEnd,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::Index => "index",
            FilterKind::ContainsText => "contains_text",
            FilterKind::TextMatchesRegex => "text_matches_regex",
            FilterKind::ShapeType => "shape_type",
            FilterKind::Style => "style",
            FilterKind::HasStyle => "has_style",
            FilterKind::IsBold => "is_bold",
            FilterKind::RowIndex => "row_index",
            FilterKind::ColumnIndex => "column_index",
            FilterKind::TableIndex => "table_index",
            FilterKind::IsListItem => "is_list_item",
            FilterKind::RangeStart => "range_start",
            FilterKind::RangeEnd => "range_end",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Positional filters depend on where a candidate sits in the list or
    /// the document, not on its attributes.
    pub fn is_positional(self) -> bool {
        matches!(
            self,
            FilterKind::Index | FilterKind::RangeStart | FilterKind::RangeEnd
        )
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How candidates are narrowed relative to an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    AllOccurrencesWithin,
    FirstOccurrenceAfter,
    ParentOf,
    ImmediatelyFollowing,
}

impl RelationKind {
    pub const ALL: [RelationKind; 4] = [
        RelationKind::AllOccurrencesWithin,
        RelationKind::FirstOccurrenceAfter,
        RelationKind::ParentOf,
        RelationKind::ImmediatelyFollowing,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::AllOccurrencesWithin => "all_occurrences_within",
            RelationKind::FirstOccurrenceAfter => "first_occurrence_after",
            RelationKind::ParentOf => "parent_of",
            RelationKind::ImmediatelyFollowing => "immediately_following",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|rel| rel.as_str() == name)
    }

    /// Containment relations only look at nodes overlapping the anchor;
    /// ordering relations look past it, across the whole document.
    pub fn scopes_candidates(self) -> bool {
        matches!(
            self,
            RelationKind::AllOccurrencesWithin | RelationKind::ParentOf
        )
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar argument of a filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FilterValue {
    /// Coerce unquoted grammar text: booleans, then (signed) integers,
    /// otherwise the text itself.
    pub fn coerce(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("true") {
            return FilterValue::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return FilterValue::Bool(false);
        }
        let digits = raw.strip_prefix('-').unwrap_or(raw);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = raw.parse::<i64>() {
                return FilterValue::Int(n);
            }
        }
        FilterValue::Text(raw.to_string())
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FilterValue::Int(n) => Some(*n),
            FilterValue::Text(s) => s.trim().parse().ok(),
            FilterValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FilterValue::Bool(b) => Some(*b),
            FilterValue::Text(s) if s.eq_ignore_ascii_case("true") => Some(true),
            FilterValue::Text(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FilterValue::Text(s) => Cow::Borrowed(s),
            FilterValue::Int(n) => Cow::Owned(n.to_string()),
            FilterValue::Bool(b) => Cow::Owned(b.to_string()),
        }
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl fmt::Display for FilterValue {
    /// Grammar form: text is always quoted so it never re-coerces.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Bool(b) => write!(f, "{b}"),
            FilterValue::Int(n) => write!(f, "{n}"),
            FilterValue::Text(s) => f.write_str(&quote(s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub value: FilterValue,
}

impl FilterSpec {
    pub fn new(kind: FilterKind, value: impl Into<FilterValue>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

impl Serialize for FilterSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.kind.as_str(), &self.value)?;
        map.end()
    }
}

/// What an anchored locator is positioned against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    /// Identifier: pseudo-anchor, `bookmark:<name>`, `heading:<text>`, a
    /// 0-based index, or text to search for.
    Id(String),
    /// A nested locator; its first match is the anchor.
    Locator(Box<Locator>),
}

/// Anchor and relation always travel together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorClause {
    pub target: Anchor,
    pub relation: RelationKind,
}

/// Validated, normalized query descriptor.
///
/// `Display` renders the canonical string form, which parses back into an
/// identical locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub object_type: ObjectType,
    pub value: Option<String>,
    pub filters: Vec<FilterSpec>,
    pub anchor: Option<AnchorClause>,
    pub treat_as_index: bool,
}

impl Locator {
    pub fn new(object_type: ObjectType) -> Self {
        Self {
            object_type,
            value: None,
            filters: Vec::new(),
            anchor: None,
            treat_as_index: false,
        }
    }

    /// Set the value, inferring `treat_as_index` for all-digit values.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.treat_as_index = is_all_digits(&value);
        self.value = Some(value).filter(|v| !v.is_empty());
        self
    }

    pub fn with_filter(mut self, kind: FilterKind, value: impl Into<FilterValue>) -> Self {
        self.filters.push(FilterSpec::new(kind, value));
        self
    }

    pub fn with_treat_as_index(mut self, treat_as_index: bool) -> Self {
        self.treat_as_index = treat_as_index;
        self
    }

    pub fn anchored(mut self, target: Anchor, relation: RelationKind) -> Self {
        self.anchor = Some(AnchorClause { target, relation });
        self
    }

    pub fn relation(&self) -> Option<RelationKind> {
        self.anchor.as_ref().map(|clause| clause.relation)
    }

    /// Whether the value addresses a position rather than text.
    pub fn value_is_index(&self) -> bool {
        self.treat_as_index || self.value.as_deref().is_some_and(is_all_digits)
    }

    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.object_type.as_str())?;
        if let Some(value) = &self.value {
            write!(f, ":{}", quote_if_needed(value))?;
        }
        for filter in &self.filters {
            write!(f, "[{}={}]", filter.kind, filter.value)?;
        }
        let inferred = self.value.as_deref().is_some_and(is_all_digits);
        if self.treat_as_index != inferred {
            write!(f, "[treat_as_index={}]", self.treat_as_index)?;
        }
        if let Some(clause) = &self.anchor {
            match &clause.target {
                Anchor::Id(id) => write!(f, "@{}", quote_if_needed(id))?,
                Anchor::Locator(nested) => write!(f, "@{{{nested}}}")?,
            }
            write!(f, "[{}]", clause.relation)?;
        }
        Ok(())
    }
}

impl Serialize for Locator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RawLocator::from(self).serialize(serializer)
    }
}

/// Structured locator as supplied by callers, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLocator {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<RawFilter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<RawAnchor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treat_as_index: Option<bool>,
    /// Shorthand for a trailing `range_start` filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    /// Shorthand for a trailing `range_end` filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
}

impl RawLocator {
    pub fn of_type(object_type: impl Into<String>) -> Self {
        Self {
            object_type: Some(object_type.into()),
            ..Self::default()
        }
    }

    pub fn value(mut self, value: impl Into<RawValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn filter(mut self, kind: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters
            .get_or_insert_with(Vec::new)
            .push(BTreeMap::from([(kind.into(), value.into())]));
        self
    }

    pub fn anchor(mut self, anchor: impl Into<RawAnchor>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    pub fn relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }

    pub fn treat_as_index(mut self, treat_as_index: bool) -> Self {
        self.treat_as_index = Some(treat_as_index);
        self
    }
}

impl From<&Locator> for RawLocator {
    /// Like the canonical form, the index flag is only carried when it
    /// differs from what the value implies.
    fn from(locator: &Locator) -> Self {
        let inferred = locator.value.as_deref().is_some_and(is_all_digits);
        RawLocator {
            object_type: Some(locator.object_type.as_str().to_string()),
            value: locator.value.clone().map(RawValue::Text),
            filters: Some(
                locator
                    .filters
                    .iter()
                    .map(|f| BTreeMap::from([(f.kind.as_str().to_string(), f.value.clone())]))
                    .collect(),
            ),
            anchor: locator.anchor.as_ref().map(|clause| match &clause.target {
                Anchor::Id(id) => RawAnchor::Id(id.clone()),
                Anchor::Locator(nested) => RawAnchor::Locator(Box::new(RawLocator::from(&**nested))),
            }),
            relation: locator.relation().map(|r| r.as_str().to_string()),
            treat_as_index: (locator.treat_as_index != inferred).then_some(locator.treat_as_index),
            start: None,
            end: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Int(i64),
    Text(String),
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Int(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAnchor {
    Id(String),
    Locator(Box<RawLocator>),
}

impl From<&str> for RawAnchor {
    fn from(value: &str) -> Self {
        RawAnchor::Id(value.to_string())
    }
}

impl From<RawLocator> for RawAnchor {
    fn from(value: RawLocator) -> Self {
        RawAnchor::Locator(Box::new(value))
    }
}

/// One filter in structured form: a single `kind -> value` entry.
pub type RawFilter = BTreeMap<String, FilterValue>;

/// Non-empty and made only of ASCII digits (no sign).
pub fn is_all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value.trim() != value
        || value
            .chars()
            .any(|c| matches!(c, '[' | ']' | '@' | '"' | '\'' | '\\' | '{' | '}') || c.is_control())
}

fn quote_if_needed(value: &str) -> Cow<'_, str> {
    if needs_quotes(value) {
        Cow::Owned(quote(value))
    } else {
        Cow::Borrowed(value)
    }
}

pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
