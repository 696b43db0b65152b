//! Locator query language: parsing, validation and the canonical form.
//!
//! A locator names what to find in a document:
//!
//! ```text
//! paragraph:3
//! paragraph[contains_text="Total"][is_bold=true]
//! cell[table_index=1][row_index=2][column_index=3]
//! paragraph@heading:Introduction[all_occurrences_within]
//! table@{paragraph[contains_text="Summary"]}[first_occurrence_after]
//! ```
//!
//! The same query may be given in structured form (see [`RawLocator`]),
//! which deserializes from JSON.

pub mod errors;
mod grammar;
pub mod schema;
mod validate;

pub use errors::{LocatorSyntaxError, SyntaxIssue};
pub use schema::{
    Anchor, AnchorClause, FilterKind, FilterSpec, FilterValue, Locator, ObjectType, RawAnchor,
    RawFilter, RawLocator, RawValue, RelationKind, MAX_ANCHOR_DEPTH,
};

use serde::{Deserialize, Serialize};

/// What to do with a filter kind the parser does not know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFilterPolicy {
    /// Fail validation, suggesting the closest known filter.
    #[default]
    Reject,
    /// Drop the filter and log a warning.
    Ignore,
}

/// Any of the shapes a caller may hand the engine.
#[derive(Debug, Clone)]
pub enum LocatorInput {
    Text(String),
    Structured(RawLocator),
    Json(serde_json::Value),
    Parsed(Locator),
}

impl From<&str> for LocatorInput {
    fn from(value: &str) -> Self {
        LocatorInput::Text(value.to_string())
    }
}

impl From<String> for LocatorInput {
    fn from(value: String) -> Self {
        LocatorInput::Text(value)
    }
}

impl From<RawLocator> for LocatorInput {
    fn from(value: RawLocator) -> Self {
        LocatorInput::Structured(value)
    }
}

impl From<serde_json::Value> for LocatorInput {
    fn from(value: serde_json::Value) -> Self {
        LocatorInput::Json(value)
    }
}

impl From<Locator> for LocatorInput {
    fn from(value: Locator) -> Self {
        LocatorInput::Parsed(value)
    }
}

impl From<&Locator> for LocatorInput {
    fn from(value: &Locator) -> Self {
        LocatorInput::Parsed(value.clone())
    }
}

/// Parses and validates locators.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocatorParser {
    strict: bool,
    unknown_filters: UnknownFilterPolicy,
}

impl LocatorParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require paragraph and table locators to narrow their target.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn unknown_filters(mut self, policy: UnknownFilterPolicy) -> Self {
        self.unknown_filters = policy;
        self
    }

    pub fn parse(&self, input: impl Into<LocatorInput>) -> Result<Locator, LocatorSyntaxError> {
        self.parse_with(input.into(), self.strict)
    }

    /// Parse with the stricter rule set regardless of configuration.
    pub fn parse_enhanced(
        &self,
        input: impl Into<LocatorInput>,
    ) -> Result<Locator, LocatorSyntaxError> {
        self.parse_with(input.into(), true)
    }

    pub fn parse_str(&self, input: &str) -> Result<Locator, LocatorSyntaxError> {
        self.parse_with(LocatorInput::from(input), self.strict)
    }

    pub fn parse_structured(&self, raw: RawLocator) -> Result<Locator, LocatorSyntaxError> {
        self.normalize(raw)
    }

    pub fn parse_json(&self, value: &serde_json::Value) -> Result<Locator, LocatorSyntaxError> {
        self.parse_with(LocatorInput::Json(value.clone()), self.strict)
    }

    /// Check a structured locator without building it.
    pub fn validate(&self, raw: &RawLocator) -> Result<(), LocatorSyntaxError> {
        self.build(raw, self.strict).map(|_| ())
    }

    /// Validate and normalize a structured locator.
    pub fn normalize(&self, raw: RawLocator) -> Result<Locator, LocatorSyntaxError> {
        self.build(&raw, self.strict)
    }

    fn parse_with(&self, input: LocatorInput, strict: bool) -> Result<Locator, LocatorSyntaxError> {
        let raw = match input {
            LocatorInput::Text(text) => grammar::parse_locator_str(&text)?,
            LocatorInput::Structured(raw) => raw,
            LocatorInput::Json(value) => serde_json::from_value(value)
                .map_err(|e| LocatorSyntaxError::new("locator", format!("invalid structure: {e}")))?,
            // Locators may be built by hand; re-check them like any other input.
            LocatorInput::Parsed(locator) => RawLocator::from(&locator),
        };
        self.build(&raw, strict)
    }

    fn build(&self, raw: &RawLocator, strict: bool) -> Result<Locator, LocatorSyntaxError> {
        let opts = validate::Options {
            strict,
            unknown_filters: self.unknown_filters,
        };
        let mut issues = Vec::new();
        match validate::build(raw, opts, "", &mut issues) {
            Some(locator) if issues.is_empty() => Ok(locator),
            _ => Err(LocatorSyntaxError { issues }),
        }
    }
}

/// Stable cache key: the canonical locator followed by `key=value` params
/// sorted by key, joined with `|`.
pub fn cache_key<K, V>(locator: &Locator, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(&str, &str)> = params
        .iter()
        .map(|(k, v)| (k.as_ref(), v.as_ref()))
        .collect();
    pairs.sort();

    let mut key = locator.canonical();
    for (k, v) in pairs {
        key.push('|');
        key.push_str(k);
        key.push('=');
        key.push_str(v);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_and_structured_forms_agree() {
        let parser = LocatorParser::new();
        let from_str = parser
            .parse(r#"paragraph[contains_text="Total"]@bookmark:summary[all_occurrences_within]"#)
            .unwrap();
        let from_json = parser
            .parse(json!({
                "type": "paragraph",
                "filters": [{"contains_text": "Total"}],
                "anchor": "bookmark:summary",
                "relation": "all_occurrences_within"
            }))
            .unwrap();
        assert_eq!(from_str, from_json);
    }

    #[test]
    fn canonical_form_round_trips() {
        let parser = LocatorParser::new();
        for input in [
            "paragraph:3",
            "comment:12[treat_as_index=false]",
            r#"paragraph:"a [b]"[contains_text="5"][is_bold=true]"#,
            "cell[table_index=1][row_index=2]@{table:1}[all_occurrences_within]",
            r#"image[index=-1]@"heading:Intro"[first_occurrence_after]"#,
        ] {
            let first = parser.parse(input).unwrap();
            let second = parser.parse(first.canonical()).unwrap();
            assert_eq!(first, second, "{input}");
        }
    }

    #[test]
    fn nested_anchor_json() {
        let locator = LocatorParser::new()
            .parse(json!({
                "type": "table",
                "anchor": {"type": "paragraph", "value": "Summary"},
                "relation": "first_occurrence_after"
            }))
            .unwrap();
        let Some(AnchorClause {
            target: Anchor::Locator(nested),
            ..
        }) = &locator.anchor
        else {
            panic!("expected nested anchor");
        };
        assert_eq!(nested.value.as_deref(), Some("Summary"));
    }

    #[test]
    fn enhanced_parse_rejects_bare_paragraph() {
        let parser = LocatorParser::new();
        assert!(parser.parse("paragraph").is_ok());
        assert!(parser.parse_enhanced("paragraph").is_err());
        assert!(parser.strict(true).parse("table").is_err());
    }

    #[test]
    fn parsed_locators_are_revalidated() {
        let bad = Locator::new(ObjectType::DocumentEnd).with_value("x");
        let err = LocatorParser::new().parse(&bad).unwrap_err();
        assert!(err.mentions("value"));

        let zero = LocatorParser::new().parse("paragraph:0").unwrap();
        assert_eq!(LocatorParser::new().parse(&zero).unwrap(), zero);
    }

    #[test]
    fn cache_key_sorts_params() {
        let locator = LocatorParser::new().parse("paragraph:2").unwrap();
        let a = cache_key(&locator, &[("revision", "7"), ("document", "a.json")]);
        let b = cache_key(&locator, &[("document", "a.json"), ("revision", "7")]);
        assert_eq!(a, b);
        assert_eq!(a, "paragraph:2|document=a.json|revision=7");
    }
}
