//! Validation and normalization of [`RawLocator`] into [`Locator`].
//!
//! Every problem is collected into the issue list so callers see them all at
//! once, in the manner of a config validation pass.

use crate::cache::get_or_compile_regex;
use crate::locator::errors::SyntaxIssue;
use crate::locator::schema::{
    is_all_digits, Anchor, AnchorClause, FilterKind, FilterSpec, FilterValue, Locator, ObjectType,
    RawAnchor, RawFilter, RawLocator, RawValue, RelationKind, MAX_ANCHOR_DEPTH,
};
use crate::locator::UnknownFilterPolicy;

/// Alias accepted for `type`: a paragraph searched by text.
const TEXT_ALIAS: &str = "text";

#[derive(Debug, Clone, Copy)]
pub(crate) struct Options {
    pub strict: bool,
    pub unknown_filters: UnknownFilterPolicy,
}

/// Validate `raw`, pushing issues with field names prefixed by `prefix`.
/// Returns the normalized locator when this level produced no issues.
pub(crate) fn build(
    raw: &RawLocator,
    opts: Options,
    prefix: &str,
    issues: &mut Vec<SyntaxIssue>,
) -> Option<Locator> {
    let before = issues.len();
    let field = |name: &str| format!("{prefix}{name}");

    let (object_type, is_text_alias) = match raw.object_type.as_deref().map(str::trim) {
        None | Some("") => {
            issues.push(SyntaxIssue::new(field("type"), "object type is required"));
            (None, false)
        }
        Some(name) if name.eq_ignore_ascii_case(TEXT_ALIAS) => (Some(ObjectType::Paragraph), true),
        Some(name) => match ObjectType::from_name(name) {
            Some(ty) => (Some(ty), false),
            None => {
                let known = ObjectType::ALL.iter().map(|ty| ty.as_str());
                issues.push(SyntaxIssue::new(
                    field("type"),
                    unknown_message("object type", name, known),
                ));
                (None, false)
            }
        },
    };

    let mut value = match &raw.value {
        Some(RawValue::Int(n)) => Some(n.to_string()),
        Some(RawValue::Text(s)) => Some(s.clone()).filter(|s| !s.is_empty()),
        None => None,
    };
    let mut treat_as_index = raw
        .treat_as_index
        .unwrap_or_else(|| value.as_deref().is_some_and(is_all_digits));

    let mut filters = Vec::new();
    for (idx, entry) in raw.filters.iter().flatten().enumerate() {
        let filter_field = field(&format!("filters[{idx}]"));
        if let Some(spec) = build_filter(entry, &filter_field, opts, issues) {
            filters.push(spec);
        }
    }

    if is_text_alias {
        if let Some(text) = value.take() {
            filters.push(FilterSpec::new(FilterKind::ContainsText, text));
        }
        treat_as_index = false;
    }

    for (bound, kind) in [(raw.start, FilterKind::RangeStart), (raw.end, FilterKind::RangeEnd)] {
        match bound {
            Some(n) if n < 0 => issues.push(SyntaxIssue::new(
                field(kind.as_str().trim_start_matches("range_")),
                format!("must be a non-negative integer, got {n}"),
            )),
            Some(n) => filters.push(FilterSpec::new(kind, n)),
            None => {}
        }
    }

    let anchor = build_anchor(raw, opts, prefix, issues);

    if let Some(ty) = object_type {
        check_type_rules(ty, raw, value.as_deref(), &filters, prefix, issues);
        if opts.strict
            && matches!(ty, ObjectType::Paragraph | ObjectType::Table)
            && anchor.is_none()
            && value.is_none()
            && filters.is_empty()
        {
            issues.push(SyntaxIssue::new(
                field("value"),
                format!("{ty} locator needs a value or at least one filter"),
            ));
        }
    }

    if issues.len() > before {
        return None;
    }

    Some(Locator {
        object_type: object_type?,
        value,
        filters,
        anchor: anchor.flatten(),
        treat_as_index,
    })
}

/// One filter entry: `{kind: value}`, or the `{type: kind, value: v}` pair
/// some older clients produce.
fn build_filter(
    entry: &RawFilter,
    field: &str,
    opts: Options,
    issues: &mut Vec<SyntaxIssue>,
) -> Option<FilterSpec> {
    let (name, value) = match (entry.len(), entry.get("type"), entry.get("value")) {
        (2, Some(FilterValue::Text(kind)), Some(value)) => (kind.as_str(), value),
        (1, _, _) => {
            let (name, value) = entry.iter().next()?;
            (name.as_str(), value)
        }
        _ => {
            issues.push(SyntaxIssue::new(
                field,
                "filter must be a single kind/value pair",
            ));
            return None;
        }
    };

    let Some(kind) = FilterKind::from_name(name) else {
        match opts.unknown_filters {
            UnknownFilterPolicy::Ignore => {
                tracing::warn!(filter = name, "ignoring unknown filter");
            }
            UnknownFilterPolicy::Reject => {
                let known = FilterKind::ALL.iter().map(|kind| kind.as_str());
                issues.push(SyntaxIssue::new(field, unknown_message("filter", name, known)));
            }
        }
        return None;
    };

    match normalize_filter_value(kind, value) {
        Ok(value) => Some(FilterSpec { kind, value }),
        Err(message) => {
            issues.push(SyntaxIssue::new(format!("{field}.{kind}"), message));
            None
        }
    }
}

fn normalize_filter_value(kind: FilterKind, value: &FilterValue) -> Result<FilterValue, String> {
    match kind {
        FilterKind::Index | FilterKind::RowIndex | FilterKind::ColumnIndex | FilterKind::TableIndex => value
            .as_int()
            .map(FilterValue::Int)
            .ok_or_else(|| format!("expected an integer, got {value}")),
        FilterKind::RangeStart | FilterKind::RangeEnd => match value.as_int() {
            Some(n) if n >= 0 => Ok(FilterValue::Int(n)),
            _ => Err(format!("expected a non-negative integer, got {value}")),
        },
        FilterKind::IsBold | FilterKind::IsListItem => value
            .as_bool()
            .map(FilterValue::Bool)
            .ok_or_else(|| format!("expected true or false, got {value}")),
        FilterKind::TextMatchesRegex => {
            let FilterValue::Text(pattern) = value else {
                return Err(format!("expected a pattern string, got {value}"));
            };
            get_or_compile_regex(pattern)
                .map(|_| value.clone())
                .map_err(|e| format!("invalid regular expression: {e}"))
        }
        FilterKind::HasStyle => match value {
            FilterValue::Int(_) => Err(format!("expected a boolean or style name, got {value}")),
            other => Ok(other.clone()),
        },
        FilterKind::ContainsText | FilterKind::ShapeType | FilterKind::Style => {
            Ok(FilterValue::Text(value.as_text().into_owned()))
        }
    }
}

/// `Some(None)` means "no anchor"; `None` means the anchor was invalid.
fn build_anchor(
    raw: &RawLocator,
    opts: Options,
    prefix: &str,
    issues: &mut Vec<SyntaxIssue>,
) -> Option<Option<AnchorClause>> {
    let field = |name: &str| format!("{prefix}{name}");
    let relation = raw.relation.as_deref().map(str::trim).filter(|r| !r.is_empty());

    let relation = match (&raw.anchor, relation) {
        (None, None) => return Some(None),
        (None, Some(_)) => {
            issues.push(SyntaxIssue::new(field("anchor"), "relation requires an anchor"));
            return None;
        }
        (Some(_), None) => {
            issues.push(SyntaxIssue::new(field("relation"), "anchor requires a relation"));
            None
        }
        (Some(_), Some(name)) => match RelationKind::from_name(name) {
            Some(rel) => Some(rel),
            None => {
                let known = RelationKind::ALL.iter().map(|rel| rel.as_str());
                issues.push(SyntaxIssue::new(
                    field("relation"),
                    unknown_message("relation", name, known),
                ));
                None
            }
        },
    };

    let target = match raw.anchor.as_ref()? {
        RawAnchor::Id(id) if id.trim().is_empty() => {
            issues.push(SyntaxIssue::new(field("anchor"), "anchor cannot be empty"));
            None
        }
        RawAnchor::Id(id) => Some(Anchor::Id(id.trim().to_string())),
        RawAnchor::Locator(_) if prefix.matches("anchor.").count() >= MAX_ANCHOR_DEPTH => {
            issues.push(SyntaxIssue::new(
                "anchor",
                format!("anchors nest deeper than {MAX_ANCHOR_DEPTH} levels"),
            ));
            None
        }
        RawAnchor::Locator(nested) => {
            let nested_opts = Options {
                strict: false,
                ..opts
            };
            build(nested, nested_opts, &field("anchor."), issues)
                .map(|locator| Anchor::Locator(Box::new(locator)))
        }
    };

    Some(Some(AnchorClause {
        target: target?,
        relation: relation?,
    }))
}

fn check_type_rules(
    ty: ObjectType,
    raw: &RawLocator,
    value: Option<&str>,
    filters: &[FilterSpec],
    prefix: &str,
    issues: &mut Vec<SyntaxIssue>,
) {
    let field = |name: &str| format!("{prefix}{name}");
    match ty {
        ObjectType::Paragraph if raw.treat_as_index == Some(true) => {
            if let Some(value) = value {
                if !value.trim().parse::<u64>().is_ok_and(|n| n > 0) {
                    issues.push(SyntaxIssue::new(
                        field("value"),
                        format!("paragraph index must be a positive integer, got '{value}'"),
                    ));
                }
            }
        }
        ObjectType::Table => {
            if let Some(value) = value.filter(|v| is_all_digits(v)) {
                if !value.parse::<u64>().is_ok_and(|n| n > 0) {
                    issues.push(SyntaxIssue::new(
                        field("value"),
                        format!("table index must be a positive integer, got '{value}'"),
                    ));
                }
            }
        }
        ObjectType::DocumentStart | ObjectType::DocumentEnd => {
            if value.is_some() {
                issues.push(SyntaxIssue::new(
                    field("value"),
                    format!("{ty} does not take a value"),
                ));
            }
            if !filters.is_empty() {
                issues.push(SyntaxIssue::new(
                    field("filters"),
                    format!("{ty} does not take filters"),
                ));
            }
        }
        _ => {}
    }
}

fn unknown_message<'a>(what: &str, name: &str, known: impl Iterator<Item = &'a str> + Clone) -> String {
    match suggest(name, known.clone()) {
        Some(close) => format!("unknown {what} '{name}', did you mean '{close}'?"),
        None => {
            let all: Vec<&str> = known.collect();
            format!("unknown {what} '{name}' (expected one of: {})", all.join(", "))
        }
    }
}

fn suggest<'a>(name: &str, known: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let name = name.to_ascii_lowercase();
    known
        .map(|candidate| (candidate, strsim::jaro_winkler(&name, candidate)))
        .filter(|(_, score)| *score >= 0.85)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate)
}
