//! Filter predicates.
//!
//! Each predicate is total: a value of the wrong shape, or a node without
//! the attribute being tested, simply yields no match.

use crate::cache::get_or_compile_regex;
use crate::document::Candidate;
use crate::locator::{FilterKind, FilterSpec, FilterValue};

/// Narrow `candidates` by one filter.
pub fn apply(candidates: Vec<Candidate>, filter: &FilterSpec) -> Vec<Candidate> {
    let value = &filter.value;
    match filter.kind {
        FilterKind::Index => index(candidates, value),
        FilterKind::ContainsText => contains_text(candidates, value),
        FilterKind::TextMatchesRegex => text_matches_regex(candidates, value),
        FilterKind::ShapeType => shape_type(candidates, value),
        FilterKind::Style => style(candidates, value),
        FilterKind::HasStyle => has_style(candidates, value),
        FilterKind::IsBold => is_bold(candidates, value),
        FilterKind::RowIndex => attr_index(candidates, value, |c| c.attrs.row_index),
        FilterKind::ColumnIndex => attr_index(candidates, value, |c| c.attrs.column_index),
        FilterKind::TableIndex => attr_index(candidates, value, |c| c.attrs.table_index),
        FilterKind::IsListItem => is_list_item(candidates, value),
        FilterKind::RangeStart => range_start(candidates, value),
        FilterKind::RangeEnd => range_end(candidates, value),
    }
}

/// 1-based position; negative values count from the end.
pub fn index(mut candidates: Vec<Candidate>, value: &FilterValue) -> Vec<Candidate> {
    let Some(n) = value.as_int() else {
        return Vec::new();
    };
    let len = candidates.len();
    let Ok(offset) = usize::try_from(n.unsigned_abs()) else {
        return Vec::new();
    };
    let pos = match n {
        n if n > 0 && offset <= len => offset - 1,
        n if n < 0 && offset <= len => len - offset,
        _ => return Vec::new(),
    };
    vec![candidates.swap_remove(pos)]
}

/// Case-insensitive substring match.
pub fn contains_text(candidates: Vec<Candidate>, value: &FilterValue) -> Vec<Candidate> {
    let needle = value.as_text().to_lowercase();
    candidates
        .into_iter()
        .filter(|c| c.text().is_some_and(|text| text.to_lowercase().contains(&needle)))
        .collect()
}

/// Regex search over the trimmed text.
pub fn text_matches_regex(candidates: Vec<Candidate>, value: &FilterValue) -> Vec<Candidate> {
    let Ok(re) = get_or_compile_regex(&value.as_text()) else {
        return Vec::new();
    };
    candidates
        .into_iter()
        .filter(|c| c.text().is_some_and(|text| re.is_match(text.trim())))
        .collect()
}

pub fn shape_type(candidates: Vec<Candidate>, value: &FilterValue) -> Vec<Candidate> {
    let wanted = value.as_text();
    candidates
        .into_iter()
        .filter(|c| {
            c.attrs
                .shape
                .is_some_and(|shape| shape.name().eq_ignore_ascii_case(wanted.trim()))
        })
        .collect()
}

/// Exact style name.
pub fn style(candidates: Vec<Candidate>, value: &FilterValue) -> Vec<Candidate> {
    let wanted = value.as_text();
    candidates
        .into_iter()
        .filter(|c| c.style.as_deref() == Some(wanted.as_ref()))
        .collect()
}

/// `true`/`false` tests for any style; a name matches case-insensitively.
pub fn has_style(candidates: Vec<Candidate>, value: &FilterValue) -> Vec<Candidate> {
    match value {
        FilterValue::Bool(wanted) => candidates
            .into_iter()
            .filter(|c| c.style.as_deref().is_some_and(|s| !s.is_empty()) == *wanted)
            .collect(),
        FilterValue::Text(name) => candidates
            .into_iter()
            .filter(|c| c.style.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(name)))
            .collect(),
        FilterValue::Int(_) => Vec::new(),
    }
}

/// Bold body text. Headings are bold by style and never count.
pub fn is_bold(candidates: Vec<Candidate>, value: &FilterValue) -> Vec<Candidate> {
    let Some(wanted) = value.as_bool() else {
        return Vec::new();
    };
    candidates
        .into_iter()
        .filter(|c| (c.attrs.bold == Some(true) && !c.is_heading()) == wanted)
        .collect()
}

pub fn is_list_item(candidates: Vec<Candidate>, value: &FilterValue) -> Vec<Candidate> {
    let Some(wanted) = value.as_bool() else {
        return Vec::new();
    };
    candidates
        .into_iter()
        .filter(|c| c.attrs.list_label.as_deref().is_some_and(|l| !l.is_empty()) == wanted)
        .collect()
}

fn attr_index(
    candidates: Vec<Candidate>,
    value: &FilterValue,
    attr: impl Fn(&Candidate) -> Option<usize>,
) -> Vec<Candidate> {
    let Some(wanted) = value.as_int().and_then(|n| usize::try_from(n).ok()) else {
        return Vec::new();
    };
    candidates
        .into_iter()
        .filter(|c| attr(c) == Some(wanted))
        .collect()
}

/// Keep candidates reaching past `bound`, clipping their start to it.
pub fn range_start(candidates: Vec<Candidate>, value: &FilterValue) -> Vec<Candidate> {
    let Some(bound) = value.as_int().and_then(|n| usize::try_from(n).ok()) else {
        return Vec::new();
    };
    candidates
        .into_iter()
        .filter_map(|c| match c.start {
            start if start >= bound => Some(c),
            _ if c.end > bound => Some(c.clipped(bound, c.end)),
            _ => None,
        })
        .collect()
}

/// Keep candidates starting before `bound`, clipping their end to it.
pub fn range_end(candidates: Vec<Candidate>, value: &FilterValue) -> Vec<Candidate> {
    let Some(bound) = value.as_int().and_then(|n| usize::try_from(n).ok()) else {
        return Vec::new();
    };
    candidates
        .into_iter()
        .filter_map(|c| match c.end {
            end if end <= bound => Some(c),
            _ if c.start < bound => Some(c.clipped(c.start, bound)),
            _ => None,
        })
        .collect()
}
