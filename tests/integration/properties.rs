//! Property tests for the canonical form and cache keys.

use docsel::locator::{FilterKind, FilterSpec, FilterValue, RawAnchor, RawLocator, RawValue};
use docsel::{cache_key, LocatorParser};
use proptest::prelude::*;

fn type_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "paragraph",
        "table",
        "cell",
        "comment",
        "image",
        "inline_shape",
        "range",
        "document",
    ])
}

/// Free text including every character the grammar treats specially.
fn text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 :@\\[\\]{}\"'\\\\=\t]{1,12}"
}

fn filter_strategy() -> impl Strategy<Value = FilterSpec> {
    prop_oneof![
        (-5i64..20).prop_map(|n| FilterSpec::new(FilterKind::Index, n)),
        text_strategy().prop_map(|t| FilterSpec::new(FilterKind::ContainsText, t)),
        text_strategy().prop_map(|t| FilterSpec::new(FilterKind::Style, t)),
        any::<bool>().prop_map(|b| FilterSpec::new(FilterKind::IsBold, b)),
        any::<bool>().prop_map(|b| FilterSpec::new(FilterKind::HasStyle, b)),
        prop::sample::select(vec!["true", "Heading 1", "42"])
            .prop_map(|s| FilterSpec::new(FilterKind::HasStyle, s)),
        (1i64..5).prop_map(|n| FilterSpec::new(FilterKind::RowIndex, n)),
        prop::sample::select(vec![r"^\d+$", "[a-z]+", "a|b"])
            .prop_map(|p| FilterSpec::new(FilterKind::TextMatchesRegex, p)),
        (0i64..500).prop_map(|n| FilterSpec::new(FilterKind::RangeEnd, n)),
    ]
}

fn relation_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "all_occurrences_within",
        "first_occurrence_after",
        "parent_of",
        "immediately_following",
    ])
}

fn raw_strategy() -> impl Strategy<Value = RawLocator> {
    (
        type_strategy(),
        prop::option::of(text_strategy()),
        prop::collection::vec(filter_strategy(), 0..4),
        prop::option::of(any::<bool>()),
    )
        .prop_map(|(ty, value, filters, treat_as_index)| {
            let mut raw = RawLocator::of_type(ty);
            raw.value = value.map(RawValue::Text);
            raw.treat_as_index = treat_as_index;
            for filter in filters {
                raw = raw.filter(filter.kind.as_str(), filter.value);
            }
            raw
        })
}

fn anchored_strategy() -> impl Strategy<Value = RawLocator> {
    (
        raw_strategy(),
        prop_oneof![
            text_strategy().prop_map(RawAnchor::Id),
            raw_strategy().prop_map(RawAnchor::from),
        ],
        relation_strategy(),
    )
        .prop_map(|(raw, anchor, relation)| raw.anchor(anchor).relation(relation))
}

proptest! {
    /// Parsing the canonical form gives back the same locator.
    #[test]
    fn prop_canonical_form_round_trips(raw in prop_oneof![raw_strategy(), anchored_strategy()]) {
        let parser = LocatorParser::new();
        let locator = parser.parse(raw);
        prop_assume!(locator.is_ok());
        let locator = locator.unwrap();

        let canonical = locator.canonical();
        let reparsed = parser.parse(canonical.as_str());
        prop_assert!(reparsed.is_ok(), "{canonical}: {:?}", reparsed);
        let reparsed = reparsed.unwrap();
        prop_assert_eq!(&reparsed, &locator);
        prop_assert_eq!(reparsed.canonical(), canonical);
    }

    /// Quoted filter values never turn into booleans or numbers.
    #[test]
    fn prop_quoted_values_stay_text(text in text_strategy()) {
        let locator = LocatorParser::new()
            .parse(RawLocator::of_type("paragraph").filter("contains_text", text.as_str()))
            .unwrap();
        let reparsed = LocatorParser::new().parse(locator.canonical()).unwrap();
        prop_assert_eq!(&reparsed.filters[0].value, &FilterValue::Text(text));
    }

    /// Cache keys do not depend on parameter order.
    #[test]
    fn prop_cache_key_ignores_param_order(
        params in prop::collection::btree_map("[a-z]{1,6}", "[a-z0-9=|]{0,6}", 0..6)
            .prop_map(|m| m.into_iter().collect::<Vec<_>>())
            .prop_shuffle(),
        seed in any::<u64>(),
    ) {
        let locator = LocatorParser::new().parse("paragraph:1").unwrap();
        let mut reversed = params.clone();
        reversed.reverse();
        let rotated = {
            let mut v = params.clone();
            if !v.is_empty() {
                let len = v.len();
                v.rotate_left((seed as usize) % len);
            }
            v
        };
        let key = cache_key(&locator, &params);
        prop_assert_eq!(&key, &cache_key(&locator, &reversed));
        prop_assert_eq!(&key, &cache_key(&locator, &rotated));
        prop_assert!(key.starts_with("paragraph:1"));
    }
}
