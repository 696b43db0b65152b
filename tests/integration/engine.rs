use super::{report, texts};
use docsel::locator::RawLocator;
use docsel::{MemoryDocument, NodeKind, SelectorEngine, SelectorError};
use serde_json::json;

fn abc() -> MemoryDocument {
    MemoryDocument::from_paragraphs("abc", ["A", "needle B", "C"])
}

#[test]
fn test_index_and_text_values() {
    let doc = abc();
    let mut engine = SelectorEngine::new();

    let selection = engine.select(&doc, "paragraph:2", true).unwrap();
    assert_eq!(texts(&selection), ["needle B"]);

    let selection = engine.select(&doc, "paragraph:NEEDLE", true).unwrap();
    assert_eq!(texts(&selection), ["needle B"]);

    let selection = engine
        .select(&doc, r#"paragraph[contains_text="needle"]"#, true)
        .unwrap();
    assert_eq!(selection.first().unwrap().start, 2);
}

#[test]
fn test_numeric_value_is_never_text() {
    let paragraphs = ["1", "2", "3", "4", "x", "6", "7", "8", "9", "5"];
    let doc = MemoryDocument::from_paragraphs("ten", paragraphs);
    let mut engine = SelectorEngine::new();

    let selection = engine.select(&doc, "paragraph:5", true).unwrap();
    assert_eq!(texts(&selection), ["x"]);
}

#[test]
fn test_extreme_index_filters_are_not_found() {
    let doc = MemoryDocument::from_paragraphs("two", ["a", "b"]);
    let mut engine = SelectorEngine::new();

    for locator in [
        "paragraph[index=-9223372036854775808]",
        "paragraph[index=9223372036854775807]",
    ] {
        assert!(engine.resolve(&doc, locator).unwrap().is_empty(), "{locator}");
        assert!(matches!(
            engine.select(&doc, locator, false),
            Err(SelectorError::ObjectNotFound { .. })
        ));
    }
}

#[test]
fn test_out_of_range_index() {
    let doc = abc();
    let mut engine = SelectorEngine::new();

    assert!(engine.resolve(&doc, "paragraph:99").unwrap().is_empty());
    assert_eq!(
        engine.select(&doc, "paragraph:99", false).unwrap_err(),
        SelectorError::ObjectNotFound {
            locator: "paragraph:99".to_string()
        }
    );
}

#[test]
fn test_ambiguous_single_selection() {
    let doc = abc();
    let mut engine = SelectorEngine::new();
    let err = engine.select(&doc, "paragraph", true).unwrap_err();
    assert!(matches!(err, SelectorError::AmbiguousLocator { count: 3, .. }));
    assert_eq!(engine.select(&doc, "paragraph", false).unwrap().len(), 3);
}

#[test]
fn test_syntax_errors_surface() {
    let doc = abc();
    let mut engine = SelectorEngine::new();

    let err = engine.select(&doc, "document_start:5", false).unwrap_err();
    let SelectorError::Syntax(err) = err else {
        panic!("expected syntax error, got {err:?}");
    };
    assert!(err.mentions("value"));

    let err = engine
        .select(&doc, "paragraph@document_start", false)
        .unwrap_err();
    assert!(matches!(err, SelectorError::Syntax(e) if e.mentions("relation")));
}

#[test]
fn test_text_alias() {
    let doc = report();
    let mut engine = SelectorEngine::new();
    let selection = engine.select(&doc, "text:revenue", false).unwrap();
    assert_eq!(
        texts(&selection),
        ["Revenue grew in every region.", "Appendix: revenue by month"]
    );
}

#[test]
fn test_table_cells() {
    let doc = report();
    let mut engine = SelectorEngine::new();

    let selection = engine
        .select(&doc, "cell[table_index=1][row_index=2][column_index=2]", true)
        .unwrap();
    assert_eq!(texts(&selection), ["120"]);
    assert_eq!(selection.first().unwrap().kind, NodeKind::Cell);

    let selection = engine.select(&doc, "table:1", true).unwrap();
    let table = selection.first().unwrap();
    assert_eq!((table.start, table.end), (59, 92));
}

#[test]
fn test_paragraph_attributes() {
    let doc = report();
    let mut engine = SelectorEngine::new();

    let bold = engine.select(&doc, "paragraph[is_bold=true]", true).unwrap();
    assert_eq!(texts(&bold), ["Key figures"]);

    let items = engine.select(&doc, "paragraph[is_list_item]", false).unwrap();
    assert_eq!(texts(&items), ["Hiring continues", "Costs stay flat"]);

    let headings = engine
        .select(&doc, r#"paragraph[text_matches_regex="^[A-Z][a-z]+$"][has_style="heading 2"]"#, true)
        .unwrap();
    assert_eq!(texts(&headings), ["Outlook"]);

    let last = engine.select(&doc, "paragraph[index=-1]", true).unwrap();
    assert_eq!(texts(&last), ["Appendix: revenue by month"]);
}

#[test]
fn test_shapes_are_materialized() {
    let doc = report();
    let mut engine = SelectorEngine::new();

    let image = engine.select(&doc, "image", true).unwrap();
    let range = image.first().unwrap();
    assert_eq!((range.start, range.end), (134, 135));
    assert_eq!(range.text, "\u{FFFC}");
    assert_eq!(range.kind, NodeKind::InlineShape);

    let chart = engine
        .select(&doc, "inline_shape[shape_type=chart]", true)
        .unwrap();
    assert_eq!(chart.first().unwrap().start, 136);
}

#[test]
fn test_comment_and_selection_ranges() {
    let doc = report();
    let mut engine = SelectorEngine::new();

    let comment = engine.select(&doc, "comment:source", true).unwrap();
    assert_eq!(texts(&comment), ["Revenue"]);

    let selection = engine.select(&doc, "selection", true).unwrap();
    let range = selection.first().unwrap();
    assert_eq!(range.kind, NodeKind::Selection);
    assert_eq!((range.start, range.end), (17, 24));
}

#[test]
fn test_structured_range_bounds() {
    let doc = report();
    let mut engine = SelectorEngine::new();

    let selection = engine
        .select(&doc, json!({"type": "range", "start": 0, "end": 9}), true)
        .unwrap();
    assert_eq!(texts(&selection), ["Quarterly"]);

    let raw = RawLocator {
        start: Some(17),
        end: Some(29),
        ..RawLocator::of_type("document")
    };
    let selection = engine.select(&doc, raw, true).unwrap();
    assert_eq!(texts(&selection), ["Revenue grew"]);
}

#[test]
fn test_document_edges() {
    let doc = report();
    let mut engine = SelectorEngine::new();

    let start = engine.select(&doc, "document_start", true).unwrap();
    assert_eq!(start.first().unwrap().start, 0);
    assert!(start.first().unwrap().is_empty());

    let end = engine.select(&doc, "document_end", true).unwrap();
    assert_eq!(end.first().unwrap().start, doc.len_chars());
}

#[test]
fn test_describe_selection() {
    let doc = report();
    let mut engine = SelectorEngine::new();
    let selection = engine.select(&doc, "paragraph[is_list_item=true]", false).unwrap();

    let info = serde_json::to_value(selection.describe()).unwrap();
    assert_eq!(info["document"], "quarterly-report");
    assert_eq!(info["count"], 2);
    assert_eq!(info["node_kinds"], json!({"paragraph": 2}));
    assert_eq!(info["ranges"][0]["preview"], "Hiring continues");
}
