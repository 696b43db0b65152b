use super::{report, texts};
use docsel::{NodeKind, SelectorEngine, SelectorError};
use serde_json::json;

#[test]
fn test_all_occurrences_within_bookmark() {
    let doc = report();
    let mut engine = SelectorEngine::new();

    let selection = engine
        .select(&doc, "paragraph@bookmark:outlook[all_occurrences_within]", false)
        .unwrap();
    assert_eq!(
        texts(&selection),
        ["Outlook", "Hiring continues", "Costs stay flat"]
    );

    let selection = engine
        .select(
            &doc,
            "paragraph[is_list_item=true]@bookmark:outlook[all_occurrences_within]",
            false,
        )
        .unwrap();
    assert_eq!(selection.len(), 2);
}

#[test]
fn test_first_occurrence_after_heading() {
    let doc = report();
    let mut engine = SelectorEngine::new();

    let selection = engine
        .select(&doc, "paragraph@heading:outlook[first_occurrence_after]", true)
        .unwrap();
    assert_eq!(texts(&selection), ["Hiring continues"]);

    let selection = engine
        .select(&doc, "paragraph@{table:1}[first_occurrence_after]", true)
        .unwrap();
    assert_eq!(texts(&selection), ["Outlook"]);
}

#[test]
fn test_document_start_anchor() {
    let doc = report();
    let mut engine = SelectorEngine::new();

    // The first paragraph starts at the anchor itself, not after it.
    let selection = engine
        .select(&doc, "paragraph@document_start[first_occurrence_after]", true)
        .unwrap();
    assert_eq!(texts(&selection), ["Revenue grew in every region."]);
}

#[test]
fn test_immediately_following_nested_anchor() {
    let doc = report();
    let mut engine = SelectorEngine::new();

    let selection = engine
        .select(&doc, r#"table@{paragraph:"Key figures"}[immediately_following]"#, true)
        .unwrap();
    assert_eq!(selection.first().unwrap().kind, NodeKind::Table);

    let selection = engine
        .select(
            &doc,
            json!({
                "type": "paragraph",
                "anchor": {"type": "paragraph", "filters": [{"contains_text": "hiring"}]},
                "relation": "immediately_following"
            }),
            true,
        )
        .unwrap();
    assert_eq!(texts(&selection), ["Costs stay flat"]);
}

#[test]
fn test_numeric_anchor_counts_paragraphs_then_tables() {
    let doc = report();
    let mut engine = SelectorEngine::new();

    let selection = engine
        .select(&doc, "paragraph@4[immediately_following]", true)
        .unwrap();
    assert_eq!(texts(&selection), ["Costs stay flat"]);

    // Seven paragraphs come first, so 7 is the table.
    let selection = engine
        .select(&doc, "table@7[all_occurrences_within]", true)
        .unwrap();
    assert_eq!(selection.first().unwrap().start, 59);
}

#[test]
fn test_parent_of() {
    let doc = report();
    let mut engine = SelectorEngine::new();

    let selection = engine
        .select(&doc, "paragraph@{comment:1}[parent_of]", true)
        .unwrap();
    assert_eq!(texts(&selection), ["Revenue grew in every region."]);

    let selection = engine
        .select(&doc, r#"table@{cell[contains_text="North"]}[parent_of]"#, true)
        .unwrap();
    assert_eq!(selection.first().unwrap().start, 59);

    // A cell's parent is a table, never another cell.
    let err = engine
        .select(&doc, r#"cell@{cell[contains_text="North"]}[parent_of]"#, false)
        .unwrap_err();
    assert!(matches!(err, SelectorError::ObjectNotFound { .. }));
}

#[test]
fn test_positional_filters_apply_after_relation() {
    let doc = report();
    let mut engine = SelectorEngine::new();

    let selection = engine
        .select(
            &doc,
            "paragraph[index=2]@bookmark:outlook[all_occurrences_within]",
            true,
        )
        .unwrap();
    assert_eq!(texts(&selection), ["Hiring continues"]);
}

#[test]
fn test_missing_anchor() {
    let doc = report();
    let mut engine = SelectorEngine::new();

    let err = engine
        .select(&doc, "paragraph@heading:Nowhere[all_occurrences_within]", false)
        .unwrap_err();
    assert_eq!(
        err,
        SelectorError::AnchorNotFound {
            anchor: "heading:Nowhere".to_string()
        }
    );

    let err = engine
        .select(&doc, "paragraph@{table:5}[first_occurrence_after]", false)
        .unwrap_err();
    assert_eq!(
        err,
        SelectorError::AnchorNotFound {
            anchor: "table:5".to_string()
        }
    );
}
