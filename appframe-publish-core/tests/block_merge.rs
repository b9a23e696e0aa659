//! Integration tests for stylesheet block merging.

use appframe_publish_core::error::PublishError;
use appframe_publish_core::merge::{end_marker, has_block, merge_block, start_marker};

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn test_insert_appends_exactly_one_block() {
    let body = "body { margin: 0; }\n";
    let result = merge_block(body, "theme.css", ".a { color: red; }").unwrap();

    assert!(result.starts_with(body));
    assert_eq!(count(&result, &start_marker("theme.css")), 1);
    assert_eq!(count(&result, &end_marker("theme.css")), 1);
    assert_eq!(
        result,
        format!(
            "{body}\n\n{}\n.a {{ color: red; }}\n{}\n\n",
            start_marker("theme.css"),
            end_marker("theme.css")
        )
    );
}

#[test]
fn test_second_merge_switches_to_update() {
    let body = "body { margin: 0; }";
    let first = merge_block(body, "theme.css", "red").unwrap();
    assert!(has_block(&first, "theme.css"));

    let second = merge_block(&first, "theme.css", "blue").unwrap();
    assert_eq!(count(&second, &start_marker("theme.css")), 1);
    assert!(second.contains("\nblue\n"));
    assert!(!second.contains("\nred\n"));

    // Same content again leaves the document as it was.
    let third = merge_block(&second, "theme.css", "blue").unwrap();
    assert_eq!(third, second);
}

#[test]
fn test_update_keeps_text_outside_block_unchanged() {
    let before = "/* site header */\nh1 { font-size: 2em; }\n";
    let after = "\n/* footer */\nfooter { color: gray; }\n";
    let body = format!(
        "{before}{}\nold\n{}{after}",
        start_marker("theme.css"),
        end_marker("theme.css")
    );

    let x = merge_block(&body, "theme.css", "x").unwrap();
    let y = merge_block(&x, "theme.css", "y\nmore y").unwrap();

    assert_eq!(
        y,
        format!(
            "{before}{}\ny\nmore y\n{}{after}",
            start_marker("theme.css"),
            end_marker("theme.css")
        )
    );
}

#[test]
fn test_blocks_for_other_sources_are_preserved() {
    let base = merge_block("", "a.css", "a-content").unwrap();
    let with_b = merge_block(&base, "b.css", "b-content").unwrap();
    let updated_a = merge_block(&with_b, "a.css", "a-new").unwrap();

    assert!(updated_a.contains("b-content"));
    assert!(updated_a.contains("a-new"));
    assert!(!updated_a.contains("a-content"));
    assert_eq!(count(&updated_a, &start_marker("a.css")), 1);
    assert_eq!(count(&updated_a, &start_marker("b.css")), 1);
}

#[test]
fn test_missing_end_marker_reports_corruption() {
    let body = format!("h1 {{}}\n{}\n.a {{}}\n", start_marker("theme.css"));
    match merge_block(&body, "theme.css", "new") {
        Err(PublishError::DataCorruption { source_name, .. }) => {
            assert_eq!(source_name, "theme.css")
        }
        other => panic!("expected DataCorruption, got {other:?}"),
    }
}

#[test]
fn test_source_names_are_matched_literally() {
    let body = merge_block("", "theme.css", "x").unwrap();
    assert!(!has_block(&body, "theme"));
    assert!(!has_block(&body, "THEME.css"));
}
