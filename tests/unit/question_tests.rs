//! Unit tests for the embedded question decoder.

use planwright::agent::{detect_questions, questions::strip_markers};
use serde_json::json;

fn marker(payload: &serde_json::Value) -> String {
    format!("<!--QUESTION:{payload}-->")
}

#[test]
fn single_question_with_options() {
    let payload = json!({"questions": [
        {"question": "Which approach?", "header": "Approach", "options": [
            {"label": "A", "description": "Option A"},
        ]},
    ]});
    let questions = detect_questions(&marker(&payload));

    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].text, "Which approach?");
    assert_eq!(questions[0].header, "Approach");
    assert_eq!(questions[0].options[0].label, "A");
    assert_eq!(questions[0].options[0].description.as_deref(), Some("Option A"));
}

#[test]
fn no_markers_yields_nothing() {
    assert!(detect_questions("no markers here").is_empty());
}

#[test]
fn invalid_payload_is_skipped() {
    assert!(detect_questions("<!--QUESTION:not json-->").is_empty());
}

#[test]
fn multiple_questions_in_one_marker() {
    let payload = json!({"questions": [
        {"question": "Q1?", "header": "H1"},
        {"question": "Q2?", "header": "H2"},
    ]});
    let questions = detect_questions(&marker(&payload));

    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].text, "Q1?");
    assert_eq!(questions[1].text, "Q2?");
}

#[test]
fn two_markers_return_in_source_order() {
    let first = marker(&json!({"questions": [{"question": "first?"}]}));
    let second = marker(&json!({"questions": [{"question": "second?"}]}));
    let text = format!("intro {first} middle {second} end");

    let questions = detect_questions(&text);
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].text, "first?");
    assert_eq!(questions[1].text, "second?");
}

#[test]
fn bad_marker_does_not_affect_valid_marker() {
    let valid = marker(&json!({"questions": [{"question": "still here?"}]}));
    let text = format!("<!--QUESTION:{{broken--> {valid}");

    let questions = detect_questions(&text);
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].text, "still here?");
}

#[test]
fn entry_missing_question_field_is_dropped_individually() {
    let payload = json!({"questions": [
        {"header": "no question field"},
        {"question": "kept?"},
    ]});
    let questions = detect_questions(&marker(&payload));

    assert_eq!(questions.len(), 1, "only the valid entry must survive");
    assert_eq!(questions[0].text, "kept?");
}

#[test]
fn header_and_options_default_when_absent() {
    let questions = detect_questions(&marker(&json!({"questions": [{"question": "Q?"}]})));
    assert_eq!(questions[0].header, "");
    assert!(questions[0].options.is_empty());
}

#[test]
fn duplicate_option_labels_are_preserved_in_order() {
    let payload = json!({"questions": [
        {"question": "pick", "options": [
            {"label": "same"},
            {"label": "same", "description": "second"},
        ]},
    ]});
    let questions = detect_questions(&marker(&payload));

    assert_eq!(questions[0].options.len(), 2);
    assert_eq!(questions[0].options[0].label, "same");
    assert_eq!(questions[0].options[1].label, "same");
    assert_eq!(questions[0].options[1].description.as_deref(), Some("second"));
}

#[test]
fn payload_spanning_multiple_lines_is_matched() {
    let text = "<!--QUESTION:{\n  \"questions\": [\n    {\"question\": \"multiline?\"}\n  ]\n}-->";
    let questions = detect_questions(text);
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].text, "multiline?");
}

#[test]
fn detect_is_idempotent() {
    let payload = json!({"questions": [
        {"question": "Q?", "header": "H", "options": [{"label": "A"}]},
    ]});
    let text = format!("before {} after", marker(&payload));

    let first = detect_questions(&text);
    let second = detect_questions(&text);
    assert_eq!(first, second, "repeated detection must compare equal element-wise");
}

#[test]
fn strip_markers_removes_payload_and_keeps_prose() {
    let text = format!(
        "keep this {} and this",
        marker(&json!({"questions": [{"question": "Q?"}]}))
    );
    let stripped = strip_markers(&text);
    assert!(stripped.contains("keep this"));
    assert!(stripped.contains("and this"));
    assert!(!stripped.contains("QUESTION"));
}
