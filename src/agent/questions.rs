//! Embedded question sub-protocol.
//!
//! The agent surfaces structured questions inside free-form assistant
//! text using `<!--QUESTION:{…}-->` markers. The payload is a JSON
//! object with a `questions` list; each entry names the question and may
//! carry a header and selectable options.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

/// A selectable answer offered with a question.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestionOption {
    /// Option label; this is the answer text when selected.
    pub label: String,
    /// Optional one-line elaboration shown next to the label.
    #[serde(default)]
    pub description: Option<String>,
}

/// One structured question surfaced by the agent.
///
/// Options preserve source order and labels need not be unique;
/// selection is by position. An empty option list means a free-text
/// answer is expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// The question text.
    pub text: String,
    /// Short topic header; may be empty.
    pub header: String,
    /// Selectable answers, in source order.
    pub options: Vec<QuestionOption>,
}

#[derive(Debug, Deserialize)]
struct QuestionPayload {
    #[serde(default)]
    questions: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    question: String,
    #[serde(default)]
    header: String,
    #[serde(default)]
    options: Vec<QuestionOption>,
}

// The pattern is a constant; construction cannot fail.
#[allow(clippy::expect_used)]
fn question_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?s)<!--QUESTION:(.*?)-->").expect("valid marker pattern"))
}

/// Remove question markers from text, leaving the surrounding prose.
///
/// Used by front ends that render text verbatim; the marker payload is
/// machine-facing and already surfaced through [`detect_questions`].
#[must_use]
pub fn strip_markers(text: &str) -> String {
    question_pattern().replace_all(text, "").trim().to_owned()
}

/// Detect structured question markers in text.
///
/// Scans left to right and returns every question from every marker in
/// source order. Malformed payloads and entries missing the required
/// `question` field are dropped individually; they never abort the scan
/// or discard other valid entries.
#[must_use]
pub fn detect_questions(text: &str) -> Vec<Question> {
    let mut questions = Vec::new();
    for capture in question_pattern().captures_iter(text) {
        let Some(payload) = capture.get(1) else {
            continue;
        };
        let Ok(payload) = serde_json::from_str::<QuestionPayload>(payload.as_str()) else {
            continue;
        };
        for entry in payload.questions {
            let Ok(raw) = serde_json::from_value::<RawQuestion>(entry) else {
                continue;
            };
            questions.push(Question {
                text: raw.question,
                header: raw.header,
                options: raw.options,
            });
        }
    }
    questions
}
