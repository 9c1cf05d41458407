//! Typed view over one decoded stream-JSON record.

use serde_json::Value;

/// Record tag of a decoded protocol event.
///
/// Unknown tags are preserved rather than rejected so that newer agent
/// versions can add record types without breaking the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Session bookkeeping record; the first usually carries the session id.
    System,
    /// A model turn: text blocks and tool invocations.
    Assistant,
    /// Tool results echoed back into the transcript.
    User,
    /// Terminal record carrying the final result text and error flag.
    Result,
    /// Any record tag this version does not recognize.
    Unknown(String),
}

impl EventKind {
    /// Map a record's `type` tag to its kind.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "system" => Self::System,
            "assistant" => Self::Assistant,
            "user" => Self::User,
            "result" => Self::Result,
            other => Self::Unknown(other.to_owned()),
        }
    }

    /// The wire tag for this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::Assistant => "assistant",
            Self::User => "user",
            Self::Result => "result",
            Self::Unknown(tag) => tag,
        }
    }
}

/// One decoded protocol record from the agent's streaming output.
///
/// The raw record is owned exclusively by the event and never mutated
/// after construction; all accessors are pure reads over it.
#[derive(Debug, Clone)]
pub struct AgentEvent {
    kind: EventKind,
    raw: Value,
}

impl AgentEvent {
    /// Decode one stdout line into an event.
    ///
    /// Returns `None` when the line is not a JSON object — such lines
    /// are skipped by the supervisor, never surfaced as errors. A record
    /// without a string `type` field is preserved with an empty unknown
    /// tag.
    #[must_use]
    pub fn from_json_line(line: &str) -> Option<Self> {
        let raw: Value = serde_json::from_str(line).ok()?;
        if !raw.is_object() {
            return None;
        }
        let kind = EventKind::from_tag(raw.get("type").and_then(Value::as_str).unwrap_or_default());
        Some(Self { kind, raw })
    }

    /// The record kind.
    #[must_use]
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// The full decoded record.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The record's `session_id` field, if present.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.raw.get("session_id").and_then(Value::as_str)
    }

    /// Whether this is the terminal result record of a turn.
    #[must_use]
    pub fn is_result(&self) -> bool {
        self.kind == EventKind::Result
    }

    /// Whether this is a result record with its error flag set.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.is_result()
            && self
                .raw
                .get("is_error")
                .and_then(Value::as_bool)
                .unwrap_or(false)
    }

    /// The result text of a result record.
    #[must_use]
    pub fn result_text(&self) -> Option<&str> {
        if self.is_result() {
            self.raw.get("result").and_then(Value::as_str)
        } else {
            None
        }
    }

    /// Newline-joined text blocks of an assistant record's message.
    ///
    /// `None` for non-assistant records and for assistant records with
    /// no text blocks; block order is preserved.
    #[must_use]
    pub fn text_content(&self) -> Option<String> {
        if self.kind != EventKind::Assistant {
            return None;
        }
        let texts: Vec<&str> = self
            .content_blocks()
            .iter()
            .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.join("\n"))
        }
    }

    /// Ordered `tool_use` blocks of an assistant record's message.
    ///
    /// Empty for non-assistant records.
    #[must_use]
    pub fn tool_invocations(&self) -> Vec<ToolInvocation<'_>> {
        if self.kind != EventKind::Assistant {
            return Vec::new();
        }
        self.content_blocks()
            .iter()
            .filter(|block| block.get("type").and_then(Value::as_str) == Some("tool_use"))
            .map(|block| ToolInvocation {
                name: block.get("name").and_then(Value::as_str).unwrap_or("tool"),
                input: block.get("input").unwrap_or(&Value::Null),
            })
            .collect()
    }

    fn content_blocks(&self) -> &[Value] {
        self.raw
            .get("message")
            .and_then(|message| message.get("content"))
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }
}

/// One `tool_use` content block of an assistant record.
#[derive(Debug, Clone, Copy)]
pub struct ToolInvocation<'a> {
    /// Tool name as reported by the agent.
    pub name: &'a str,
    /// Tool input object; `Null` when the block carries none.
    pub input: &'a Value,
}

/// Input field used for the one-line summary of each known tool.
const TOOL_INPUT_KEYS: &[(&str, &str)] = &[
    ("Bash", "command"),
    ("Read", "file_path"),
    ("Write", "file_path"),
    ("Edit", "file_path"),
    ("Glob", "pattern"),
    ("Grep", "pattern"),
    ("WebFetch", "url"),
    ("Task", "description"),
    ("WebSearch", "query"),
];

/// Longest tool summary shown by front ends before truncation.
const SUMMARY_MAX_CHARS: usize = 100;

impl ToolInvocation<'_> {
    /// A short human-readable description of the invocation.
    ///
    /// Picks the characteristic input field for known tools, the first
    /// input value otherwise, truncated to 100 characters.
    #[must_use]
    pub fn summary(&self) -> String {
        let keyed = TOOL_INPUT_KEYS
            .iter()
            .find(|(name, _)| *name == self.name)
            .and_then(|(_, key)| self.input.get(key));
        let first = self
            .input
            .as_object()
            .and_then(|fields| fields.values().next());
        let value = match keyed.or(first) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        truncate_chars(&value, SUMMARY_MAX_CHARS)
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_owned()
    } else {
        let mut out: String = s.chars().take(max).collect();
        out.push('…');
        out
    }
}
