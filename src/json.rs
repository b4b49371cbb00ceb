// Best-effort JSON handling shared by body serialization and response decoding

use serde_json::Value;

/// Outcome of a lenient parse: the decoded value, or the untouched text.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedJson {
    Parsed(Value),
    Raw(String),
}

impl ParsedJson {
    /// Split into the `(parsed, raw)` pair stored on a response record.
    pub fn into_parts(self) -> (Option<Value>, Option<String>) {
        match self {
            ParsedJson::Parsed(value) => (Some(value), None),
            ParsedJson::Raw(text) => (None, Some(text)),
        }
    }
}

/// Parse `text` as JSON without ever failing.
pub fn parse_json(text: &str) -> ParsedJson {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => ParsedJson::Parsed(value),
        Err(_) => ParsedJson::Raw(text.to_string()),
    }
}

/// Two-space indented JSON, used for drafts and response display.
pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Stringify a JSON value the way a form field expects it: strings verbatim,
/// everything else as compact JSON.
pub fn value_to_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
