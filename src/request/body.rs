// Request Body Serialization
//
// JSON bodies are re-serialized compactly when they parse and sent verbatim
// when they do not, so malformed input can still reach the server.
// Form bodies flatten the top-level fields of a JSON object.
//
// Example:
//   Input:  "{\"username\":\"a@b.com\",\"password\":\"p\"}" as form-urlencoded
//   Output: "username=a%40b.com&password=p"

use serde_json::Value;

use crate::json::{parse_json, value_to_field, ParsedJson};
use crate::models::FORM_CONTENT_TYPE;

/// Body for `body_text` under `content_type`, or `None` for blank text.
pub fn serialize_body(body_text: &str, content_type: &str) -> Option<String> {
    if body_text.trim().is_empty() {
        return None;
    }
    if is_form(content_type) {
        return Some(form_body(body_text));
    }
    match parse_json(body_text) {
        ParsedJson::Parsed(value) => Some(value.to_string()),
        ParsedJson::Raw(text) => Some(text),
    }
}

fn is_form(content_type: &str) -> bool {
    content_type.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE)
}

/// Flatten a JSON object into form pairs. Anything that is not an object
/// becomes an empty form.
pub fn form_body(body_text: &str) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    if let ParsedJson::Parsed(Value::Object(fields)) = parse_json(body_text) {
        for (key, value) in &fields {
            serializer.append_pair(key, &value_to_field(value));
        }
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JSON_CONTENT_TYPE;

    #[test]
    fn json_is_compacted() {
        let body = serialize_body("{\n  \"task\": \"x\",\n  \"n\": 1\n}", JSON_CONTENT_TYPE);
        assert_eq!(body.as_deref(), Some(r#"{"task":"x","n":1}"#));
    }

    #[test]
    fn malformed_json_is_sent_verbatim() {
        assert_eq!(serialize_body("{invalid json", JSON_CONTENT_TYPE).as_deref(), Some("{invalid json"));
    }

    #[test]
    fn blank_text_means_no_body() {
        assert_eq!(serialize_body("   \n", JSON_CONTENT_TYPE), None);
        assert_eq!(serialize_body("", FORM_CONTENT_TYPE), None);
    }

    #[test]
    fn form_keeps_source_field_order() {
        let body = serialize_body(r#"{"username":"a@b.com","password":"p"}"#, FORM_CONTENT_TYPE);
        assert_eq!(body.as_deref(), Some("username=a%40b.com&password=p"));
    }

    #[test]
    fn form_stringifies_non_strings() {
        assert_eq!(form_body(r#"{"temp":42.5,"ok":true}"#), "temp=42.5&ok=true");
    }

    #[test]
    fn bad_form_input_is_empty_form() {
        assert_eq!(serialize_body("{nope", FORM_CONTENT_TYPE).as_deref(), Some(""));
        assert_eq!(form_body("[1,2]"), "");
    }
}
