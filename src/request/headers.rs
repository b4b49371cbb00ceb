// Header Assembly
//
// Content-Type is always forced to the resolved content type, and a held
// bearer token always replaces whatever Authorization the user entered.
// Header names compare case-insensitively, as they do on the wire.

use indexmap::IndexMap;

use crate::models::JSON_CONTENT_TYPE;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const AUTHORIZATION: &str = "Authorization";

/// First value stored under `name`, whatever its case.
pub fn header_value<'a>(headers: &'a IndexMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Set `name` to `value`, dropping every other spelling of the same header.
pub fn force_header(headers: &mut IndexMap<String, String>, name: &str, value: String) {
    headers.retain(|key, _| !key.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value);
}

/// Endpoint override, else the draft's Content-Type header, else JSON.
pub fn resolve_content_type(override_type: Option<&str>, headers: &IndexMap<String, String>) -> String {
    override_type
        .filter(|t| !t.trim().is_empty())
        .or_else(|| header_value(headers, CONTENT_TYPE).filter(|t| !t.trim().is_empty()))
        .unwrap_or(JSON_CONTENT_TYPE)
        .to_string()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn assemble_headers(
    draft_headers: &IndexMap<String, String>,
    content_type: &str,
    token: &str,
) -> IndexMap<String, String> {
    let mut headers = draft_headers.clone();
    force_header(&mut headers, CONTENT_TYPE, content_type.to_string());
    if !token.is_empty() {
        force_header(&mut headers, AUTHORIZATION, bearer(token));
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FORM_CONTENT_TYPE;

    #[test]
    fn override_beats_user_content_type() {
        let mut headers = IndexMap::new();
        headers.insert(CONTENT_TYPE.to_string(), "text/plain".to_string());
        assert_eq!(resolve_content_type(Some(FORM_CONTENT_TYPE), &headers), FORM_CONTENT_TYPE);
        assert_eq!(resolve_content_type(None, &headers), "text/plain");
        assert_eq!(resolve_content_type(None, &IndexMap::new()), JSON_CONTENT_TYPE);
    }

    #[test]
    fn token_replaces_user_authorization() {
        let mut headers = IndexMap::new();
        headers.insert(AUTHORIZATION.to_string(), "Bearer stale".to_string());
        headers.insert("X-Trace".to_string(), "1".to_string());
        let out = assemble_headers(&headers, JSON_CONTENT_TYPE, "live");
        assert_eq!(out.get(AUTHORIZATION).unwrap(), "Bearer live");
        assert_eq!(out.get("X-Trace").unwrap(), "1");
    }

    #[test]
    fn lowercase_user_headers_are_replaced() {
        let mut headers = IndexMap::new();
        headers.insert("authorization".to_string(), "Bearer stale".to_string());
        headers.insert("content-type".to_string(), "text/plain".to_string());
        headers.insert("X-Trace".to_string(), "1".to_string());
        assert_eq!(resolve_content_type(None, &headers), "text/plain");

        let out = assemble_headers(&headers, FORM_CONTENT_TYPE, "live");
        assert_eq!(out.len(), 3);
        assert_eq!(out.get(CONTENT_TYPE).unwrap(), FORM_CONTENT_TYPE);
        assert_eq!(out.get(AUTHORIZATION).unwrap(), "Bearer live");
        assert!(!out.contains_key("authorization"));
        assert!(!out.contains_key("content-type"));
    }

    #[test]
    fn empty_token_leaves_user_authorization() {
        let mut headers = IndexMap::new();
        headers.insert(AUTHORIZATION.to_string(), "Basic abc".to_string());
        let out = assemble_headers(&headers, JSON_CONTENT_TYPE, "");
        assert_eq!(out.get(AUTHORIZATION).unwrap(), "Basic abc");
    }
}
