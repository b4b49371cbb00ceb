// Request Construction Module
//
// Turns the editable RequestDraft into a dispatchable BuiltRequest:
//
// - substitution: path placeholders and query string
// - body: JSON / form-urlencoded serialization of the draft body text
// - headers: Content-Type and bearer credential assembly
//
// Nothing in here fails. Incomplete or malformed drafts are passed through
// so the server gets to answer them.

pub mod body;
pub mod headers;
pub mod substitution;

pub use body::*;
pub use headers::*;
pub use substitution::*;

use indexmap::IndexMap;

use crate::models::{Method, RequestDraft};

/// A fully resolved request, ready for the executor
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltRequest {
    pub method: Method,
    /// Resolved path plus query string, relative to the base URL
    pub path: String,
    pub url: String,
    pub headers: IndexMap<String, String>,
    pub body: Option<String>,
}

impl BuiltRequest {
    /// Body text as recorded in a request summary.
    pub fn body_sent(&self) -> String {
        self.body.clone().unwrap_or_default()
    }
}

/// Join the base URL and a path without doubling the separator.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Build a request from the draft.
///
/// `content_type_override` is the selected endpoint's override and wins over
/// a `Content-Type` the user typed into the draft headers. A non-empty
/// `token` always replaces any user supplied `Authorization` header.
pub fn build_request(
    draft: &RequestDraft,
    base_url: &str,
    token: &str,
    content_type_override: Option<&str>,
) -> BuiltRequest {
    let path = build_url_path(&draft.path, &draft.path_params, &draft.query_params);
    let content_type = resolve_content_type(content_type_override, &draft.headers);
    let body = if draft.method.allows_body() {
        serialize_body(&draft.body_text, &content_type)
    } else {
        None
    };
    let headers = assemble_headers(&draft.headers, &content_type, token);

    BuiltRequest {
        method: draft.method,
        url: join_url(base_url, &path),
        path,
        headers,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EndpointCatalog;
    use crate::models::FORM_CONTENT_TYPE;

    #[test]
    fn builds_login_request_as_form() {
        let catalog = EndpointCatalog::default();
        let login = catalog.get("POST /api/v1/auth/login").unwrap();
        let mut draft = RequestDraft::from_endpoint(login);
        draft.body_text = r#"{"username":"a@b.com","password":"p"}"#.to_string();

        let built = build_request(&draft, "http://localhost:8000/", "", login.content_type_override.as_deref());
        assert_eq!(built.url, "http://localhost:8000/api/v1/auth/login");
        assert_eq!(built.body.as_deref(), Some("username=a%40b.com&password=p"));
        assert_eq!(built.headers.get("Content-Type").unwrap(), FORM_CONTENT_TYPE);
        assert!(!built.headers.contains_key("Authorization"));
    }

    #[test]
    fn get_requests_never_carry_a_body() {
        let catalog = EndpointCatalog::default();
        let health = catalog.get("GET /health").unwrap();
        let mut draft = RequestDraft::from_endpoint(health);
        draft.body_text = r#"{"a":1}"#.to_string();

        let built = build_request(&draft, "http://x", "tok", None);
        assert_eq!(built.body, None);
        assert_eq!(built.body_sent(), "");
        assert_eq!(built.headers.get("Authorization").unwrap(), "Bearer tok");
    }
}
