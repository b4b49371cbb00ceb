// Core data models for the AV Ops console
// Endpoint descriptors, the editable request draft and immutable response records

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::ConsoleError;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Supported HTTP methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
}

impl Method {
    /// GET and HEAD never carry a request body.
    pub fn allows_body(&self) -> bool {
        !matches!(self, Method::GET | Method::HEAD)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::PATCH => "PATCH",
            Method::HEAD => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            "PATCH" => Ok(Method::PATCH),
            "HEAD" => Ok(Method::HEAD),
            other => Err(ConsoleError::InvalidCommand(format!("unsupported method {}", other))),
        }
    }
}

/// A known remote operation from the endpoint catalog
#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    pub group: String,
    pub name: String,
    pub hint: String,
    pub method: Method,
    pub path_template: String,
    pub example_body: Option<Value>,
    pub default_params: IndexMap<String, String>,
    pub content_type_override: Option<String>,
}

impl EndpointDescriptor {
    pub fn new(group: &str, name: &str, method: Method, path_template: &str) -> Self {
        Self {
            group: group.to_string(),
            name: name.to_string(),
            hint: String::new(),
            method,
            path_template: path_template.to_string(),
            example_body: None,
            default_params: IndexMap::new(),
            content_type_override: None,
        }
    }

    pub fn hint(mut self, hint: &str) -> Self {
        self.hint = hint.to_string();
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.example_body = Some(body);
        self
    }

    /// Default path parameter; numbers are stored in their string form.
    pub fn param(mut self, name: &str, value: impl ToString) -> Self {
        self.default_params.insert(name.to_string(), value.to_string());
        self
    }

    pub fn content_type(mut self, content_type: &str) -> Self {
        self.content_type_override = Some(content_type.to_string());
        self
    }

    /// Catalog key, e.g. `GET /api/v1/health`
    pub fn key(&self) -> String {
        format!("{} {}", self.method, self.path_template)
    }

    /// Content type used for the request body of this endpoint.
    pub fn default_content_type(&self) -> &str {
        self.content_type_override.as_deref().unwrap_or(JSON_CONTENT_TYPE)
    }
}

/// The live, editable request state
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDraft {
    pub method: Method,
    pub path: String,
    pub path_params: IndexMap<String, String>,
    pub query_params: IndexMap<String, String>,
    pub headers: IndexMap<String, String>,
    pub body_text: String,
}

impl RequestDraft {
    /// Draft holding an endpoint's defaults. Nothing is carried over from a
    /// previous draft.
    pub fn from_endpoint(endpoint: &EndpointDescriptor) -> Self {
        let mut headers = IndexMap::new();
        headers.insert("Content-Type".to_string(), endpoint.default_content_type().to_string());

        let body_text = endpoint
            .example_body
            .as_ref()
            .map(crate::json::pretty)
            .unwrap_or_default();

        Self {
            method: endpoint.method,
            path: endpoint.path_template.clone(),
            path_params: endpoint.default_params.clone(),
            query_params: IndexMap::new(),
            headers,
            body_text,
        }
    }
}

/// Snapshot of what was actually sent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestSummary {
    pub name: String,
    pub method: Method,
    /// Resolved path including the query string
    pub path: String,
    pub url: String,
    pub body_sent: String,
}

/// One completed HTTP exchange. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseRecord {
    pub ok: bool,
    pub status: u16,
    pub status_text: String,
    pub elapsed_millis: u64,
    pub response_headers: IndexMap<String, String>,
    pub parsed_body: Option<Value>,
    pub raw_body: Option<String>,
    pub timestamp: String,
    pub request: RequestSummary,
}

impl ResponseRecord {
    /// Error string shown next to a non-2xx record.
    pub fn failure_message(&self) -> Option<String> {
        if self.ok {
            None
        } else if self.status_text.is_empty() {
            Some(format!("Request failed ({})", self.status))
        } else {
            Some(format!("Request failed ({} {})", self.status, self.status_text))
        }
    }

    /// Body as display text: pretty JSON when it parsed, raw text otherwise.
    pub fn body_display(&self) -> String {
        match (&self.parsed_body, &self.raw_body) {
            (Some(value), _) => crate::json::pretty(value),
            (None, Some(raw)) => raw.clone(),
            (None, None) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_round_trips_through_str() {
        assert_eq!("patch".parse::<Method>().unwrap(), Method::PATCH);
        assert_eq!(Method::DELETE.to_string(), "DELETE");
        assert!("TRACE".parse::<Method>().is_err());
    }

    #[test]
    fn draft_from_endpoint_uses_override_content_type() {
        let endpoint = EndpointDescriptor::new("Auth", "Login", Method::POST, "/login")
            .body(json!({ "username": "u", "password": "p" }))
            .content_type(FORM_CONTENT_TYPE);
        let draft = RequestDraft::from_endpoint(&endpoint);
        assert_eq!(draft.headers.get("Content-Type").unwrap(), FORM_CONTENT_TYPE);
        assert!(draft.body_text.starts_with("{\n  \"username\""));
        assert!(draft.query_params.is_empty());
    }
}
