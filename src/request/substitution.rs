// Path & Query Substitution
//
// Replaces `{name}` placeholders in a path template and appends the
// non-empty query parameters.
//
// Example:
//   Input:  "/api/v1/telemetry/latest/{device_id}", {device_id => "a b"}, {limit => "10", offset => " "}
//   Output: "/api/v1/telemetry/latest/a%20b?limit=10"

use indexmap::IndexMap;
use lazy_static::lazy_static;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::{Captures, Regex};

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([^}]+)\}").unwrap();
}

/// Characters left alone when encoding a single URL component.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Replace every `{name}` with the encoded value of `params[name]`.
/// Unknown names stay as the literal `{name}`.
pub fn substitute_path(template: &str, params: &IndexMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match params.get(&caps[1]) {
            Some(value) => encode_component(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Encoded query string without the leading `?`. Blank values are skipped.
pub fn build_query_string(query: &IndexMap<String, String>) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in query {
        if value.trim().is_empty() {
            continue;
        }
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Substituted path with the query string appended when there is one.
pub fn build_url_path(
    template: &str,
    path_params: &IndexMap<String, String>,
    query: &IndexMap<String, String>,
) -> String {
    let path = substitute_path(template, path_params);
    let qs = build_query_string(query);
    if qs.is_empty() {
        path
    } else {
        format!("{}?{}", path, qs)
    }
}

/// Path with any query string removed.
pub fn strip_query(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}
