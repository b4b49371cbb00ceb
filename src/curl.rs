// cURL export for the AV Ops console
// Renders the current draft as a copy-pasteable shell command

use indexmap::IndexMap;

use crate::models::Method;
use crate::request::{bearer, force_header, AUTHORIZATION};

pub fn build_curl(
    url: &str,
    method: Method,
    headers: &IndexMap<String, String>,
    token: &str,
    body: &str,
) -> String {
    let mut lines = vec![format!("curl -X {} \"{}\"", method, url)];

    let mut merged = headers.clone();
    if !token.is_empty() {
        force_header(&mut merged, AUTHORIZATION, bearer(token));
    }
    for (key, value) in &merged {
        if value.is_empty() {
            continue;
        }
        lines.push(format!("  -H \"{}: {}\"", key, value.replace('"', "\\\"")));
    }

    if !body.is_empty() && method != Method::GET {
        lines.push(format!("  --data '{}'", body.replace('\'', "\\'")));
    }
    lines.join(" \\\n")
}
