// Terminal output for the AV Ops console
// Formats endpoints, response records and history for stdout

use crate::catalog::EndpointCatalog;
use crate::error::ConsoleError;
use crate::history::HistoryLedger;
use crate::models::{RequestDraft, ResponseRecord};

/// `"<n> ms"` below one second, `"<s.ss> s"` above.
pub fn human_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{} ms", ms)
    } else {
        format!("{:.2} s", ms as f64 / 1000.0)
    }
}

pub fn render_catalog(catalog: &EndpointCatalog) -> String {
    let mut out = String::new();
    for (group, items) in catalog.groups() {
        out.push_str(&format!("{}\n", group));
        for (position, endpoint) in items {
            out.push_str(&format!("  {:>2}. {:<6} {:<40} {}\n", position, endpoint.method, endpoint.path_template, endpoint.name));
            if !endpoint.hint.is_empty() {
                out.push_str(&format!("      {}\n", endpoint.hint));
            }
        }
    }
    out
}

pub fn render_draft(draft: &RequestDraft) -> String {
    let mut out = format!("{} {}\n", draft.method, draft.path);
    if !draft.path_params.is_empty() {
        out.push_str("Path params:\n");
        for (k, v) in &draft.path_params {
            out.push_str(&format!("  {} = {}\n", k, v));
        }
    }
    if !draft.query_params.is_empty() {
        out.push_str("Query:\n");
        for (k, v) in &draft.query_params {
            out.push_str(&format!("  {} = {}\n", k, v));
        }
    }
    out.push_str("Headers:\n");
    for (k, v) in &draft.headers {
        out.push_str(&format!("  {}: {}\n", k, v));
    }
    if !draft.body_text.trim().is_empty() {
        out.push_str("Body:\n");
        out.push_str(&draft.body_text);
        out.push('\n');
    }
    out
}

/// Status line, headers and body of a record.
/// The whole record as pretty JSON, for scripting.
pub fn render_record_json(record: &ResponseRecord) -> Result<String, ConsoleError> {
    serde_json::to_string_pretty(record).map_err(|e| ConsoleError::Encode(e.to_string()))
}

pub fn render_record(record: &ResponseRecord) -> String {
    let mut out = format!(
        "{} {} {} | {} | {}\n",
        record.status,
        record.status_text,
        if record.ok { "OK" } else { "FAILED" },
        human_ms(record.elapsed_millis),
        record.timestamp
    );
    out.push_str(&format!("{} {}\n", record.request.method, record.request.url));
    if !record.response_headers.is_empty() {
        out.push_str("Headers:\n");
        for (k, v) in &record.response_headers {
            out.push_str(&format!("  {}: {}\n", k, v));
        }
    }
    let body = record.body_display();
    if !body.is_empty() {
        out.push_str("Body:\n");
        out.push_str(&body);
        out.push('\n');
    }
    out
}

pub fn render_history(history: &HistoryLedger) -> String {
    if history.is_empty() {
        return "No calls yet.\n".to_string();
    }
    let mut out = String::new();
    for (idx, entry) in history.iter().enumerate() {
        out.push_str(&format!(
            "{:>2}. [{}] {} {} ({}) {}\n",
            idx + 1,
            entry.status,
            entry.request.method,
            entry.request.path,
            entry.request.name,
            human_ms(entry.elapsed_millis)
        ));
    }
    out
}
