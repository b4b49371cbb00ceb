// Copilot runner for the AV Ops console
// One-shot diagnostic task against /api/v1/copilot/run, with result decoding

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::catalog::COPILOT_RUN_PATH;
use crate::json::{parse_json, pretty, ParsedJson};
use crate::models::{Method, ResponseRecord, JSON_CONTENT_TYPE};
use crate::request::{assemble_headers, join_url, BuiltRequest};

pub const COPILOT_RUNNER_NAME: &str = "Copilot Runner";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CopilotOutput {
    pub diagnosis: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CopilotRun {
    #[serde(default)]
    pub run_id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    pub output: CopilotOutput,
}

/// What the runner shows for a successful call
#[derive(Debug, Clone, PartialEq)]
pub enum CopilotResult {
    /// Body had the `output.diagnosis` shape
    Structured(CopilotRun),
    /// Any other JSON
    Json(Value),
    /// Body was not JSON
    Text(String),
}

impl CopilotResult {
    pub fn from_record(record: &ResponseRecord) -> Self {
        match (&record.parsed_body, &record.raw_body) {
            (Some(value), _) => match serde_json::from_value::<CopilotRun>(value.clone()) {
                Ok(run) => CopilotResult::Structured(run),
                Err(_) => CopilotResult::Json(value.clone()),
            },
            (None, raw) => CopilotResult::Text(raw.clone().unwrap_or_default()),
        }
    }

    pub fn render(&self) -> String {
        match self {
            CopilotResult::Structured(run) => {
                let mut out = String::new();
                if let Some(created) = &run.created_at {
                    out.push_str(&format!("Created: {}\n", created));
                }
                out.push_str("Diagnosis:\n");
                for line in &run.output.diagnosis {
                    out.push_str(&format!("  - {}\n", line));
                }
                out.push_str("Next Steps:\n");
                for line in &run.output.next_steps {
                    out.push_str(&format!("  - {}\n", line));
                }
                if let Some(notes) = run.output.notes.as_deref().filter(|n| !n.is_empty()) {
                    out.push_str(&format!("Notes:\n  {}\n", notes));
                }
                out
            }
            CopilotResult::Json(value) => pretty(value),
            CopilotResult::Text(text) => text.clone(),
        }
    }
}

/// Request for a copilot run. The body is always JSON `{"task": ...}`.
pub fn copilot_request(base_url: &str, token: &str, task: &str) -> BuiltRequest {
    let headers = assemble_headers(&IndexMap::new(), JSON_CONTENT_TYPE, token);
    BuiltRequest {
        method: Method::POST,
        path: COPILOT_RUN_PATH.to_string(),
        url: join_url(base_url, COPILOT_RUN_PATH),
        headers,
        body: Some(json!({ "task": task }).to_string()),
    }
}

/// Error text for a non-2xx copilot response, with the body pretty-printed
/// when it is JSON.
pub fn copilot_failure(record: &ResponseRecord) -> String {
    let detail = match &record.parsed_body {
        Some(value) => pretty(value),
        None => match parse_json(record.raw_body.as_deref().unwrap_or_default()) {
            ParsedJson::Parsed(value) => pretty(&value),
            ParsedJson::Raw(text) => text,
        },
    };
    format!("Copilot failed ({}): {}", record.status, detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RequestSummary;

    fn record_with(status: u16, parsed: Option<Value>, raw: Option<&str>) -> ResponseRecord {
        ResponseRecord {
            ok: (200..300).contains(&status),
            status,
            status_text: String::new(),
            elapsed_millis: 0,
            response_headers: IndexMap::new(),
            parsed_body: parsed,
            raw_body: raw.map(|r| r.to_string()),
            timestamp: String::new(),
            request: RequestSummary {
                name: COPILOT_RUNNER_NAME.to_string(),
                method: Method::POST,
                path: COPILOT_RUN_PATH.to_string(),
                url: String::new(),
                body_sent: String::new(),
            },
        }
    }

    #[test]
    fn structured_output_renders_sections() {
        let body = json!({
            "run_id": 3,
            "status": "completed",
            "task": "t",
            "created_at": "2026-01-07T10:00:00",
            "output": { "diagnosis": ["overheating"], "next_steps": ["reboot"], "notes": "check fan" }
        });
        let result = CopilotResult::from_record(&record_with(200, Some(body), None));
        let text = result.render();
        assert!(matches!(result, CopilotResult::Structured(_)));
        assert!(text.contains("Created: 2026-01-07T10:00:00"));
        assert!(text.contains("  - overheating"));
        assert!(text.contains("  - reboot"));
        assert!(text.contains("check fan"));
    }

    #[test]
    fn other_shapes_fall_back_to_json() {
        let result = CopilotResult::from_record(&record_with(200, Some(json!({ "output": {} })), None));
        assert!(matches!(result, CopilotResult::Json(_)));
    }

    #[test]
    fn request_body_is_json_task() {
        let req = copilot_request("http://h:8000/", "T", "Diagnose");
        assert_eq!(req.url, "http://h:8000/api/v1/copilot/run");
        assert_eq!(req.body.as_deref(), Some(r#"{"task":"Diagnose"}"#));
        assert_eq!(req.headers.get("Authorization").unwrap(), "Bearer T");
    }

    #[test]
    fn failure_message_includes_status_and_body() {
        let msg = copilot_failure(&record_with(401, Some(json!({ "detail": "Not authenticated" })), None));
        assert!(msg.starts_with("Copilot failed (401): {"));
        assert!(msg.contains("Not authenticated"));
        let msg = copilot_failure(&record_with(500, None, Some("boom")));
        assert_eq!(msg, "Copilot failed (500): boom");
    }
}
