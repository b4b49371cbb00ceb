// Endpoint catalog for the AV Ops backend
// Static, ordered table of known operations with example payloads

use lazy_static::lazy_static;
use serde_json::json;

use crate::error::ConsoleError;
use crate::models::{EndpointDescriptor, Method, FORM_CONTENT_TYPE};

pub const HEALTH_PATH: &str = "/health";
pub const LOGIN_PATH: &str = "/api/v1/auth/login";
pub const COPILOT_RUN_PATH: &str = "/api/v1/copilot/run";
pub const EXAMPLE_TASK: &str = "Diagnose device 001 audio dropouts error E42";

lazy_static! {
    static ref DEFAULT_ENDPOINTS: Vec<EndpointDescriptor> = build_default_endpoints();
}

fn telemetry_example() -> serde_json::Value {
    json!({
        "device_id": "001",
        "temperature": 42.5,
        "packet_loss": 1.2,
        "audio_dropouts": 3,
        "error_code": "E42"
    })
}

fn build_default_endpoints() -> Vec<EndpointDescriptor> {
    vec![
        // Health (root + v1)
        EndpointDescriptor::new("Health", "Health (root)", Method::GET, HEALTH_PATH).hint("Quick ping"),
        EndpointDescriptor::new("Health", "Root", Method::GET, "/").hint("Root endpoint"),
        EndpointDescriptor::new("Health", "Health (v1)", Method::GET, "/api/v1/health").hint("Versioned ping"),
        // Auth
        EndpointDescriptor::new("Auth", "Register", Method::POST, "/api/v1/auth/register")
            .hint("JSON body")
            .body(json!({ "email": "test@example.com", "password": "Password123!" })),
        EndpointDescriptor::new("Auth", "Login (form)", Method::POST, LOGIN_PATH)
            .hint("x-www-form-urlencoded (username/password). Saves the token on success.")
            .body(json!({ "username": "test@example.com", "password": "Password123!" }))
            .content_type(FORM_CONTENT_TYPE),
        // Telemetry
        EndpointDescriptor::new("Telemetry", "Ingest Telemetry", Method::POST, "/api/v1/telemetry/ingest")
            .hint("JSON body (TelemetryPayload)")
            .body(telemetry_example()),
        EndpointDescriptor::new("Telemetry", "Latest Telemetry (all)", Method::GET, "/api/v1/telemetry/latest")
            .hint("Latest records for all devices"),
        EndpointDescriptor::new("Telemetry", "Latest Telemetry (device)", Method::GET, "/api/v1/telemetry/latest/{device_id}")
            .hint("Replace {device_id}")
            .param("device_id", "001"),
        EndpointDescriptor::new("Telemetry", "List Events (auth)", Method::GET, "/api/v1/telemetry/events")
            .hint("Query: device_id (optional), limit (<=200), offset. Requires token."),
        EndpointDescriptor::new("Telemetry", "Get Event (auth)", Method::GET, "/api/v1/telemetry/events/{event_id}")
            .hint("Replace {event_id}. Requires token.")
            .param("event_id", 1),
        // Predict
        EndpointDescriptor::new("Predict", "Predict Risk", Method::POST, "/api/v1/predict/risk")
            .hint("JSON body (TelemetryPayload)")
            .body(telemetry_example()),
        // Device
        EndpointDescriptor::new("Device", "Reset Device (auth)", Method::POST, "/api/v1/device/reset")
            .hint("Requires query param: device_id=001 (no body). Requires token."),
        // Copilot
        EndpointDescriptor::new("Copilot", "Copilot Run (auth)", Method::POST, COPILOT_RUN_PATH)
            .hint("JSON body { task }. Requires token.")
            .body(json!({ "task": EXAMPLE_TASK })),
        EndpointDescriptor::new("Copilot", "List Copilot Runs (auth)", Method::GET, "/api/v1/copilot/runs")
            .hint("Query: limit (<=100), offset. Requires token."),
        EndpointDescriptor::new("Copilot", "Get Copilot Run (auth)", Method::GET, "/api/v1/copilot/runs/{run_id}")
            .hint("Replace {run_id}. Requires token.")
            .param("run_id", 1),
    ]
}

/// Ordered collection of endpoint descriptors
#[derive(Debug, Clone)]
pub struct EndpointCatalog {
    endpoints: Vec<EndpointDescriptor>,
}

impl Default for EndpointCatalog {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_ENDPOINTS.clone(),
        }
    }
}

impl EndpointCatalog {
    pub fn endpoints(&self) -> &[EndpointDescriptor] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&EndpointDescriptor> {
        self.endpoints.iter().find(|e| e.key() == key)
    }

    /// Resolve user input: a 1-based position, an exact key, or a display
    /// name (case-insensitive).
    pub fn lookup(&self, query: &str) -> Result<&EndpointDescriptor, ConsoleError> {
        let query = query.trim();
        if let Ok(position) = query.parse::<usize>() {
            if position >= 1 {
                if let Some(endpoint) = self.endpoints.get(position - 1) {
                    return Ok(endpoint);
                }
            }
        }
        self.get(query)
            .or_else(|| {
                self.endpoints
                    .iter()
                    .find(|e| e.key().eq_ignore_ascii_case(query) || e.name.eq_ignore_ascii_case(query))
            })
            .ok_or_else(|| ConsoleError::UnknownEndpoint(query.to_string()))
    }

    /// Endpoint selected when a session starts: the copilot run, else the first entry.
    pub fn initial(&self) -> Option<&EndpointDescriptor> {
        self.endpoints
            .iter()
            .find(|e| e.path_template == COPILOT_RUN_PATH)
            .or_else(|| self.endpoints.first())
    }

    /// Endpoints grouped by `group`, groups in first-seen order.
    pub fn groups(&self) -> Vec<(&str, Vec<(usize, &EndpointDescriptor)>)> {
        let mut groups: Vec<(&str, Vec<(usize, &EndpointDescriptor)>)> = Vec::new();
        for (idx, endpoint) in self.endpoints.iter().enumerate() {
            match groups.iter_mut().find(|(g, _)| *g == endpoint.group) {
                Some((_, items)) => items.push((idx + 1, endpoint)),
                None => groups.push((endpoint.group.as_str(), vec![(idx + 1, endpoint)])),
            }
        }
        groups
    }
}
