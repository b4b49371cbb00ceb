// Async HTTP engine for the AV Ops console
// Uses reqwest and tokio; one call in, one ResponseRecord out

use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::ConsoleError;
use crate::json::parse_json;
use crate::models::{RequestSummary, ResponseRecord};
use crate::request::BuiltRequest;

/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct RequestExecutor {
    pub client: Client,
}

impl RequestExecutor {
    /// Executor with the transport's default timeout behaviour, or a fixed
    /// per-request timeout when one is configured.
    pub fn new(timeout: Option<Duration>) -> Result<Self, ConsoleError> {
        let mut builder = Client::builder().pool_max_idle_per_host(10);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client })
    }

    /// Perform one exchange.
    ///
    /// Any HTTP response, whatever its status, becomes a record. Only
    /// transport failures return `Err`, and those leave nothing behind.
    pub async fn execute(&self, request: &BuiltRequest, name: &str) -> Result<ResponseRecord, ConsoleError> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| ConsoleError::Transport(e.to_string()))?;

        let mut req = self.client.request(method, &request.url);
        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }

        debug!(method = %request.method, url = %request.url, "dispatching request");
        let start = Instant::now();

        let resp = req.send().await.map_err(|e| {
            warn!(url = %request.url, error = %e, "transport failure");
            ConsoleError::from(e)
        })?;

        let status = resp.status();
        let mut response_headers = IndexMap::new();
        for (key, value) in resp.headers() {
            response_headers.insert(key.as_str().to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        let text = resp.text().await.map_err(|e| {
            warn!(url = %request.url, error = %e, "failed reading response body");
            ConsoleError::from(e)
        })?;
        let elapsed_millis = start.elapsed().as_millis() as u64;

        let (parsed_body, raw_body) = parse_json(&text).into_parts();
        let record = ResponseRecord {
            ok: status.is_success(),
            status: status.as_u16(),
            // Canonical phrase for the code, not the one on the wire. HTTP/2
            // carries none, and unregistered codes get an empty string.
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            elapsed_millis,
            response_headers,
            parsed_body,
            raw_body,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            request: RequestSummary {
                name: name.to_string(),
                method: request.method,
                path: request.path.clone(),
                url: request.url.clone(),
                body_sent: request.body_sent(),
            },
        };

        if record.ok {
            debug!(status = record.status, elapsed_ms = record.elapsed_millis, "request completed");
        } else {
            warn!(status = record.status, url = %request.url, "request returned non-success status");
        }
        Ok(record)
    }
}
