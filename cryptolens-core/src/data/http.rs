//! Blocking HTTP plumbing shared by the listing sources.
//!
//! One request per call, no retries. Transport failures become
//! `DataError::Network`; non-2xx statuses become `DataError::Api` with the
//! best human message the body offers.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use super::provider::DataError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the blocking client used by every source.
pub fn build_client(timeout: Duration) -> Result<Client, DataError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("cryptolens/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| DataError::Network(format!("failed to build HTTP client: {e}")))
}

/// Send a prepared request and decode the JSON body.
pub fn send_json(request: RequestBuilder) -> Result<Value, DataError> {
    let resp = request.send().map_err(classify_transport)?;
    let status = resp.status().as_u16();
    let body = resp.text().map_err(classify_transport)?;
    debug!(status, bytes = body.len(), "response received");
    decode_body(status, &body)
}

fn classify_transport(e: reqwest::Error) -> DataError {
    if e.is_timeout() {
        DataError::Network(format!("request timed out: {e}"))
    } else if e.is_connect() {
        DataError::Network(format!("connection failed: {e}"))
    } else {
        DataError::Network(e.to_string())
    }
}

/// Classify a status + body pair.
pub fn decode_body(status: u16, body: &str) -> Result<Value, DataError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| error_message(&v))
            .unwrap_or_else(|| summarize(body));
        return Err(DataError::Api {
            status: Some(status),
            message,
        });
    }

    serde_json::from_str(body)
        .map_err(|e| DataError::Schema(format!("response is not valid JSON: {e}")))
}

/// Pull a human-readable error out of the common API error shapes:
/// `{"error": "..."}`, `{"error": {"message": "..."}}`,
/// `{"status": {"error_message": "..."}}`.
pub fn error_message(payload: &Value) -> Option<String> {
    match payload.get("error") {
        Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
        Some(Value::Object(obj)) => {
            if let Some(Value::String(s)) = obj.get("message") {
                return Some(s.clone());
            }
        }
        _ => {}
    }
    payload
        .get("status")
        .and_then(|s| s.get("error_message"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn summarize(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    let mut out: String = trimmed.chars().take(120).collect();
    if trimmed.chars().count() > 120 {
        out.push_str("...");
    }
    out
}
