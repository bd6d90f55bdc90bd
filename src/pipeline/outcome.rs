use std::time::Duration;

use reqwest::{Method, StatusCode};
use tracing::Level;
use tracing::event;

pub const MSG_REQUEST_FAILED: &str = "Request failed";
pub const MSG_ACCESS_DENIED: &str = "Access denied";
pub const MSG_NOT_FOUND: &str = "The requested resource does not exist";
pub const MSG_SERVER_ERROR: &str = "Internal server error";
pub const MSG_NETWORK: &str = "Network error, please check your connection";
pub const MSG_UNAUTHORIZED: &str = "Unauthorized, please log in again";
pub const MSG_SESSION_EXPIRED: &str = "Session expired, please log in again";

/// User-facing text for an HTTP error status that will not be retried.
pub fn status_message(status: StatusCode, body: &str) -> String {
    match status {
        StatusCode::FORBIDDEN => MSG_ACCESS_DENIED.to_string(),
        StatusCode::NOT_FOUND => MSG_NOT_FOUND.to_string(),
        StatusCode::INTERNAL_SERVER_ERROR => MSG_SERVER_ERROR.to_string(),
        _ => {
            let detail = serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|value| {
                    value
                        .get("message")
                        .and_then(|m| m.as_str())
                        .filter(|m| !m.is_empty())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| "unknown error".to_string());
            format!("{MSG_REQUEST_FAILED}: {detail}")
        }
    }
}

/// Message carried by a non-200 envelope, or the generic fallback.
pub fn envelope_message(message: Option<String>) -> String {
    message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| MSG_REQUEST_FAILED.to_string())
}

#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub method: Method,
    pub path: String,
    pub success: bool,
    pub elapsed: Duration,
}

impl RequestOutcome {
    pub fn log(&self) {
        event!(
            Level::DEBUG,
            method = %self.method,
            path = %self.path,
            success = self.success,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "request.outcome"
        );
    }
}
