//! Error types for the dashboard client.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Result type for dashboard client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Failure body returned by the backend for any non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Parse a failure body into an `ApiError`.
    ///
    /// The backend writes `{"code": ..., "message": ...}`. Anything else
    /// falls back to the HTTP status and the raw body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let fallback_message = || {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                trimmed.to_string()
            }
        };

        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let Some(Value::Object(fields)) = parsed else {
            return Self::new(status.as_u16().to_string(), fallback_message());
        };

        let code = match fields.get("code") {
            Some(Value::String(code)) => code.clone(),
            Some(Value::Number(code)) => code.to_string(),
            _ => status.as_u16().to_string(),
        };
        let message = match fields.get("message") {
            Some(Value::String(message)) => message.clone(),
            _ => fallback_message(),
        };

        Self { code, message }
    }
}

/// Errors surfaced to callers of the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Backend rejected the request (non-2xx, not an authorization failure)
    #[error("API error: {0}")]
    Api(ApiError),

    /// Request never produced a response (connection refused, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// Title used when this error is shown as a notification.
    pub fn title(&self) -> &str {
        match self {
            ClientError::Api(err) => &err.code,
            ClientError::Network(_) => "network error",
            ClientError::Parse(_) => "error",
        }
    }

    /// Human-readable description, preferring the server message.
    pub fn description(&self) -> String {
        match self {
            ClientError::Api(err) => err.message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

/// Failures of durable session storage. Never surfaced past `SessionStore`.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session data: {0}")]
    Corrupt(#[from] serde_json::Error),
}
