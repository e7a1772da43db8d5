//! Typed failure for non-success responses from the file service.

use serde_json::Value;
use thiserror::Error;

/// Message used when the service gives no usable error message.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// A non-2xx response from the file service.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ApiError {
    /// Human-readable message.
    pub message: String,
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON error body, when there was one.
    pub payload: Option<Value>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(message: impl Into<String>, status: u16, payload: Option<Value>) -> Self {
        Self {
            message: message.into(),
            status,
            payload,
        }
    }

    /// Build an error from a status and an optional parsed body.
    ///
    /// The message is taken from the body's `message` field when present and
    /// not null; otherwise [`GENERIC_ERROR_MESSAGE`] is used.
    pub fn from_payload(status: u16, payload: Option<Value>) -> Self {
        let message = payload
            .as_ref()
            .and_then(|body| body.get("message"))
            .and_then(|message| match message {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());

        Self::new(message, status, payload)
    }

    /// Returns true for 401 and 403 responses.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, 401 | 403)
    }

    /// Returns true for 404 responses.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}
