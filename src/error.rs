//! Error types for filedesk.

use thiserror::Error;

use crate::api::ApiError;

/// Common error type for filedesk.
#[derive(Error, Debug)]
pub enum FiledeskError {
    /// Configuration error.
    ///
    /// Raised once during startup (missing or malformed base URL, unreadable
    /// config file). Not recoverable at runtime.
    #[error("configuration error: {0}")]
    Config(String),

    /// The file service answered with a non-success status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Transport-level HTTP failure (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A success response whose body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),
}

impl FiledeskError {
    /// Returns the service error if this failure came from a non-success response.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            FiledeskError::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for filedesk operations.
pub type Result<T> = std::result::Result<T, FiledeskError>;
