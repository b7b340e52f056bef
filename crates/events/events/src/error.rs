//! Event store error types.

use paybridge_core::IntegrationError;
use thiserror::Error;

/// Result type for event store operations.
pub type EventResult<T> = Result<T, EventError>;

/// Error type for event store operations.
#[derive(Debug, Error)]
pub enum EventError {
    /// Event serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The query parameters are invalid.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The event store answered with a non-success status.
    #[error("Event store responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for EventError {
    fn from(err: serde_json::Error) -> Self {
        EventError::SerializationError(err.to_string())
    }
}

#[cfg(feature = "http-client")]
impl From<reqwest::Error> for EventError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EventError::Timeout
        } else {
            EventError::HttpError(err.to_string())
        }
    }
}

impl From<EventError> for IntegrationError {
    fn from(err: EventError) -> Self {
        IntegrationError::upstream("event-store", err.to_string())
    }
}
