//! Webhook error types.

use paybridge_core::IntegrationError;
use thiserror::Error;

/// Result type for webhook operations.
pub type WebhookResult<T> = Result<T, WebhookError>;

/// Error type for webhook operations.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// No signature header was sent.
    #[error("Missing signature header")]
    MissingSignature,

    /// Invalid signature.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signature expired.
    #[error("Signature expired")]
    ExpiredSignature,

    /// Invalid payload.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for WebhookError {
    fn from(err: serde_json::Error) -> Self {
        WebhookError::InvalidPayload(err.to_string())
    }
}

/// Every verification failure is an authorization failure to the caller.
impl From<WebhookError> for IntegrationError {
    fn from(_: WebhookError) -> Self {
        IntegrationError::Authorization
    }
}
