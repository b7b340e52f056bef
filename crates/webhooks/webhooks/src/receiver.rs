//! Webhook receiver for verifying incoming provider webhooks.

use serde_json::Value;

use crate::error::{WebhookError, WebhookResult};
use crate::signature::{DEFAULT_TOLERANCE_SECS, SignatureError, WebhookSigner};

/// A verified provider event.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderEvent {
    /// Provider event ID (e.g. `evt_...`).
    pub id: String,
    /// Provider event type (e.g. `customer.created`).
    pub event_type: String,
    /// The full event JSON as delivered.
    pub payload: Value,
}

impl ProviderEvent {
    /// Extracts the event from a JSON document with string `id` and `type`.
    pub fn from_value(payload: Value) -> WebhookResult<Self> {
        let id = payload
            .get("id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| WebhookError::InvalidPayload("event id missing".into()))?
            .to_string();
        let event_type = payload
            .get("type")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| WebhookError::InvalidPayload("event type missing".into()))?
            .to_string();

        Ok(Self {
            id,
            event_type,
            payload,
        })
    }
}

impl From<SignatureError> for WebhookError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::Expired => WebhookError::ExpiredSignature,
            SignatureError::InvalidSecret => WebhookError::ConfigError(err.to_string()),
            SignatureError::InvalidFormat | SignatureError::MissingSignature | SignatureError::Invalid => {
                WebhookError::InvalidSignature
            }
        }
    }
}

/// Webhook receiver for verifying incoming webhooks.
#[derive(Debug)]
pub struct WebhookReceiver {
    signer: WebhookSigner,
    /// Tolerance for timestamp validation (in seconds).
    tolerance_secs: i64,
}

impl WebhookReceiver {
    /// Creates a new webhook receiver.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            signer: WebhookSigner::new(secret),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Sets the timestamp tolerance.
    pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    /// Verifies a webhook signature and parses the provider event.
    ///
    /// Fails with [`WebhookError::MissingSignature`] when no header was sent.
    pub fn construct_event(&self, payload: &[u8], signature: Option<&str>) -> WebhookResult<ProviderEvent> {
        let signature = signature.ok_or(WebhookError::MissingSignature)?;
        self.verify_signature(signature, payload)?;

        let value: Value = serde_json::from_slice(payload)?;
        ProviderEvent::from_value(value)
    }

    /// Verifies only the signature without parsing.
    pub fn verify_signature(&self, signature: &str, payload: &[u8]) -> WebhookResult<()> {
        self.signer
            .verify_header(signature, payload, self.tolerance_secs)
            .map_err(WebhookError::from)
    }
}

/// Verifies `payload` against `signature` with `secret` and the default tolerance.
pub fn construct_event(payload: &[u8], signature: Option<&str>, secret: &str) -> WebhookResult<ProviderEvent> {
    WebhookReceiver::new(secret).construct_event(payload, signature)
}
