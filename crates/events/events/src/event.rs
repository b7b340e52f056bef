//! Event records written to the platform event log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An event as written to the event log.
///
/// Created once, never mutated or deleted by integrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvent {
    /// Event type, prefixed by the emitter for external events
    /// (e.g. `stripe_customer.created`).
    #[serde(rename = "type")]
    pub event_type: String,
    /// Identifier of the object the event is about. Indexed by the store.
    pub object_id: String,
    /// Emitter of the event (e.g. `stripe`).
    pub emitter_id: String,
    /// Free-form payload for downstream consumers.
    pub metadata: Value,
}

impl NormalizedEvent {
    /// Creates a new event.
    pub fn new(
        event_type: impl Into<String>,
        object_id: impl Into<String>,
        emitter_id: impl Into<String>,
        metadata: Value,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            object_id: object_id.into(),
            emitter_id: emitter_id.into(),
            metadata,
        }
    }

    /// Creates an event relayed from an external emitter.
    ///
    /// The type is prefixed with `<emitter>_` so it cannot collide with native
    /// platform event types.
    pub fn external(emitter_id: &str, provider_type: &str, object_id: impl Into<String>, metadata: Value) -> Self {
        Self::new(
            external_event_type(emitter_id, provider_type),
            object_id,
            emitter_id,
            metadata,
        )
    }
}

/// Returns the prefixed event type for an external provider event type.
pub fn external_event_type(emitter_id: &str, provider_type: &str) -> String {
    format!("{}_{}", emitter_id, provider_type)
}

/// An event with storage metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEvent {
    /// Unique storage ID.
    pub id: String,
    /// When the event was stored.
    pub created_date: DateTime<Utc>,
    /// The event itself.
    #[serde(flatten)]
    pub event: NormalizedEvent,
}
