//! # Paybridge Events
//!
//! Event log access for provider integrations:
//! - Normalized event records with emitter-prefixed types
//! - The tenant-scoped [`EventStore`] trait
//! - An in-memory store and an HTTP client for the platform event API
//!
//! ## Example
//!
//! ```rust,ignore
//! use paybridge_events::{EventQuery, EventStore, MemoryEventStore, NormalizedEvent};
//!
//! let store = MemoryEventStore::new();
//! let event = NormalizedEvent::external("stripe", "customer.created", "evt_1", metadata);
//! store.create(&tenant, event).await?;
//!
//! let page = store.list(&tenant, EventQuery::latest("stripe_customer.created", "evt_1")).await?;
//! ```

mod error;
mod event;
pub mod store;

pub use error::{EventError, EventResult};
pub use event::{external_event_type, NormalizedEvent, StoredEvent};
pub use store::{EventOrdering, EventPage, EventQuery, EventStore, MemoryEventStore};

#[cfg(feature = "http-client")]
pub use store::{HttpEventStore, HttpEventStoreConfig};
