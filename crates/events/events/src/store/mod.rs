//! Event Store - Persistence layer for events
//!
//! Provides tenant-scoped event persistence and querying, either in memory
//! or through the platform's event API.

mod trait_def;
mod memory;
#[cfg(feature = "http-client")]
mod http;

pub use trait_def::{EventOrdering, EventPage, EventQuery, EventStore};
pub use memory::MemoryEventStore;

#[cfg(feature = "http-client")]
pub use http::{
    HttpEventStore, HttpEventStoreConfig, PLATFORM_API_VERSION, PLATFORM_ENV_HEADER,
    PLATFORM_ID_HEADER, SYSTEM_KEY_HEADER, VERSION_HEADER,
};
