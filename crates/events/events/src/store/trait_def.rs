use crate::{EventResult, NormalizedEvent, StoredEvent};
use async_trait::async_trait;
use paybridge_core::TenantContext;
use serde::{Deserialize, Serialize};

/// Trait for the platform event log.
///
/// Every call is scoped to a tenant. Implementations provide no transaction
/// spanning separate calls: a `list` followed by a `create` is not atomic.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Query events with filtering, ordering and pagination.
    async fn list(&self, tenant: &TenantContext, query: EventQuery) -> EventResult<EventPage>;

    /// Append an event to the tenant's log.
    ///
    /// # Returns
    ///
    /// The stored event, carrying the store-assigned ID and creation date.
    async fn create(&self, tenant: &TenantContext, event: NormalizedEvent) -> EventResult<StoredEvent>;
}

/// Sort order for event queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOrdering {
    /// Oldest events first
    #[default]
    Asc,

    /// Newest events first
    Desc,
}

impl EventOrdering {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventOrdering::Asc => "asc",
            EventOrdering::Desc => "desc",
        }
    }
}

/// Query parameters for event retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    /// Filter by exact event type.
    pub event_type: Option<String>,

    /// Filter by object ID.
    pub object_id: Option<String>,

    /// Field to order by. Only `createdDate` is supported.
    pub order_by: String,

    /// Sort order for results.
    pub order: EventOrdering,

    /// 1-based page number.
    pub page: u32,

    /// Page size.
    pub nb_results_per_page: u32,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            event_type: None,
            object_id: None,
            order_by: "createdDate".to_string(),
            order: EventOrdering::Desc,
            page: 1,
            nb_results_per_page: 20,
        }
    }
}

impl EventQuery {
    /// Maximum page size accepted by the store.
    pub const MAX_RESULTS_PER_PAGE: u32 = 100;

    /// Creates a query with default ordering and pagination.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by event type.
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Filters by object ID.
    pub fn object_id(mut self, object_id: impl Into<String>) -> Self {
        self.object_id = Some(object_id.into());
        self
    }

    /// Sets the sort order.
    pub fn order(mut self, order: EventOrdering) -> Self {
        self.order = order;
        self
    }

    /// Sets the page.
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Sets the page size.
    pub fn nb_results_per_page(mut self, n: u32) -> Self {
        self.nb_results_per_page = n;
        self
    }

    /// Most recent event with the given type and object ID, if any.
    pub fn latest(event_type: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self::new()
            .event_type(event_type)
            .object_id(object_id)
            .order(EventOrdering::Desc)
            .page(1)
            .nb_results_per_page(1)
    }

    /// Rejects queries the store cannot serve.
    pub fn validate(&self) -> EventResult<()> {
        if self.order_by != "createdDate" {
            return Err(crate::EventError::InvalidQuery(format!(
                "unsupported orderBy '{}'",
                self.order_by
            )));
        }
        if self.page == 0 {
            return Err(crate::EventError::InvalidQuery("page must be >= 1".into()));
        }
        if self.nb_results_per_page == 0 || self.nb_results_per_page > Self::MAX_RESULTS_PER_PAGE {
            return Err(crate::EventError::InvalidQuery(format!(
                "nbResultsPerPage must be between 1 and {}",
                Self::MAX_RESULTS_PER_PAGE
            )));
        }
        Ok(())
    }

    /// Wire query parameters, in the platform API's naming.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(6);
        if let Some(event_type) = &self.event_type {
            params.push(("type", event_type.clone()));
        }
        if let Some(object_id) = &self.object_id {
            params.push(("objectId", object_id.clone()));
        }
        params.push(("orderBy", self.order_by.clone()));
        params.push(("order", self.order.as_str().to_string()));
        params.push(("page", self.page.to_string()));
        params.push(("nbResultsPerPage", self.nb_results_per_page.to_string()));
        params
    }
}

/// A page of query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    pub results: Vec<StoredEvent>,
    pub nb_results: u64,
    pub nb_pages: u64,
    pub page: u32,
    pub nb_results_per_page: u32,
}

impl EventPage {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn first(&self) -> Option<&StoredEvent> {
        self.results.first()
    }
}
