use super::trait_def::*;
use crate::{EventResult, NormalizedEvent, StoredEvent};
use async_trait::async_trait;
use chrono::Utc;
use paybridge_core::TenantContext;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A stored event together with the tenant it belongs to.
#[derive(Debug, Clone)]
struct Entry {
    tenant: TenantContext,
    seq: u64,
    stored: StoredEvent,
}

/// In-memory implementation of EventStore
///
/// Stores all events in memory. Useful for testing and development.
/// Data is lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventStore {
    events: Arc<RwLock<Vec<Entry>>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of events stored for a tenant.
    pub async fn count(&self, tenant: &TenantContext) -> usize {
        let events = self.events.read().await;
        events.iter().filter(|e| &e.tenant == tenant).count()
    }

    /// Returns every event stored for a tenant, oldest first.
    pub async fn all(&self, tenant: &TenantContext) -> Vec<StoredEvent> {
        let events = self.events.read().await;
        events
            .iter()
            .filter(|e| &e.tenant == tenant)
            .map(|e| e.stored.clone())
            .collect()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn list(&self, tenant: &TenantContext, query: EventQuery) -> EventResult<EventPage> {
        query.validate()?;
        let events = self.events.read().await;

        let mut filtered: Vec<&Entry> = events
            .iter()
            .filter(|e| {
                if &e.tenant != tenant {
                    return false;
                }

                if let Some(event_type) = &query.event_type {
                    if &e.stored.event.event_type != event_type {
                        return false;
                    }
                }

                if let Some(object_id) = &query.object_id {
                    if &e.stored.event.object_id != object_id {
                        return false;
                    }
                }

                true
            })
            .collect();

        // Insertion order breaks ties between equal timestamps
        match query.order {
            EventOrdering::Asc => {
                filtered.sort_by_key(|e| (e.stored.created_date, e.seq));
            }
            EventOrdering::Desc => {
                filtered.sort_by_key(|e| std::cmp::Reverse((e.stored.created_date, e.seq)));
            }
        }

        let nb_results = filtered.len() as u64;
        let per_page = query.nb_results_per_page as u64;
        let nb_pages = nb_results.div_ceil(per_page);
        let offset = (query.page as usize - 1) * query.nb_results_per_page as usize;

        let results = filtered
            .into_iter()
            .skip(offset)
            .take(query.nb_results_per_page as usize)
            .map(|e| e.stored.clone())
            .collect();

        Ok(EventPage {
            results,
            nb_results,
            nb_pages,
            page: query.page,
            nb_results_per_page: query.nb_results_per_page,
        })
    }

    async fn create(&self, tenant: &TenantContext, event: NormalizedEvent) -> EventResult<StoredEvent> {
        let stored = StoredEvent {
            id: format!("evt_{}", uuid::Uuid::new_v4().simple()),
            created_date: Utc::now(),
            event,
        };

        let mut events = self.events.write().await;
        let seq = events.len() as u64;
        events.push(Entry {
            tenant: tenant.clone(),
            seq,
            stored: stored.clone(),
        });

        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paybridge_core::Env;

    fn create_test_event(event_type: &str, object_id: &str) -> NormalizedEvent {
        NormalizedEvent::external("stripe", event_type, object_id, serde_json::json!({"data": "test"}))
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let store = MemoryEventStore::new();
        let tenant = TenantContext::new("1", Env::Test);

        let stored = store
            .create(&tenant, create_test_event("customer.created", "evt_1"))
            .await
            .unwrap();
        assert!(stored.id.starts_with("evt_"));

        let page = store.list(&tenant, EventQuery::new()).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page.nb_results, 1);
        assert_eq!(page.nb_pages, 1);
        assert_eq!(page.first().unwrap().id, stored.id);
    }

    #[tokio::test]
    async fn test_tenant_isolation() {
        let store = MemoryEventStore::new();
        let test = TenantContext::new("1", Env::Test);
        let live = TenantContext::new("1", Env::Live);

        store.create(&test, create_test_event("customer.created", "evt_1")).await.unwrap();

        assert_eq!(store.count(&test).await, 1);
        assert_eq!(store.count(&live).await, 0);
        assert!(store.list(&live, EventQuery::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_filtering_and_ordering() {
        let store = MemoryEventStore::new();
        let tenant = TenantContext::new("1", Env::Test);

        let first = store
            .create(&tenant, create_test_event("customer.created", "evt_1"))
            .await
            .unwrap();
        store.create(&tenant, create_test_event("customer.deleted", "evt_2")).await.unwrap();
        let last = store
            .create(&tenant, create_test_event("customer.created", "evt_1"))
            .await
            .unwrap();

        let page = store
            .list(&tenant, EventQuery::latest("stripe_customer.created", "evt_1"))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page.nb_results, 2);
        assert_eq!(page.first().unwrap().id, last.id);

        let page = store
            .list(
                &tenant,
                EventQuery::new()
                    .event_type("stripe_customer.created")
                    .order(EventOrdering::Asc),
            )
            .await
            .unwrap();
        assert_eq!(page.first().unwrap().id, first.id);
    }

    #[tokio::test]
    async fn test_pagination() {
        let store = MemoryEventStore::new();
        let tenant = TenantContext::new("1", Env::Test);

        for i in 0..5 {
            store
                .create(&tenant, create_test_event("product.created", &format!("evt_{i}")))
                .await
                .unwrap();
        }

        let query = EventQuery::new().order(EventOrdering::Asc).nb_results_per_page(2);
        let page = store.list(&tenant, query.clone().page(3)).await.unwrap();
        assert_eq!(page.nb_pages, 3);
        assert_eq!(page.len(), 1);
        assert_eq!(page.first().unwrap().event.object_id, "evt_4");

        let page = store.list(&tenant, query.page(4)).await.unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_query_is_rejected() {
        let store = MemoryEventStore::new();
        let tenant = TenantContext::new("1", Env::Test);
        assert!(store.list(&tenant, EventQuery::new().page(0)).await.is_err());
    }
}
