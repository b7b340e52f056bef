//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use paybridge_adapter_memory::MemoryConfigResolver;
use paybridge_core::{ConfigRequest, ConfigResolver, Env, IntegrationResult, TenantContext};
use paybridge_events::{
    EventError, EventPage, EventQuery, EventResult, EventStore, MemoryEventStore, NormalizedEvent, StoredEvent,
};
use paybridge_plugin_stripe::transport::{ApiRequest, HttpMethod};
use paybridge_plugin_stripe::{StripeDeps, StripeIntegration, StripeSettings, StripeTransport, TransportError};
use paybridge_webhooks::WebhookSigner;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const SECRET_KEY: &str = "sk_test_123";
pub const WEBHOOK_SECRET: &str = "whsec_test_123";

/// In-memory stand-in for the Stripe API that records every call.
#[derive(Default)]
pub struct FakeStripe {
    pub calls: Mutex<Vec<(String, ApiRequest)>>,
    customers: Mutex<HashMap<String, Value>>,
    pub fail_network: AtomicBool,
}

impl FakeStripe {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<(String, ApiRequest)> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl StripeTransport for FakeStripe {
    async fn execute(&self, secret_key: &str, request: ApiRequest) -> Result<Value, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((secret_key.to_string(), request.clone()));

        if self.fail_network.load(Ordering::SeqCst) {
            return Err(TransportError::Network("connection reset".into()));
        }
        if secret_key != SECRET_KEY {
            return Err(TransportError::Status {
                status: 401,
                body: json!({"error": {"type": "invalid_request_error", "message": "Invalid API Key provided"}}),
            });
        }

        let mut customers = self.customers.lock().unwrap();
        match (request.method, request.path.as_str()) {
            (HttpMethod::Post, "/v1/customers") => {
                let id = format!("cus_{}", customers.len() + 1);
                let mut customer = json!({"id": id, "object": "customer"});
                for (key, value) in &request.params {
                    customer[key] = json!(value);
                }
                customers.insert(id, customer.clone());
                Ok(customer)
            }
            (HttpMethod::Get, path) if path.starts_with("/v1/customers/") => {
                let id = &path["/v1/customers/".len()..];
                customers.get(id).cloned().ok_or_else(|| TransportError::Status {
                    status: 404,
                    body: json!({"error": {"type": "invalid_request_error", "message": format!("No such customer: '{}'", id)}}),
                })
            }
            _ => Ok(json!({"object": "echo", "path": request.path})),
        }
    }
}

/// Config resolver that counts reads.
#[derive(Default)]
pub struct CountingResolver {
    pub inner: MemoryConfigResolver,
    pub reads: AtomicUsize,
}

impl CountingResolver {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigResolver for CountingResolver {
    async fn communicate(&self, tenant: &TenantContext, request: ConfigRequest) -> IntegrationResult<Value> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.communicate(tenant, request).await
    }

    async fn close(&self) {
        self.inner.close().await;
    }
}

/// A call made to [`RecordingEventStore`].
#[derive(Debug, Clone)]
pub enum StoreCall {
    List(EventQuery),
    Create(NormalizedEvent),
}

/// Event store that records every call before delegating to memory.
#[derive(Default)]
pub struct RecordingEventStore {
    pub inner: MemoryEventStore,
    pub calls: Mutex<Vec<StoreCall>>,
    pub fail_list: AtomicBool,
}

impl RecordingEventStore {
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub async fn count(&self, tenant: &TenantContext) -> usize {
        self.inner.count(tenant).await
    }

    pub async fn all(&self, tenant: &TenantContext) -> Vec<StoredEvent> {
        self.inner.all(tenant).await
    }
}

#[async_trait]
impl EventStore for RecordingEventStore {
    async fn list(&self, tenant: &TenantContext, query: EventQuery) -> EventResult<EventPage> {
        self.calls.lock().unwrap().push(StoreCall::List(query.clone()));
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(EventError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        self.inner.list(tenant, query).await
    }

    async fn create(&self, tenant: &TenantContext, event: NormalizedEvent) -> EventResult<StoredEvent> {
        self.calls.lock().unwrap().push(StoreCall::Create(event.clone()));
        self.inner.create(tenant, event).await
    }
}

pub struct Harness {
    pub integration: StripeIntegration,
    pub config: Arc<CountingResolver>,
    pub events: Arc<RecordingEventStore>,
    pub stripe: Arc<FakeStripe>,
}

pub fn tenant() -> TenantContext {
    TenantContext::new("1", Env::Test)
}

pub fn harness(settings: StripeSettings) -> Harness {
    let config = Arc::new(CountingResolver::default());
    let events = Arc::new(RecordingEventStore::default());
    let stripe = Arc::new(FakeStripe::default());

    let integration = StripeIntegration::start(StripeDeps {
        config: config.clone(),
        events: events.clone(),
        transport: stripe.clone(),
        settings,
    });

    Harness {
        integration,
        config,
        events,
        stripe,
    }
}

impl Harness {
    pub async fn configure(&self, tenant: &TenantContext, stripe: Value) {
        self.config
            .inner
            .set_private_config(tenant, json!({ "integrations": { "stripe": stripe } }))
            .await;
    }

    pub async fn configure_default(&self, tenant: &TenantContext) {
        self.configure(
            tenant,
            json!({ "secretKey": SECRET_KEY, "webhookSecret": WEBHOOK_SECRET }),
        )
        .await;
    }
}

pub fn sign(secret: &str, body: &[u8]) -> String {
    WebhookSigner::new(secret)
        .sign_header(chrono::Utc::now().timestamp(), body)
        .unwrap()
}

pub fn event_body(id: &str, event_type: &str) -> Vec<u8> {
    json!({
        "id": id,
        "object": "event",
        "type": event_type,
        "data": { "object": { "id": "cus_1", "object": "customer" } }
    })
    .to_string()
    .into_bytes()
}
