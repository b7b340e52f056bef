//! Event store client for the platform's event API.

use super::trait_def::*;
use crate::{EventError, EventResult, NormalizedEvent, StoredEvent};
use async_trait::async_trait;
use paybridge_core::TenantContext;
use std::time::Duration;

/// API version sent with every event request.
pub const PLATFORM_API_VERSION: &str = "2019-05-20";

/// Header carrying the platform API version.
pub const VERSION_HEADER: &str = "x-platform-version";
/// Header carrying the tenant's platform ID.
pub const PLATFORM_ID_HEADER: &str = "x-platform-id";
/// Header carrying the tenant's environment.
pub const PLATFORM_ENV_HEADER: &str = "x-platform-env";
/// Header carrying the service key for internal calls.
pub const SYSTEM_KEY_HEADER: &str = "x-platform-system-key";

/// Configuration for [`HttpEventStore`].
#[derive(Debug, Clone)]
pub struct HttpEventStoreConfig {
    /// Base URL of the platform API, without trailing slash.
    pub base_url: String,
    /// Service key authenticating internal calls, if required.
    pub system_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpEventStoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            system_key: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_system_key(mut self, key: impl Into<String>) -> Self {
        self.system_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Event store backed by the platform's `/events` HTTP API.
#[derive(Debug, Clone)]
pub struct HttpEventStore {
    client: reqwest::Client,
    config: HttpEventStoreConfig,
}

impl HttpEventStore {
    pub fn new(config: HttpEventStoreConfig) -> EventResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    fn events_url(&self) -> String {
        format!("{}/events", self.config.base_url)
    }

    fn scoped(&self, builder: reqwest::RequestBuilder, tenant: &TenantContext) -> reqwest::RequestBuilder {
        let builder = builder
            .header(VERSION_HEADER, PLATFORM_API_VERSION)
            .header(PLATFORM_ID_HEADER, &tenant.platform_id)
            .header(PLATFORM_ENV_HEADER, tenant.env.as_str());
        match &self.config.system_key {
            Some(key) => builder.header(SYSTEM_KEY_HEADER, key),
            None => builder,
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> EventResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EventError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl EventStore for HttpEventStore {
    async fn list(&self, tenant: &TenantContext, query: EventQuery) -> EventResult<EventPage> {
        query.validate()?;
        tracing::debug!(
            platform_id = %tenant.platform_id,
            env = %tenant.env,
            event_type = ?query.event_type,
            "Listing events"
        );

        let request = self
            .scoped(self.client.get(self.events_url()), tenant)
            .query(&query.to_params());
        let response = request.send().await?;
        Self::read_json(response).await
    }

    async fn create(&self, tenant: &TenantContext, event: NormalizedEvent) -> EventResult<StoredEvent> {
        tracing::debug!(
            platform_id = %tenant.platform_id,
            env = %tenant.env,
            event_type = %event.event_type,
            object_id = %event.object_id,
            "Creating event"
        );

        let request = self
            .scoped(self.client.post(self.events_url()), tenant)
            .json(&event);
        let response = request.send().await?;
        Self::read_json(response).await
    }
}
