//! Config resolver backed by the platform's config API.

use async_trait::async_trait;
use paybridge_core::traits::{ConfigAccess, ConfigRequest, ConfigResolver};
use paybridge_core::{IntegrationError, IntegrationResult, TenantContext};
use paybridge_events::store::{
    PLATFORM_API_VERSION, PLATFORM_ENV_HEADER, PLATFORM_ID_HEADER, SYSTEM_KEY_HEADER, VERSION_HEADER,
};
use serde_json::Value;
use std::time::Duration;

const SERVICE: &str = "config";

/// Reads tenant configuration from `GET <base>/config/<access>`.
#[derive(Debug, Clone)]
pub struct HttpConfigResolver {
    client: reqwest::Client,
    base_url: String,
    system_key: Option<String>,
}

impl HttpConfigResolver {
    pub fn new(base_url: &str, system_key: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            system_key,
        })
    }
}

#[async_trait]
impl ConfigResolver for HttpConfigResolver {
    async fn communicate(&self, tenant: &TenantContext, request: ConfigRequest) -> IntegrationResult<Value> {
        if request.kind != "_getConfig" {
            return Err(IntegrationError::internal(format!(
                "Unsupported config request '{}'",
                request.kind
            )));
        }

        let access = match request.access {
            ConfigAccess::Default => "default",
            ConfigAccess::Private => "private",
        };
        let url = format!("{}/config/{}", self.base_url, access);

        let mut builder = self
            .client
            .get(&url)
            .header(VERSION_HEADER, PLATFORM_API_VERSION)
            .header(PLATFORM_ID_HEADER, &tenant.platform_id)
            .header(PLATFORM_ENV_HEADER, tenant.env.as_str());
        if let Some(key) = &self.system_key {
            builder = builder.header(SYSTEM_KEY_HEADER, key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| IntegrationError::upstream(SERVICE, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                platform_id = %tenant.platform_id,
                env = %tenant.env,
                status = status.as_u16(),
                "Config API request failed"
            );
            return Err(IntegrationError::upstream(SERVICE, format!("HTTP {}", status.as_u16())));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| IntegrationError::upstream(SERVICE, e.to_string()))
    }
}
