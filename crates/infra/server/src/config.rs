//! Server configuration.

use paybridge_core::{DeploymentTier, TenantContext};
use paybridge_plugin_stripe::{DEFAULT_API_BASE_URL, StripeSettings};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Complete server configuration, as read from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listener and process settings.
    pub server: ServerConfig,
    /// Stripe API settings shared by all tenants.
    pub stripe: StripeConfig,
    /// Platform API hosting the config and event services. When absent,
    /// in-memory collaborators are used and seeded from `tenants`.
    pub platform_api: Option<PlatformApiConfig>,
    /// Static private configuration trees keyed by routing ID (`e<id>_<env>`).
    pub tenants: HashMap<String, serde_json::Value>,
}

/// Server-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Host to bind to.
    pub host: String,
    /// Log level, used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Deployment tier.
    pub deployment_tier: DeploymentTier,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 4100,
            host: "0.0.0.0".to_string(),
            log_level: "info".to_string(),
            deployment_tier: DeploymentTier::Development,
        }
    }
}

impl ServerConfig {
    /// Socket address to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Stripe API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StripeConfig {
    /// Base URL of the Stripe API.
    pub api_base_url: String,
    /// Pinned `Stripe-Version`.
    pub api_version: Option<String>,
    /// Accepted age of webhook signatures, in seconds.
    pub webhook_tolerance_secs: i64,
    /// Stripe API call timeout, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for StripeConfig {
    fn default() -> Self {
        let settings = StripeSettings::default();
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: None,
            webhook_tolerance_secs: settings.webhook_tolerance_secs,
            timeout_ms: settings.timeout.as_millis() as u64,
        }
    }
}

/// Platform API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformApiConfig {
    /// Base URL of the platform API.
    pub base_url: String,
    /// Service key authenticating internal calls.
    pub system_key: Option<String>,
    /// Request timeout, in milliseconds.
    #[serde(default = "default_platform_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_platform_timeout_ms() -> u64 {
    10_000
}

impl Config {
    /// Stripe settings for the integration.
    pub fn stripe_settings(&self) -> StripeSettings {
        let mut settings = StripeSettings::new()
            .api_base_url(&self.stripe.api_base_url)
            .webhook_tolerance_secs(self.stripe.webhook_tolerance_secs)
            .timeout(Duration::from_millis(self.stripe.timeout_ms))
            .deployment_tier(self.server.deployment_tier);
        if let Some(version) = &self.stripe.api_version {
            settings = settings.api_version(version);
        }
        settings
    }

    /// Static tenants with their parsed contexts.
    pub fn tenant_trees(&self) -> Result<Vec<(TenantContext, serde_json::Value)>, ConfigError> {
        self.tenants
            .iter()
            .map(|(routing_id, tree)| {
                TenantContext::from_routing_id(routing_id)
                    .map(|tenant| (tenant, tree.clone()))
                    .map_err(|_| ConfigError::InvalidTenant(routing_id.clone()))
            })
            .collect()
    }
}

/// Parses configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.tenant_trees()?;
    Ok(config)
}

/// Loads configuration from a TOML file.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
    parse_config(&content)
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid tenant routing id: {0}")]
    InvalidTenant(String),
}
