//! Configuration for the Stripe integration.

use paybridge_core::DeploymentTier;
use paybridge_webhooks::DEFAULT_TOLERANCE_SECS;
use std::time::Duration;

/// Default Stripe API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Settings shared by every request the integration serves.
///
/// Tenant secrets are not part of the settings; they are fetched per request.
#[derive(Debug, Clone)]
pub struct StripeSettings {
    /// Base URL of the Stripe API.
    pub api_base_url: String,
    /// Pinned `Stripe-Version`, if any.
    pub api_version: Option<String>,
    /// Accepted age of a webhook signature, in seconds.
    pub webhook_tolerance_secs: i64,
    /// Timeout of a single Stripe API call.
    pub timeout: Duration,
    /// Deployment tier, deciding whether provider error detail is shown.
    pub deployment_tier: DeploymentTier,
}

impl Default for StripeSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: None,
            webhook_tolerance_secs: DEFAULT_TOLERANCE_SECS,
            timeout: Duration::from_secs(80),
            deployment_tier: DeploymentTier::default(),
        }
    }
}

impl StripeSettings {
    /// Creates settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API base URL.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Pins the Stripe API version.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets the webhook signature tolerance.
    pub fn webhook_tolerance_secs(mut self, secs: i64) -> Self {
        self.webhook_tolerance_secs = secs;
        self
    }

    /// Sets the API call timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the deployment tier.
    pub fn deployment_tier(mut self, tier: DeploymentTier) -> Self {
        self.deployment_tier = tier;
        self
    }
}
