//! Core traits for Paybridge.
//!
//! This module defines the trait interfaces that collaborators and provider
//! integrations must implement to plug into the platform.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::TenantContext;
use crate::error::IntegrationResult;
use crate::router::Router;

/// Access level of a configuration tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigAccess {
    Default,
    Private,
}

/// A message sent to the configuration service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRequest {
    /// Message type, `_getConfig` for reads.
    #[serde(rename = "type")]
    pub kind: String,
    /// Which configuration tree to read.
    pub access: ConfigAccess,
}

impl ConfigRequest {
    /// Request for the tenant's private configuration tree.
    pub fn private() -> Self {
        Self {
            kind: "_getConfig".to_string(),
            access: ConfigAccess::Private,
        }
    }
}

/// Scoped, access-controlled read access to tenant configuration trees.
///
/// Implementations must return fresh data on every call; callers rely on
/// configuration changes being visible on the next request.
#[async_trait]
pub trait ConfigResolver: Send + Sync {
    /// Sends `request` on behalf of `tenant` and returns the configuration tree.
    async fn communicate(
        &self,
        tenant: &TenantContext,
        request: ConfigRequest,
    ) -> IntegrationResult<Value>;

    /// Releases any connection held by the resolver.
    async fn close(&self) {}
}

/// Trait for provider integrations.
///
/// An integration exposes its HTTP surface through the framework-agnostic
/// router; the hosting application decides how routes are served.
pub trait IntegrationPlugin: Send + Sync {
    /// Returns the unique identifier for this integration (e.g. "stripe").
    fn id(&self) -> &'static str;

    /// Returns a human-readable name for this integration.
    fn name(&self) -> &'static str;

    /// Registers routes for this integration.
    fn register_routes(&self, router: &mut Router);
}
