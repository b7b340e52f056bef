//! Tenant and request context passed to integration operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IntegrationError;

/// Tenant environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Env {
    Test,
    Live,
}

impl Env {
    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Env::Test => "test",
            Env::Live => "live",
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Env {
    type Err = IntegrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test" => Ok(Env::Test),
            "live" => Ok(Env::Live),
            other => Err(IntegrationError::invalid_payload(format!(
                "Unknown environment '{}'",
                other
            ))),
        }
    }
}

/// Deployment tier of the running service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentTier {
    #[default]
    Development,
    Staging,
    Production,
}

impl DeploymentTier {
    /// Whether provider error detail may be shown to a tenant in `env`.
    ///
    /// Detail is withheld only for live tenants on a production deployment.
    pub fn reveals_detail_for(&self, env: Env) -> bool {
        !(*self == DeploymentTier::Production && env == Env::Live)
    }
}

/// A logical tenant and its environment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantContext {
    /// Platform identifier.
    pub platform_id: String,
    /// Tenant environment.
    pub env: Env,
}

impl TenantContext {
    /// Creates a new tenant context.
    pub fn new(platform_id: impl Into<String>, env: Env) -> Self {
        Self {
            platform_id: platform_id.into(),
            env,
        }
    }

    /// Parses an opaque routing identifier of the form `e<platformId>_<env>`.
    ///
    /// Any malformed identifier yields `IntegrationError::Authorization` so the
    /// caller learns nothing about which part was wrong.
    pub fn from_routing_id(routing_id: &str) -> Result<Self, IntegrationError> {
        let rest = routing_id
            .strip_prefix('e')
            .ok_or(IntegrationError::Authorization)?;
        let (platform_id, env) = rest
            .rsplit_once('_')
            .ok_or(IntegrationError::Authorization)?;

        if platform_id.is_empty() || !platform_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(IntegrationError::Authorization);
        }

        let env = env.parse().map_err(|_| IntegrationError::Authorization)?;
        Ok(Self::new(platform_id, env))
    }

    /// Returns the routing identifier addressing this tenant's webhook endpoint.
    pub fn routing_id(&self) -> String {
        format!("e{}_{}", self.platform_id, self.env)
    }
}

impl fmt::Display for TenantContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.platform_id, self.env)
    }
}

/// Per-request context resolved by the routing layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// The tenant the request acts on.
    pub tenant: TenantContext,
    /// Platform request identifier, used to correlate log records.
    pub request_id: Option<String>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(tenant: TenantContext) -> Self {
        Self {
            tenant,
            request_id: None,
        }
    }

    /// Sets the request identifier.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Returns the request identifier or `"-"` for log fields.
    pub fn request_id_or_dash(&self) -> &str {
        self.request_id.as_deref().unwrap_or("-")
    }
}
