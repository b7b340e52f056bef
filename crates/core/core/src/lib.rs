//! # Paybridge Core
//!
//! This crate provides the foundational types and traits shared by provider
//! integrations. It defines the tenant/request context, the error taxonomy
//! surfaced to HTTP callers, the configuration-resolver collaborator and the
//! framework-agnostic router integrations register their routes on.

pub mod context;
pub mod error;
pub mod router;
pub mod traits;
pub mod types;

// Re-export commonly used items at the crate root
pub use context::{DeploymentTier, Env, RequestContext, TenantContext};
pub use error::{IntegrationError, IntegrationResult, ProviderErrorDetail};
pub use traits::{ConfigAccess, ConfigRequest, ConfigResolver, IntegrationPlugin};
pub use types::{ActionRequest, OneOrMany, ProviderCredential, ProviderInfo, WebhookAck};

// Re-export router types
pub use router::{Method, Request, RequestHandler, Response, Route, RouteMetadata, Router};
