//! # Paybridge Stripe Integration
//!
//! Connects tenants to their own Stripe account.
//!
//! ## Features
//!
//! - Forward whitelisted Stripe API methods with the tenant's secret key
//! - Verify Stripe webhooks with the tenant's webhook secret
//! - Record verified webhooks as `stripe_<type>` platform events
//! - Provider error detail withheld for live tenants in production
//!
//! ## Usage
//!
//! ```rust,ignore
//! use paybridge_plugin_stripe::{StripeDeps, StripeIntegration, StripeSettings};
//!
//! let integration = StripeIntegration::start(StripeDeps {
//!     config: resolver,
//!     events: event_store,
//!     transport,
//!     settings: StripeSettings::default(),
//! });
//!
//! let mut router = Router::default();
//! integration.register_routes(&mut router);
//!
//! // on shutdown
//! integration.stop().await;
//! ```

mod client;
mod config;
mod forwarder;
mod handlers;
mod ingestor;
pub mod operations;
pub mod transport;

pub use client::StripeClient;
pub use config::{DEFAULT_API_BASE_URL, StripeSettings};
pub use forwarder::RequestForwarder;
pub use handlers::{PluginRequestHandler, SIGNATURE_HEADER, WebhooksHandler};
pub use ingestor::{EMITTER_ID, WebhookDelivery, WebhookIngestor};
pub use operations::Operation;
pub use transport::{HttpTransport, StripeTransport, TransportError};

use paybridge_core::ProviderInfo;
use paybridge_core::router::{Method, Route, Router};
use paybridge_core::traits::{ConfigResolver, IntegrationPlugin};
use paybridge_events::EventStore;
use std::sync::Arc;

/// Stripe's provider identity.
pub const PROVIDER: ProviderInfo = ProviderInfo {
    id: "stripe",
    name: "Stripe",
};

/// Permissions that grant access to the request forwarder.
pub const REQUEST_PERMISSIONS: [&str; 2] = ["integrations:read_write:stripe", "integrations:read_write:all"];

/// Collaborators the integration is started with.
pub struct StripeDeps {
    pub config: Arc<dyn ConfigResolver>,
    pub events: Arc<dyn EventStore>,
    pub transport: Arc<dyn StripeTransport>,
    pub settings: StripeSettings,
}

/// A running Stripe integration.
///
/// Holds every collaborator the handlers need; handlers share it by `Arc`.
pub struct StripeIntegration {
    config: Arc<dyn ConfigResolver>,
    forwarder: Arc<RequestForwarder>,
    ingestor: Arc<WebhookIngestor>,
}

impl StripeIntegration {
    /// Starts the integration.
    pub fn start(deps: StripeDeps) -> Self {
        let StripeDeps {
            config,
            events,
            transport,
            settings,
        } = deps;

        tracing::info!(
            deployment_tier = ?settings.deployment_tier,
            api_version = ?settings.api_version,
            "Stripe integration started"
        );

        let forwarder = Arc::new(RequestForwarder::new(config.clone(), transport, settings.clone()));
        let ingestor = Arc::new(WebhookIngestor::new(config.clone(), events, settings));

        Self {
            config,
            forwarder,
            ingestor,
        }
    }

    /// The request forwarder.
    pub fn forwarder(&self) -> &RequestForwarder {
        &self.forwarder
    }

    /// The webhook ingestor.
    pub fn ingestor(&self) -> &WebhookIngestor {
        &self.ingestor
    }

    /// Stops the integration and releases the config resolver.
    pub async fn stop(self) {
        self.config.close().await;
        tracing::info!("Stripe integration stopped");
    }
}

impl IntegrationPlugin for StripeIntegration {
    fn id(&self) -> &'static str {
        PROVIDER.id
    }

    fn name(&self) -> &'static str {
        PROVIDER.name
    }

    fn register_routes(&self, router: &mut Router) {
        // POST /stripe/request
        router.route(
            Route::new(
                Method::POST,
                "/stripe/request",
                PluginRequestHandler {
                    forwarder: self.forwarder.clone(),
                },
            )
            .name("stripe.pluginRequest")
            .summary("Forward a Stripe API call")
            .permissions(REQUEST_PERMISSIONS),
        );

        // POST /stripe/webhooks/:routingId
        router.route(
            Route::new(
                Method::POST,
                "/stripe/webhooks/:routingId",
                WebhooksHandler {
                    ingestor: self.ingestor.clone(),
                },
            )
            .name("stripe.webhooks")
            .summary("Receive a Stripe webhook")
            .manual_auth(),
        );
    }
}
