//! # Paybridge Server
//!
//! Standalone HTTP service hosting the Stripe integration behind the
//! platform gateway.
//!
//! Collaborators are chosen from configuration: with a `[platform_api]`
//! section, tenant config and events go through the platform API; without
//! one, in-memory collaborators are seeded from `[tenants.*]`.

mod config;
mod resolver;

pub use config::{
    Config, ConfigError, PlatformApiConfig, ServerConfig, StripeConfig, load_config, parse_config,
};
pub use resolver::HttpConfigResolver;

use paybridge_adapter_memory::MemoryConfigResolver;
use paybridge_axum::{PlatformContextLayer, integration_routes};
use paybridge_core::Router;
use paybridge_core::traits::{ConfigResolver, IntegrationPlugin};
use paybridge_events::{EventError, EventStore, HttpEventStore, HttpEventStoreConfig, MemoryEventStore};
use paybridge_plugin_stripe::{HttpTransport, StripeDeps, StripeIntegration, StripeTransport, TransportError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Server startup error.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Event store error: {0}")]
    EventStore(#[from] EventError),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl From<TransportError> for ServerError {
    fn from(err: TransportError) -> Self {
        ServerError::HttpClient(err.to_string())
    }
}

impl From<reqwest::Error> for ServerError {
    fn from(err: reqwest::Error) -> Self {
        ServerError::HttpClient(err.to_string())
    }
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Config resolver and event store for a configuration.
pub async fn build_collaborators(
    config: &Config,
) -> Result<(Arc<dyn ConfigResolver>, Arc<dyn EventStore>), ServerError> {
    match &config.platform_api {
        Some(api) => {
            let timeout = Duration::from_millis(api.timeout_ms);
            let resolver = HttpConfigResolver::new(&api.base_url, api.system_key.clone(), timeout)?;

            let mut store_config = HttpEventStoreConfig::new(&api.base_url).with_timeout(timeout);
            if let Some(key) = &api.system_key {
                store_config = store_config.with_system_key(key);
            }
            let events = HttpEventStore::new(store_config)?;

            tracing::info!(base_url = %api.base_url, "Using platform API collaborators");
            Ok((Arc::new(resolver), Arc::new(events)))
        }
        None => {
            let resolver = MemoryConfigResolver::new();
            for (tenant, tree) in config.tenant_trees()? {
                resolver.set_private_config(&tenant, tree).await;
            }

            tracing::info!(
                tenants = resolver.tenant_count().await,
                "Using in-memory collaborators"
            );
            Ok((Arc::new(resolver), Arc::new(MemoryEventStore::new())))
        }
    }
}

/// The assembled service.
pub struct PaybridgeServer {
    config: Config,
    integration: StripeIntegration,
    events: Arc<dyn EventStore>,
    app: axum::Router,
}

impl PaybridgeServer {
    /// Builds the server with collaborators and transport chosen from `config`.
    pub async fn build(config: Config) -> Result<Self, ServerError> {
        let (resolver, events) = build_collaborators(&config).await?;
        let transport = HttpTransport::new(&config.stripe_settings())?;
        Ok(Self::with_collaborators(config, resolver, events, Arc::new(transport)))
    }

    /// Builds the server around the given collaborators.
    pub fn with_collaborators(
        config: Config,
        resolver: Arc<dyn ConfigResolver>,
        events: Arc<dyn EventStore>,
        transport: Arc<dyn StripeTransport>,
    ) -> Self {
        let integration = StripeIntegration::start(StripeDeps {
            config: resolver,
            events: events.clone(),
            transport,
            settings: config.stripe_settings(),
        });

        let mut router = Router::default();
        integration.register_routes(&mut router);
        for route in router.routes() {
            tracing::debug!(
                method = %route.method,
                path = %router.full_path(route),
                "Registered route"
            );
        }

        let app = axum::Router::new()
            .merge(integration_routes(router))
            .layer(PlatformContextLayer::new());

        Self {
            config,
            integration,
            events,
            app,
        }
    }

    /// Server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The event store webhooks are recorded in.
    pub fn events(&self) -> Arc<dyn EventStore> {
        self.events.clone()
    }

    /// The HTTP application.
    pub fn router(&self) -> axum::Router {
        self.app.clone()
    }

    /// Binds the configured address and serves until Ctrl-C.
    pub async fn run(self) -> Result<(), ServerError> {
        let address = self.config.server.bind_address();
        let listener = TcpListener::bind(&address).await?;
        tracing::info!(address = %address, "Paybridge server listening");

        self.serve(listener, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }

    /// Serves on `listener` until `shutdown` resolves, then stops the integration.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let result = axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await;

        self.integration.stop().await;
        tracing::info!("Paybridge server stopped");
        result.map_err(ServerError::from)
    }
}
