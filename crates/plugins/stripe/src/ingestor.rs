//! Webhook ingestion into the platform event log.

use paybridge_core::{
    ConfigRequest, ConfigResolver, IntegrationError, IntegrationResult, ProviderCredential,
    TenantContext, WebhookAck,
};
use paybridge_events::{EventQuery, EventStore, NormalizedEvent, external_event_type};
use paybridge_webhooks::WebhookReceiver;
use std::sync::Arc;

use crate::PROVIDER;
use crate::config::StripeSettings;

/// Emitter ID of events relayed from Stripe.
pub const EMITTER_ID: &str = PROVIDER.id;

/// A raw inbound webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookDelivery {
    /// Opaque routing identifier from the URL path.
    pub routing_id: String,
    /// `Stripe-Signature` header value, if sent.
    pub signature_header: Option<String>,
    /// The unparsed body, byte for byte.
    pub raw_body: Vec<u8>,
    /// Platform request ID, for logs.
    pub request_id: Option<String>,
}

impl WebhookDelivery {
    pub fn new(routing_id: impl Into<String>, signature_header: Option<String>, raw_body: impl Into<Vec<u8>>) -> Self {
        Self {
            routing_id: routing_id.into(),
            signature_header,
            raw_body: raw_body.into(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Verifies Stripe webhooks and records them as platform events.
pub struct WebhookIngestor {
    config: Arc<dyn ConfigResolver>,
    events: Arc<dyn EventStore>,
    settings: StripeSettings,
}

impl WebhookIngestor {
    pub fn new(config: Arc<dyn ConfigResolver>, events: Arc<dyn EventStore>, settings: StripeSettings) -> Self {
        Self {
            config,
            events,
            settings,
        }
    }

    /// Verifies and records one delivery.
    ///
    /// A delivery whose event was already recorded is recorded again: the
    /// duplicate lookup is logged but never short-circuits.
    pub async fn ingest(&self, delivery: WebhookDelivery) -> IntegrationResult<WebhookAck> {
        let request_id = delivery.request_id.as_deref().unwrap_or("-");
        let tenant = TenantContext::from_routing_id(&delivery.routing_id)?;

        if delivery.raw_body.is_empty() {
            return Err(IntegrationError::invalid_payload("Event object body expected"));
        }

        tracing::trace!(
            platform_id = %tenant.platform_id,
            env = %tenant.env,
            request_id,
            body = %String::from_utf8_lossy(&delivery.raw_body),
            "Stripe webhook received"
        );

        let tree = self.config.communicate(&tenant, ConfigRequest::private()).await?;
        let credential = ProviderCredential::from_config_tree(&tree, PROVIDER);
        if credential.secret_key.is_none() {
            return Err(IntegrationError::config("Stripe API key not configured"));
        }
        let webhook_secret = credential.require_webhook_secret()?;

        let event = WebhookReceiver::new(webhook_secret)
            .with_tolerance(self.settings.webhook_tolerance_secs)
            .construct_event(&delivery.raw_body, delivery.signature_header.as_deref())
            .map_err(|err| {
                tracing::debug!(
                    platform_id = %tenant.platform_id,
                    env = %tenant.env,
                    request_id,
                    error = %err,
                    "Stripe webhook rejected"
                );
                IntegrationError::from(err)
            })?;

        let event_type = external_event_type(EMITTER_ID, &event.event_type);

        let previous = self
            .events
            .list(&tenant, EventQuery::latest(event_type.as_str(), event.id.as_str()))
            .await?;
        if let Some(previous) = previous.first() {
            tracing::debug!(
                platform_id = %tenant.platform_id,
                env = %tenant.env,
                request_id,
                event_id = %event.id,
                previous_id = %previous.id,
                "Stripe event already recorded"
            );
        }

        let stored = self
            .events
            .create(
                &tenant,
                NormalizedEvent::new(event_type, event.id.as_str(), EMITTER_ID, event.payload),
            )
            .await?;

        tracing::info!(
            platform_id = %tenant.platform_id,
            env = %tenant.env,
            request_id,
            event_id = %stored.event.object_id,
            event_type = %stored.event.event_type,
            "Stripe event recorded"
        );

        Ok(WebhookAck::ok())
    }
}
