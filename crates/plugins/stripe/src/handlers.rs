//! Request handlers for the Stripe integration.

use async_trait::async_trait;
use paybridge_core::router::{Request, RequestHandler, Response};
use paybridge_core::{ActionRequest, IntegrationError};
use std::sync::Arc;

use crate::forwarder::RequestForwarder;
use crate::ingestor::{WebhookDelivery, WebhookIngestor};

/// Header carrying the Stripe webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Handler for POST /stripe/request
pub struct PluginRequestHandler {
    pub(crate) forwarder: Arc<RequestForwarder>,
}

#[async_trait]
impl RequestHandler for PluginRequestHandler {
    async fn handle(&self, req: Request) -> Response {
        let Some(ctx) = req.context.as_ref() else {
            return Response::from_error(&IntegrationError::Authorization);
        };

        let action = match req.json_body().and_then(|body| ActionRequest::from_body(body.as_ref())) {
            Ok(action) => action,
            Err(err) => return Response::from_error(&err),
        };

        match self.forwarder.forward(ctx, action).await {
            Ok(result) => Response::ok().json(result),
            Err(err) => Response::from_error(&err),
        }
    }
}

/// Handler for POST /stripe/webhooks/:routingId
///
/// Not authenticated by the platform; errors carry the status only.
pub struct WebhooksHandler {
    pub(crate) ingestor: Arc<WebhookIngestor>,
}

#[async_trait]
impl RequestHandler for WebhooksHandler {
    async fn handle(&self, req: Request) -> Response {
        let Some(routing_id) = req.param("routingId").cloned() else {
            return Response::from_error_opaque(&IntegrationError::Authorization);
        };

        let request_id = req
            .context
            .as_ref()
            .and_then(|ctx| ctx.request_id.clone())
            .or_else(|| req.header("x-request-id").cloned());

        let mut delivery = WebhookDelivery::new(routing_id, req.header(SIGNATURE_HEADER).cloned(), req.raw_body);
        delivery.request_id = request_id;

        match self.ingestor.ingest(delivery).await {
            Ok(ack) => Response::ok().json(ack),
            Err(err) => Response::from_error_opaque(&err),
        }
    }
}
