//! Per-request Stripe client.

use serde_json::Value;
use std::sync::Arc;

use crate::transport::{ApiRequest, StripeTransport, TransportError};

/// A Stripe client scoped to one tenant's secret key.
///
/// Built for a single request and dropped with it. The underlying transport
/// (and its connection pool) is shared across tenants.
pub struct StripeClient {
    transport: Arc<dyn StripeTransport>,
    secret_key: String,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

impl StripeClient {
    pub fn new(transport: Arc<dyn StripeTransport>, secret_key: impl Into<String>) -> Self {
        Self {
            transport,
            secret_key: secret_key.into(),
        }
    }

    /// Whether the key belongs to Stripe live mode.
    pub fn is_live_key(&self) -> bool {
        self.secret_key.starts_with("sk_live_") || self.secret_key.starts_with("rk_live_")
    }

    /// Sends a bound operation.
    pub async fn invoke(&self, request: ApiRequest) -> Result<Value, TransportError> {
        self.transport.execute(&self.secret_key, request).await
    }
}
