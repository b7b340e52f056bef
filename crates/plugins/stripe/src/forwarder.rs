//! Request forwarding to the Stripe API.

use paybridge_core::{
    ActionRequest, ConfigRequest, ConfigResolver, Env, IntegrationError, IntegrationResult,
    ProviderCredential, RequestContext,
};
use serde_json::Value;
use std::sync::Arc;

use crate::PROVIDER;
use crate::client::StripeClient;
use crate::config::StripeSettings;
use crate::operations::Operation;
use crate::transport::StripeTransport;

/// Forwards tenant-scoped method calls to Stripe.
pub struct RequestForwarder {
    config: Arc<dyn ConfigResolver>,
    transport: Arc<dyn StripeTransport>,
    settings: StripeSettings,
}

impl RequestForwarder {
    pub fn new(
        config: Arc<dyn ConfigResolver>,
        transport: Arc<dyn StripeTransport>,
        settings: StripeSettings,
    ) -> Self {
        Self {
            config,
            transport,
            settings,
        }
    }

    /// Invokes `action` with the tenant's secret key and returns Stripe's body verbatim.
    ///
    /// The method name is checked against the operation table before the
    /// tenant configuration is fetched.
    pub async fn forward(&self, ctx: &RequestContext, action: ActionRequest) -> IntegrationResult<Value> {
        let ActionRequest { method, args } = action;
        let tenant = &ctx.tenant;

        let Some(operation) = Operation::lookup(&method) else {
            tracing::debug!(
                platform_id = %tenant.platform_id,
                env = %tenant.env,
                request_id = ctx.request_id_or_dash(),
                method = %method,
                "Unknown Stripe method"
            );
            return Err(IntegrationError::invalid_operation(PROVIDER, method));
        };

        let tree = self.config.communicate(tenant, ConfigRequest::private()).await?;
        let credential = ProviderCredential::from_config_tree(&tree, PROVIDER);
        let client = StripeClient::new(self.transport.clone(), credential.require_secret_key()?);

        if tenant.env == Env::Test && client.is_live_key() {
            tracing::warn!(
                platform_id = %tenant.platform_id,
                request_id = ctx.request_id_or_dash(),
                "Live Stripe key configured for a test environment"
            );
        }

        let request = operation.bind(&method, &args)?;
        let reveal_detail = self.settings.deployment_tier.reveals_detail_for(tenant.env);

        match client.invoke(request).await {
            Ok(result) => {
                tracing::debug!(
                    platform_id = %tenant.platform_id,
                    env = %tenant.env,
                    request_id = ctx.request_id_or_dash(),
                    method = %method,
                    "Stripe call succeeded"
                );
                Ok(result)
            }
            Err(err) => {
                tracing::warn!(
                    platform_id = %tenant.platform_id,
                    env = %tenant.env,
                    request_id = ctx.request_id_or_dash(),
                    method = %method,
                    status = err.status(),
                    error = %err,
                    "Stripe call failed"
                );
                Err(IntegrationError::provider(
                    PROVIDER,
                    err.status(),
                    method,
                    err.provider_error(),
                    reveal_detail,
                ))
            }
        }
    }
}
