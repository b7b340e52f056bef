//! Request forwarding tests.

mod common;

use common::*;
use paybridge_core::{ActionRequest, DeploymentTier, Env, IntegrationError, RequestContext, TenantContext};
use paybridge_plugin_stripe::StripeSettings;
use paybridge_plugin_stripe::transport::HttpMethod;
use serde_json::json;
use std::sync::atomic::Ordering;

fn ctx(tenant: TenantContext) -> RequestContext {
    RequestContext::new(tenant).with_request_id("req_1")
}

#[tokio::test]
async fn test_forward_returns_provider_result_unchanged() {
    let h = harness(StripeSettings::default());
    h.configure_default(&tenant()).await;

    let result = h
        .integration
        .forwarder()
        .forward(
            &ctx(tenant()),
            ActionRequest::new("customers.create", vec![json!({"email": "jenny@example.com", "metadata": {"a": "1"}})]),
        )
        .await
        .unwrap();

    assert_eq!(result["id"], "cus_1");
    assert_eq!(result["email"], "jenny@example.com");

    let (key, call) = h.stripe.last_call().unwrap();
    assert_eq!(key, SECRET_KEY);
    assert_eq!(call.method, HttpMethod::Post);
    assert_eq!(call.path, "/v1/customers");
    assert!(call.params.contains(&("metadata[a]".to_string(), "1".to_string())));
}

#[tokio::test]
async fn test_unknown_method_fails_before_any_external_call() {
    let h = harness(StripeSettings::default());
    h.configure_default(&tenant()).await;

    let err = h
        .integration
        .forwarder()
        .forward(&ctx(tenant()), ActionRequest::new("customers.explode", vec![json!({})]))
        .await
        .unwrap_err();

    assert!(matches!(&err, IntegrationError::InvalidOperation { method, .. } if method == "customers.explode"));
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.public_body()["public"]["method"], "customers.explode");
    assert_eq!(h.config.reads(), 0);
    assert_eq!(h.stripe.call_count(), 0);
}

#[tokio::test]
async fn test_missing_secret_key_is_configuration_error() {
    let h = harness(StripeSettings::default());

    let err = h
        .integration
        .forwarder()
        .forward(&ctx(tenant()), ActionRequest::new("customers.list", vec![json!({})]))
        .await
        .unwrap_err();

    assert!(matches!(err, IntegrationError::Configuration { .. }));
    assert_eq!(err.status_code(), 403);
    assert_eq!(err.to_string(), "Stripe secret API key not configured");
    assert_eq!(h.stripe.call_count(), 0);
}

#[tokio::test]
async fn test_argument_mismatch_is_invalid_payload() {
    let h = harness(StripeSettings::default());
    h.configure_default(&tenant()).await;

    let err = h
        .integration
        .forwarder()
        .forward(&ctx(tenant()), ActionRequest::new("customers.retrieve", vec![json!({})]))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert!(err.to_string().contains("customers.retrieve"));
    assert_eq!(h.stripe.call_count(), 0);
}

#[tokio::test]
async fn test_provider_error_mirrors_status_with_detail_outside_production() {
    let h = harness(StripeSettings::default().deployment_tier(DeploymentTier::Staging));
    let live = TenantContext::new("1", Env::Live);
    h.configure_default(&live).await;

    let err = h
        .integration
        .forwarder()
        .forward(&ctx(live), ActionRequest::new("customers.retrieve", vec![json!("cus_missing")]))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 404);
    let body = err.public_body();
    assert_eq!(body["message"], "Stripe error");
    assert_eq!(body["public"]["stripeMethod"], "customers.retrieve");
    assert_eq!(body["public"]["stripeError"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn test_detail_withheld_only_for_production_live() {
    for (tier, env, revealed) in [
        (DeploymentTier::Production, Env::Live, false),
        (DeploymentTier::Production, Env::Test, true),
        (DeploymentTier::Development, Env::Live, true),
        (DeploymentTier::Staging, Env::Test, true),
    ] {
        let h = harness(StripeSettings::default().deployment_tier(tier));
        let tenant = TenantContext::new("9", env);
        h.configure(&tenant, json!({"secretKey": "sk_wrong"})).await;

        let err = h
            .integration
            .forwarder()
            .forward(&ctx(tenant), ActionRequest::new("customers.list", vec![json!({})]))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 401);
        assert_eq!(err.public_detail().is_some(), revealed, "{tier:?} {env:?}");
    }
}

#[tokio::test]
async fn test_network_failure_is_bad_gateway() {
    let h = harness(StripeSettings::default());
    h.configure_default(&tenant()).await;
    h.stripe.fail_network.store(true, Ordering::SeqCst);

    let err = h
        .integration
        .forwarder()
        .forward(&ctx(tenant()), ActionRequest::new("balance.retrieve", vec![json!({})]))
        .await
        .unwrap_err();

    assert!(matches!(err, IntegrationError::Provider { status: 502, .. }));
    assert_eq!(err.status_code(), 502);
}

#[tokio::test]
async fn test_configuration_is_fetched_on_every_request() {
    let h = harness(StripeSettings::default());
    h.configure_default(&tenant()).await;

    let forwarder = h.integration.forwarder();
    forwarder
        .forward(&ctx(tenant()), ActionRequest::new("customers.list", vec![json!({})]))
        .await
        .unwrap();

    h.configure(&tenant(), json!({"secretKey": "sk_test_rotated"})).await;
    let err = forwarder
        .forward(&ctx(tenant()), ActionRequest::new("customers.list", vec![json!({})]))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 401);
    assert_eq!(h.config.reads(), 2);
    assert_eq!(h.stripe.last_call().unwrap().0, "sk_test_rotated");
}
