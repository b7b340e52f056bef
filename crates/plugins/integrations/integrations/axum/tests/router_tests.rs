//! Tests for mounting integration routes on Axum.

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request as HttpRequest, StatusCode};
use axum::routing::get;
use paybridge_axum::{PlatformContext, PlatformContextLayer, integration_routes};
use paybridge_core::router::{Method, Request, RequestHandler, Response, Route, Router};
use serde_json::{Value, json};
use tower::ServiceExt;

struct Inspect;

#[async_trait]
impl RequestHandler for Inspect {
    async fn handle(&self, req: Request) -> Response {
        Response::ok().json(json!({
            "param": req.param("routingId"),
            "query": req.query_param("mode"),
            "signature": req.header("stripe-signature"),
            "body": String::from_utf8_lossy(&req.raw_body),
            "platformId": req.context.as_ref().map(|c| c.tenant.platform_id.clone()),
            "requestId": req.context.as_ref().and_then(|c| c.request_id.clone()),
        }))
    }
}

fn app() -> axum::Router {
    let mut router = Router::default();
    router.route(Route::new(Method::POST, "/demo/webhooks/:routingId", Inspect).manual_auth());
    router.route(
        Route::new(Method::POST, "/demo/request", Inspect).permissions(["integrations:read_write:demo"]),
    );
    router.route(Route::new(Method::GET, "/demo/request", Inspect));

    async fn whoami(PlatformContext(ctx): PlatformContext) -> String {
        ctx.tenant.to_string()
    }

    axum::Router::new()
        .merge(integration_routes(router))
        .route("/whoami", get(whoami))
        .layer(PlatformContextLayer::new())
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_raw_body_and_path_params_are_forwarded() {
    let raw = r#"{"id":  "evt_1" }"#;
    let res = app()
        .oneshot(
            HttpRequest::post("/integrations/demo/webhooks/e1_test?mode=x")
                .header("Stripe-Signature", "t=1,v1=00")
                .body(Body::from(raw))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["param"], "e1_test");
    assert_eq!(body["query"], "x");
    assert_eq!(body["signature"], "t=1,v1=00");
    assert_eq!(body["body"], raw);
    assert_eq!(body["platformId"], Value::Null);
}

#[tokio::test]
async fn test_context_and_permissions_from_gateway_headers() {
    let res = app()
        .oneshot(
            HttpRequest::post("/integrations/demo/request")
                .header("x-platform-id", "42")
                .header("x-platform-env", "live")
                .header("x-request-id", "req_9")
                .header("x-platform-permissions", "integrations:read_write:demo")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["platformId"], "42");
    assert_eq!(body["requestId"], "req_9");
}

#[tokio::test]
async fn test_missing_permission_is_forbidden() {
    let res = app()
        .oneshot(
            HttpRequest::post("/integrations/demo/request")
                .header("x-platform-id", "42")
                .header("x-platform-env", "live")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(res).await["statusCode"], 403);
}

#[tokio::test]
async fn test_methods_on_same_path_are_merged() {
    let res = app()
        .oneshot(HttpRequest::get("/integrations/demo/request").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app()
        .oneshot(HttpRequest::delete("/integrations/demo/request").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_context_extractor() {
    let res = app()
        .oneshot(
            HttpRequest::get("/whoami")
                .header("x-platform-id", "7")
                .header("x-platform-env", "test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"7/test");

    let res = app()
        .oneshot(HttpRequest::get("/whoami").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
