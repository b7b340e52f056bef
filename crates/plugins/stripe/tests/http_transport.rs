//! Wire-level tests of the reqwest transport against a local stub.

use axum::{
    Router,
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use paybridge_plugin_stripe::transport::{ApiRequest, HttpMethod, RequestOptions};
use paybridge_plugin_stripe::{HttpTransport, StripeTransport, TransportError};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct Seen {
    last: Arc<Mutex<Option<(HeaderMap, String)>>>,
}

async fn create_customer(State(seen): State<Seen>, headers: HeaderMap, body: Bytes) -> (StatusCode, String) {
    *seen.last.lock().unwrap() = Some((headers, String::from_utf8_lossy(&body).into_owned()));
    (StatusCode::OK, json!({"id": "cus_1", "object": "customer"}).to_string())
}

async fn list_customers(State(seen): State<Seen>, headers: HeaderMap, RawQuery(query): RawQuery) -> String {
    *seen.last.lock().unwrap() = Some((headers, query.unwrap_or_default()));
    json!({"object": "list", "data": []}).to_string()
}

async fn retrieve_customer(Path(id): Path<String>) -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        json!({"error": {"type": "invalid_request_error", "message": format!("No such customer: '{}'", id)}}).to_string(),
    )
}

async fn spawn_stub(seen: Seen) -> String {
    let app = Router::new()
        .route("/v1/customers", post(create_customer).get(list_customers))
        .route("/v1/customers/{id}", get(retrieve_customer))
        .with_state(seen);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn transport(base_url: &str) -> HttpTransport {
    HttpTransport::with_timeout(base_url, Some("2024-06-20".into()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_post_sends_form_body_and_headers() {
    let seen = Seen::default();
    let base_url = spawn_stub(seen.clone()).await;

    let result = transport(&base_url)
        .execute(
            "sk_test_123",
            ApiRequest {
                method: HttpMethod::Post,
                path: "/v1/customers".into(),
                params: vec![
                    ("email".into(), "jenny@example.com".into()),
                    ("metadata[order]".into(), "42".into()),
                ],
                options: RequestOptions {
                    idempotency_key: Some("idem_1".into()),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();
    assert_eq!(result["id"], "cus_1");

    let (headers, body) = seen.last.lock().unwrap().clone().unwrap();
    assert_eq!(headers["authorization"], "Bearer sk_test_123");
    assert_eq!(headers["stripe-version"], "2024-06-20");
    assert_eq!(headers["idempotency-key"], "idem_1");
    assert!(headers.get("stripe-account").is_none());
    assert_eq!(body, "email=jenny%40example.com&metadata%5Border%5D=42");
}

#[tokio::test]
async fn test_get_sends_query_string() {
    let seen = Seen::default();
    let base_url = spawn_stub(seen.clone()).await;

    transport(&base_url)
        .execute(
            "sk_test_123",
            ApiRequest {
                method: HttpMethod::Get,
                path: "/v1/customers".into(),
                params: vec![("limit".into(), "3".into())],
                options: RequestOptions::default(),
            },
        )
        .await
        .unwrap();

    let (_, query) = seen.last.lock().unwrap().clone().unwrap();
    assert_eq!(query, "limit=3");
}

#[tokio::test]
async fn test_error_status_and_body_are_returned() {
    let base_url = spawn_stub(Seen::default()).await;

    let err = transport(&base_url)
        .execute(
            "sk_test_123",
            ApiRequest {
                method: HttpMethod::Get,
                path: "/v1/customers/cus_missing".into(),
                params: Vec::new(),
                options: RequestOptions::default(),
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.status(), 404);
    assert_eq!(err.provider_error()["type"], "invalid_request_error");
    assert!(matches!(err, TransportError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = transport(&format!("http://{}", addr))
        .execute(
            "sk_test_123",
            ApiRequest {
                method: HttpMethod::Get,
                path: "/v1/balance".into(),
                params: Vec::new(),
                options: RequestOptions::default(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Network(_)));
    assert_eq!(err.status(), 502);
}
