//! Request-context middleware layer for Axum.
//!
//! The platform gateway authenticates callers and forwards the resolved tenant,
//! request ID and granted permissions as headers. This layer turns those headers
//! into request extensions read by the route bridge and the extractors. It must
//! only be mounted behind a gateway that strips these headers from client
//! traffic.

use axum::body::Body;
use axum::http::{Request, Response};
use paybridge_core::{Env, RequestContext, TenantContext};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Header carrying the tenant's platform ID.
pub const PLATFORM_ID_HEADER: &str = "x-platform-id";
/// Header carrying the tenant's environment (`test` or `live`).
pub const PLATFORM_ENV_HEADER: &str = "x-platform-env";
/// Header carrying the platform request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
/// Header carrying the caller's granted permissions, comma separated.
pub const PERMISSIONS_HEADER: &str = "x-platform-permissions";

/// Permissions granted to the caller, as inserted into request extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantedPermissions(pub Vec<String>);

/// Layer that resolves the platform request context.
#[derive(Debug, Clone, Default)]
pub struct PlatformContextLayer;

impl PlatformContextLayer {
    /// Creates a new context layer.
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for PlatformContextLayer {
    type Service = PlatformContextMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        PlatformContextMiddleware { inner }
    }
}

/// Middleware service that inserts [`RequestContext`] and [`GrantedPermissions`].
#[derive(Debug, Clone)]
pub struct PlatformContextMiddleware<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for PlatformContextMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();

        if let Some(ctx) = extract_context(&req) {
            req.extensions_mut().insert(ctx);
        }
        let permissions = extract_permissions(&req);
        req.extensions_mut().insert(permissions);

        Box::pin(async move { inner.call(req).await })
    }
}

fn header<'a>(req: &'a Request<Body>, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Reads the tenant from the gateway headers. Missing or malformed headers
/// leave the request without context.
fn extract_context(req: &Request<Body>) -> Option<RequestContext> {
    let platform_id = header(req, PLATFORM_ID_HEADER)?;
    let env: Env = header(req, PLATFORM_ENV_HEADER)?.parse().ok()?;

    let ctx = RequestContext::new(TenantContext::new(platform_id, env));
    Some(match header(req, REQUEST_ID_HEADER) {
        Some(request_id) => ctx.with_request_id(request_id),
        None => ctx,
    })
}

fn extract_permissions(req: &Request<Body>) -> GrantedPermissions {
    let permissions = header(req, PERMISSIONS_HEADER)
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    GrantedPermissions(permissions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_context() {
        let req = request(&[
            ("x-platform-id", "42"),
            ("x-platform-env", "live"),
            ("x-request-id", "req_1"),
        ]);
        let ctx = extract_context(&req).unwrap();
        assert_eq!(ctx.tenant, TenantContext::new("42", Env::Live));
        assert_eq!(ctx.request_id.as_deref(), Some("req_1"));

        assert!(extract_context(&request(&[("x-platform-id", "42")])).is_none());
        assert!(extract_context(&request(&[("x-platform-id", "42"), ("x-platform-env", "prod")])).is_none());
    }

    #[test]
    fn test_extract_permissions() {
        let req = request(&[(
            "x-platform-permissions",
            "integrations:read_write:stripe, event:list:all,",
        )]);
        assert_eq!(
            extract_permissions(&req).0,
            vec!["integrations:read_write:stripe", "event:list:all"]
        );
        assert!(extract_permissions(&request(&[])).0.is_empty());
    }
}
