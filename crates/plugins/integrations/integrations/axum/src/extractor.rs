//! Request-context extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use paybridge_core::{IntegrationError, RequestContext};

use crate::IntegrationErrorResponse;

/// Extractor for the resolved platform request context.
///
/// This extractor will reject the request with 403 Forbidden if
/// [`PlatformContextLayer`](crate::PlatformContextLayer) did not resolve a tenant.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(PlatformContext(ctx): PlatformContext) -> String {
///     format!("Hello, platform {}!", ctx.tenant.platform_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PlatformContext(pub RequestContext);

/// Error returned when no request context was resolved.
#[derive(Debug)]
pub struct PlatformContextRejection;

impl IntoResponse for PlatformContextRejection {
    fn into_response(self) -> Response {
        IntegrationErrorResponse(IntegrationError::Authorization).into_response()
    }
}

impl<S> FromRequestParts<S> for PlatformContext
where
    S: Send + Sync,
{
    type Rejection = PlatformContextRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .map(PlatformContext)
            .ok_or(PlatformContextRejection)
    }
}
