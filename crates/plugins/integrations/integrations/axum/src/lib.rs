//! # Paybridge Axum Integration
//!
//! This crate provides Axum integration for Paybridge, including:
//! - Route mounting for integration plugins
//! - Request-context middleware
//! - Context extractors
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use paybridge_axum::{PlatformContextLayer, integration_routes};
//!
//! let mut router = paybridge_core::Router::default();
//! stripe.register_routes(&mut router);
//!
//! let app = axum::Router::new()
//!     .merge(integration_routes(router))
//!     .layer(PlatformContextLayer::new());
//! ```

mod extractor;
mod layer;
mod routes;

pub use extractor::{PlatformContext, PlatformContextRejection};
pub use layer::{
    GrantedPermissions, PERMISSIONS_HEADER, PLATFORM_ENV_HEADER, PLATFORM_ID_HEADER,
    PlatformContextLayer, PlatformContextMiddleware, REQUEST_ID_HEADER,
};
pub use routes::{integration_routes, to_axum_path};

use axum::extract::Query;
use axum::http::request::Parts;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use paybridge_core::error::IntegrationError;
use paybridge_core::router::{Method as IntegrationMethod, Request as IntegrationRequest, Response as IntegrationResponse};
use paybridge_core::RequestContext;
use std::collections::HashMap;

/// Largest request body accepted by integration routes.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Converts Axum request parts and the raw body to an integration request.
///
/// The body is kept byte for byte; webhook signatures are computed over it.
pub fn to_integration_request(parts: &Parts, raw_body: Vec<u8>) -> IntegrationRequest {
    let method = match parts.method {
        axum::http::Method::POST => IntegrationMethod::POST,
        axum::http::Method::PUT => IntegrationMethod::PUT,
        axum::http::Method::PATCH => IntegrationMethod::PATCH,
        axum::http::Method::DELETE => IntegrationMethod::DELETE,
        _ => IntegrationMethod::GET,
    };

    let mut headers = HashMap::new();
    for (key, value) in parts.headers.iter() {
        if let Ok(v) = value.to_str() {
            headers.insert(key.as_str().to_string(), v.to_string());
        }
    }

    let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .map(|Query(q)| q)
        .unwrap_or_default();

    let mut req = IntegrationRequest::new(method, parts.uri.path()).with_body(raw_body);
    req.headers = headers;
    req.query = query;
    req.context = parts.extensions.get::<RequestContext>().cloned();
    req.permissions = parts
        .extensions
        .get::<GrantedPermissions>()
        .map(|p| p.0.clone())
        .unwrap_or_default();
    req
}

/// Converts an integration response to an Axum response.
pub fn to_axum_response(integration_response: IntegrationResponse) -> Response {
    let status = StatusCode::from_u16(integration_response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut response = if let Some(body) = integration_response.body {
        axum::Json(body).into_response()
    } else {
        status.into_response()
    };

    *response.status_mut() = status;

    for (key, value) in integration_response.headers {
        if let (Ok(name), Ok(val)) = (HeaderName::try_from(key), HeaderValue::try_from(value)) {
            response.headers_mut().insert(name, val);
        }
    }

    response
}

/// Wrapper for IntegrationError that implements IntoResponse.
pub struct IntegrationErrorResponse(pub IntegrationError);

impl IntoResponse for IntegrationErrorResponse {
    fn into_response(self) -> Response {
        to_axum_response(IntegrationResponse::from_error(&self.0))
    }
}

impl From<IntegrationError> for IntegrationErrorResponse {
    fn from(err: IntegrationError) -> Self {
        IntegrationErrorResponse(err)
    }
}
