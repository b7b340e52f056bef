//! Route mounting for integration routes.

use axum::Router;
use axum::body::Body;
use axum::extract::Request;
use axum::response::Response;
use axum::routing::{MethodFilter, MethodRouter, on};
use paybridge_core::router::{Method, Router as IntegrationRouter};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{MAX_BODY_BYTES, to_axum_response, to_integration_request};

/// Creates an Axum router serving every route of `router`.
///
/// Routes are mounted at their full path (base path included), so the
/// returned router is meant to be merged at the application root.
///
/// # Example
///
/// ```rust,ignore
/// let mut integrations = paybridge_core::Router::default();
/// stripe.register_routes(&mut integrations);
///
/// let app = axum::Router::new()
///     .merge(integration_routes(integrations))
///     .layer(PlatformContextLayer::new());
/// ```
pub fn integration_routes<S>(router: IntegrationRouter) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let paths: Vec<(Method, String)> = router
        .routes()
        .map(|route| (route.method, router.full_path(route)))
        .collect();
    let router = Arc::new(router);

    let mut grouped: BTreeMap<String, MethodRouter<S>> = BTreeMap::new();
    for (method, path) in paths {
        let dispatcher = router.clone();
        let handler = move |req: Request| dispatch(dispatcher, req);
        let filter = method_filter(method);

        let axum_path = to_axum_path(&path);
        let method_router = match grouped.remove(&axum_path) {
            Some(existing) => existing.on(filter, handler),
            None => on(filter, handler),
        };
        grouped.insert(axum_path, method_router);
    }

    grouped
        .into_iter()
        .fold(Router::new(), |app, (path, method_router)| app.route(&path, method_router))
}

async fn dispatch(router: Arc<IntegrationRouter>, req: Request) -> Response<Body> {
    let (parts, body) = req.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return to_axum_response(paybridge_core::Response::from_error(
                &paybridge_core::IntegrationError::invalid_payload("Request body too large"),
            ));
        }
    };

    let req = to_integration_request(&parts, bytes.to_vec());
    to_axum_response(router.dispatch(req).await)
}

fn method_filter(method: Method) -> MethodFilter {
    match method {
        Method::GET => MethodFilter::GET,
        Method::POST => MethodFilter::POST,
        Method::PUT => MethodFilter::PUT,
        Method::PATCH => MethodFilter::PATCH,
        Method::DELETE => MethodFilter::DELETE,
    }
}

/// Converts `:param` segments to Axum's `{param}` syntax.
pub fn to_axum_path(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{}}}", name),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}
