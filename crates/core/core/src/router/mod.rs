//! Framework-agnostic router for integration routes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::context::RequestContext;
use crate::error::IntegrationError;

/// HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::GET => write!(f, "GET"),
            Method::POST => write!(f, "POST"),
            Method::PUT => write!(f, "PUT"),
            Method::PATCH => write!(f, "PATCH"),
            Method::DELETE => write!(f, "DELETE"),
        }
    }
}

/// A generic HTTP request representation.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Path parameters (e.g., :routingId).
    pub params: HashMap<String, String>,
    /// Query parameters.
    pub query: HashMap<String, String>,
    /// Request headers (lowercase keys).
    pub headers: HashMap<String, String>,
    /// Exact request body bytes as received.
    pub raw_body: Vec<u8>,
    /// Tenant context resolved by the routing layer, if any.
    pub context: Option<RequestContext>,
    /// Permissions granted to the caller by the auth layer.
    pub permissions: Vec<String>,
}

impl Request {
    /// Creates a new request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: HashMap::new(),
            query: HashMap::new(),
            headers: HashMap::new(),
            raw_body: Vec::new(),
            context: None,
            permissions: Vec::new(),
        }
    }

    /// Sets a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_lowercase(), value.into());
        self
    }

    /// Sets the raw body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.raw_body = body.into();
        self
    }

    /// Sets a JSON body.
    pub fn with_json(mut self, body: &Value) -> Self {
        self.raw_body = body.to_string().into_bytes();
        self
    }

    /// Sets the request context.
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Grants a permission.
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }

    /// Gets a path parameter.
    pub fn param(&self, name: &str) -> Option<&String> {
        self.params.get(name)
    }

    /// Gets a query parameter.
    pub fn query_param(&self, name: &str) -> Option<&String> {
        self.query.get(name)
    }

    /// Gets a header value.
    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers.get(&name.to_lowercase())
    }

    /// Parses the body as JSON. An empty body yields `None`.
    pub fn json_body(&self) -> Result<Option<Value>, IntegrationError> {
        if self.raw_body.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&self.raw_body)
            .map(Some)
            .map_err(|e| IntegrationError::invalid_payload(format!("Invalid JSON body: {}", e)))
    }
}

/// A generic HTTP response representation.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body (JSON).
    pub body: Option<Value>,
}

impl Response {
    /// Creates a new response with status code.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Creates a 200 OK response.
    pub fn ok() -> Self {
        Self::new(200)
    }

    /// Creates a 404 Not Found response.
    pub fn not_found() -> Self {
        Self::new(404)
    }

    /// Creates an error response with the public error body.
    pub fn from_error(err: &IntegrationError) -> Self {
        Self::new(err.status_code()).json(err.public_body())
    }

    /// Creates an error response that reveals only the status.
    pub fn from_error_opaque(err: &IntegrationError) -> Self {
        Self::new(err.status_code()).json(err.opaque_body())
    }

    /// Sets the response body as JSON.
    pub fn json<T: Serialize>(mut self, body: T) -> Self {
        self.body = serde_json::to_value(body).ok();
        self.headers
            .insert("content-type".to_string(), "application/json".to_string());
        self
    }

    /// Sets a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_lowercase(), value.into());
        self
    }
}

/// Trait for request handlers.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Handles a request and returns a response.
    async fn handle(&self, req: Request) -> Response;
}

/// A route definition.
pub struct Route {
    /// The HTTP method.
    pub method: Method,
    /// The path pattern (e.g., "/webhooks/:routingId").
    pub path: String,
    /// The handler function.
    pub handler: Box<dyn RequestHandler>,
    /// Route metadata.
    pub metadata: RouteMetadata,
}

/// Metadata describing how a route is exposed.
#[derive(Debug, Clone, Default)]
pub struct RouteMetadata {
    /// Route name (e.g. "stripe.webhooks").
    pub name: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Whether the route authenticates requests itself instead of relying on
    /// platform auth (webhooks).
    pub manual_auth: bool,
    /// Permissions of which the caller must hold at least one.
    pub permissions: Vec<String>,
}

impl Route {
    /// Creates a new route.
    pub fn new(method: Method, path: impl Into<String>, handler: impl RequestHandler + 'static) -> Self {
        Self {
            method,
            path: path.into(),
            handler: Box::new(handler),
            metadata: RouteMetadata::default(),
        }
    }

    /// Sets the route name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.metadata.name = Some(name.into());
        self
    }

    /// Sets the summary.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.metadata.summary = Some(summary.into());
        self
    }

    /// Marks the route as authenticating its own requests.
    pub fn manual_auth(mut self) -> Self {
        self.metadata.manual_auth = true;
        self
    }

    /// Requires one of the given permissions.
    pub fn permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metadata.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    /// Checks the caller's granted permissions against the route's requirement.
    pub fn is_permitted(&self, granted: &[String]) -> bool {
        self.metadata.manual_auth
            || self.metadata.permissions.is_empty()
            || self
                .metadata
                .permissions
                .iter()
                .any(|required| granted.iter().any(|g| g == required))
    }

    /// Matches a concrete path against the pattern, returning path parameters.
    pub fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
        let pattern: Vec<&str> = self.path.trim_matches('/').split('/').collect();
        let actual: Vec<&str> = path.trim_matches('/').split('/').collect();

        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (p, a) in pattern.iter().zip(actual.iter()) {
            if let Some(name) = p.strip_prefix(':') {
                if a.is_empty() {
                    return None;
                }
                params.insert(name.to_string(), a.to_string());
            } else if p != a {
                return None;
            }
        }
        Some(params)
    }
}

/// A router that collects routes from integrations.
pub struct Router {
    /// Base path prefix.
    pub base_path: String,
    /// Collected routes.
    routes: Vec<Route>,
}

impl Router {
    /// Creates a new router with a base path.
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            routes: Vec::new(),
        }
    }

    /// Adds a route.
    pub fn route(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Adds a POST route.
    pub fn post(&mut self, path: &str, handler: impl RequestHandler + 'static) {
        self.route(Route::new(Method::POST, path, handler));
    }

    /// Returns all routes.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Returns the full path of a route (base path + route path).
    pub fn full_path(&self, route: &Route) -> String {
        format!("{}{}", self.base_path.trim_end_matches('/'), route.path)
    }

    /// Returns the number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if there are no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Dispatches a request to the matching route.
    ///
    /// Responds 404 when no route matches and 403 when the caller lacks the
    /// route's permissions.
    pub async fn dispatch(&self, mut req: Request) -> Response {
        let base = self.base_path.trim_end_matches('/');
        let Some(relative) = req.path.strip_prefix(base).map(str::to_string) else {
            return Response::not_found();
        };

        for route in &self.routes {
            if route.method != req.method {
                continue;
            }
            let Some(params) = route.match_path(&relative) else {
                continue;
            };
            if !route.is_permitted(&req.permissions) {
                return Response::from_error(&IntegrationError::Authorization);
            }
            req.params = params;
            return route.handler.handle(req).await;
        }

        Response::not_found()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new("/integrations")
    }
}
