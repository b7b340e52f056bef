//! Transport to the Stripe HTTP API.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::config::StripeSettings;

/// HTTP method of a Stripe endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Per-call options, passed after the params argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Sent as `Idempotency-Key`.
    pub idempotency_key: Option<String>,
    /// Connected account, sent as `Stripe-Account`.
    pub stripe_account: Option<String>,
    /// Overrides the pinned `Stripe-Version` for this call.
    pub api_version: Option<String>,
}

impl RequestOptions {
    /// Reads options from `{ idempotencyKey?, stripeAccount?, apiVersion? }`.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, String> {
        let mut options = Self::default();
        for (key, value) in map {
            let slot = match key.as_str() {
                "idempotencyKey" => &mut options.idempotency_key,
                "stripeAccount" => &mut options.stripe_account,
                "apiVersion" => &mut options.api_version,
                other => return Err(format!("unknown option '{}'", other)),
            };
            match value {
                Value::String(s) => *slot = Some(s.clone()),
                Value::Null => {}
                _ => return Err(format!("option '{}' must be a string", key)),
            }
        }
        Ok(options)
    }
}

/// A bound call to the Stripe API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Path below the API base URL (e.g. `/v1/customers`).
    pub path: String,
    /// Form pairs: query string for GET/DELETE, body for POST.
    pub params: Vec<(String, String)>,
    pub options: RequestOptions,
}

/// Error type for Stripe transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Stripe answered with a non-success status.
    #[error("Stripe responded with HTTP {status}")]
    Status { status: u16, body: Value },

    /// No response was received.
    #[error("Network error: {0}")]
    Network(String),

    /// The response body was not JSON.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Provider error body to attach to the caller's error.
    ///
    /// Stripe wraps errors as `{ "error": { ... } }`; the inner object is returned.
    pub fn provider_error(&self) -> Value {
        match self {
            TransportError::Status { body, .. } => body.get("error").cloned().unwrap_or_else(|| body.clone()),
            other => serde_json::json!({ "message": other.to_string() }),
        }
    }

    /// Status to surface. Failures without a response map to 502.
    pub fn status(&self) -> u16 {
        match self {
            TransportError::Status { status, .. } => *status,
            _ => 502,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Network(err.to_string())
    }
}

/// Sends bound calls to Stripe on behalf of a secret key.
///
/// Implementations hold no tenant state; the key travels with every call.
#[async_trait]
pub trait StripeTransport: Send + Sync {
    /// Executes `request` authenticated by `secret_key`, returning the JSON body.
    async fn execute(&self, secret_key: &str, request: ApiRequest) -> Result<Value, TransportError>;
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_version: Option<String>,
}

impl HttpTransport {
    /// Creates a transport from the integration settings.
    pub fn new(settings: &StripeSettings) -> Result<Self, TransportError> {
        Self::with_timeout(&settings.api_base_url, settings.api_version.clone(), settings.timeout)
    }

    /// Creates a transport against `base_url`.
    pub fn with_timeout(
        base_url: &str,
        api_version: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("paybridge/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version,
        })
    }
}

#[async_trait]
impl StripeTransport for HttpTransport {
    async fn execute(&self, secret_key: &str, request: ApiRequest) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url).query(&request.params),
            HttpMethod::Delete => self.client.delete(&url).query(&request.params),
            HttpMethod::Post => self.client.post(&url).form(&request.params),
        };
        builder = builder.bearer_auth(secret_key);

        if let Some(version) = request.options.api_version.as_ref().or(self.api_version.as_ref()) {
            builder = builder.header("Stripe-Version", version);
        }
        if let Some(key) = &request.options.idempotency_key {
            builder = builder.header("Idempotency-Key", key);
        }
        if let Some(account) = &request.options.stripe_account {
            builder = builder.header("Stripe-Account", account);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            return serde_json::from_slice(&bytes).map_err(|e| TransportError::InvalidResponse(e.to_string()));
        }

        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_error_unwraps_envelope() {
        let err = TransportError::Status {
            status: 402,
            body: json!({"error": {"type": "card_error", "code": "card_declined"}}),
        };
        assert_eq!(err.status(), 402);
        assert_eq!(err.provider_error()["code"], "card_declined");

        let err = TransportError::Network("connection refused".into());
        assert_eq!(err.status(), 502);
        assert!(err.provider_error()["message"].as_str().unwrap().contains("connection refused"));
    }
}
