//! Core data types shared by provider integrations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{IntegrationError, IntegrationResult};

/// Identity of a payment provider.
///
/// `id` keys the provider's config section and public error detail; `name`
/// appears in caller-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderInfo {
    pub id: &'static str,
    pub name: &'static str,
}

/// Per-tenant provider secrets read from private configuration.
///
/// Never cached beyond a single request.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredential {
    /// Provider the secrets belong to.
    pub provider: ProviderInfo,
    /// Secret API key used to call the provider.
    pub secret_key: Option<String>,
    /// Shared secret used to verify webhook signatures.
    pub webhook_secret: Option<String>,
}

impl ProviderCredential {
    /// Extracts the credential of `provider` from a private config tree.
    ///
    /// Reads `integrations.<id>.{secretKey, webhookSecret}`. Empty strings
    /// count as not configured.
    pub fn from_config_tree(tree: &Value, provider: ProviderInfo) -> Self {
        let section = tree
            .get("integrations")
            .and_then(|i| i.get(provider.id));

        let read = |key: &str| {
            section
                .and_then(|s| s.get(key))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            provider,
            secret_key: read("secretKey"),
            webhook_secret: read("webhookSecret"),
        }
    }

    /// Returns the secret key or a configuration error.
    pub fn require_secret_key(&self) -> IntegrationResult<&str> {
        self.secret_key
            .as_deref()
            .ok_or_else(|| {
                IntegrationError::config(format!("{} secret API key not configured", self.provider.name))
            })
    }

    /// Returns the webhook secret or a configuration error.
    pub fn require_webhook_secret(&self) -> IntegrationResult<&str> {
        self.webhook_secret
            .as_deref()
            .ok_or_else(|| {
                IntegrationError::config(format!("{} Webhook secret not configured", self.provider.name))
            })
    }
}

impl std::fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredential")
            .field("provider", &self.provider.id)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Positional argument list that also accepts a single bare value.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OneOrMany {
    Many(Vec<Value>),
    One(Value),
}

impl OneOrMany {
    /// Flattens into a positional list.
    pub fn into_vec(self) -> Vec<Value> {
        match self {
            OneOrMany::Many(values) => values,
            OneOrMany::One(value) => vec![value],
        }
    }
}

/// A provider action requested by an authenticated caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    /// Dotted path naming a provider operation (e.g. `customers.create`).
    pub method: String,
    /// Positional arguments.
    pub args: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawActionRequest {
    method: Option<Value>,
    #[serde(default)]
    args: Option<OneOrMany>,
}

impl ActionRequest {
    /// Creates a new action request.
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }

    /// Validates and parses a request body `{ method, args }`.
    ///
    /// `args` may be a single value; when omitted it defaults to `[{}]`.
    pub fn from_body(body: Option<&Value>) -> IntegrationResult<Self> {
        let body = body.ok_or_else(|| IntegrationError::invalid_payload("Request body expected"))?;
        let raw: RawActionRequest = serde_json::from_value(body.clone())
            .map_err(|e| IntegrationError::invalid_payload(e.to_string()))?;

        let method = match raw.method {
            Some(Value::String(m)) if !m.is_empty() => m,
            Some(_) => return Err(IntegrationError::invalid_payload("\"method\" must be a string")),
            None => return Err(IntegrationError::invalid_payload("\"method\" is required")),
        };

        let args = raw
            .args
            .map(OneOrMany::into_vec)
            .unwrap_or_else(|| vec![Value::Object(Default::default())]);

        Ok(Self { method, args })
    }
}

/// Successful webhook acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAck {
    pub success: bool,
}

impl WebhookAck {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
