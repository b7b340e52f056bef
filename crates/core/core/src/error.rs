//! Error types for Paybridge.
//!
//! This module defines the `IntegrationError` enum which represents every
//! failure a provider integration can surface to its HTTP caller.

use serde_json::{Value, json};
use thiserror::Error;

use crate::types::ProviderInfo;

/// The main error type for integration operations.
///
/// Every variant maps to exactly one HTTP status class. None of them are
/// retried internally: the error is the terminal response of the request.
#[derive(Debug, Error)]
pub enum IntegrationError {
    // ==================== Security Errors ====================
    /// The request could not be authenticated (malformed routing identifier,
    /// bad webhook signature). Never carries detail.
    #[error("Forbidden")]
    Authorization,

    /// Tenant credentials required by the integration are not configured.
    #[error("{message}")]
    Configuration { message: String },

    // ==================== Validation Errors ====================
    /// The request payload is missing or malformed.
    #[error("{message}")]
    InvalidPayload { message: String },

    /// The requested provider operation does not exist.
    #[error("{} method not found", .provider.name)]
    InvalidOperation {
        provider: ProviderInfo,
        method: String,
    },

    // ==================== Provider Errors ====================
    /// The provider rejected the invocation.
    #[error("{} error", .provider.name)]
    Provider {
        provider: ProviderInfo,
        status: u16,
        detail: Option<ProviderErrorDetail>,
    },

    // ==================== Collaborator Errors ====================
    /// A platform collaborator (event store, config resolver) failed.
    #[error("Upstream error from {service}: {message}")]
    Upstream { service: String, message: String },

    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Diagnostic detail attached to provider errors when disclosure is allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderErrorDetail {
    /// The dotted method name that was invoked.
    pub method: String,
    /// The provider's original error body.
    pub provider_error: Value,
}

impl IntegrationError {
    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new invalid payload error.
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            message: message.into(),
        }
    }

    /// Creates a new invalid operation error.
    pub fn invalid_operation(provider: ProviderInfo, method: impl Into<String>) -> Self {
        Self::InvalidOperation {
            provider,
            method: method.into(),
        }
    }

    /// Creates a provider error, attaching detail only when `reveal_detail` is set.
    pub fn provider(
        provider: ProviderInfo,
        status: u16,
        method: impl Into<String>,
        provider_error: Value,
        reveal_detail: bool,
    ) -> Self {
        let detail = reveal_detail.then(|| ProviderErrorDetail {
            method: method.into(),
            provider_error,
        });
        Self::Provider {
            provider,
            status,
            detail,
        }
    }

    /// Creates a new upstream collaborator error.
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Creates a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns an HTTP status code appropriate for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Authorization | Self::Configuration { .. } => 403,
            Self::InvalidPayload { .. } | Self::InvalidOperation { .. } => 400,
            Self::Provider { status, .. } => match *status {
                400..=599 => *status,
                _ => 502,
            },
            Self::Upstream { .. } => 502,
            Self::Internal { .. } => 500,
        }
    }

    /// Returns true if revealing anything beyond the status could help an attacker
    /// map out signature or configuration state.
    pub fn is_security_sensitive(&self) -> bool {
        matches!(self, Self::Authorization | Self::Configuration { .. })
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Public message shown to callers.
    ///
    /// Collaborator and internal failures are reduced to a generic message.
    pub fn public_message(&self) -> String {
        match self {
            Self::Upstream { .. } => "Bad gateway".to_string(),
            Self::Internal { .. } => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Detail that is safe to expose to the caller, if any.
    pub fn public_detail(&self) -> Option<Value> {
        match self {
            Self::InvalidOperation { method, .. } => Some(json!({ "method": method })),
            Self::Provider {
                provider,
                detail: Some(detail),
                ..
            } => {
                let mut public = serde_json::Map::new();
                public.insert(format!("{}Method", provider.id), json!(detail.method));
                public.insert(format!("{}Error", provider.id), detail.provider_error.clone());
                Some(Value::Object(public))
            }
            _ => None,
        }
    }

    /// Full error body for authenticated routes.
    pub fn public_body(&self) -> Value {
        let mut body = json!({
            "message": self.public_message(),
            "statusCode": self.status_code(),
        });
        if let Some(detail) = self.public_detail() {
            body["public"] = detail;
        }
        body
    }

    /// Status-only error body for unauthenticated routes such as webhooks.
    pub fn opaque_body(&self) -> Value {
        let message = if self.is_security_sensitive() {
            "Forbidden".to_string()
        } else {
            self.public_message()
        };
        json!({
            "message": message,
            "statusCode": self.status_code(),
        })
    }
}

/// A Result type alias using IntegrationError.
pub type IntegrationResult<T> = Result<T, IntegrationError>;

impl From<serde_json::Error> for IntegrationError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload {
            message: err.to_string(),
        }
    }
}
