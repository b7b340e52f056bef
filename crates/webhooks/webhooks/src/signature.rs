//! HMAC signature generation and verification.
//!
//! Header format: `t=<unix seconds>,v1=<hex>[,v1=<hex>...]`. The signed payload
//! is `"<t>.<raw body>"`. Several `v1` entries may be present while a secret is
//! being rolled; any one of them matching accepts the delivery.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Default tolerance between the signed timestamp and now.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Signature scheme carried in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureVersion {
    /// Version 1: HMAC-SHA256
    #[default]
    V1,
}

impl SignatureVersion {
    pub fn scheme(&self) -> &'static str {
        match self {
            SignatureVersion::V1 => "v1",
        }
    }
}

/// Webhook signer for generating and verifying signatures.
pub struct WebhookSigner {
    secret: String,
    version: SignatureVersion,
}

impl std::fmt::Debug for WebhookSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookSigner")
            .field("secret", &"[REDACTED]")
            .field("version", &self.version)
            .finish()
    }
}

impl WebhookSigner {
    /// Creates a new signer with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            version: SignatureVersion::V1,
        }
    }

    fn mac(&self, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, SignatureError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| SignatureError::InvalidSecret)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac)
    }

    /// Generates a hex signature for the given payload and timestamp.
    pub fn sign(&self, timestamp: i64, payload: &[u8]) -> Result<String, SignatureError> {
        let mac = self.mac(timestamp, payload)?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Generates a full signature header value.
    pub fn sign_header(&self, timestamp: i64, payload: &[u8]) -> Result<String, SignatureError> {
        let signature = self.sign(timestamp, payload)?;
        Ok(format!("t={},{}={}", timestamp, self.version.scheme(), signature))
    }

    /// Verifies a single hex signature against the payload.
    pub fn verify(&self, signature: &str, timestamp: i64, payload: &[u8]) -> bool {
        let Ok(provided) = hex::decode(signature) else {
            return false;
        };
        match self.mac(timestamp, payload) {
            Ok(mac) => mac.verify_slice(&provided).is_ok(),
            Err(_) => false,
        }
    }

    /// Parses and verifies a signature header against `now`.
    ///
    /// A non-positive `tolerance_secs` disables the timestamp check.
    pub fn verify_header_at(
        &self,
        header: &str,
        payload: &[u8],
        tolerance_secs: i64,
        now: i64,
    ) -> Result<(), SignatureError> {
        let parsed = SignatureHeader::parse(header, self.version)?;

        if tolerance_secs > 0 && now.abs_diff(parsed.timestamp) > tolerance_secs.unsigned_abs() {
            return Err(SignatureError::Expired);
        }

        let matched = parsed
            .signatures
            .iter()
            .any(|signature| self.verify(signature, parsed.timestamp, payload));
        if !matched {
            return Err(SignatureError::Invalid);
        }

        Ok(())
    }

    /// Parses and verifies a signature header against the current time.
    pub fn verify_header(&self, header: &str, payload: &[u8], tolerance_secs: i64) -> Result<(), SignatureError> {
        self.verify_header_at(header, payload, tolerance_secs, chrono::Utc::now().timestamp())
    }
}

/// Signature verification errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// Invalid signature format.
    InvalidFormat,
    /// No signature with the expected scheme.
    MissingSignature,
    /// Signature is invalid.
    Invalid,
    /// Signature has expired.
    Expired,
    /// The secret cannot be used as an HMAC key.
    InvalidSecret,
}

impl std::fmt::Display for SignatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignatureError::InvalidFormat => write!(f, "Invalid signature format"),
            SignatureError::MissingSignature => write!(f, "No signature found with expected scheme"),
            SignatureError::Invalid => write!(f, "Invalid signature"),
            SignatureError::Expired => write!(f, "Signature expired"),
            SignatureError::InvalidSecret => write!(f, "Invalid signing secret"),
        }
    }
}

impl std::error::Error for SignatureError {}

/// A parsed signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SignatureHeader<'a> {
    timestamp: i64,
    signatures: Vec<&'a str>,
}

impl<'a> SignatureHeader<'a> {
    /// Parses a signature header, keeping the signatures of `version`'s scheme.
    ///
    /// Unknown keys are ignored. The first `t` wins.
    fn parse(header: &'a str, version: SignatureVersion) -> Result<Self, SignatureError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part.trim().split_once('=').ok_or(SignatureError::InvalidFormat)?;
            if key == "t" {
                if timestamp.is_none() {
                    timestamp = Some(value.parse::<i64>().map_err(|_| SignatureError::InvalidFormat)?);
                }
            } else if key == version.scheme() {
                signatures.push(value);
            }
        }

        let timestamp = timestamp.ok_or(SignatureError::InvalidFormat)?;
        if signatures.is_empty() {
            return Err(SignatureError::MissingSignature);
        }

        Ok(Self { timestamp, signatures })
    }
}
