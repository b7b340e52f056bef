//! # Paybridge Webhooks
//!
//! Verification of inbound provider webhooks:
//! - HMAC-SHA256 timestamped signatures (`t=...,v1=...`)
//! - Replay protection through a timestamp tolerance window
//! - Parsing of verified bodies into typed provider events
//!
//! ## Example
//!
//! ```rust,ignore
//! use paybridge_webhooks::WebhookReceiver;
//!
//! let receiver = WebhookReceiver::new(webhook_secret).with_tolerance(300);
//! let event = receiver.construct_event(&raw_body, signature_header)?;
//! println!("{} {}", event.id, event.event_type);
//! ```

mod error;
mod receiver;
mod signature;

pub use error::{WebhookError, WebhookResult};
pub use receiver::{ProviderEvent, WebhookReceiver, construct_event};
pub use signature::{DEFAULT_TOLERANCE_SECS, SignatureError, SignatureVersion, WebhookSigner};
