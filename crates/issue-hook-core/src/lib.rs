//! # Issue Hook Core
//!
//! Validation and normalization of GitHub issue, pull request and comment
//! webhooks.
//!
//! This crate provides:
//! - HMAC signature verification of webhook bodies (SHA-1 or SHA-256)
//! - Event, origin and sender filtering
//! - A flat, typed [`Context`] view over the delivered JSON
//!
//! # Examples
//!
//! ```rust
//! use issue_hook_core::signature::{sign, SignatureAlgorithm};
//! use issue_hook_core::{RawRequest, Receiver, ReceiverConfig, Rejection};
//!
//! let receiver = Receiver::new(
//!     ReceiverConfig::default()
//!         .with_secret_token("123ABC")
//!         .with_accept_origin("org/repo"),
//! );
//!
//! let body = r#"{"action":"created","repository":{"full_name":"org/other"}}"#;
//! let signature = sign(b"123ABC", body.as_bytes(), SignatureAlgorithm::Sha1).unwrap();
//! let mut request = RawRequest::new(body)
//!     .with_header("X-Hub-Signature", signature)
//!     .with_header("X-GitHub-Event", "issue_comment");
//!
//! let error = receiver.parse_request(&mut request).unwrap_err();
//! assert_eq!(error.rejection(), Some(Rejection::OriginNotAllowed));
//! assert_eq!(error.message(), "Event origin not allowed");
//! ```

// Public modules
pub mod config;
pub mod error;
pub mod payload;
pub mod receiver;
pub mod request;
pub mod signature;

// Re-export commonly used types at crate root for convenience
pub use error::{ConfigError, Error, Rejection, SignatureError};

pub use config::{AcceptedEvents, ReceiverConfig, SecretToken};
pub use payload::{Context, ItemId, Payload};
pub use receiver::Receiver;
pub use request::{Headers, RawRequest, ReaderRequest, WebhookRequest, DELIVERY_HEADER, EVENT_HEADER};
pub use signature::SignatureAlgorithm;
