//! Webhook receiver: turns an untrusted request into a [`Payload`].
//!
//! The receiver runs a fixed sequence of checks and stops at the first one
//! that fails:
//!
//! 1. Signature - a secret is configured, the signature header is present
//!    and matches the HMAC of the body
//! 2. Body - the body is a non-empty JSON object
//! 3. Event - the event header is present
//! 4. Event policy - the event is in the accepted set
//! 5. Origin policy - the repository is the accepted origin
//! 6. Sender policy - the sender is not discarded
//!
//! The outcome is returned as a `Result`; the receiver keeps no per-request
//! state, so one instance can serve concurrent requests behind an `Arc`.
//!
//! # Examples
//!
//! ```rust
//! use issue_hook_core::signature::{sign, SignatureAlgorithm};
//! use issue_hook_core::{RawRequest, Receiver, ReceiverConfig};
//!
//! let receiver = Receiver::new(
//!     ReceiverConfig::default()
//!         .with_secret_token("123ABC")
//!         .with_accept_events(["issues", "issue_comment"]),
//! );
//!
//! let body = r#"{"action":"opened","issue":{"number":1,"title":"Bug"}}"#;
//! let signature = sign(b"123ABC", body.as_bytes(), SignatureAlgorithm::Sha1).unwrap();
//!
//! let mut request = RawRequest::new(body)
//!     .with_header("X-Hub-Signature", signature)
//!     .with_header("X-GitHub-Event", "issues");
//!
//! let payload = receiver.parse_request(&mut request).unwrap();
//! assert!(payload.is_opened());
//! assert_eq!(payload.issue_title(), Some("Bug"));
//! ```

use crate::config::{ReceiverConfig, SecretToken};
use crate::error::{Error, Rejection};
use crate::payload::{lookup, Payload};
use crate::request::{WebhookRequest, DELIVERY_HEADER, EVENT_HEADER};
use crate::signature;
use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Validates webhook requests against a fixed [`ReceiverConfig`].
#[derive(Debug, Clone)]
pub struct Receiver {
    config: ReceiverConfig,
}

impl Receiver {
    pub fn new(config: ReceiverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    pub fn secret_token(&self) -> Option<&SecretToken> {
        self.config.secret_token.as_ref()
    }

    pub fn accept_origin(&self) -> Option<&str> {
        self.config.accept_origin.as_deref()
    }

    pub fn discard_sender(&self) -> Option<&str> {
        self.config.discard_sender.as_deref()
    }

    pub fn accept_events(&self) -> &[String] {
        self.config.accept_events.as_slice()
    }

    /// Validate `request` and build its payload.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] built from the [`Rejection`] of the first check
    /// that failed. Errors are terminal for the request.
    #[instrument(
        name = "parse_request",
        skip(self, request),
        fields(
            event_type = request.header(EVENT_HEADER).unwrap_or_default(),
            delivery_id = request.header(DELIVERY_HEADER).unwrap_or_default(),
        )
    )]
    pub fn parse_request<R>(&self, request: &mut R) -> Result<Payload, Error>
    where
        R: WebhookRequest + ?Sized,
    {
        match self.run_checks(request) {
            Ok(payload) => {
                info!(
                    action = payload.action().unwrap_or_default(),
                    repository = payload.repo().unwrap_or_default(),
                    "Webhook accepted"
                );
                Ok(payload)
            }
            Err(rejection) if rejection.is_policy() => {
                debug!(reason = %rejection, "Webhook filtered by policy");
                Err(rejection.into())
            }
            Err(rejection) => {
                warn!(
                    reason = %rejection,
                    status = rejection.status(),
                    "Webhook rejected"
                );
                Err(rejection.into())
            }
        }
    }

    /// Check a signature header value against `body`.
    ///
    /// Runs the signature step of the pipeline on its own, for callers that
    /// buffer and parse the body themselves.
    ///
    /// # Errors
    ///
    /// - [`Rejection::MissingSecret`] if no secret is configured
    /// - [`Rejection::MissingSignature`] if `signature` is `None`
    /// - [`Rejection::SignatureMismatch`] if the signature does not match
    pub fn verify_signature(&self, body: &[u8], signature: Option<&str>) -> Result<(), Error> {
        let secret = self.secret_token().ok_or(Rejection::MissingSecret)?;
        let signature = signature.ok_or(Rejection::MissingSignature)?;
        self.compare_signature(secret, body, signature)
            .map_err(Error::from)
    }

    fn run_checks<R>(&self, request: &mut R) -> Result<Payload, Rejection>
    where
        R: WebhookRequest + ?Sized,
    {
        let body = self.authenticate(request)?;
        let raw = parse_body(&body)?;

        let event = request
            .header(EVENT_HEADER)
            .ok_or(Rejection::MissingEvent)?
            .to_string();

        self.apply_policy(&event, &raw)?;

        Ok(Payload::new(raw, event))
    }

    /// Signature step; returns the buffered body on success.
    fn authenticate<R>(&self, request: &mut R) -> Result<Bytes, Rejection>
    where
        R: WebhookRequest + ?Sized,
    {
        let secret = self.secret_token().ok_or(Rejection::MissingSecret)?;

        let algorithm = self.config.signature_algorithm;
        let signature = request
            .header(algorithm.header_name())
            .ok_or(Rejection::MissingSignature)?
            .to_string();

        let body = request.read_body().map_err(|e| {
            warn!(error = %e, "Failed to read webhook body");
            Rejection::MalformedRequest
        })?;
        if let Err(e) = request.rewind_body() {
            debug!(error = %e, "Failed to rewind webhook body");
        }

        self.compare_signature(secret, &body, &signature)?;
        Ok(body)
    }

    fn compare_signature(
        &self,
        secret: &SecretToken,
        body: &[u8],
        signature: &str,
    ) -> Result<(), Rejection> {
        if signature::verify(
            secret.expose(),
            body,
            signature,
            self.config.signature_algorithm,
        ) {
            Ok(())
        } else {
            Err(Rejection::SignatureMismatch)
        }
    }

    fn apply_policy(&self, event: &str, raw: &Value) -> Result<(), Rejection> {
        if !self.config.accept_events.accepts(event) {
            return Err(Rejection::EventDiscarded);
        }

        if let Some(origin) = self.accept_origin() {
            let repository = lookup(raw, "repository.full_name").and_then(Value::as_str);
            if repository != Some(origin) {
                return Err(Rejection::OriginNotAllowed);
            }
        }

        if let Some(discarded) = self.discard_sender() {
            let sender = lookup(raw, "sender.login").and_then(Value::as_str);
            if sender == Some(discarded) {
                return Err(Rejection::SenderDiscarded);
            }
        }

        Ok(())
    }
}

/// Parse the body into a non-empty JSON object.
fn parse_body(body: &[u8]) -> Result<Value, Rejection> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if map.is_empty() => Err(Rejection::EmptyPayload),
        Ok(raw @ Value::Object(_)) => Ok(raw),
        Ok(_) | Err(_) => Err(Rejection::MalformedRequest),
    }
}

#[cfg(test)]
#[path = "receiver_tests.rs"]
mod tests;
