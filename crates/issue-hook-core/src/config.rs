//! Receiver configuration.
//!
//! [`ReceiverConfig`] is supplied once when the [`Receiver`](crate::Receiver)
//! is built and never changes afterwards. It deserializes from any serde
//! source; loading it from files or the environment is left to the host
//! application.

use crate::error::ConfigError;
use crate::signature::SignatureAlgorithm;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Secret Token
// ============================================================================

/// Shared secret used to sign webhook deliveries.
///
/// The value is wiped from memory on drop and never shows up in `Debug`
/// or serialized output.
#[derive(Clone, PartialEq, Eq, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretToken(String);

impl SecretToken {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw secret bytes, for HMAC keying only.
    pub fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretToken(<REDACTED>)")
    }
}

impl Serialize for SecretToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("<REDACTED>")
    }
}

impl From<&str> for SecretToken {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

impl From<String> for SecretToken {
    fn from(secret: String) -> Self {
        Self::new(secret)
    }
}

// ============================================================================
// Accepted Events
// ============================================================================

/// Set of event names the receiver lets through.
///
/// Built from either a single name or a sequence of names; both forms are
/// normalized to a list of strings. An empty list accepts every event.
///
/// # Examples
///
/// ```rust
/// use issue_hook_core::AcceptedEvents;
///
/// let single = AcceptedEvents::from("issues");
/// assert_eq!(single.as_slice(), ["issues"]);
///
/// let many = AcceptedEvents::from(["issue_comment", "issues"]);
/// assert!(many.accepts("issues"));
/// assert!(!many.accepts("push"));
///
/// assert!(AcceptedEvents::default().accepts("anything"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AcceptedEvents(Vec<String>);

impl AcceptedEvents {
    /// Whether `event` passes the filter.
    pub fn accepts(&self, event: &str) -> bool {
        self.0.is_empty() || self.0.iter().any(|accepted| accepted == event)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for AcceptedEvents {
    fn from(event: &str) -> Self {
        Self(vec![event.to_string()])
    }
}

impl From<String> for AcceptedEvents {
    fn from(event: String) -> Self {
        Self(vec![event])
    }
}

impl From<Vec<String>> for AcceptedEvents {
    fn from(events: Vec<String>) -> Self {
        Self(events)
    }
}

impl From<Vec<&str>> for AcceptedEvents {
    fn from(events: Vec<&str>) -> Self {
        events.as_slice().into()
    }
}

impl From<&[&str]> for AcceptedEvents {
    fn from(events: &[&str]) -> Self {
        Self(events.iter().map(|e| e.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for AcceptedEvents {
    fn from(events: [&str; N]) -> Self {
        events.as_slice().into()
    }
}

impl<'de> Deserialize<'de> for AcceptedEvents {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
            None => Self::default(),
            // A single string may carry a comma separated list.
            Some(OneOrMany::One(events)) => Self(
                events
                    .split(',')
                    .map(str::trim)
                    .filter(|event| !event.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            Some(OneOrMany::Many(events)) => Self::from(events),
        })
    }
}

// ============================================================================
// Receiver Configuration
// ============================================================================

/// Settings that drive the receiver pipeline.
///
/// # Examples
///
/// ```rust
/// use issue_hook_core::ReceiverConfig;
///
/// let config = ReceiverConfig::default()
///     .with_secret_token("123ABC")
///     .with_accept_origin("testing/tests")
///     .with_discard_sender("mybot")
///     .with_accept_events(["issue_comment", "issues"]);
///
/// assert_eq!(config.accept_origin.as_deref(), Some("testing/tests"));
/// assert_eq!(config.accept_events.as_slice(), ["issue_comment", "issues"]);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Shared secret for signature verification
    pub secret_token: Option<SecretToken>,

    /// Only accept events from this repository (`owner/name`)
    #[serde(alias = "origin")]
    pub accept_origin: Option<String>,

    /// Drop events triggered by this login
    pub discard_sender: Option<String>,

    /// Event names to accept (empty = all)
    pub accept_events: AcceptedEvents,

    /// Digest used for request signatures
    pub signature_algorithm: SignatureAlgorithm,
}

impl ReceiverConfig {
    pub fn with_secret_token(mut self, secret: impl Into<SecretToken>) -> Self {
        self.secret_token = Some(secret.into());
        self
    }

    pub fn with_accept_origin(mut self, origin: impl Into<String>) -> Self {
        self.accept_origin = Some(origin.into());
        self
    }

    pub fn with_discard_sender(mut self, sender: impl Into<String>) -> Self {
        self.discard_sender = Some(sender.into());
        self
    }

    pub fn with_accept_events(mut self, events: impl Into<AcceptedEvents>) -> Self {
        self.accept_events = events.into();
        self
    }

    pub fn with_signature_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.signature_algorithm = algorithm;
        self
    }

    /// Check the settings for values that could never match a delivery.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidOrigin`] if `accept_origin` is not `owner/name`
    /// - [`ConfigError::BlankEvent`] if an accepted event name is blank
    /// - [`ConfigError::BlankSender`] if `discard_sender` is blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(origin) = &self.accept_origin {
            let valid = match origin.split_once('/') {
                Some((owner, name)) => {
                    !owner.trim().is_empty() && !name.trim().is_empty() && !name.contains('/')
                }
                None => false,
            };
            if !valid {
                return Err(ConfigError::InvalidOrigin {
                    origin: origin.clone(),
                });
            }
        }

        if self
            .accept_events
            .as_slice()
            .iter()
            .any(|event| event.trim().is_empty())
        {
            return Err(ConfigError::BlankEvent);
        }

        if matches!(&self.discard_sender, Some(sender) if sender.trim().is_empty()) {
            return Err(ConfigError::BlankSender);
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
