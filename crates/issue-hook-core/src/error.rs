//! Error types for webhook intake.
//!
//! Every check in the receiver pipeline maps to exactly one [`Rejection`]
//! kind. Rejections are converted into an [`Error`], the value handed back to
//! the caller, which carries an HTTP-style status code and a short message.

use thiserror::Error;

/// The reason a webhook request was refused by the receiver pipeline.
///
/// The display text of each variant is the fixed message reported to the
/// caller. Callers that need to branch on the failure can match on the
/// variant instead of comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Rejection {
    /// No shared secret is configured, so no signature can be computed.
    #[error("Can't compute signature")]
    MissingSecret,

    /// The request carries no signature header.
    #[error("Request missing signature")]
    MissingSignature,

    /// The signature header does not match the HMAC of the body.
    #[error("Signatures didn't match!")]
    SignatureMismatch,

    /// The body could not be read or is not a JSON object.
    #[error("Malformed request")]
    MalformedRequest,

    /// The body parsed to an empty JSON object.
    #[error("No payload")]
    EmptyPayload,

    /// The request carries no event header.
    #[error("No event")]
    MissingEvent,

    /// The event type is not in the accepted set.
    #[error("Event discarded")]
    EventDiscarded,

    /// The originating repository is not the accepted one.
    #[error("Event origin not allowed")]
    OriginNotAllowed,

    /// The sender is on the discard list.
    #[error("Event origin discarded")]
    SenderDiscarded,
}

impl Rejection {
    /// HTTP status code reported for this rejection.
    ///
    /// - 500 when the receiver itself is not able to authenticate requests
    /// - 401 for missing or invalid signatures
    /// - 400 for structurally invalid requests
    /// - 403 for requests refused by policy
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingSecret => 500,
            Self::MissingSignature | Self::SignatureMismatch => 401,
            Self::MalformedRequest | Self::EmptyPayload | Self::MissingEvent => 400,
            Self::EventDiscarded | Self::OriginNotAllowed | Self::SenderDiscarded => 403,
        }
    }

    /// Whether the rejection stems from a policy filter rather than from
    /// an unauthenticated or malformed request.
    pub fn is_policy(&self) -> bool {
        matches!(
            self,
            Self::EventDiscarded | Self::OriginNotAllowed | Self::SenderDiscarded
        )
    }
}

/// Terminal failure for a single webhook request.
///
/// Immutable once constructed. The `status` is an HTTP-style code and the
/// `message` a short human readable cause.
///
/// # Examples
///
/// ```rust
/// use issue_hook_core::{Error, Rejection};
///
/// let error = Error::new(403, "Forbidden action. Request not accepted.");
/// assert_eq!(error.status(), 403);
/// assert_eq!(error.message(), "Forbidden action. Request not accepted.");
///
/// let error = Error::from(Rejection::MissingEvent);
/// assert_eq!(error.message(), "No event");
/// assert_eq!(error.rejection(), Some(Rejection::MissingEvent));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({status})")]
pub struct Error {
    status: u16,
    message: String,
    rejection: Option<Rejection>,
}

impl Error {
    /// Create an error with an arbitrary status and message.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            rejection: None,
        }
    }

    /// HTTP-style status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Short description of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Pipeline check that produced this error, if any.
    pub fn rejection(&self) -> Option<Rejection> {
        self.rejection
    }
}

impl From<Rejection> for Error {
    fn from(rejection: Rejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.to_string(),
            rejection: Some(rejection),
        }
    }
}

/// Invalid receiver settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The accepted origin is not of the form `owner/name`.
    #[error("Invalid origin '{origin}': expected 'owner/name'")]
    InvalidOrigin { origin: String },

    /// An accepted event name is empty or only whitespace.
    #[error("Accepted event names must not be blank")]
    BlankEvent,

    /// The discarded sender is empty or only whitespace.
    #[error("Discarded sender must not be blank")]
    BlankSender,
}

/// Failures while computing a request signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The HMAC could not be keyed with the configured secret.
    #[error("Failed to create HMAC instance: {message}")]
    HmacError { message: String },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
