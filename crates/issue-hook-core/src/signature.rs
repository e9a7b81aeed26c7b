//! Webhook signature computation and verification.
//!
//! Deliveries are signed with an HMAC of the raw request body keyed by the
//! shared secret. The signature travels in a header formatted as
//! `<algorithm>=<hex digest>`, e.g. `sha1=0a4d...`.
//!
//! Verification decodes the header and compares digests in constant time.

use crate::error::SignatureError;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;

/// Header carrying the SHA-1 signature.
pub const SHA1_SIGNATURE_HEADER: &str = "X-Hub-Signature";

/// Header carrying the SHA-256 signature.
pub const SHA256_SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

/// Digest used to sign deliveries.
///
/// | Variant  | Header                | Prefix    |
/// |----------|-----------------------|-----------|
/// | `Sha1`   | `X-Hub-Signature`     | `sha1=`   |
/// | `Sha256` | `X-Hub-Signature-256` | `sha256=` |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureAlgorithm {
    /// HMAC-SHA1, the legacy signing scheme.
    #[default]
    Sha1,
    /// HMAC-SHA256.
    Sha256,
}

impl SignatureAlgorithm {
    /// Name of the request header carrying signatures for this algorithm.
    pub fn header_name(&self) -> &'static str {
        match self {
            Self::Sha1 => SHA1_SIGNATURE_HEADER,
            Self::Sha256 => SHA256_SIGNATURE_HEADER,
        }
    }

    /// Prefix of the header value, including the `=` separator.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1=",
            Self::Sha256 => "sha256=",
        }
    }

    fn digest(&self, secret: &[u8], body: &[u8]) -> Result<Vec<u8>, SignatureError> {
        let to_error = |e: hmac::digest::InvalidLength| SignatureError::HmacError {
            message: e.to_string(),
        };

        Ok(match self {
            Self::Sha1 => {
                let mut mac = Hmac::<Sha1>::new_from_slice(secret).map_err(to_error)?;
                mac.update(body);
                mac.finalize().into_bytes().to_vec()
            }
            Self::Sha256 => {
                let mut mac = Hmac::<Sha256>::new_from_slice(secret).map_err(to_error)?;
                mac.update(body);
                mac.finalize().into_bytes().to_vec()
            }
        })
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha1 => write!(f, "sha1"),
            Self::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Compute the signature header value for `body`.
///
/// # Examples
///
/// ```rust
/// use issue_hook_core::signature::{sign, verify, SignatureAlgorithm};
///
/// let body = br#"{"action":"opened"}"#;
/// let header = sign(b"123ABC", body, SignatureAlgorithm::Sha1).unwrap();
///
/// assert!(header.starts_with("sha1="));
/// assert!(verify(b"123ABC", body, &header, SignatureAlgorithm::Sha1));
/// ```
///
/// # Errors
///
/// Returns [`SignatureError::HmacError`] if the HMAC cannot be keyed.
pub fn sign(
    secret: &[u8],
    body: &[u8],
    algorithm: SignatureAlgorithm,
) -> Result<String, SignatureError> {
    let digest = algorithm.digest(secret, body)?;
    Ok(format!("{}{}", algorithm.prefix(), hex::encode(digest)))
}

/// Check a signature header value against `body`.
///
/// Returns `false` for any header that is not a well-formed signature for
/// `algorithm`, as well as for digests that do not match. The digest
/// comparison runs in constant time.
pub fn verify(secret: &[u8], body: &[u8], signature: &str, algorithm: SignatureAlgorithm) -> bool {
    let Some(provided) = parse_signature(signature, algorithm) else {
        return false;
    };

    match algorithm.digest(secret, body) {
        Ok(expected) => constant_time_compare(&provided, &expected),
        Err(_) => false,
    }
}

/// Decode `<prefix><hex>` into raw digest bytes.
fn parse_signature(signature: &str, algorithm: SignatureAlgorithm) -> Option<Vec<u8>> {
    let hex_signature = signature.trim().strip_prefix(algorithm.prefix())?;
    hex::decode(hex_signature).ok()
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    // Digest length is public, so this early return leaks nothing about the secret.
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;
