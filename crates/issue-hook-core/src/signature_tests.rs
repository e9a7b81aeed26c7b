//! Tests for webhook signature computation and verification.

use super::*;

const DOCS_SECRET: &[u8] = b"It's a Secret to Everybody";
const DOCS_PAYLOAD: &[u8] = b"Hello, World!";
const DOCS_SHA256_SIGNATURE: &str =
    "sha256=757107ea0eb2509fc211221cce984b8a37570b6d7586c22c46f4379c8b043e17";
const DOCS_SHA1_SIGNATURE: &str = "sha1=01dc10d0c83e72ed246219cdd91669667fe2ca59";

// ============================================================================
// Signing
// ============================================================================

#[test]
fn test_sign_matches_known_sha256_vector() {
    let signature = sign(DOCS_SECRET, DOCS_PAYLOAD, SignatureAlgorithm::Sha256)
        .expect("signing should not fail");

    assert_eq!(signature, DOCS_SHA256_SIGNATURE);
}

#[test]
fn test_sign_matches_known_sha1_vector() {
    let signature = sign(DOCS_SECRET, DOCS_PAYLOAD, SignatureAlgorithm::Sha1)
        .expect("signing should not fail");

    assert_eq!(signature, DOCS_SHA1_SIGNATURE);
}

#[test]
fn test_sign_with_empty_secret_still_produces_digest() {
    let signature =
        sign(b"", DOCS_PAYLOAD, SignatureAlgorithm::Sha1).expect("signing should not fail");

    assert!(signature.starts_with("sha1="));
    assert_eq!(signature.len(), "sha1=".len() + 40);
}

// ============================================================================
// Verification
// ============================================================================

#[test]
fn test_verify_accepts_known_vectors() {
    assert!(verify(
        DOCS_SECRET,
        DOCS_PAYLOAD,
        DOCS_SHA256_SIGNATURE,
        SignatureAlgorithm::Sha256
    ));
    assert!(verify(
        DOCS_SECRET,
        DOCS_PAYLOAD,
        DOCS_SHA1_SIGNATURE,
        SignatureAlgorithm::Sha1
    ));
}

#[test]
fn test_verify_accepts_uppercase_hex() {
    let signature = format!("sha1={}", "01DC10D0C83E72ED246219CDD91669667FE2CA59");

    assert!(verify(
        DOCS_SECRET,
        DOCS_PAYLOAD,
        &signature,
        SignatureAlgorithm::Sha1
    ));
}

#[test]
fn test_verify_rejects_wrong_secret() {
    assert!(!verify(
        b"wrong-secret",
        DOCS_PAYLOAD,
        DOCS_SHA1_SIGNATURE,
        SignatureAlgorithm::Sha1
    ));
}

#[test]
fn test_verify_rejects_tampered_body() {
    assert!(!verify(
        DOCS_SECRET,
        b"Hello, World?",
        DOCS_SHA1_SIGNATURE,
        SignatureAlgorithm::Sha1
    ));
}

#[test]
fn test_verify_rejects_other_algorithm_prefix() {
    assert!(!verify(
        DOCS_SECRET,
        DOCS_PAYLOAD,
        DOCS_SHA256_SIGNATURE,
        SignatureAlgorithm::Sha1
    ));
    assert!(!verify(
        DOCS_SECRET,
        DOCS_PAYLOAD,
        DOCS_SHA1_SIGNATURE,
        SignatureAlgorithm::Sha256
    ));
}

#[test]
fn test_verify_rejects_malformed_headers() {
    let cases = [
        "",
        "sha1=",
        "sha1=not-hex",
        "sha1=01dc10d0",
        "01dc10d0c83e72ed246219cdd91669667fe2ca59",
        "md5=01dc10d0c83e72ed246219cdd91669667fe2ca59",
    ];

    for signature in cases {
        assert!(
            !verify(DOCS_SECRET, DOCS_PAYLOAD, signature, SignatureAlgorithm::Sha1),
            "signature '{}' should be rejected",
            signature
        );
    }
}

#[test]
fn test_algorithm_headers_and_prefixes() {
    assert_eq!(SignatureAlgorithm::default(), SignatureAlgorithm::Sha1);
    assert_eq!(SignatureAlgorithm::Sha1.header_name(), "X-Hub-Signature");
    assert_eq!(SignatureAlgorithm::Sha256.header_name(), "X-Hub-Signature-256");
    assert_eq!(SignatureAlgorithm::Sha256.prefix(), "sha256=");
    assert_eq!(SignatureAlgorithm::Sha256.to_string(), "sha256");
}
