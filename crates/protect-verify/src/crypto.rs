//! Signature primitives.
//!
//! Everything cryptographic the SDK does funnels through these four
//! operations: SHA-256 hex digests, constant-time string comparison, and
//! ECDSA P-256 verify/sign with DER signatures. Signing is deterministic
//! (RFC 6979), which is what [`SigningKey::sign`] produces.
//!
//! The primitives do not classify failures. A bad signature, a bad key, a
//! truncated DER blob all come back as `false`; wrapping a `false` into an
//! [`IntegrityError`](protect_types::IntegrityError) is the caller's job.

use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey};
use p256::pkcs8::DecodePrivateKey;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use protect_types::PublicKey;
use protect_types::error::ValidationError;

/// SHA-256 of the UTF-8 bytes of `input`, as 64 lowercase hex characters.
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Compares two strings without leaking the position of the first
/// difference. Differing lengths fail fast; equal-length inputs are compared
/// in constant time.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Verifies a DER-encoded ECDSA P-256 signature over `message`.
///
/// Returns `false` for anything short of a valid signature: undecodable DER,
/// wrong key, wrong message. No heuristic recovery is attempted.
pub fn ecdsa_verify(key: &PublicKey, message: &[u8], signature_der: &[u8]) -> bool {
    match Signature::from_der(signature_der) {
        Ok(signature) => key.verifying_key().verify(message, &signature).is_ok(),
        Err(_) => false,
    }
}

/// Signs `message` with ECDSA P-256 over SHA-256 and returns the DER
/// encoding. Deterministic per RFC 6979.
pub fn ecdsa_sign(key: &SigningKey, message: &[u8]) -> Vec<u8> {
    let signature: Signature = key.sign(message);
    signature.to_der().as_bytes().to_vec()
}

/// Parses a PKCS#8 PEM private key for approval signing.
pub fn signing_key_from_pem(pem: &str) -> Result<SigningKey, ValidationError> {
    SigningKey::from_pkcs8_pem(pem).map_err(|e| ValidationError::InvalidPrivateKey(e.to_string()))
}
