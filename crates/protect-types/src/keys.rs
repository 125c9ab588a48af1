//! ECDSA P-256 public key wrapper.
//!
//! Rules containers bind user ids to public keys in two encodings depending
//! on the wire form: PEM text (JSON) or encoded bytes (protobuf). [`PublicKey`]
//! accepts both and normalizes to a parsed verifying key so downstream
//! verification never re-parses key material.

use p256::ecdsa::VerifyingKey;
use p256::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Error returned when key material cannot be parsed as a P-256 public key.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid public key: {0}")]
pub struct KeyParseError(pub String);

/// An ECDSA public key on curve P-256.
///
/// Construct with [`PublicKey::from_pem`] for PEM-encoded SubjectPublicKeyInfo
/// text, or [`PublicKey::from_bytes`] for the byte encodings carried by the
/// protobuf wire form (SPKI DER, with a SEC1 point fallback).
///
/// # Serialization
///
/// Serializes to and from a PEM string, which is the JSON wire form:
///
/// ```text
/// "-----BEGIN PUBLIC KEY-----\n...\n-----END PUBLIC KEY-----\n"
/// ```
#[derive(Clone)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Parses a PEM-encoded SubjectPublicKeyInfo document.
    pub fn from_pem(pem: &str) -> Result<Self, KeyParseError> {
        VerifyingKey::from_public_key_pem(pem)
            .map(Self)
            .map_err(|e| KeyParseError(e.to_string()))
    }

    /// Parses the byte encodings used by the protobuf wire form.
    ///
    /// SPKI DER is tried first, then a raw SEC1 point (compressed or
    /// uncompressed).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyParseError> {
        VerifyingKey::from_public_key_der(bytes)
            .or_else(|_| VerifyingKey::from_sec1_bytes(bytes))
            .map(Self)
            .map_err(|e| KeyParseError(e.to_string()))
    }

    /// Returns the parsed verifying key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.0
    }

    /// Renders the key as a PEM-encoded SubjectPublicKeyInfo document.
    pub fn to_pem(&self) -> String {
        self.0
            .to_public_key_pem(LineEnding::LF)
            .unwrap_or_default()
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(key: VerifyingKey) -> Self {
        Self(key)
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_encoded_point(true) == other.0.to_encoded_point(true)
    }
}

impl Eq for PublicKey {}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey")
            .field(&self.0.to_encoded_point(true))
            .finish()
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_pem())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pem = String::deserialize(deserializer)?;
        PublicKey::from_pem(&pem).map_err(serde::de::Error::custom)
    }
}
