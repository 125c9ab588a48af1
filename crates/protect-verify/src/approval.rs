//! Request hash verification and approval signing.
//!
//! Requests are content-addressed: the server returns a payload string plus
//! its hex SHA-256, and an approval is one ECDSA signature over the
//! concatenation of the approved requests' hashes in ascending id order. The
//! concatenation is deliberately hex-over-string - the platform's verifier
//! concatenates the hex characters, so pre-decoding the hashes to bytes
//! would produce a different message.

use p256::ecdsa::SigningKey;

use protect_types::error::{IntegrityError, ValidationError};
use protect_types::util::b64;
use protect_types::wire::{ApprovalBody, RejectionBody, Request};

use crate::crypto;

/// Checks a returned request's metadata hash against its payload.
///
/// Requests without metadata pass; they carry nothing to verify (and can
/// never be approved, since approval requires a hash).
pub fn verify_request_hash(request: &Request) -> Result<(), IntegrityError> {
    if let Some(metadata) = &request.metadata {
        let computed = crypto::sha256_hex(&metadata.payload_as_string);
        if !crypto::constant_time_eq(&computed, &metadata.hash) {
            return Err(IntegrityError::RequestHashMismatch {
                request_id: request.id,
            });
        }
    }
    Ok(())
}

/// Signs an approval over a batch of hash-verified requests.
///
/// Requests are sorted by numeric id; their hex hashes are concatenated
/// without separators and the UTF-8 bytes of that string are signed. The
/// result is independent of the input order.
///
/// # Errors
///
/// [`ValidationError::NoRequests`] for an empty batch,
/// [`ValidationError::MissingHash`] when any request lacks a metadata hash.
pub fn sign_approvals(
    requests: &[Request],
    key: &SigningKey,
    comment: &str,
) -> Result<ApprovalBody, ValidationError> {
    if requests.is_empty() {
        return Err(ValidationError::NoRequests);
    }

    let mut ordered: Vec<&Request> = requests.iter().collect();
    ordered.sort_by_key(|request| request.id);

    let mut message = String::new();
    let mut ids = Vec::with_capacity(ordered.len());
    for request in ordered {
        let hash = request
            .metadata
            .as_ref()
            .map(|m| m.hash.as_str())
            .unwrap_or("");
        if hash.is_empty() {
            return Err(ValidationError::MissingHash {
                request_id: request.id,
            });
        }
        message.push_str(hash);
        ids.push(request.id.to_string());
    }

    let signature = crypto::ecdsa_sign(key, message.as_bytes());
    Ok(ApprovalBody {
        ids,
        signature: b64::encode(signature),
        comment: comment.to_owned(),
    })
}

/// Builds a rejection body. Rejection signs nothing; the comment is
/// mandatory.
pub fn build_rejection(ids: &[u64], comment: &str) -> Result<RejectionBody, ValidationError> {
    if ids.is_empty() {
        return Err(ValidationError::NoRequests);
    }
    if comment.trim().is_empty() {
        return Err(ValidationError::EmptyComment);
    }
    Ok(RejectionBody {
        ids: ids.iter().map(u64::to_string).collect(),
        comment: comment.to_owned(),
    })
}
