//! Wire DTOs for server-returned envelopes and outbound request bodies.
//!
//! Everything here is untrusted as-received. A [`SignedEnvelope`] carries one
//! authenticated unit - `metadata.payload_as_string` plus its SHA-256 hash -
//! next to convenience fields the server copies out of the payload for
//! display. The verification pipeline reads only the authenticated unit;
//! the convenience fields are adversary-controlled hints.
//!
//! All types serialize with camelCase keys and accept snake_case aliases,
//! matching the two server generations in the field.

use serde::{Deserialize, Serialize};

use crate::util::lenient;

/// The authenticated unit of a signed envelope or request: a payload string
/// and the hex SHA-256 hash that user signatures cover.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadMetadata {
    /// Hex SHA-256 of `payload_as_string`, 64 lowercase characters.
    pub hash: String,
    /// The payload JSON, verbatim as hashed and signed.
    #[serde(alias = "payload_as_string", default)]
    pub payload_as_string: String,
}

/// One user's ECDSA signature, DER-encoded and carried as base64.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSignature {
    #[serde(alias = "user_id")]
    pub user_id: String,
    /// Base64 of a DER-encoded ECDSA signature.
    #[serde(default)]
    pub signature: String,
}

/// A user signature together with the set of entity hashes it covers.
///
/// A signature only counts toward an entity's thresholds when the entity's
/// metadata hash appears in `covered_hashes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadSignature {
    #[serde(alias = "user_signature")]
    pub user_signature: UserSignature,
    #[serde(alias = "covered_hashes", default)]
    pub covered_hashes: Vec<String>,
}

/// The signed section of an envelope: the payload and the signatures over it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedPayload {
    #[serde(default)]
    pub payload: String,
    #[serde(default)]
    pub signatures: Vec<PayloadSignature>,
}

/// A server-returned envelope for a whitelisted address or asset.
///
/// The same shape serves both entity kinds; only the whitelisting-rule list
/// consulted during verification differs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedEnvelope {
    /// The authenticated payload and its hash.
    pub metadata: PayloadMetadata,
    /// Base64 of the rules container these signatures were made under.
    #[serde(alias = "rules_container_base64", default)]
    pub rules_container_base64: String,
    /// Base64 of the SuperAdmin signatures over the raw container bytes.
    #[serde(alias = "rules_signatures_base64", default)]
    pub rules_signatures_base64: String,
    /// The signed payload section.
    #[serde(alias = "signed_payload", default)]
    pub signed_payload: SignedPayload,
    /// Unverified hint; never copied into a verified value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain: Option<String>,
    /// Unverified hint; never copied into a verified value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    /// Unverified hint; never copied into a verified value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Unverified hint; never copied into a verified value.
    #[serde(
        alias = "contract_address",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub contract_address: Option<String>,
    /// Unverified hint; never copied into a verified value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A server-returned approval request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(deserialize_with = "lenient::u64_from_number_or_string")]
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// The authenticated unit; requests without metadata skip hash
    /// verification but can never be approved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PayloadMetadata>,
}

/// The governance-rules document returned by the rules endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesEnvelope {
    /// Base64 of the rules container.
    #[serde(alias = "rules_container", default)]
    pub rules_container: String,
    /// Base64 of the SuperAdmin signatures over the raw container bytes.
    #[serde(alias = "rules_signatures", default)]
    pub rules_signatures: String,
}

/// Outbound body for approving a batch of requests.
///
/// `ids` are decimal strings in ascending numeric order; `signature` is the
/// base64 DER signature over the concatenation of the requests' hex hashes
/// in that same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalBody {
    pub ids: Vec<String>,
    pub signature: String,
    #[serde(default)]
    pub comment: String,
}

/// Outbound body for rejecting a batch of requests. Rejection signs nothing;
/// the comment is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionBody {
    pub ids: Vec<String>,
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_parses_camel_and_snake() {
        let camel = r#"{
            "metadata": {"hash": "aa", "payloadAsString": "{}"},
            "rulesContainerBase64": "Y29udGFpbmVy",
            "rulesSignaturesBase64": "W10=",
            "signedPayload": {"payload": "{}", "signatures": [
                {"userSignature": {"userId": "u1", "signature": "c2ln"}, "coveredHashes": ["aa"]}
            ]},
            "blockchain": "OTHER"
        }"#;
        let snake = r#"{
            "metadata": {"hash": "aa", "payload_as_string": "{}"},
            "rules_container_base64": "Y29udGFpbmVy",
            "rules_signatures_base64": "W10=",
            "signed_payload": {"payload": "{}", "signatures": [
                {"user_signature": {"user_id": "u1", "signature": "c2ln"}, "covered_hashes": ["aa"]}
            ]},
            "blockchain": "OTHER"
        }"#;
        let a: SignedEnvelope = serde_json::from_str(camel).expect("camelCase parses");
        let b: SignedEnvelope = serde_json::from_str(snake).expect("snake_case parses");
        assert_eq!(a, b);
        assert_eq!(a.signed_payload.signatures[0].user_signature.user_id, "u1");
        assert_eq!(a.blockchain.as_deref(), Some("OTHER"));
    }

    #[test]
    fn request_id_accepts_string_form() {
        let r: Request = serde_json::from_str(r#"{"id": "42", "status": "PENDING"}"#)
            .expect("request parses");
        assert_eq!(r.id, 42);
        assert!(r.metadata.is_none());
    }

    #[test]
    fn approval_body_serializes_camel_case() {
        let body = ApprovalBody {
            ids: vec!["1".into(), "2".into()],
            signature: "c2ln".into(),
            comment: "ok".into(),
        };
        let json = serde_json::to_value(&body).expect("body encodes");
        assert_eq!(json["ids"][0], "1");
        assert_eq!(json["signature"], "c2ln");
    }
}
