//! Rules-container and rules-signatures decoding.
//!
//! Two server generations put two encodings on the wire: a protobuf message
//! and a JSON document with the same logical shape. The decoder tries
//! protobuf first and falls back to JSON, the same
//! try-one-format-then-the-other approach the rest of the SDK uses for
//! versioned responses. The dual form is an external compatibility contract,
//! not a convenience.
//!
//! Decoding is a pure function of the input bytes. An empty input is an
//! empty container; missing optional fields never fail; structural data is
//! never discarded.

use prost::Message;
use serde::Deserialize;

use protect_types::error::IntegrityError;
use protect_types::rules::{
    AddressWhitelistingRule, ContractAddressWhitelistingRule, Group, GroupThreshold, Role,
    RulesContainer, SequentialThresholds, User,
};
use protect_types::util::b64;
use protect_types::wire::UserSignature;
use protect_types::PublicKey;

use crate::pb;

/// Decodes a base64 rules container into the normalized model.
///
/// # Errors
///
/// [`IntegrityError::MalformedContainer`] when the input is not base64, or
/// the decoded bytes parse as neither protobuf nor JSON.
pub fn rules_container_from_base64(encoded: &str) -> Result<RulesContainer, IntegrityError> {
    let bytes =
        b64::decode(encoded.trim()).map_err(|_| IntegrityError::MalformedContainer)?;
    rules_container_from_bytes(&bytes)
}

/// Decodes raw rules-container bytes into the normalized model.
pub fn rules_container_from_bytes(bytes: &[u8]) -> Result<RulesContainer, IntegrityError> {
    if bytes.is_empty() {
        return Ok(RulesContainer::default());
    }

    // Protobuf wins only when it carries structure: arbitrary bytes can
    // decode as an all-defaults message.
    let proto = pb::RulesContainer::decode(bytes).ok();
    if let Some(message) = &proto {
        let container = container_from_proto(message.clone());
        if !container.is_structurally_empty() {
            return Ok(container);
        }
    }

    match serde_json::from_slice::<RulesContainer>(bytes) {
        Ok(container) => Ok(container),
        Err(_) if proto.is_some() => {
            tracing::warn!(
                "rules container decoded as a structurally empty protobuf message; \
                 treating as empty"
            );
            Ok(RulesContainer::default())
        }
        Err(error) => {
            tracing::debug!(%error, "rules container is neither protobuf nor JSON");
            Err(IntegrityError::MalformedContainer)
        }
    }
}

fn container_from_proto(message: pb::RulesContainer) -> RulesContainer {
    RulesContainer {
        users: message.users.into_iter().map(user_from_proto).collect(),
        groups: message
            .groups
            .into_iter()
            .map(|g| Group {
                id: g.id,
                user_ids: g.user_ids,
                properties: g.properties,
            })
            .collect(),
        minimum_distinct_user_signatures: message.minimum_distinct_user_signatures,
        minimum_distinct_group_signatures: message.minimum_distinct_group_signatures,
        address_whitelisting_rules: message
            .address_whitelisting_rules
            .into_iter()
            .map(|r| AddressWhitelistingRule {
                currency: r.currency,
                network: r.network,
                parallel_thresholds: thresholds_from_proto(r.parallel_thresholds),
            })
            .collect(),
        contract_address_whitelisting_rules: message
            .contract_address_whitelisting_rules
            .into_iter()
            .map(|r| ContractAddressWhitelistingRule {
                blockchain: r.blockchain,
                network: r.network,
                parallel_thresholds: thresholds_from_proto(r.parallel_thresholds),
            })
            .collect(),
        enforced_rules_hash: (!message.enforced_rules_hash.is_empty())
            .then_some(message.enforced_rules_hash),
        timestamp: message.timestamp,
        minimum_commitment_signatures: message.minimum_commitment_signatures,
        engine_identities: message.engine_identities,
        hsm_slot_id: (!message.hsm_slot_id.is_empty()).then_some(message.hsm_slot_id),
        properties: message.properties,
    }
}

fn user_from_proto(user: pb::User) -> User {
    let public_key = if user.public_key.is_empty() {
        None
    } else {
        // Same leniency as the JSON path: a key that does not parse is kept
        // as absent, and the user can never satisfy a signature check.
        PublicKey::from_bytes(&user.public_key).ok()
    };
    User {
        id: user.id,
        public_key,
        roles: user.roles.into_iter().map(Role::from_code).collect(),
        properties: user.properties,
    }
}

fn thresholds_from_proto(
    parallel: Vec<pb::SequentialThresholds>,
) -> Vec<SequentialThresholds> {
    parallel
        .into_iter()
        .map(|sequential| SequentialThresholds {
            thresholds: sequential
                .thresholds
                .into_iter()
                .map(|t| GroupThreshold {
                    group_id: t.group_id,
                    minimum_signatures: t.minimum_signatures,
                })
                .collect(),
        })
        .collect()
}

/// Decodes a base64 rules-signatures blob.
///
/// Accepts base64 of a protobuf `UserSignatures` message, a JSON array of
/// `{userId, signature}` objects, or a JSON object with a `signatures` key.
/// Protobuf signature bytes are re-encoded as base64 to match the JSON wire
/// shape of [`UserSignature`].
pub fn user_signatures_from_base64(
    encoded: &str,
) -> Result<Vec<UserSignature>, IntegrityError> {
    let bytes =
        b64::decode(encoded.trim()).map_err(|_| IntegrityError::MalformedSignatures)?;
    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    let proto = pb::UserSignatures::decode(bytes.as_slice()).ok();
    if let Some(message) = &proto {
        if !message.signatures.is_empty() {
            return Ok(message
                .signatures
                .iter()
                .map(|s| UserSignature {
                    user_id: s.user_id.clone(),
                    signature: b64::encode(&s.signature),
                })
                .collect());
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SignaturesWire {
        List(Vec<UserSignature>),
        Object { signatures: Vec<UserSignature> },
    }

    match serde_json::from_slice::<SignaturesWire>(&bytes) {
        Ok(SignaturesWire::List(signatures)) => Ok(signatures),
        Ok(SignaturesWire::Object { signatures }) => Ok(signatures),
        Err(_) if proto.is_some() => Ok(Vec::new()),
        Err(_) => Err(IntegrityError::MalformedSignatures),
    }
}
