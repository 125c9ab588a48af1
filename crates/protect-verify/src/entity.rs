//! Whitelisted-entity verification.
//!
//! The six-step pipeline that turns a server-returned [`SignedEnvelope`]
//! into a value the caller may act on:
//!
//! 1. recompute the SHA-256 of the authenticated payload and compare it to
//!    the envelope hash in constant time;
//! 2. verify the SuperAdmin signatures over the envelope's rules container;
//! 3. decode that container - the per-envelope container is what binds the
//!    user signatures, a cached one is only an auxiliary lookup;
//! 4. resolve the applicable whitelisting rule from the key in the verified
//!    payload, never from the envelope's hint fields;
//! 5. keep the signatures covering this entity's hash and evaluate the
//!    rule's thresholds with them;
//! 6. build the returned value from the verified payload alone.
//!
//! Any failing step aborts the rest; a partially verified value never
//! escapes. Addresses and assets share every step except which rule list is
//! consulted.

use protect_types::error::IntegrityError;
use protect_types::rules::RulesContainer;
use protect_types::verified::{VerifiedAddress, VerifiedAsset};
use protect_types::wire::{PayloadSignature, SignedEnvelope};

use crate::container;
use crate::crypto;
use crate::governance::{self, GovernanceRules, VerificationConfig};
use crate::resolver;
use crate::threshold;

/// Runs the pipeline for a whitelisted address.
///
/// Returns the verified address or the error of the first failing step. The
/// envelope's own `blockchain`/`network`/`address` fields never reach the
/// returned value.
pub fn verify_whitelisted_address(
    envelope: &SignedEnvelope,
    config: &VerificationConfig,
) -> Result<VerifiedAddress, IntegrityError> {
    let rules = check_hash_and_rules(envelope, config)?;

    let address = VerifiedAddress::from_verified_payload(&envelope.metadata.payload_as_string)?;
    let currency = address.blockchain.as_deref().unwrap_or("");
    let network = address.network.as_deref().unwrap_or("");
    let rule = resolver::resolve_address_rule(&rules, currency, network)?;

    threshold::evaluate_parallel_thresholds(
        &rules,
        &rule.parallel_thresholds,
        &envelope.metadata.hash,
        &covering_signatures(envelope),
        &format!("({currency}, {network})"),
    )?;

    Ok(address)
}

/// Runs the pipeline for a whitelisted asset, consulting the
/// contract-address rules and the asset's `(blockchain, network)`.
pub fn verify_whitelisted_asset(
    envelope: &SignedEnvelope,
    config: &VerificationConfig,
) -> Result<VerifiedAsset, IntegrityError> {
    let rules = check_hash_and_rules(envelope, config)?;

    let asset = VerifiedAsset::from_verified_payload(&envelope.metadata.payload_as_string)?;
    let blockchain = asset.blockchain.as_deref().unwrap_or("");
    let network = asset.network.as_deref().unwrap_or("");
    let rule = resolver::resolve_contract_rule(&rules, blockchain, network)?;

    threshold::evaluate_parallel_thresholds(
        &rules,
        &rule.parallel_thresholds,
        &envelope.metadata.hash,
        &covering_signatures(envelope),
        &format!("({blockchain}, {network})"),
    )?;

    Ok(asset)
}

/// Steps 1-3: hash check, governance verification, container decode.
fn check_hash_and_rules(
    envelope: &SignedEnvelope,
    config: &VerificationConfig,
) -> Result<RulesContainer, IntegrityError> {
    let computed = crypto::sha256_hex(&envelope.metadata.payload_as_string);
    if !crypto::constant_time_eq(&computed, &envelope.metadata.hash) {
        return Err(IntegrityError::HashMismatch);
    }

    if config.min_valid_signatures > 0 {
        let signatures =
            container::user_signatures_from_base64(&envelope.rules_signatures_base64)?;
        governance::verify_governance_rules(
            &GovernanceRules {
                rules_container_base64: envelope.rules_container_base64.clone(),
                signatures,
            },
            config,
        )?;
    }

    container::rules_container_from_base64(&envelope.rules_container_base64)
}

/// Step 5 filter: the signatures whose covered hashes include this entity's
/// hash, compared pairwise in constant time.
fn covering_signatures(envelope: &SignedEnvelope) -> Vec<PayloadSignature> {
    envelope
        .signed_payload
        .signatures
        .iter()
        .filter(|signature| {
            signature
                .covered_hashes
                .iter()
                .any(|hash| crypto::constant_time_eq(hash, &envelope.metadata.hash))
        })
        .cloned()
        .collect()
}
