//! Verified value types.
//!
//! A verified value is built from exactly one source: the envelope's
//! authenticated `payload_as_string`, after the full verification pipeline
//! has accepted it. Nothing here reads the envelope's loose hint fields -
//! copying `envelope.blockchain` into a verified value would silently turn
//! an adversary-controlled string into a trusted one.
//!
//! Fields absent from the payload JSON are absent from the value; they are
//! never back-filled.

use serde::{Deserialize, Serialize};

use crate::error::IntegrityError;
use crate::util::lenient;

/// An internal address linked to a whitelisted address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInternalAddress {
    #[serde(deserialize_with = "lenient::string_from_string_or_number")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A wallet linked to a whitelisted address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedWallet {
    #[serde(deserialize_with = "lenient::string_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// A whitelisted address whose every field came from the verified payload.
///
/// The payload's `currency` key becomes [`blockchain`](Self::blockchain).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedAddress {
    pub blockchain: Option<String>,
    pub network: Option<String>,
    pub address: Option<String>,
    pub memo: Option<String>,
    pub label: Option<String>,
    pub customer_id: Option<String>,
    pub contract_type: Option<String>,
    pub address_type: Option<String>,
    pub tn_participant_id: Option<String>,
    pub exchange_account_id: Option<i64>,
    pub linked_internal_addresses: Vec<LinkedInternalAddress>,
    pub linked_wallets: Vec<LinkedWallet>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressPayload {
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    network: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    memo: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(alias = "customer_id", default)]
    customer_id: Option<String>,
    #[serde(alias = "contract_type", default)]
    contract_type: Option<String>,
    #[serde(alias = "address_type", default)]
    address_type: Option<String>,
    #[serde(
        rename = "tnParticipantID",
        alias = "tnParticipantId",
        alias = "tn_participant_id",
        default
    )]
    tn_participant_id: Option<String>,
    #[serde(
        alias = "exchange_account_id",
        default,
        deserialize_with = "lenient::opt_i64_lenient"
    )]
    exchange_account_id: Option<i64>,
    #[serde(alias = "linked_internal_addresses", default)]
    linked_internal_addresses: Vec<LinkedInternalAddress>,
    #[serde(alias = "linked_wallets", default)]
    linked_wallets: Vec<LinkedWallet>,
}

impl VerifiedAddress {
    /// Parses a verified payload string into an address value.
    ///
    /// Call this only with a payload whose hash and signatures have already
    /// been accepted. Missing optional keys become `None`; malformed JSON is
    /// an [`IntegrityError::MalformedPayload`].
    pub fn from_verified_payload(payload: &str) -> Result<Self, IntegrityError> {
        let wire: AddressPayload = serde_json::from_str(payload)
            .map_err(|e| IntegrityError::MalformedPayload(e.to_string()))?;
        Ok(VerifiedAddress {
            blockchain: wire.currency,
            network: wire.network,
            address: wire.address,
            memo: wire.memo,
            label: wire.label,
            customer_id: wire.customer_id,
            contract_type: wire.contract_type,
            address_type: wire.address_type,
            tn_participant_id: wire.tn_participant_id,
            exchange_account_id: wire.exchange_account_id,
            linked_internal_addresses: wire.linked_internal_addresses,
            linked_wallets: wire.linked_wallets,
        })
    }
}

/// A whitelisted asset (token contract) whose every field came from the
/// verified payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedAsset {
    pub blockchain: Option<String>,
    pub network: Option<String>,
    pub contract_address: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetPayload {
    #[serde(default)]
    blockchain: Option<String>,
    #[serde(default)]
    network: Option<String>,
    #[serde(alias = "contract_address", default)]
    contract_address: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    decimals: Option<u32>,
}

impl VerifiedAsset {
    /// Parses a verified payload string into an asset value.
    ///
    /// Same contract as [`VerifiedAddress::from_verified_payload`].
    pub fn from_verified_payload(payload: &str) -> Result<Self, IntegrityError> {
        let wire: AssetPayload = serde_json::from_str(payload)
            .map_err(|e| IntegrityError::MalformedPayload(e.to_string()))?;
        Ok(VerifiedAsset {
            blockchain: wire.blockchain,
            network: wire.network,
            contract_address: wire.contract_address,
            name: wire.name,
            symbol: wire.symbol,
            decimals: wire.decimals,
        })
    }
}
