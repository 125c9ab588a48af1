//! The normalized governance model.
//!
//! A [`RulesContainer`] is the authoritative description of who may approve
//! what: users with public keys, groups of users, and per-key whitelisting
//! rules whose thresholds must be met by user signatures. Containers are
//! decoded once, then consumed read-only by verifiers and replaced wholesale
//! on cache refresh.
//!
//! # Wire tolerance
//!
//! The JSON wire form arrives with either camelCase or snake_case keys, and
//! `parallelThresholds` arrives in two shapes: the nested form
//! (`[{"thresholds": [...]}, ...]`) and a legacy flat form
//! (`[{"groupId": ..., "minimumSignatures": ...}, ...]`). Deserialization
//! accepts both and normalizes flat entries into singleton sequential sets,
//! so code downstream of this crate only ever sees the nested shape.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::keys::PublicKey;

/// A role attached to a user record.
///
/// The protobuf wire form carries roles as enum integers, the JSON form as
/// strings; both normalize to this type. Unknown integers are preserved as
/// `UNKNOWN_<n>` rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Unspecified,
    SuperAdmin,
    HsmSlot,
    RequestApprover,
    User,
    Operator,
    /// A role this SDK does not know about, kept verbatim.
    Other(String),
}

impl Role {
    /// Maps a wire enum integer to a role.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Role::Unspecified,
            1 => Role::SuperAdmin,
            2 => Role::HsmSlot,
            3 => Role::RequestApprover,
            4 => Role::User,
            5 => Role::Operator,
            n => Role::Other(format!("UNKNOWN_{n}")),
        }
    }

    /// Maps a wire role name to a role.
    pub fn from_name(name: &str) -> Self {
        match name {
            "UNSPECIFIED" => Role::Unspecified,
            "SUPERADMIN" => Role::SuperAdmin,
            "HSMSLOT" => Role::HsmSlot,
            "REQUESTAPPROVER" => Role::RequestApprover,
            "USER" => Role::User,
            "OPERATOR" => Role::Operator,
            other => Role::Other(other.to_owned()),
        }
    }

    /// The textual wire name of this role.
    pub fn as_str(&self) -> &str {
        match self {
            Role::Unspecified => "UNSPECIFIED",
            Role::SuperAdmin => "SUPERADMIN",
            Role::HsmSlot => "HSMSLOT",
            Role::RequestApprover => "REQUESTAPPROVER",
            Role::User => "USER",
            Role::Operator => "OPERATOR",
            Role::Other(name) => name,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RoleWire {
            Code(i32),
            Name(String),
        }
        Ok(match RoleWire::deserialize(deserializer)? {
            RoleWire::Code(code) => Role::from_code(code),
            RoleWire::Name(name) => Role::from_name(&name),
        })
    }
}

/// A user record: an id bound to a public key and a set of roles.
///
/// A public key that fails to parse is kept as `None`; such a user can never
/// satisfy a signature check, which is the safe reading of a damaged record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    #[serde(
        alias = "public_key",
        alias = "publicKeyPem",
        alias = "public_key_pem",
        deserialize_with = "lenient_public_key",
        skip_serializing_if = "Option::is_none"
    )]
    pub public_key: Option<PublicKey>,
    pub roles: Vec<Role>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl User {
    /// Whether this user carries the given role.
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }
}

fn lenient_public_key<'de, D>(deserializer: D) -> Result<Option<PublicKey>, D::Error>
where
    D: Deserializer<'de>,
{
    let pem = Option::<String>::deserialize(deserializer)?;
    Ok(pem.and_then(|p| PublicKey::from_pem(&p).ok()))
}

/// A group record: an ordered sequence of user ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    pub id: String,
    #[serde(alias = "user_ids")]
    pub user_ids: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

/// One group threshold: at least `minimum_signatures` distinct members of
/// `group_id` must have signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupThreshold {
    #[serde(alias = "group_id")]
    pub group_id: String,
    #[serde(alias = "minimum_signatures")]
    pub minimum_signatures: u32,
}

/// An ordered conjunction of group thresholds with pairwise-disjoint signer
/// sets: every threshold must be satisfied, and no user may be counted for
/// more than one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequentialThresholds {
    pub thresholds: Vec<GroupThreshold>,
}

/// Deserializes `parallelThresholds`, accepting both the nested form and the
/// legacy flat form. Flat entries become singleton sequential sets.
pub(crate) fn parallel_thresholds<'de, D>(
    deserializer: D,
) -> Result<Vec<SequentialThresholds>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Nested(SequentialThresholds),
        Flat(GroupThreshold),
    }
    let entries = Vec::<Entry>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            Entry::Nested(sequential) => sequential,
            Entry::Flat(threshold) => SequentialThresholds {
                thresholds: vec![threshold],
            },
        })
        .collect())
}

/// A whitelisting rule for plain addresses, matched on `(currency, network)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressWhitelistingRule {
    pub currency: String,
    pub network: String,
    #[serde(
        alias = "parallel_thresholds",
        deserialize_with = "parallel_thresholds"
    )]
    pub parallel_thresholds: Vec<SequentialThresholds>,
}

/// A whitelisting rule for contract addresses, matched on
/// `(blockchain, network)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractAddressWhitelistingRule {
    pub blockchain: String,
    pub network: String,
    #[serde(
        alias = "parallel_thresholds",
        deserialize_with = "parallel_thresholds"
    )]
    pub parallel_thresholds: Vec<SequentialThresholds>,
}

/// The normalized rules container.
///
/// Produced by the decoder in `protect-verify`, consumed read-only by every
/// verifier. All fields are optional on the wire; a missing field is its
/// `Default` here, never an error.
///
/// The serialized form of this struct is also the canonical JSON wire form:
/// re-encoding a decoded container and decoding it again yields an equal
/// value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RulesContainer {
    pub users: Vec<User>,
    pub groups: Vec<Group>,
    #[serde(alias = "minimum_distinct_user_signatures")]
    pub minimum_distinct_user_signatures: u32,
    #[serde(alias = "minimum_distinct_group_signatures")]
    pub minimum_distinct_group_signatures: u32,
    #[serde(alias = "address_whitelisting_rules")]
    pub address_whitelisting_rules: Vec<AddressWhitelistingRule>,
    #[serde(alias = "contract_address_whitelisting_rules")]
    pub contract_address_whitelisting_rules: Vec<ContractAddressWhitelistingRule>,
    #[serde(
        alias = "enforced_rules_hash",
        skip_serializing_if = "Option::is_none"
    )]
    pub enforced_rules_hash: Option<String>,
    pub timestamp: u64,
    #[serde(alias = "minimum_commitment_signatures")]
    pub minimum_commitment_signatures: u32,
    #[serde(alias = "engine_identities")]
    pub engine_identities: Vec<String>,
    #[serde(alias = "hsm_slot_id", skip_serializing_if = "Option::is_none")]
    pub hsm_slot_id: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl RulesContainer {
    /// Whether the container carries no structurally meaningful data.
    ///
    /// A protobuf decode that yields an empty container is treated as a
    /// failed decode by the dual-form decoder, since arbitrary bytes can
    /// parse as an all-defaults message.
    pub fn is_structurally_empty(&self) -> bool {
        self.users.is_empty()
            && self.groups.is_empty()
            && self.address_whitelisting_rules.is_empty()
            && self.contract_address_whitelisting_rules.is_empty()
    }

    /// Looks up a user record by id.
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Looks up a group record by id.
    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_parallel_thresholds_normalize_to_nested() {
        let json = r#"{
            "addressWhitelistingRules": [{
                "currency": "BTC",
                "network": "mainnet",
                "parallelThresholds": [
                    {"groupId": "ops", "minimumSignatures": 2},
                    {"groupId": "risk", "minimumSignatures": 1}
                ]
            }]
        }"#;
        let container: RulesContainer = serde_json::from_str(json).expect("container parses");
        let rule = &container.address_whitelisting_rules[0];
        assert_eq!(rule.parallel_thresholds.len(), 2);
        assert_eq!(rule.parallel_thresholds[0].thresholds.len(), 1);
        assert_eq!(rule.parallel_thresholds[0].thresholds[0].group_id, "ops");
        assert_eq!(
            rule.parallel_thresholds[0].thresholds[0].minimum_signatures,
            2
        );
    }

    #[test]
    fn nested_parallel_thresholds_kept_as_is() {
        let json = r#"{
            "contractAddressWhitelistingRules": [{
                "blockchain": "ETH",
                "network": "mainnet",
                "parallelThresholds": [
                    {"thresholds": [
                        {"groupId": "ops", "minimumSignatures": 1},
                        {"groupId": "risk", "minimumSignatures": 1}
                    ]}
                ]
            }]
        }"#;
        let container: RulesContainer = serde_json::from_str(json).expect("container parses");
        let rule = &container.contract_address_whitelisting_rules[0];
        assert_eq!(rule.parallel_thresholds.len(), 1);
        assert_eq!(rule.parallel_thresholds[0].thresholds.len(), 2);
    }

    #[test]
    fn snake_case_keys_accepted() {
        let json = r#"{
            "users": [{"id": "u1", "roles": ["SUPERADMIN"]}],
            "groups": [{"id": "g1", "user_ids": ["u1"]}],
            "minimum_distinct_user_signatures": 3,
            "enforced_rules_hash": "abc"
        }"#;
        let container: RulesContainer = serde_json::from_str(json).expect("container parses");
        assert_eq!(container.groups[0].user_ids, vec!["u1"]);
        assert_eq!(container.minimum_distinct_user_signatures, 3);
        assert_eq!(container.enforced_rules_hash.as_deref(), Some("abc"));
        assert!(container.users[0].has_role(&Role::SuperAdmin));
    }

    #[test]
    fn roles_accept_names_and_codes() {
        let json = r#"{"users": [{"id": "u1", "roles": ["OPERATOR", 1, 99]}]}"#;
        let container: RulesContainer = serde_json::from_str(json).expect("container parses");
        assert_eq!(
            container.users[0].roles,
            vec![
                Role::Operator,
                Role::SuperAdmin,
                Role::Other("UNKNOWN_99".into())
            ]
        );
    }

    #[test]
    fn unparseable_public_key_becomes_none() {
        let json = r#"{"users": [{"id": "u1", "publicKey": "garbage"}]}"#;
        let container: RulesContainer = serde_json::from_str(json).expect("container parses");
        assert!(container.users[0].public_key.is_none());
    }

    #[test]
    fn empty_document_is_structurally_empty() {
        let container: RulesContainer = serde_json::from_str("{}").expect("container parses");
        assert!(container.is_structurally_empty());
        assert_eq!(container, RulesContainer::default());
    }

    #[test]
    fn normalized_shape_round_trips() {
        let json = r#"{
            "users": [{"id": "u1", "roles": ["SUPERADMIN"], "properties": {"team": "ops"}}],
            "groups": [{"id": "g1", "userIds": ["u1"]}],
            "addressWhitelistingRules": [{
                "currency": "BTC",
                "network": "mainnet",
                "parallelThresholds": [{"groupId": "g1", "minimumSignatures": 1}]
            }],
            "timestamp": 1700000000
        }"#;
        let container: RulesContainer = serde_json::from_str(json).expect("container parses");
        let encoded = serde_json::to_string(&container).expect("container encodes");
        let decoded: RulesContainer = serde_json::from_str(&encoded).expect("round trip parses");
        assert_eq!(container, decoded);
    }
}
