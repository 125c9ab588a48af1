//! Hand-written protobuf messages for the rules-container wire form.
//!
//! The server's binary encoding is small and stable enough that the messages
//! are declared inline rather than generated. Field tags follow the wire
//! schema; tag 5 of `RulesContainer` carries transaction rules the SDK does
//! not consume and is left undeclared, which makes the decoder skip it.
//!
//! Decoded messages are normalized into
//! [`protect_types::rules`] types by the [`container`](crate::container)
//! module; nothing outside that module should touch these structs.

use std::collections::BTreeMap;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct User {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    /// SPKI DER, or a raw SEC1 point on older servers.
    #[prost(bytes = "vec", tag = "2")]
    pub public_key: ::prost::alloc::vec::Vec<u8>,
    /// Role enum integers; mapped to textual role names during decoding.
    #[prost(int32, repeated, tag = "3")]
    pub roles: ::prost::alloc::vec::Vec<i32>,
    #[prost(btree_map = "string, string", tag = "4")]
    pub properties: BTreeMap<::prost::alloc::string::String, ::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Group {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "2")]
    pub user_ids: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(btree_map = "string, string", tag = "3")]
    pub properties: BTreeMap<::prost::alloc::string::String, ::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GroupThreshold {
    #[prost(string, tag = "1")]
    pub group_id: ::prost::alloc::string::String,
    #[prost(uint32, tag = "2")]
    pub minimum_signatures: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SequentialThresholds {
    #[prost(message, repeated, tag = "1")]
    pub thresholds: ::prost::alloc::vec::Vec<GroupThreshold>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AddressWhitelistingRule {
    #[prost(string, tag = "1")]
    pub currency: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub network: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "3")]
    pub parallel_thresholds: ::prost::alloc::vec::Vec<SequentialThresholds>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContractAddressWhitelistingRule {
    #[prost(string, tag = "1")]
    pub blockchain: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub network: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "3")]
    pub parallel_thresholds: ::prost::alloc::vec::Vec<SequentialThresholds>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RulesContainer {
    #[prost(message, repeated, tag = "1")]
    pub users: ::prost::alloc::vec::Vec<User>,
    #[prost(message, repeated, tag = "2")]
    pub groups: ::prost::alloc::vec::Vec<Group>,
    #[prost(uint32, tag = "3")]
    pub minimum_distinct_user_signatures: u32,
    #[prost(uint32, tag = "4")]
    pub minimum_distinct_group_signatures: u32,
    #[prost(message, repeated, tag = "6")]
    pub address_whitelisting_rules: ::prost::alloc::vec::Vec<AddressWhitelistingRule>,
    #[prost(message, repeated, tag = "7")]
    pub contract_address_whitelisting_rules:
        ::prost::alloc::vec::Vec<ContractAddressWhitelistingRule>,
    #[prost(string, tag = "8")]
    pub enforced_rules_hash: ::prost::alloc::string::String,
    #[prost(btree_map = "string, string", tag = "9")]
    pub properties: BTreeMap<::prost::alloc::string::String, ::prost::alloc::string::String>,
    #[prost(uint64, tag = "10")]
    pub timestamp: u64,
    #[prost(uint32, tag = "11")]
    pub minimum_commitment_signatures: u32,
    #[prost(string, repeated, tag = "12")]
    pub engine_identities: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, tag = "13")]
    pub hsm_slot_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserSignature {
    #[prost(string, tag = "1")]
    pub user_id: ::prost::alloc::string::String,
    /// DER-encoded ECDSA signature.
    #[prost(bytes = "vec", tag = "2")]
    pub signature: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserSignatures {
    #[prost(message, repeated, tag = "1")]
    pub signatures: ::prost::alloc::vec::Vec<UserSignature>,
}
