//! Verification core for the Protect custody SDK.
//!
//! This crate turns opaque, server-returned blobs into objects the caller is
//! allowed to act upon. The server is not trusted: every whitelisted address
//! or asset is accepted only after its payload hash, the SuperAdmin
//! signatures over the governing rules container, and the container's
//! signature thresholds have all been checked against a locally configured
//! trust root.
//!
//! # Modules
//!
//! - [`crypto`] - SHA-256, constant-time comparison, ECDSA P-256 (DER)
//! - [`container`] - rules-container decoding (protobuf and JSON wire forms)
//! - [`governance`] - SuperAdmin signature verification over container bytes
//! - [`resolver`] - whitelisting-rule lookup per entity key
//! - [`threshold`] - sequential/parallel signature-threshold evaluation
//! - [`entity`] - the six-step pipeline for whitelisted addresses and assets
//! - [`approval`] - request hash verification and approval signing
//! - [`cache`] - single-flight cache of the decoded rules container
//!
//! Verifiers are re-entrant and keep no state across calls; the only mutable
//! state in this crate is the cache slot. Trusted-key material is captured
//! by value in a [`governance::VerificationConfig`] at client construction.

pub mod approval;
pub mod cache;
pub mod container;
pub mod crypto;
pub mod entity;
pub mod governance;
pub(crate) mod pb;
pub mod resolver;
pub mod threshold;

pub use cache::{CachedRules, RulesCache};
pub use container::{rules_container_from_base64, user_signatures_from_base64};
pub use entity::{verify_whitelisted_address, verify_whitelisted_asset};
pub use governance::{GovernanceRules, VerificationConfig, verify_governance_rules};
