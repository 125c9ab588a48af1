//! Core types for the Protect custody SDK.
//!
//! This crate provides the foundational types shared by the verification core
//! and the client façade. It is transport-agnostic: nothing here performs
//! network I/O or drives a verification pipeline.
//!
//! # Overview
//!
//! A Protect deployment is governed by a *rules container*: a server-issued
//! document binding user ids to public keys and describing, per currency and
//! network, which signature thresholds authorize a whitelisted address or
//! asset. The server returns governed resources wrapped in *signed envelopes*
//! whose authenticated payload is a JSON string plus its SHA-256 hash; the
//! loose fields on the envelope itself are convenience hints and are never
//! trusted.
//!
//! # Modules
//!
//! - [`error`] - The error taxonomy shared across the SDK
//! - [`keys`] - ECDSA P-256 public key wrapper with PEM/DER/SEC1 loading
//! - [`rules`] - The normalized governance model (users, groups, thresholds)
//! - [`wire`] - Wire DTOs: signed envelopes, requests, approval bodies
//! - [`verified`] - Value types built exclusively from authenticated payloads
//! - [`util`] - Helpers (base64, lenient serde)

pub mod error;
pub mod keys;
pub mod rules;
pub mod util;
pub mod verified;
pub mod wire;

pub use error::{Error, IntegrityError, NotFoundError, TransportError, ValidationError};
pub use keys::PublicKey;
pub use rules::RulesContainer;
