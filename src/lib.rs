//! Rust SDK for the Protect custody platform.
//!
//! Protect servers return governed resources - whitelisted addresses,
//! whitelisted assets, approval requests - wrapped in signed envelopes. This
//! crate fetches them and, before handing anything to the caller, verifies
//! the full chain of trust against a locally configured root:
//!
//! 1. the resource payload is content-addressed (SHA-256, constant-time
//!    compare);
//! 2. the rules container governing it carries enough distinct SuperAdmin
//!    signatures over its raw bytes;
//! 3. the signature thresholds of the applicable whitelisting rule are met
//!    by user signatures over the payload hash;
//! 4. the returned value is built from the authenticated payload alone -
//!    the envelope's convenience fields are treated as untrusted hints.
//!
//! Approvals go the other way: the SDK signs the canonical hash
//! concatenation of hash-verified requests with a caller-supplied key that
//! is never stored.
//!
//! # Crates
//!
//! - [`protect_types`] (re-exported as [`types`]) - wire DTOs, the
//!   governance model, verified value types, the error taxonomy
//! - [`protect_verify`] (re-exported as [`verify`]) - the verification core
//! - this crate - configuration, HTTP transport, service façades
//!
//! # Example
//!
//! ```rust,no_run
//! use protect_rs::{ProtectClient, ProtectConfig};
//! use url::Url;
//!
//! # async fn example() -> Result<(), protect_rs::Error> {
//! let config = ProtectConfig::from_env()?;
//! let client = ProtectClient::new(config)?;
//!
//! // Only verified values come back.
//! let addresses = client.whitelisted_addresses().list().await?;
//! for address in &addresses {
//!     println!("{:?} on {:?}", address.address, address.blockchain);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod services;
pub mod transport;

pub use protect_types as types;
pub use protect_verify as verify;

pub use client::ProtectClient;
pub use config::{CacheRefreshPolicy, ProtectConfig};
pub use protect_types::error::{
    Error, IntegrityError, NotFoundError, TransportError, ValidationError,
};
pub use protect_types::rules::RulesContainer;
pub use protect_types::verified::{VerifiedAddress, VerifiedAsset};
pub use protect_types::wire::Request;
pub use transport::{HttpTransport, Transport};
