//! Error taxonomy for the Protect SDK.
//!
//! One surface, four families:
//!
//! - [`ValidationError`] - caller-supplied arguments violate a precondition;
//!   raised before any network or cryptographic work
//! - [`IntegrityError`] - verification failed; never recovered locally
//! - [`NotFoundError`] - the referenced entity does not exist
//! - [`TransportError`] - underlying HTTP failure, passed through untouched
//!
//! [`Error`] unifies the four for APIs that can fail in more than one way.

/// Top-level SDK error.
///
/// Wraps the four error families transparently so callers can match on the
/// family that interests them while `Display` stays informative.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// A precondition on caller-supplied arguments failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A verification step failed.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
    /// The referenced entity does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    /// The transport layer failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Caller-supplied arguments violate a precondition.
///
/// These are raised before any network or cryptographic work happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// An approval or rejection comment was empty where one is required.
    #[error("comment must not be empty")]
    EmptyComment,
    /// An approval was requested for an empty set of requests.
    #[error("at least one request is required")]
    NoRequests,
    /// A request is missing its metadata hash.
    #[error("request {request_id} has no metadata hash")]
    MissingHash { request_id: u64 },
    /// A private key could not be parsed.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),
    /// A configured trusted SuperAdmin key could not be parsed.
    #[error("invalid trusted SuperAdmin key: {0}")]
    InvalidTrustedKey(String),
    /// A required configuration value is missing or malformed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A verification step failed.
///
/// Verifiers never swallow these; a failure at any pipeline step aborts the
/// remaining steps and surfaces the error as-is. Variants carry enough
/// context to diagnose which check rejected the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    /// The rules container decoded as neither protobuf nor JSON.
    #[error("rules container is malformed")]
    MalformedContainer,
    /// The rules signatures blob decoded as neither protobuf nor JSON.
    #[error("rules signatures are malformed")]
    MalformedSignatures,
    /// A verified payload was not valid JSON.
    #[error("verified payload is not valid JSON: {0}")]
    MalformedPayload(String),
    /// Governance verification is enabled but no trusted keys are configured.
    #[error("no trusted SuperAdmin keys configured")]
    NoTrustedKeys,
    /// Governance verification is enabled but the container is empty.
    #[error("rules container is empty")]
    EmptyContainer,
    /// Governance verification is enabled but no signatures were supplied.
    #[error("no rules signatures supplied")]
    NoSignatures,
    /// Fewer distinct SuperAdmin signatures verified than required.
    #[error("insufficient valid SuperAdmin signatures: found {found}, required {required}")]
    InsufficientSignatures { found: u32, required: u32 },
    /// The recomputed payload hash does not match the supplied hash.
    #[error("payload hash does not match its content")]
    HashMismatch,
    /// A request's metadata hash does not match its payload.
    #[error("request {request_id} hash does not match its payload")]
    RequestHashMismatch { request_id: u64 },
    /// No whitelisting rule applies to the entity's key.
    #[error("no whitelisting rule applies to ({key}, {network})")]
    NoApplicableRule { key: String, network: String },
    /// More than one whitelisting rule applies to the entity's key.
    #[error("multiple whitelisting rules apply to ({key}, {network})")]
    AmbiguousRule { key: String, network: String },
    /// No sequential threshold set under the applicable rule was satisfied.
    #[error(
        "signature threshold not met for rule {rule}: sequential set {sequential_index}, \
         threshold {threshold_index} (group {group_id}) has {satisfied} of {required} signatures"
    )]
    ThresholdNotMet {
        rule: String,
        sequential_index: usize,
        threshold_index: usize,
        group_id: String,
        satisfied: u32,
        required: u32,
    },
}

/// The referenced entity does not exist on the server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{resource} {id} not found")]
pub struct NotFoundError {
    /// The resource kind, e.g. `"whitelisted address"`.
    pub resource: String,
    /// The identifier the caller asked for.
    pub id: String,
}

/// The transport layer failed.
///
/// Carried as strings so this crate stays free of HTTP dependencies; the
/// client crate maps its HTTP library's errors into these variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("http status {status}: {body}")]
    Status { status: u16, body: String },
    /// The request never completed (connect, timeout, TLS, ...).
    #[error("transport failure: {0}")]
    Failure(String),
    /// The response body could not be decoded.
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}
