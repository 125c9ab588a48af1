//! Service façades.
//!
//! Each service pairs a [`Transport`] with the verification trust root and
//! exposes only verified values. The flow is always fetch, verify, return:
//! a failing verification aborts the call, and nothing partially verified
//! escapes - a list call fails as a whole rather than silently dropping the
//! entity that failed.

use protect_types::error::Error;
use protect_types::verified::{VerifiedAddress, VerifiedAsset};
use protect_types::wire::Request;
use protect_verify::VerificationConfig;
use protect_verify::{approval, crypto, entity};

use crate::transport::Transport;

/// Fetches and verifies whitelisted addresses.
pub struct WhitelistedAddressService<T> {
    transport: T,
    verification: VerificationConfig,
}

impl<T: Transport> WhitelistedAddressService<T> {
    pub fn new(transport: T, verification: VerificationConfig) -> Self {
        Self {
            transport,
            verification,
        }
    }

    /// Fetches one whitelisted address and runs the verification pipeline.
    pub async fn get(&self, id: u64) -> Result<VerifiedAddress, Error> {
        let envelope = self.transport.fetch_whitelisted_address(id).await?;
        let address = entity::verify_whitelisted_address(&envelope, &self.verification)?;
        tracing::debug!(id, "whitelisted address verified");
        Ok(address)
    }

    /// Fetches all whitelisted addresses; every envelope must verify.
    pub async fn list(&self) -> Result<Vec<VerifiedAddress>, Error> {
        let envelopes = self.transport.fetch_whitelisted_addresses().await?;
        let mut addresses = Vec::with_capacity(envelopes.len());
        for envelope in &envelopes {
            addresses.push(entity::verify_whitelisted_address(envelope, &self.verification)?);
        }
        tracing::debug!(count = addresses.len(), "whitelisted addresses verified");
        Ok(addresses)
    }
}

/// Fetches and verifies whitelisted assets.
pub struct WhitelistedAssetService<T> {
    transport: T,
    verification: VerificationConfig,
}

impl<T: Transport> WhitelistedAssetService<T> {
    pub fn new(transport: T, verification: VerificationConfig) -> Self {
        Self {
            transport,
            verification,
        }
    }

    /// Fetches one whitelisted asset and runs the verification pipeline.
    pub async fn get(&self, id: u64) -> Result<VerifiedAsset, Error> {
        let envelope = self.transport.fetch_whitelisted_asset(id).await?;
        let asset = entity::verify_whitelisted_asset(&envelope, &self.verification)?;
        tracing::debug!(id, "whitelisted asset verified");
        Ok(asset)
    }

    /// Fetches all whitelisted assets; every envelope must verify.
    pub async fn list(&self) -> Result<Vec<VerifiedAsset>, Error> {
        let envelopes = self.transport.fetch_whitelisted_assets().await?;
        let mut assets = Vec::with_capacity(envelopes.len());
        for envelope in &envelopes {
            assets.push(entity::verify_whitelisted_asset(envelope, &self.verification)?);
        }
        tracing::debug!(count = assets.len(), "whitelisted assets verified");
        Ok(assets)
    }
}

/// Fetches requests and submits approvals and rejections.
pub struct RequestService<T> {
    transport: T,
}

impl<T: Transport> RequestService<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Fetches one request, verifying its metadata hash.
    pub async fn get(&self, id: u64) -> Result<Request, Error> {
        let request = self.transport.fetch_request(id).await?;
        approval::verify_request_hash(&request)?;
        Ok(request)
    }

    /// Fetches the pending requests, verifying every metadata hash.
    pub async fn list(&self) -> Result<Vec<Request>, Error> {
        let requests = self.transport.fetch_requests().await?;
        for request in &requests {
            approval::verify_request_hash(request)?;
        }
        tracing::debug!(count = requests.len(), "requests hash-verified");
        Ok(requests)
    }

    /// Approves a batch of requests with the caller's private key.
    ///
    /// The key is used for this call and dropped; the SDK never stores it.
    /// Hashes are re-verified before signing so a tampered request can never
    /// be co-signed.
    pub async fn approve(
        &self,
        requests: &[Request],
        signing_key_pem: &str,
        comment: &str,
    ) -> Result<(), Error> {
        for request in requests {
            approval::verify_request_hash(request)?;
        }
        let key = crypto::signing_key_from_pem(signing_key_pem)?;
        let body = approval::sign_approvals(requests, &key, comment)?;
        tracing::info!(ids = ?body.ids, "approving requests");
        self.transport.post_approval(&body).await
    }

    /// Rejects a batch of requests. Requires a non-empty comment and signs
    /// nothing.
    pub async fn reject(&self, ids: &[u64], comment: &str) -> Result<(), Error> {
        let body = approval::build_rejection(ids, comment)?;
        tracing::info!(ids = ?body.ids, "rejecting requests");
        self.transport.post_rejection(&body).await
    }
}
