//! The SDK entry point.
//!
//! A [`ProtectClient`] owns the transport, the parsed verification trust
//! root, and the rules-container cache. Construct it once per server and
//! share it freely: every operation is `&self`, verifiers keep no state
//! between calls, and the cache collapses concurrent refreshes into one
//! fetch.

use std::sync::Arc;

use protect_types::error::Error;
use protect_verify::cache::{CachedRules, RulesCache};
use protect_verify::governance::GovernanceRules;
use protect_verify::{VerificationConfig, user_signatures_from_base64, verify_governance_rules};

use crate::config::ProtectConfig;
use crate::services::{RequestService, WhitelistedAddressService, WhitelistedAssetService};
use crate::transport::{HttpTransport, Transport};

/// Client for a Protect server.
///
/// Generic over the transport so tests can substitute an in-memory one; the
/// default is [`HttpTransport`].
///
/// # Example
///
/// ```rust,no_run
/// use protect_rs::{ProtectClient, ProtectConfig};
/// use url::Url;
///
/// # async fn example() -> Result<(), protect_rs::Error> {
/// let config = ProtectConfig::new(Url::parse("https://protect.example.com/api/rest/v1").unwrap())
///     .with_api_token("token")
///     .with_min_valid_signatures(2);
/// let client = ProtectClient::new(config)?;
/// let address = client.whitelisted_addresses().get(42).await?;
/// # Ok(())
/// # }
/// ```
pub struct ProtectClient<T = HttpTransport> {
    transport: Arc<T>,
    verification: VerificationConfig,
    rules_cache: RulesCache,
}

impl ProtectClient<HttpTransport> {
    /// Builds a client from configuration.
    ///
    /// Trusted SuperAdmin keys are parsed here, once; a key that does not
    /// parse fails construction rather than weakening the threshold later.
    pub fn new(config: ProtectConfig) -> Result<Self, Error> {
        let verification = config.verification_config()?;
        let transport = HttpTransport::new(config.base_url, config.api_token);
        Ok(Self::with_transport(transport, verification))
    }
}

impl<T> ProtectClient<T>
where
    T: Transport + Send + Sync + 'static,
{
    /// Builds a client over an arbitrary transport.
    pub fn with_transport(transport: T, verification: VerificationConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            verification,
            rules_cache: RulesCache::new(),
        }
    }

    /// The whitelisted-address service.
    pub fn whitelisted_addresses(&self) -> WhitelistedAddressService<Arc<T>> {
        WhitelistedAddressService::new(Arc::clone(&self.transport), self.verification.clone())
    }

    /// The whitelisted-asset service.
    pub fn whitelisted_assets(&self) -> WhitelistedAssetService<Arc<T>> {
        WhitelistedAssetService::new(Arc::clone(&self.transport), self.verification.clone())
    }

    /// The request service.
    pub fn requests(&self) -> RequestService<Arc<T>> {
        RequestService::new(Arc::clone(&self.transport))
    }

    /// Returns the current rules container, fetching and verifying it on a
    /// cache miss.
    ///
    /// The SuperAdmin signatures are checked before the container enters the
    /// cache, so a cached container is always a trusted one. Concurrent
    /// misses collapse into a single fetch.
    pub async fn rules_container(&self) -> Result<Arc<CachedRules>, Error> {
        let transport = Arc::clone(&self.transport);
        let verification = self.verification.clone();
        self.rules_cache
            .get(move || async move {
                let envelope = transport.fetch_rules().await?;
                if verification.min_valid_signatures > 0 {
                    let signatures = user_signatures_from_base64(&envelope.rules_signatures)?;
                    verify_governance_rules(
                        &GovernanceRules {
                            rules_container_base64: envelope.rules_container.clone(),
                            signatures,
                        },
                        &verification,
                    )?;
                }
                Ok(envelope.rules_container)
            })
            .await
    }

    /// Drops the cached rules container; the next
    /// [`rules_container`](Self::rules_container) call fetches a fresh one.
    pub async fn invalidate_rules(&self) {
        self.rules_cache.invalidate().await;
    }
}
