//! Client configuration.
//!
//! Everything the client needs is fixed at construction: the server base
//! URL, an optional API token, and the verification trust root (trusted
//! SuperAdmin keys plus the signature minimum). There is no global mutable
//! configuration; the parsed trust root is captured by value into each
//! verifier.
//!
//! Environment variables used by [`ProtectConfig::from_env`]:
//! - `PROTECT_BASE_URL` — server base URL (required)
//! - `PROTECT_API_TOKEN` — bearer token, optional
//! - `PROTECT_SUPERADMIN_KEYS` — concatenated PEM public keys, optional
//! - `PROTECT_MIN_VALID_SIGNATURES` — non-negative integer, default 1

use std::env;
use url::Url;

use protect_types::PublicKey;
use protect_types::error::ValidationError;
use protect_verify::VerificationConfig;

const ENV_BASE_URL: &str = "PROTECT_BASE_URL";
const ENV_API_TOKEN: &str = "PROTECT_API_TOKEN";
const ENV_SUPERADMIN_KEYS: &str = "PROTECT_SUPERADMIN_KEYS";
const ENV_MIN_VALID_SIGNATURES: &str = "PROTECT_MIN_VALID_SIGNATURES";

/// When the rules-container cache refreshes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheRefreshPolicy {
    /// Fetch on the first miss after construction or invalidation.
    #[default]
    OnMiss,
}

/// Options recognized at client construction.
#[derive(Debug, Clone)]
pub struct ProtectConfig {
    /// Base URL of the Protect server.
    pub base_url: Url,
    /// Bearer token attached to every request, if any.
    pub api_token: Option<String>,
    /// PEM-encoded trusted SuperAdmin public keys.
    pub trusted_super_admin_keys_pem: Vec<String>,
    /// Distinct SuperAdmin signatures required on the rules container.
    /// Zero disables governance verification and is only meant for tests.
    pub min_valid_signatures: u32,
    pub cache_refresh_policy: CacheRefreshPolicy,
}

impl ProtectConfig {
    /// Creates a configuration with defaults: no token, no trusted keys,
    /// one required signature, refresh on miss.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_token: None,
            trusted_super_admin_keys_pem: Vec::new(),
            min_valid_signatures: 1,
            cache_refresh_policy: CacheRefreshPolicy::default(),
        }
    }

    /// Reads the configuration from `PROTECT_*` environment variables.
    pub fn from_env() -> Result<Self, ValidationError> {
        let base_url = env::var(ENV_BASE_URL)
            .map_err(|_| ValidationError::InvalidConfig(format!("env {ENV_BASE_URL} not set")))?;
        let base_url = Url::parse(&base_url).map_err(|e| {
            ValidationError::InvalidConfig(format!("env {ENV_BASE_URL} is not a URL: {e}"))
        })?;

        let mut config = Self::new(base_url);
        config.api_token = env::var(ENV_API_TOKEN).ok();
        if let Ok(bundle) = env::var(ENV_SUPERADMIN_KEYS) {
            config.trusted_super_admin_keys_pem = split_pem_bundle(&bundle);
        }
        if let Ok(raw) = env::var(ENV_MIN_VALID_SIGNATURES) {
            config.min_valid_signatures = raw.parse().map_err(|_| {
                ValidationError::InvalidConfig(format!(
                    "env {ENV_MIN_VALID_SIGNATURES} must be a non-negative integer"
                ))
            })?;
        }
        Ok(config)
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_trusted_super_admin_keys(
        mut self,
        keys_pem: impl IntoIterator<Item = String>,
    ) -> Self {
        self.trusted_super_admin_keys_pem = keys_pem.into_iter().collect();
        self
    }

    pub fn with_min_valid_signatures(mut self, minimum: u32) -> Self {
        self.min_valid_signatures = minimum;
        self
    }

    /// Parses the configured PEM keys into the immutable trust root used by
    /// every verifier.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidTrustedKey`] if any configured PEM does not
    /// parse; a dropped trust anchor would silently weaken the threshold.
    pub fn verification_config(&self) -> Result<VerificationConfig, ValidationError> {
        let mut trusted_super_admin_keys =
            Vec::with_capacity(self.trusted_super_admin_keys_pem.len());
        for pem in &self.trusted_super_admin_keys_pem {
            let key = PublicKey::from_pem(pem)
                .map_err(|e| ValidationError::InvalidTrustedKey(e.to_string()))?;
            trusted_super_admin_keys.push(key);
        }
        Ok(VerificationConfig {
            trusted_super_admin_keys,
            min_valid_signatures: self.min_valid_signatures,
        })
    }
}

/// Splits a bundle of concatenated PEM documents into individual documents.
///
/// PEM text cannot be comma-separated the way single-line secrets are, so
/// the bundle form is simply the documents back to back.
pub fn split_pem_bundle(bundle: &str) -> Vec<String> {
    const END_MARKER: &str = "-----END PUBLIC KEY-----";
    let mut keys = Vec::new();
    let mut rest = bundle;
    while let Some(end) = rest.find(END_MARKER) {
        let (document, tail) = rest.split_at(end + END_MARKER.len());
        let document = document.trim();
        if !document.is_empty() {
            keys.push(format!("{document}\n"));
        }
        rest = tail;
    }
    keys
}
