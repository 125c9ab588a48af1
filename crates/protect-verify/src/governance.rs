//! Governance-rules verification.
//!
//! A rules container is only trustworthy once enough distinct SuperAdmins
//! have signed its raw bytes. The trust root is local: the set of SuperAdmin
//! public keys configured at client construction, never anything the server
//! returns.

use std::collections::BTreeSet;

use protect_types::error::IntegrityError;
use protect_types::util::b64;
use protect_types::wire::UserSignature;
use protect_types::PublicKey;

use crate::crypto;

/// Verification settings captured at client construction.
///
/// `min_valid_signatures == 0` disables governance verification entirely and
/// is only meant for test environments.
#[derive(Debug, Clone, Default)]
pub struct VerificationConfig {
    /// Locally configured SuperAdmin public keys.
    pub trusted_super_admin_keys: Vec<PublicKey>,
    /// How many distinct SuperAdmins must have signed the container.
    pub min_valid_signatures: u32,
}

/// A rules container together with the SuperAdmin signatures over its bytes.
#[derive(Debug, Clone, Default)]
pub struct GovernanceRules {
    /// The container, still base64: signatures cover the raw decoded bytes,
    /// not any post-decode canonicalization.
    pub rules_container_base64: String,
    pub signatures: Vec<UserSignature>,
}

/// Verifies that enough distinct SuperAdmin signatures cover the container.
///
/// A signature counts when its DER decodes and verifies against any trusted
/// key; only the first verifying key is consulted, and duplicate user ids
/// count once.
///
/// # Errors
///
/// - [`IntegrityError::NoTrustedKeys`] - verification enabled, no keys
/// - [`IntegrityError::EmptyContainer`] - verification enabled, empty container
/// - [`IntegrityError::NoSignatures`] - verification enabled, no signatures
/// - [`IntegrityError::InsufficientSignatures`] - fewer distinct verifying
///   signers than required
pub fn verify_governance_rules(
    rules: &GovernanceRules,
    config: &VerificationConfig,
) -> Result<(), IntegrityError> {
    if config.min_valid_signatures == 0 {
        return Ok(());
    }
    if config.trusted_super_admin_keys.is_empty() {
        return Err(IntegrityError::NoTrustedKeys);
    }
    if rules.rules_container_base64.is_empty() {
        return Err(IntegrityError::EmptyContainer);
    }
    if rules.signatures.is_empty() {
        return Err(IntegrityError::NoSignatures);
    }

    let message = b64::decode(&rules.rules_container_base64)
        .map_err(|_| IntegrityError::MalformedContainer)?;

    let mut verified_users: BTreeSet<&str> = BTreeSet::new();
    for signature in &rules.signatures {
        if verified_users.contains(signature.user_id.as_str()) {
            continue;
        }
        let Ok(der) = b64::decode(&signature.signature) else {
            continue;
        };
        let verifies = config
            .trusted_super_admin_keys
            .iter()
            .any(|key| crypto::ecdsa_verify(key, &message, &der));
        if verifies {
            verified_users.insert(signature.user_id.as_str());
        }
    }

    let found = verified_users.len() as u32;
    if found >= config.min_valid_signatures {
        Ok(())
    } else {
        Err(IntegrityError::InsufficientSignatures {
            found,
            required: config.min_valid_signatures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::SigningKey;

    fn keypair() -> (SigningKey, PublicKey) {
        let signing = SigningKey::random(&mut rand::thread_rng());
        let public = PublicKey::from(*signing.verifying_key());
        (signing, public)
    }

    fn signed(user_id: &str, key: &SigningKey, message: &[u8]) -> UserSignature {
        UserSignature {
            user_id: user_id.into(),
            signature: b64::encode(crypto::ecdsa_sign(key, message)),
        }
    }

    const CONTAINER_B64: &str = "Y29udGFpbmVy"; // "container"

    #[test]
    fn two_distinct_superadmins_satisfy_two_required() {
        let (k1, p1) = keypair();
        let (k2, p2) = keypair();
        let config = VerificationConfig {
            trusted_super_admin_keys: vec![p1, p2],
            min_valid_signatures: 2,
        };
        let rules = GovernanceRules {
            rules_container_base64: CONTAINER_B64.into(),
            signatures: vec![
                signed("u1", &k1, b"container"),
                signed("u2", &k2, b"container"),
            ],
        };
        verify_governance_rules(&rules, &config).expect("two valid signatures");
    }

    #[test]
    fn duplicate_user_counts_once() {
        let (k1, p1) = keypair();
        let (k2, p2) = keypair();
        let config = VerificationConfig {
            trusted_super_admin_keys: vec![p1, p2],
            min_valid_signatures: 2,
        };
        let rules = GovernanceRules {
            rules_container_base64: CONTAINER_B64.into(),
            signatures: vec![
                signed("u1", &k1, b"container"),
                signed("u1", &k2, b"container"),
            ],
        };
        let err = verify_governance_rules(&rules, &config).unwrap_err();
        assert_eq!(
            err,
            IntegrityError::InsufficientSignatures {
                found: 1,
                required: 2
            }
        );
    }

    #[test]
    fn zero_minimum_disables_verification() {
        let config = VerificationConfig {
            trusted_super_admin_keys: Vec::new(),
            min_valid_signatures: 0,
        };
        verify_governance_rules(&GovernanceRules::default(), &config)
            .expect("verification disabled");
    }

    #[test]
    fn enabled_verification_requires_inputs() {
        let (_, p1) = keypair();
        let enabled = |keys: Vec<PublicKey>| VerificationConfig {
            trusted_super_admin_keys: keys,
            min_valid_signatures: 1,
        };

        let err = verify_governance_rules(&GovernanceRules::default(), &enabled(vec![]))
            .unwrap_err();
        assert_eq!(err, IntegrityError::NoTrustedKeys);

        let err = verify_governance_rules(
            &GovernanceRules::default(),
            &enabled(vec![p1.clone()]),
        )
        .unwrap_err();
        assert_eq!(err, IntegrityError::EmptyContainer);

        let err = verify_governance_rules(
            &GovernanceRules {
                rules_container_base64: CONTAINER_B64.into(),
                signatures: vec![],
            },
            &enabled(vec![p1]),
        )
        .unwrap_err();
        assert_eq!(err, IntegrityError::NoSignatures);
    }

    #[test]
    fn signature_by_untrusted_key_does_not_count() {
        let (trusted_key, trusted_public) = keypair();
        let (rogue_key, _) = keypair();
        let config = VerificationConfig {
            trusted_super_admin_keys: vec![trusted_public],
            min_valid_signatures: 2,
        };
        let rules = GovernanceRules {
            rules_container_base64: CONTAINER_B64.into(),
            signatures: vec![
                signed("u1", &trusted_key, b"container"),
                signed("u2", &rogue_key, b"container"),
            ],
        };
        let err = verify_governance_rules(&rules, &config).unwrap_err();
        assert_eq!(
            err,
            IntegrityError::InsufficientSignatures {
                found: 1,
                required: 2
            }
        );
    }

    #[test]
    fn undecodable_signature_is_skipped() {
        let (k1, p1) = keypair();
        let config = VerificationConfig {
            trusted_super_admin_keys: vec![p1],
            min_valid_signatures: 1,
        };
        let rules = GovernanceRules {
            rules_container_base64: CONTAINER_B64.into(),
            signatures: vec![
                UserSignature {
                    user_id: "broken".into(),
                    signature: "!!! not base64".into(),
                },
                signed("u1", &k1, b"container"),
            ],
        };
        verify_governance_rules(&rules, &config).expect("valid signature still counts");
    }
}
