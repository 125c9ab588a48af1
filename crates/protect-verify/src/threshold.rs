//! Threshold evaluation.
//!
//! A whitelisting rule carries *parallel thresholds*: a disjunction of
//! *sequential threshold sets*, each an ordered conjunction of group
//! thresholds with pairwise-disjoint signer sets. Satisfying any one
//! sequential set satisfies the rule.
//!
//! Allocation is greedy and deterministic: thresholds are processed in
//! declaration order, and within a threshold candidate signers are taken in
//! the group's `user_ids` order. A user who belongs to several groups is
//! credited to the earliest threshold whose group contains them and still
//! needs signatures. Nothing depends on hash-map iteration order, so the
//! verdict and the credited sets are invariant under shuffling of the input
//! signature list.

use std::collections::BTreeSet;

use protect_types::error::IntegrityError;
use protect_types::rules::{RulesContainer, SequentialThresholds};
use protect_types::util::b64;
use protect_types::wire::PayloadSignature;

use crate::crypto;

struct ThresholdFailure {
    sequential_index: usize,
    threshold_index: usize,
    group_id: String,
    satisfied: u32,
    required: u32,
}

/// Evaluates `parallel` against the supplied signatures.
///
/// `signatures` must already be filtered to those covering `target_hash`;
/// each one is checked to ECDSA-verify over the UTF-8 bytes of the hash
/// string using the signer's public key from `container`. Signatures by
/// unknown users, with undecodable DER, or that fail verification simply do
/// not count.
///
/// On success returns the credited user ids per threshold of the satisfied
/// sequential set. On failure returns
/// [`IntegrityError::ThresholdNotMet`] describing the sequential set that
/// failed last; `rule` labels the rule for that diagnostic.
pub fn evaluate_parallel_thresholds(
    container: &RulesContainer,
    parallel: &[SequentialThresholds],
    target_hash: &str,
    signatures: &[PayloadSignature],
    rule: &str,
) -> Result<Vec<BTreeSet<String>>, IntegrityError> {
    let verified = verified_signers(container, target_hash, signatures);

    let mut last_failure: Option<ThresholdFailure> = None;
    for (sequential_index, sequential) in parallel.iter().enumerate() {
        match try_sequential(container, sequential, &verified, sequential_index) {
            Ok(allocation) => return Ok(allocation),
            Err(failure) => last_failure = Some(failure),
        }
    }

    let failure = last_failure.unwrap_or(ThresholdFailure {
        sequential_index: 0,
        threshold_index: 0,
        group_id: String::new(),
        satisfied: 0,
        required: 0,
    });
    Err(IntegrityError::ThresholdNotMet {
        rule: rule.to_owned(),
        sequential_index: failure.sequential_index,
        threshold_index: failure.threshold_index,
        group_id: failure.group_id,
        satisfied: failure.satisfied,
        required: failure.required,
    })
}

/// The set of user ids whose signature verifies over the target hash.
///
/// Duplicate user ids collapse into one entry; the first decodable,
/// verifying signature wins.
fn verified_signers(
    container: &RulesContainer,
    target_hash: &str,
    signatures: &[PayloadSignature],
) -> BTreeSet<String> {
    let mut verified = BTreeSet::new();
    for signature in signatures {
        let user_id = &signature.user_signature.user_id;
        if verified.contains(user_id) {
            continue;
        }
        let Some(key) = container.user(user_id).and_then(|u| u.public_key.as_ref()) else {
            continue;
        };
        let Ok(der) = b64::decode(&signature.user_signature.signature) else {
            continue;
        };
        if crypto::ecdsa_verify(key, target_hash.as_bytes(), &der) {
            verified.insert(user_id.clone());
        }
    }
    verified
}

fn try_sequential(
    container: &RulesContainer,
    sequential: &SequentialThresholds,
    verified: &BTreeSet<String>,
    sequential_index: usize,
) -> Result<Vec<BTreeSet<String>>, ThresholdFailure> {
    // A sequential set with no thresholds authorizes nothing: treating it as
    // vacuously satisfied would turn a misconfigured rule into auto-approval.
    if sequential.thresholds.is_empty() {
        return Err(ThresholdFailure {
            sequential_index,
            threshold_index: 0,
            group_id: String::new(),
            satisfied: 0,
            required: 0,
        });
    }

    let mut used: BTreeSet<&str> = BTreeSet::new();
    let mut allocation: Vec<BTreeSet<String>> = Vec::with_capacity(sequential.thresholds.len());

    for (threshold_index, threshold) in sequential.thresholds.iter().enumerate() {
        let required = threshold.minimum_signatures;
        let Some(group) = container.group(&threshold.group_id) else {
            return Err(ThresholdFailure {
                sequential_index,
                threshold_index,
                group_id: threshold.group_id.clone(),
                satisfied: 0,
                required,
            });
        };

        let mut selected: BTreeSet<String> = BTreeSet::new();
        for user_id in &group.user_ids {
            if selected.len() as u32 >= required {
                break;
            }
            if used.contains(user_id.as_str()) {
                continue;
            }
            if verified.contains(user_id) {
                selected.insert(user_id.clone());
            }
        }

        if (selected.len() as u32) < required {
            return Err(ThresholdFailure {
                sequential_index,
                threshold_index,
                group_id: threshold.group_id.clone(),
                satisfied: selected.len() as u32,
                required,
            });
        }
        used.extend(group.user_ids.iter().filter(|u| selected.contains(*u)).map(String::as_str));
        allocation.push(selected);
    }

    Ok(allocation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::SigningKey;
    use protect_types::wire::UserSignature;
    use protect_types::PublicKey;
    use std::collections::BTreeMap;

    /// Builds a container plus signing keys for the given user ids.
    fn fixture(
        users: &[&str],
        groups: &[(&str, &[&str])],
    ) -> (RulesContainer, BTreeMap<String, SigningKey>) {
        use protect_types::rules::{Group, User};
        let mut keys = BTreeMap::new();
        let mut container = RulesContainer::default();
        for id in users {
            let signing = SigningKey::random(&mut rand::thread_rng());
            container.users.push(User {
                id: (*id).into(),
                public_key: Some(PublicKey::from(*signing.verifying_key())),
                roles: Vec::new(),
                properties: Default::default(),
            });
            keys.insert((*id).to_string(), signing);
        }
        for (id, members) in groups {
            container.groups.push(Group {
                id: (*id).into(),
                user_ids: members.iter().map(|m| (*m).to_string()).collect(),
                properties: Default::default(),
            });
        }
        (container, keys)
    }

    fn parallel(json: &str) -> Vec<SequentialThresholds> {
        serde_json::from_str(json).expect("thresholds parse")
    }

    fn signature(keys: &BTreeMap<String, SigningKey>, user_id: &str, hash: &str) -> PayloadSignature {
        PayloadSignature {
            user_signature: UserSignature {
                user_id: user_id.into(),
                signature: b64::encode(crypto::ecdsa_sign(&keys[user_id], hash.as_bytes())),
            },
            covered_hashes: vec![hash.into()],
        }
    }

    const HASH: &str = "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";

    #[test]
    fn single_group_threshold_met() {
        let (container, keys) = fixture(&["u1"], &[("team1", &["u1"])]);
        let parallel = parallel(
            r#"[{"thresholds": [{"groupId": "team1", "minimumSignatures": 1}]}]"#,
        );
        let allocation = evaluate_parallel_thresholds(
            &container,
            &parallel,
            HASH,
            &[signature(&keys, "u1", HASH)],
            "(ALGO, mainnet)",
        )
        .expect("threshold met");
        assert_eq!(allocation.len(), 1);
        assert!(allocation[0].contains("u1"));
    }

    #[test]
    fn sequential_sets_need_disjoint_signers() {
        // u1 belongs to both groups; a single signature cannot satisfy both
        // thresholds.
        let (container, keys) =
            fixture(&["u1", "u2"], &[("a", &["u1", "u2"]), ("b", &["u1"])]);
        let parallel = parallel(
            r#"[{"thresholds": [
                {"groupId": "a", "minimumSignatures": 1},
                {"groupId": "b", "minimumSignatures": 1}
            ]}]"#,
        );

        let err = evaluate_parallel_thresholds(
            &container,
            &parallel,
            HASH,
            &[signature(&keys, "u1", HASH)],
            "rule",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            IntegrityError::ThresholdNotMet {
                threshold_index: 1,
                satisfied: 0,
                required: 1,
                ..
            }
        ));

        // With u2 signing as well, u1 goes to the earliest threshold (group
        // a) and u2 cannot stand in for group b.
        let err = evaluate_parallel_thresholds(
            &container,
            &parallel,
            HASH,
            &[signature(&keys, "u1", HASH), signature(&keys, "u2", HASH)],
            "rule",
        )
        .unwrap_err();
        assert!(matches!(err, IntegrityError::ThresholdNotMet { .. }));
    }

    #[test]
    fn greedy_allocation_prefers_container_order() {
        // Both members of "a" signed but only one is needed; the credited
        // signer is the first in the group's user_ids order, regardless of
        // input order.
        let (container, keys) = fixture(&["u1", "u2"], &[("a", &["u1", "u2"])]);
        let parallel =
            parallel(r#"[{"thresholds": [{"groupId": "a", "minimumSignatures": 1}]}]"#);
        let forward = [signature(&keys, "u1", HASH), signature(&keys, "u2", HASH)];
        let reversed = [signature(&keys, "u2", HASH), signature(&keys, "u1", HASH)];

        let a = evaluate_parallel_thresholds(&container, &parallel, HASH, &forward, "rule")
            .expect("met");
        let b = evaluate_parallel_thresholds(&container, &parallel, HASH, &reversed, "rule")
            .expect("met");
        assert_eq!(a, b);
        assert!(a[0].contains("u1"));
        assert!(!a[0].contains("u2"));
    }

    #[test]
    fn any_parallel_branch_suffices() {
        let (container, keys) =
            fixture(&["u1", "u2"], &[("ops", &["u1"]), ("risk", &["u2"])]);
        let parallel = parallel(
            r#"[
                {"thresholds": [{"groupId": "ops", "minimumSignatures": 1}]},
                {"thresholds": [{"groupId": "risk", "minimumSignatures": 1}]}
            ]"#,
        );
        // Only the second branch is satisfiable.
        evaluate_parallel_thresholds(
            &container,
            &parallel,
            HASH,
            &[signature(&keys, "u2", HASH)],
            "rule",
        )
        .expect("second branch satisfied");
    }

    #[test]
    fn signature_over_wrong_hash_does_not_count() {
        let (container, keys) = fixture(&["u1"], &[("a", &["u1"])]);
        let parallel =
            parallel(r#"[{"thresholds": [{"groupId": "a", "minimumSignatures": 1}]}]"#);
        let other_hash = "ff".repeat(32);
        let stale = PayloadSignature {
            user_signature: UserSignature {
                user_id: "u1".into(),
                signature: b64::encode(crypto::ecdsa_sign(&keys["u1"], other_hash.as_bytes())),
            },
            covered_hashes: vec![HASH.into()],
        };
        let err =
            evaluate_parallel_thresholds(&container, &parallel, HASH, &[stale], "rule")
                .unwrap_err();
        assert!(matches!(err, IntegrityError::ThresholdNotMet { .. }));
    }

    #[test]
    fn unknown_group_fails_the_branch() {
        let (container, keys) = fixture(&["u1"], &[("a", &["u1"])]);
        let parallel =
            parallel(r#"[{"thresholds": [{"groupId": "ghost", "minimumSignatures": 1}]}]"#);
        let err = evaluate_parallel_thresholds(
            &container,
            &parallel,
            HASH,
            &[signature(&keys, "u1", HASH)],
            "rule",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            IntegrityError::ThresholdNotMet { group_id, .. } if group_id == "ghost"
        ));
    }

    #[test]
    fn empty_parallel_and_empty_sequential_reject() {
        let (container, keys) = fixture(&["u1"], &[("a", &["u1"])]);
        let signatures = [signature(&keys, "u1", HASH)];

        let err =
            evaluate_parallel_thresholds(&container, &[], HASH, &signatures, "rule")
                .unwrap_err();
        assert!(matches!(err, IntegrityError::ThresholdNotMet { .. }));

        let empty_sequential = parallel(r#"[{"thresholds": []}]"#);
        let err = evaluate_parallel_thresholds(
            &container,
            &empty_sequential,
            HASH,
            &signatures,
            "rule",
        )
        .unwrap_err();
        assert!(matches!(err, IntegrityError::ThresholdNotMet { .. }));
    }

    #[test]
    fn duplicate_signatures_count_once() {
        let (container, keys) = fixture(&["u1", "u2"], &[("a", &["u1", "u2"])]);
        let parallel =
            parallel(r#"[{"thresholds": [{"groupId": "a", "minimumSignatures": 2}]}]"#);
        let err = evaluate_parallel_thresholds(
            &container,
            &parallel,
            HASH,
            &[signature(&keys, "u1", HASH), signature(&keys, "u1", HASH)],
            "rule",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            IntegrityError::ThresholdNotMet {
                satisfied: 1,
                required: 2,
                ..
            }
        ));
    }
}
