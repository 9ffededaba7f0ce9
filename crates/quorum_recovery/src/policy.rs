use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::combinations::Combinations;
use crate::error::RecoveryError;
use crate::traits::ShareCombiner;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecoveryPolicy {
    /// Combine the first `t` shares as given, no verification.
    #[default]
    Normal,
    /// Try `t`-subsets in order until one combines into a verifying signature.
    Optimistic,
    /// Verify shares one by one and combine the first `t` that pass.
    Pessimistic,
}

#[instrument(level = "debug", skip(combiner, shares), fields(shares = shares.len()))]
pub fn recover<C: ShareCombiner>(
    policy: RecoveryPolicy,
    combiner: &C,
    shares: &[C::Share],
    t: usize,
    n: usize,
) -> Result<C::Signature, RecoveryError> {
    if t == 0 || t > n {
        return Err(RecoveryError::InvalidThreshold { t, n });
    }
    if shares.len() < t {
        return Err(RecoveryError::InsufficientShares {
            got: shares.len(),
            need: t,
        });
    }
    match policy {
        RecoveryPolicy::Normal => recover_normal(combiner, shares, t),
        RecoveryPolicy::Optimistic => recover_optimistic(combiner, shares, t),
        RecoveryPolicy::Pessimistic => recover_pessimistic(combiner, shares, t),
    }
}

pub fn recover_normal<C: ShareCombiner>(
    combiner: &C,
    shares: &[C::Share],
    t: usize,
) -> Result<C::Signature, RecoveryError> {
    ensure_enough(shares.len(), t)?;
    let subset: Vec<&C::Share> = shares.iter().take(t).collect();
    combiner
        .combine(&subset)
        .map_err(|e| RecoveryError::Combine(e.to_string()))
}

pub fn recover_pessimistic<C: ShareCombiner>(
    combiner: &C,
    shares: &[C::Share],
    t: usize,
) -> Result<C::Signature, RecoveryError> {
    ensure_enough(shares.len(), t)?;
    let mut valid = Vec::with_capacity(t);
    for (index, share) in shares.iter().enumerate() {
        if combiner.verify_share(share) {
            valid.push(share);
            if valid.len() == t {
                break;
            }
        } else {
            debug!(index, "Share failed verification, skipping");
        }
    }
    if valid.len() < t {
        return Err(RecoveryError::InsufficientValidShares {
            valid: valid.len(),
            need: t,
        });
    }
    combiner
        .combine(&valid)
        .map_err(|e| RecoveryError::Combine(e.to_string()))
}

pub fn recover_optimistic<C: ShareCombiner>(
    combiner: &C,
    shares: &[C::Share],
    t: usize,
) -> Result<C::Signature, RecoveryError> {
    ensure_enough(shares.len(), t)?;
    let mut attempts = 0;
    for combination in Combinations::new(shares.len(), t) {
        attempts += 1;
        let subset: Vec<&C::Share> = combination.iter().map(|&i| &shares[i]).collect();
        match combiner.combine(&subset) {
            Ok(signature) if combiner.verify(&signature) => {
                debug!(attempts, ?combination, "Found verifying combination");
                return Ok(signature);
            }
            Ok(_) => trace!(?combination, "Combined signature does not verify"),
            Err(e) => trace!(?combination, "Combination failed: {e}"),
        }
    }
    Err(RecoveryError::NoValidCombination { attempts })
}

fn ensure_enough(got: usize, need: usize) -> Result<(), RecoveryError> {
    if got < need {
        return Err(RecoveryError::InsufficientShares { got, need });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy)]
    struct MockShare {
        id: usize,
        valid: bool,
    }

    #[derive(Debug, PartialEq)]
    struct MockSignature {
        ids: Vec<usize>,
        valid: bool,
    }

    #[derive(Default)]
    struct MockCombiner {
        combine_calls: Cell<usize>,
        share_checks: Cell<usize>,
        fail_combine: bool,
    }

    impl ShareCombiner for MockCombiner {
        type Share = MockShare;
        type Signature = MockSignature;
        type Error = String;

        fn verify_share(&self, share: &MockShare) -> bool {
            self.share_checks.set(self.share_checks.get() + 1);
            share.valid
        }

        fn combine(&self, shares: &[&MockShare]) -> Result<MockSignature, String> {
            self.combine_calls.set(self.combine_calls.get() + 1);
            if self.fail_combine {
                return Err("bad share encoding".to_string());
            }
            Ok(MockSignature {
                ids: shares.iter().map(|s| s.id).collect(),
                valid: shares.iter().all(|s| s.valid),
            })
        }

        fn verify(&self, signature: &MockSignature) -> bool {
            signature.valid
        }
    }

    fn shares(validity: &[bool]) -> Vec<MockShare> {
        validity
            .iter()
            .enumerate()
            .map(|(id, &valid)| MockShare { id, valid })
            .collect()
    }

    #[test]
    fn normal_combines_first_t_shares() {
        let combiner = MockCombiner::default();
        let signature = recover(RecoveryPolicy::Normal, &combiner, &shares(&[true; 3]), 3, 5).unwrap();
        assert!(combiner.verify(&signature));
        assert_eq!(signature.ids, vec![0, 1, 2]);
        assert_eq!(combiner.share_checks.get(), 0);
    }

    #[test]
    fn normal_does_not_detect_corruption() {
        let combiner = MockCombiner::default();
        let signature = recover(RecoveryPolicy::Normal, &combiner, &shares(&[false, true, true, true]), 3, 5).unwrap();
        assert!(!signature.valid);
    }

    #[test]
    fn every_policy_rejects_too_few_shares() {
        for policy in [RecoveryPolicy::Normal, RecoveryPolicy::Optimistic, RecoveryPolicy::Pessimistic] {
            let combiner = MockCombiner::default();
            let err = recover(policy, &combiner, &shares(&[true; 2]), 3, 5).unwrap_err();
            assert_eq!(err, RecoveryError::InsufficientShares { got: 2, need: 3 });
            assert_eq!(combiner.combine_calls.get(), 0);
            assert_eq!(combiner.share_checks.get(), 0);
        }
    }

    #[test]
    fn pessimistic_skips_corrupt_shares() {
        let combiner = MockCombiner::default();
        let input = shares(&[false, true, false, true, true]);
        let signature = recover(RecoveryPolicy::Pessimistic, &combiner, &input, 3, 5).unwrap();
        assert_eq!(signature.ids, vec![1, 3, 4]);
        assert!(signature.valid);
        assert_eq!(combiner.combine_calls.get(), 1);
    }

    #[test]
    fn pessimistic_fails_with_too_many_corrupt_shares() {
        let combiner = MockCombiner::default();
        let input = shares(&[false, false, true, false, false]);
        let err = recover(RecoveryPolicy::Pessimistic, &combiner, &input, 3, 5).unwrap_err();
        assert_eq!(err, RecoveryError::InsufficientValidShares { valid: 1, need: 3 });
        assert_eq!(combiner.combine_calls.get(), 0);
    }

    #[test]
    fn optimistic_finds_honest_subset() {
        let combiner = MockCombiner::default();
        let input = shares(&[true, true, false, true, true]);
        let signature = recover(RecoveryPolicy::Optimistic, &combiner, &input, 3, 5).unwrap();
        // [0,1,2] fails, [0,1,3] is next in order
        assert_eq!(signature.ids, vec![0, 1, 3]);
        assert_eq!(combiner.combine_calls.get(), 2);
    }

    #[test]
    fn optimistic_exhausts_all_subsets() {
        let combiner = MockCombiner::default();
        let err = recover(RecoveryPolicy::Optimistic, &combiner, &shares(&[false; 5]), 3, 5).unwrap_err();
        assert_eq!(err, RecoveryError::NoValidCombination { attempts: 10 });
        assert_eq!(combiner.combine_calls.get(), 10);
    }

    #[test]
    fn optimistic_treats_combine_errors_as_misses() {
        let combiner = MockCombiner {
            fail_combine: true,
            ..Default::default()
        };
        let err = recover(RecoveryPolicy::Optimistic, &combiner, &shares(&[true; 4]), 3, 4).unwrap_err();
        assert_eq!(err, RecoveryError::NoValidCombination { attempts: 4 });
    }

    #[test]
    fn normal_surfaces_combine_errors() {
        let combiner = MockCombiner {
            fail_combine: true,
            ..Default::default()
        };
        let err = recover(RecoveryPolicy::Normal, &combiner, &shares(&[true; 3]), 3, 3).unwrap_err();
        assert!(matches!(err, RecoveryError::Combine(_)));
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        let combiner = MockCombiner::default();
        assert_eq!(
            recover(RecoveryPolicy::Normal, &combiner, &shares(&[true; 3]), 0, 3).unwrap_err(),
            RecoveryError::InvalidThreshold { t: 0, n: 3 }
        );
        assert_eq!(
            recover(RecoveryPolicy::Normal, &combiner, &shares(&[true; 3]), 4, 3).unwrap_err(),
            RecoveryError::InvalidThreshold { t: 4, n: 3 }
        );
    }

    #[test]
    fn policy_names_parse() {
        assert_eq!(RecoveryPolicy::from_str("optimistic").unwrap(), RecoveryPolicy::Optimistic);
        assert_eq!(RecoveryPolicy::Pessimistic.to_string(), "pessimistic");
        assert_eq!(RecoveryPolicy::default(), RecoveryPolicy::Normal);
    }
}
