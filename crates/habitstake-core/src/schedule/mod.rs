//! Seeded reward schedule generation.
//!
//! Partitions a deposit (in cents) into one hidden amount per contract day.
//! The partition is driven by a PCG generator seeded from a SHA-256 digest of
//! the contract id, so the same contract always reproduces the same
//! schedule. This is not a security boundary.
//!
//! ## Algorithm
//!
//! 1. Draw a weight per day: zero with `zero_day_probability`, otherwise
//!    uniform in `[100 - spread_pct, 100 + spread_pct]`.
//! 2. Share of day `i` is `floor(total * w_i / sum(w))`.
//! 3. The last day absorbs the rounding remainder, so the sum is exact.

use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::contract::{Contract, ContractDuration};
use crate::error::{EngineError, ScheduleError};

const BASE_WEIGHT: u64 = 100;
const MAX_SPREAD_PCT: u32 = 100;
const MAX_ZERO_DAY_PROBABILITY: f64 = 0.5;

/// How uneven the daily amounts are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariancePolicy {
    /// Maximum deviation of a day's weight from the mean, in percent (0-100).
    #[serde(default = "default_spread_pct")]
    pub spread_pct: u32,

    /// Chance that a day is worth nothing (0.0-0.5).
    #[serde(default = "default_zero_day_probability")]
    pub zero_day_probability: f64,
}

fn default_spread_pct() -> u32 {
    60
}
fn default_zero_day_probability() -> f64 {
    0.1
}

impl Default for VariancePolicy {
    fn default() -> Self {
        Self {
            spread_pct: default_spread_pct(),
            zero_day_probability: default_zero_day_probability(),
        }
    }
}

impl VariancePolicy {
    /// Even split: every day gets the same share, remainder on the last day.
    pub fn uniform() -> Self {
        Self {
            spread_pct: 0,
            zero_day_probability: 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.spread_pct > MAX_SPREAD_PCT {
            return Err(ScheduleError::InvalidPolicy {
                field: "spread_pct".into(),
                message: format!("{} exceeds {MAX_SPREAD_PCT}", self.spread_pct),
            });
        }
        if !(0.0..=MAX_ZERO_DAY_PROBABILITY).contains(&self.zero_day_probability) {
            return Err(ScheduleError::InvalidPolicy {
                field: "zero_day_probability".into(),
                message: format!(
                    "{} is outside 0.0..={MAX_ZERO_DAY_PROBABILITY}",
                    self.zero_day_probability
                ),
            });
        }
        Ok(())
    }
}

/// Derive the PRNG seed from a contract id.
fn seed_from(seed: &str) -> u64 {
    let digest = Sha256::digest(seed.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Generate the hidden per-day reward schedule.
///
/// # Errors
///
/// Returns an error if the policy is out of range or the deposit is zero.
pub fn generate_schedule(
    seed: &str,
    duration: ContractDuration,
    total_cents: u64,
    policy: &VariancePolicy,
) -> Result<Vec<u64>, ScheduleError> {
    policy.validate()?;
    if total_cents == 0 {
        return Err(ScheduleError::EmptyDeposit);
    }

    let days = duration.days() as usize;
    let mut rng = Mcg128Xsl64::seed_from_u64(seed_from(seed));

    let spread = u64::from(policy.spread_pct);
    let low = BASE_WEIGHT - spread;
    let high = BASE_WEIGHT + spread;

    let mut weights: Vec<u64> = (0..days)
        .map(|_| {
            // Both draws happen every day so the stream position does not
            // depend on the outcome of the zero-day roll.
            let zero = rng.gen_bool(policy.zero_day_probability);
            let weight = rng.gen_range(low..=high);
            if zero {
                0
            } else {
                weight
            }
        })
        .collect();

    if weights.iter().all(|w| *w == 0) {
        weights.iter_mut().for_each(|w| *w = 1);
    }

    let weight_sum: u128 = weights.iter().map(|w| u128::from(*w)).sum();
    let total = u128::from(total_cents);

    let mut shares: Vec<u64> = Vec::with_capacity(days);
    let mut allocated: u64 = 0;
    for weight in &weights[..days - 1] {
        // share <= total_cents, so the cast cannot truncate
        let share = (total * u128::from(*weight) / weight_sum) as u64;
        allocated += share;
        shares.push(share);
    }
    shares.push(total_cents - allocated);

    tracing::debug!(
        days,
        total_cents,
        spread_pct = policy.spread_pct,
        "generated reward schedule"
    );
    Ok(shares)
}

/// Check that a contract's schedule has one entry per day and sums to the
/// deposit. Amounts are integer cents, so the tolerance is zero.
pub fn validate_schedule(contract: &Contract) -> Result<(), EngineError> {
    let expected_len = contract.duration.days() as usize;
    let actual_len = contract.reward_schedule.len();
    let actual_sum = contract
        .reward_schedule
        .iter()
        .try_fold(0u64, |acc, v| acc.checked_add(*v))
        .unwrap_or(u64::MAX);

    if actual_len != expected_len || actual_sum != contract.deposit_cents {
        tracing::warn!(
            contract_id = %contract.id,
            expected_len,
            actual_len,
            "refusing to resolve contract with malformed schedule"
        );
        return Err(EngineError::MalformedSchedule {
            expected_len,
            actual_len,
            expected_sum: contract.deposit_cents,
            actual_sum,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_uniform_policy_splits_evenly() {
        let schedule =
            generate_schedule("seed", ContractDuration::Week, 14_000, &VariancePolicy::uniform())
                .unwrap();
        assert_eq!(schedule, vec![2_000; 7]);
    }

    #[test]
    fn test_remainder_goes_to_last_day() {
        let schedule =
            generate_schedule("seed", ContractDuration::Week, 1_000, &VariancePolicy::uniform())
                .unwrap();
        assert_eq!(&schedule[..6], &[142; 6]);
        assert_eq!(schedule[6], 148);
    }

    #[test]
    fn test_default_policy_is_not_uniform() {
        let schedule = generate_schedule(
            "3f1c2a9e-contract",
            ContractDuration::Month,
            30_000,
            &VariancePolicy::default(),
        )
        .unwrap();
        let first = schedule[0];
        assert!(schedule.iter().any(|v| *v != first));
    }

    #[test]
    fn test_different_seeds_differ() {
        let policy = VariancePolicy::default();
        let a = generate_schedule("alpha", ContractDuration::Month, 50_000, &policy).unwrap();
        let b = generate_schedule("beta", ContractDuration::Month, 50_000, &policy).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejects_bad_policy() {
        let policy = VariancePolicy {
            spread_pct: 150,
            zero_day_probability: 0.1,
        };
        assert!(matches!(
            generate_schedule("x", ContractDuration::Week, 100, &policy),
            Err(ScheduleError::InvalidPolicy { .. })
        ));

        let policy = VariancePolicy {
            spread_pct: 10,
            zero_day_probability: 0.9,
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_deposit() {
        assert_eq!(
            generate_schedule("x", ContractDuration::Week, 0, &VariancePolicy::default()),
            Err(ScheduleError::EmptyDeposit)
        );
    }

    #[test]
    fn test_full_spread_allows_zero_weight_days() {
        let policy = VariancePolicy {
            spread_pct: 100,
            zero_day_probability: 0.5,
        };
        // Conservation still holds when many days are worth nothing.
        for seed in ["a", "b", "c", "d"] {
            let schedule = generate_schedule(seed, ContractDuration::Month, 100, &policy).unwrap();
            assert_eq!(schedule.iter().sum::<u64>(), 100);
        }
    }

    fn any_duration() -> impl Strategy<Value = ContractDuration> {
        prop::sample::select(ContractDuration::ALL.to_vec())
    }

    fn any_policy() -> impl Strategy<Value = VariancePolicy> {
        (0u32..=100, 0.0f64..=0.5).prop_map(|(spread_pct, zero_day_probability)| VariancePolicy {
            spread_pct,
            zero_day_probability,
        })
    }

    proptest! {
        #[test]
        fn prop_schedule_conserves_deposit(
            seed in "[a-z0-9-]{1,36}",
            duration in any_duration(),
            total in 1u64..=10_000_000,
            policy in any_policy(),
        ) {
            let schedule = generate_schedule(&seed, duration, total, &policy).unwrap();
            prop_assert_eq!(schedule.len(), duration.days() as usize);
            prop_assert_eq!(schedule.iter().sum::<u64>(), total);
        }

        #[test]
        fn prop_schedule_is_deterministic(
            seed in "[a-z0-9-]{1,36}",
            duration in any_duration(),
            total in 1u64..=10_000_000,
            policy in any_policy(),
        ) {
            let a = generate_schedule(&seed, duration, total, &policy).unwrap();
            let b = generate_schedule(&seed, duration, total, &policy).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
