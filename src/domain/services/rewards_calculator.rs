use num_bigint::BigUint;
use std::str::FromStr;

use super::perbill::Perbill;
use crate::domain::errors::RewardsError;

/// Splits an era payout between validators and their nominators
#[derive(Debug, Clone)]
pub struct RewardsCalculator {
    total_era_reward_points: BigUint,
    total_era_reward_payout: BigUint,
}

impl RewardsCalculator {
    /// `payout` must be a base-10 integer string
    pub fn new(total_era_reward_points: i64, payout: &str) -> Result<Self, RewardsError> {
        let total_era_reward_payout = BigUint::from_str(payout)
            .map_err(|_| RewardsError::InvalidQuantity(payout.to_string()))?;

        Ok(Self {
            total_era_reward_points: non_negative(total_era_reward_points),
            total_era_reward_payout,
        })
    }

    /// Returns `(commission_payout, leftover_payout)` for one validator.
    ///
    /// The leftover is what gets split between the validator's exposure.
    pub fn commission_payout(
        &self,
        validator_reward_points: i64,
        validator_commission_parts: i64,
    ) -> (BigUint, BigUint) {
        let reward_share = Perbill::from_rational_approximation(
            &non_negative(validator_reward_points),
            &self.total_era_reward_points,
        );
        let total_payout = reward_share.mul_floor(&self.total_era_reward_payout);

        let commission = Perbill::from_parts(validator_commission_parts);
        let commission_payout = commission.mul_floor(&total_payout);
        let leftover_payout = &total_payout - &commission_payout;

        (commission_payout, leftover_payout)
    }

    /// Share of `validator_leftover_payout` owed to a stake of `nominator_stake`
    pub fn nominator_payout(
        &self,
        validator_leftover_payout: &BigUint,
        nominator_stake: &BigUint,
        validator_stake: &BigUint,
    ) -> BigUint {
        let exposure_share = Perbill::from_rational_approximation(nominator_stake, validator_stake);
        exposure_share.mul_floor(validator_leftover_payout)
    }
}

fn non_negative(value: i64) -> BigUint {
    BigUint::from(u64::try_from(value).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn test_rejects_invalid_payout() {
        for bad in ["", "12.5", "abc", "-100", "1e9"] {
            match RewardsCalculator::new(100, bad) {
                Err(RewardsError::InvalidQuantity(raw)) => assert_eq!(raw, bad),
                other => panic!("expected InvalidQuantity for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_commission_payout() {
        let calc = RewardsCalculator::new(100, "1000000000000").unwrap();
        let (commission, leftover) = calc.commission_payout(25, 100_000_000);

        assert_eq!(commission, big(25_000_000_000));
        assert_eq!(leftover, big(225_000_000_000));
    }

    #[test]
    fn test_commission_and_leftover_sum_to_total_payout() {
        let calc = RewardsCalculator::new(7_919, "348759123918237498127349").unwrap();
        let cases = [
            (1, 0),
            (13, 1),
            (2_000, 33_333_333),
            (7_919, 1_000_000_000),
            (500, 999_999_999),
        ];
        for (points, commission_parts) in cases {
            let (commission, leftover) = calc.commission_payout(points, commission_parts);
            let share = Perbill::from_rational_approximation(&big(points as u64), &big(7_919));
            let total = share.mul_floor(&"348759123918237498127349".parse().unwrap());
            assert_eq!(&commission + &leftover, total);
        }
    }

    #[test]
    fn test_full_commission_leaves_nothing() {
        let calc = RewardsCalculator::new(10, "5000").unwrap();
        let (commission, leftover) = calc.commission_payout(10, 1_000_000_000);
        assert_eq!(commission, big(5000));
        assert_eq!(leftover, big(0));
    }

    #[test]
    fn test_nominator_payouts_never_exceed_leftover() {
        let calc = RewardsCalculator::new(100, "1000000000000").unwrap();
        let (_, leftover) = calc.commission_payout(25, 100_000_000);

        let stakes = [big(100), big(100), big(100)];
        let validator_stake: BigUint = stakes.iter().sum();
        let paid: BigUint = stakes
            .iter()
            .map(|stake| calc.nominator_payout(&leftover, stake, &validator_stake))
            .sum();

        assert!(paid <= leftover);
        // each share loses at most one part per billion
        let bound = big(stakes.len() as u64) * (&leftover / big(1_000_000_000) + big(1));
        assert!(&leftover - &paid <= bound);
    }

    #[test]
    fn test_evenly_divisible_stakes_distribute_whole_leftover() {
        let calc = RewardsCalculator::new(1, "0").unwrap();
        let leftover = big(225_000_000_000);
        let stakes = [big(250), big(250), big(500)];
        let validator_stake = big(1000);

        let paid: BigUint = stakes
            .iter()
            .map(|stake| calc.nominator_payout(&leftover, stake, &validator_stake))
            .sum();

        assert!(&leftover - &paid <= big(stakes.len() as u64));
    }

    #[test]
    fn test_zero_points_yield_no_payout() {
        let calc = RewardsCalculator::new(0, "900").unwrap();
        let (commission, leftover) = calc.commission_payout(0, 0);
        assert_eq!(commission, big(0));
        assert_eq!(leftover, big(0));
    }
}
