use async_trait::async_trait;
use num_bigint::BigUint;
use num_traits::Zero;
use std::collections::BTreeMap;

use crate::application::indexer::payload::Payload;
use crate::application::pipeline::{StageName, Task};
use crate::application::pipeline::TaskError;
use crate::domain::models::{Quantity, RewardEraSeq, RewardKind, Sequence};
use crate::domain::services::RewardsCalculator;
use crate::utils::logging;

pub const REWARD_ERA_SEQ_CREATOR_TASK_NAME: &str = "RewardEraSeqCreator";

type RewardKey = (String, String, RewardKind);

/// Splits the era payout into commission and exposure rewards at era-final heights
pub struct RewardEraSeqCreatorTask;

#[async_trait]
impl Task<Payload> for RewardEraSeqCreatorTask {
    fn name(&self) -> &'static str {
        REWARD_ERA_SEQ_CREATOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        logging::log_task(
            StageName::Sequencer.as_str(),
            self.name(),
            payload.current_height,
            "running indexer task",
        );

        let syncable = payload.syncable()?;
        if !syncable.last_in_era {
            return Ok(());
        }
        let sequence = syncable.sequence();
        let staking = payload
            .raw()?
            .staking
            .as_ref()
            .ok_or(TaskError::MissingPayload("staking"))?;

        let calculator =
            match RewardsCalculator::new(staking.total_reward_points, &staking.total_reward_payout) {
                Ok(calculator) => calculator,
                Err(err) => {
                    logging::log_warning(&format!(
                        "Skipping rewards of era {} at height {}: {}",
                        staking.era, payload.current_height, err
                    ));
                    return Ok(());
                }
            };

        let era = staking.era;
        let mut amounts: BTreeMap<RewardKey, BigUint> = BTreeMap::new();
        let mut add = |stash: &str, validator: &str, kind: RewardKind, amount: BigUint| {
            if amount.is_zero() {
                return;
            }
            *amounts
                .entry((stash.to_string(), validator.to_string(), kind))
                .or_default() += amount;
        };

        for (validator, exposure) in payload.staked_validators() {
            let stash = validator.stash_account.as_str();
            let (commission, leftover) =
                calculator.commission_payout(exposure.reward_points, exposure.commission);
            add(stash, stash, RewardKind::Commission, commission);

            let validator_stake = exposure.total_stake.as_biguint();
            add(
                stash,
                stash,
                RewardKind::Reward,
                calculator.nominator_payout(&leftover, exposure.own_stake.as_biguint(), validator_stake),
            );
            for staker in &exposure.stakers {
                add(
                    &staker.stash_account,
                    stash,
                    RewardKind::Reward,
                    calculator.nominator_payout(&leftover, staker.stake.as_biguint(), validator_stake),
                );
            }
        }

        payload.reward_era_sequences = amounts
            .into_iter()
            .map(|((stash_account, validator_stash_account, kind), amount)| {
                reward_row(sequence, era, stash_account, validator_stash_account, kind, amount)
            })
            .collect();
        Ok(())
    }
}

fn reward_row(
    sequence: Sequence,
    era: i64,
    stash_account: String,
    validator_stash_account: String,
    kind: RewardKind,
    amount: BigUint,
) -> RewardEraSeq {
    RewardEraSeq {
        sequence,
        era,
        stash_account,
        validator_stash_account,
        kind,
        amount: Quantity::new(amount),
        claimed: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::indexer::payload::{ParsedStaking, ParsedValidator};
    use crate::application::indexer::sequencer_tasks::tests::syncable;
    use crate::application::pipeline::HeightPayload;
    use crate::domain::models::{RawHeightData, RawStaker, RawStaking};

    fn staked(stash: &str, points: i64, commission: i64, own: u64, stakers: &[(&str, u64)]) -> ParsedValidator {
        let total = own + stakers.iter().map(|(_, s)| s).sum::<u64>();
        ParsedValidator {
            stash_account: stash.to_string(),
            display_name: String::new(),
            performance: None,
            staking: Some(ParsedStaking {
                controller_account: String::new(),
                total_stake: Quantity::from(total),
                own_stake: Quantity::from(own),
                reward_points: points,
                commission,
                stakers: stakers
                    .iter()
                    .map(|(account, stake)| RawStaker {
                        stash_account: account.to_string(),
                        stake: Quantity::from(*stake),
                    })
                    .collect(),
            }),
        }
    }

    fn era_payload(payout: &str, validators: Vec<ParsedValidator>) -> Payload {
        let mut payload = Payload::for_height(100);
        payload.syncable = Some(syncable(100, true, true));
        payload.raw = Some(RawHeightData {
            staking: Some(RawStaking {
                era: 3,
                total_reward_points: 100,
                total_reward_payout: payout.to_string(),
                validators: vec![],
            }),
            ..Default::default()
        });
        payload.parsed_validators = validators
            .into_iter()
            .map(|v| (v.stash_account.clone(), v))
            .collect();
        payload
    }

    fn amount_of(payload: &Payload, stash: &str, validator: &str, kind: RewardKind) -> Option<String> {
        payload
            .reward_era_sequences
            .iter()
            .find(|r| r.stash_account == stash && r.validator_stash_account == validator && r.kind == kind)
            .map(|r| r.amount.to_string())
    }

    #[tokio::test]
    async fn test_splits_commission_and_exposure() {
        // 25 of 100 points, 10% commission, own stake 250 of 1000
        let mut payload = era_payload(
            "1000000000000",
            vec![staked("val", 25, 100_000_000, 250, &[("n1", 250), ("n2", 500)])],
        );

        RewardEraSeqCreatorTask.run(&mut payload).await.unwrap();

        assert_eq!(
            amount_of(&payload, "val", "val", RewardKind::Commission).as_deref(),
            Some("25000000000")
        );
        assert_eq!(
            amount_of(&payload, "val", "val", RewardKind::Reward).as_deref(),
            Some("56250000000")
        );
        assert_eq!(
            amount_of(&payload, "n1", "val", RewardKind::Reward).as_deref(),
            Some("56250000000")
        );
        assert_eq!(
            amount_of(&payload, "n2", "val", RewardKind::Reward).as_deref(),
            Some("112500000000")
        );
        assert!(payload.reward_era_sequences.iter().all(|r| r.era == 3 && !r.claimed));
    }

    #[tokio::test]
    async fn test_zero_amounts_are_not_recorded() {
        let mut payload = era_payload("1000", vec![staked("idle", 0, 0, 10, &[("n1", 10)])]);
        RewardEraSeqCreatorTask.run(&mut payload).await.unwrap();
        assert!(payload.reward_era_sequences.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_payout_skips_the_era() {
        let mut payload = era_payload("12.5", vec![staked("val", 25, 0, 10, &[])]);
        RewardEraSeqCreatorTask.run(&mut payload).await.unwrap();
        assert!(payload.reward_era_sequences.is_empty());
    }

    #[tokio::test]
    async fn test_runs_only_at_era_end() {
        let mut payload = era_payload("1000", vec![staked("val", 25, 0, 10, &[])]);
        payload.syncable = Some(syncable(100, true, false));
        RewardEraSeqCreatorTask.run(&mut payload).await.unwrap();
        assert!(payload.reward_era_sequences.is_empty());
    }
}
