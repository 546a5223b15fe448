use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::application::indexer::payload::{
    ParsedBlock, ParsedPerformance, ParsedStaking, ParsedValidator, Payload,
};
use crate::application::pipeline::{StageName, Task};
use crate::application::pipeline::TaskError;
use crate::domain::models::{RawExtrinsic, RewardClaim};
use crate::utils::logging;

pub const BLOCK_PARSER_TASK_NAME: &str = "BlockParser";
pub const VALIDATORS_PARSER_TASK_NAME: &str = "ValidatorsParser";
pub const REWARD_CLAIMS_PARSER_TASK_NAME: &str = "RewardClaimsParser";

const PAYOUT_SECTION: &str = "staking";
const PAYOUT_METHOD: &str = "payoutStakers";

/// Counts signed and unsigned extrinsics
pub struct BlockParserTask;

#[async_trait]
impl Task<Payload> for BlockParserTask {
    fn name(&self) -> &'static str {
        BLOCK_PARSER_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        logging::log_task(
            StageName::Parser.as_str(),
            self.name(),
            payload.current_height,
            "running indexer task",
        );

        let extrinsics = &payload.raw()?.block.extrinsics;
        let signed = extrinsics.iter().filter(|e| e.is_signed).count() as i64;
        let total = extrinsics.len() as i64;

        payload.parsed_block = Some(ParsedBlock {
            extrinsics_count: total,
            signed_extrinsics_count: signed,
            unsigned_extrinsics_count: total - signed,
        });
        Ok(())
    }
}

/// Merges session performance and era exposure per stash account
pub struct ValidatorsParserTask;

#[async_trait]
impl Task<Payload> for ValidatorsParserTask {
    fn name(&self) -> &'static str {
        VALIDATORS_PARSER_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        logging::log_task(
            StageName::Parser.as_str(),
            self.name(),
            payload.current_height,
            "running indexer task",
        );

        let raw = payload.raw()?;
        let mut parsed: BTreeMap<String, ParsedValidator> = BTreeMap::new();

        for validator in &raw.validators {
            parsed.insert(
                validator.stash_account.clone(),
                ParsedValidator {
                    stash_account: validator.stash_account.clone(),
                    display_name: validator.display_name.clone(),
                    performance: Some(ParsedPerformance {
                        online: validator.online,
                        active_balance: validator.active_balance.clone(),
                    }),
                    staking: None,
                },
            );
        }

        if let Some(staking) = &raw.staking {
            for exposure in &staking.validators {
                let entry = parsed
                    .entry(exposure.stash_account.clone())
                    .or_insert_with(|| ParsedValidator {
                        stash_account: exposure.stash_account.clone(),
                        display_name: String::new(),
                        performance: None,
                        staking: None,
                    });
                entry.staking = Some(ParsedStaking {
                    controller_account: exposure.controller_account.clone(),
                    total_stake: exposure.total_stake.clone(),
                    own_stake: exposure.own_stake.clone(),
                    reward_points: exposure.reward_points,
                    commission: exposure.commission,
                    stakers: exposure.stakers.clone(),
                });
            }
        }

        payload.parsed_validators = parsed;
        Ok(())
    }
}

/// Collects the eras paid out by successful `staking.payoutStakers` calls
pub struct RewardClaimsParserTask;

impl RewardClaimsParserTask {
    fn parse_claim(extrinsic: &RawExtrinsic) -> Result<RewardClaim, TaskError> {
        let invalid = |what: &str| {
            TaskError::InvalidData(format!(
                "{}.{} extrinsic {} has {}",
                PAYOUT_SECTION, PAYOUT_METHOD, extrinsic.index, what
            ))
        };

        let validator_stash = extrinsic
            .args
            .get("validator_stash")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("no validator_stash argument"))?;

        let era = match extrinsic.args.get("era") {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.parse::<i64>().ok(),
            _ => None,
        }
        .ok_or_else(|| invalid("no integer era argument"))?;

        Ok(RewardClaim {
            validator_stash: validator_stash.to_string(),
            era,
        })
    }
}

#[async_trait]
impl Task<Payload> for RewardClaimsParserTask {
    fn name(&self) -> &'static str {
        REWARD_CLAIMS_PARSER_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        logging::log_task(
            StageName::Parser.as_str(),
            self.name(),
            payload.current_height,
            "running indexer task",
        );

        let claims = payload
            .raw()?
            .block
            .extrinsics
            .iter()
            .filter(|e| e.is_success && e.section == PAYOUT_SECTION && e.method == PAYOUT_METHOD)
            .map(Self::parse_claim)
            .collect::<Result<Vec<_>, _>>()?;

        payload.reward_claims = claims;
        Ok(())
    }
}
