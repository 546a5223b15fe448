#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use polkadothub_indexer::application::indexer::IndexingPipeline;
use polkadothub_indexer::config::IndexTargets;
use polkadothub_indexer::domain::models::{
    ChainStatus, HeightMeta, RawBlock, RawEvent, RawExtrinsic, RawHeightData, RawStaker,
    RawStaking, RawStakingValidator, RawValidatorPerformance,
};
use polkadothub_indexer::infrastructure::chain::{ChainClient, ChainClientError};
use polkadothub_indexer::infrastructure::persistence::{InMemoryStore, Stores};

const DEFAULT_TARGETS: &str = include_str!("../../indexer_targets.json");

/// A deterministic chain.
///
/// Sessions are two heights long and eras four, so every even height closes
/// a session and every multiple of four closes an era. `alice` and `bob` are
/// always active; `carol` joins the active set at height 5. Height 6 pays out
/// alice's era 0 rewards.
pub struct ScriptedChain {
    head: AtomicI64,
    fail_at: AtomicI64,
    genesis: DateTime<Utc>,
    block_time: Duration,
}

impl ScriptedChain {
    pub fn new(head: i64) -> Self {
        Self::with_block_time(head, Duration::seconds(6))
    }

    pub fn with_block_time(head: i64, block_time: Duration) -> Self {
        Self {
            head: AtomicI64::new(head),
            fail_at: AtomicI64::new(0),
            genesis: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            block_time,
        }
    }

    pub fn set_head(&self, head: i64) {
        self.head.store(head, Ordering::SeqCst);
    }

    /// Makes block requests for `height` fail; zero disables the failure
    pub fn fail_at(&self, height: i64) {
        self.fail_at.store(height, Ordering::SeqCst);
    }

    pub fn time_of(&self, height: i64) -> DateTime<Utc> {
        self.genesis + self.block_time * height as i32
    }

    fn active(height: i64) -> Vec<&'static str> {
        if height >= 5 {
            vec!["alice", "bob", "carol"]
        } else {
            vec!["alice", "bob"]
        }
    }

    fn staking(height: i64) -> RawStaking {
        RawStaking {
            era: era_of(height),
            total_reward_points: 100,
            total_reward_payout: "1000000000000".to_string(),
            validators: vec![
                RawStakingValidator {
                    stash_account: "alice".to_string(),
                    controller_account: "alice-ctrl".to_string(),
                    total_stake: 400u64.into(),
                    own_stake: 100u64.into(),
                    reward_points: 25,
                    commission: 100_000_000,
                    stakers: vec![
                        RawStaker {
                            stash_account: "nominator-1".to_string(),
                            stake: 100u64.into(),
                        },
                        RawStaker {
                            stash_account: "nominator-2".to_string(),
                            stake: 200u64.into(),
                        },
                    ],
                },
                RawStakingValidator {
                    stash_account: "bob".to_string(),
                    controller_account: "bob-ctrl".to_string(),
                    total_stake: 300u64.into(),
                    own_stake: 300u64.into(),
                    reward_points: 75,
                    commission: 0,
                    stakers: Vec::new(),
                },
            ],
        }
    }
}

pub fn session_of(height: i64) -> i64 {
    (height - 1) / 2
}

pub fn era_of(height: i64) -> i64 {
    (height - 1) / 4
}

#[async_trait]
impl ChainClient for ScriptedChain {
    async fn get_head(&self) -> Result<i64, ChainClientError> {
        Ok(self.head.load(Ordering::SeqCst))
    }

    async fn get_status(&self) -> Result<ChainStatus, ChainClientError> {
        Ok(ChainStatus {
            chain_name: "Scripted".to_string(),
            ..ChainStatus::default()
        })
    }

    async fn get_meta_by_height(&self, height: i64) -> Result<HeightMeta, ChainClientError> {
        Ok(HeightMeta {
            height,
            time: self.time_of(height),
            session: session_of(height),
            era: era_of(height),
            last_in_session: height % 2 == 0,
            last_in_era: height % 4 == 0,
            spec_version: "1000".to_string(),
        })
    }

    async fn get_block_at_height(&self, height: i64) -> Result<RawHeightData, ChainClientError> {
        if self.fail_at.load(Ordering::SeqCst) == height {
            return Err(ChainClientError::ApiError {
                status: 503,
                url: format!("/block/{}", height),
            });
        }

        let mut extrinsics = vec![
            RawExtrinsic {
                index: 0,
                hash: format!("0x{:04x}00", height),
                is_signed: false,
                signer: String::new(),
                section: "timestamp".to_string(),
                method: "set".to_string(),
                is_success: true,
                args: json!({}),
            },
            RawExtrinsic {
                index: 1,
                hash: format!("0x{:04x}01", height),
                is_signed: true,
                signer: "nominator-1".to_string(),
                section: "balances".to_string(),
                method: "transfer".to_string(),
                is_success: true,
                args: json!({"dest": "nominator-2", "value": "10"}),
            },
        ];
        if height == 6 {
            extrinsics.push(RawExtrinsic {
                index: 2,
                hash: "0x000602".to_string(),
                is_signed: true,
                signer: "alice".to_string(),
                section: "staking".to_string(),
                method: "payoutStakers".to_string(),
                is_success: true,
                args: json!({"validator_stash": "alice", "era": 0}),
            });
        }

        let validators = Self::active(height)
            .into_iter()
            .map(|stash| RawValidatorPerformance {
                stash_account: stash.to_string(),
                display_name: stash.to_uppercase(),
                online: true,
                active_balance: 1_000u64.into(),
            })
            .collect();

        Ok(RawHeightData {
            block: RawBlock {
                hash: format!("0x{:04x}", height),
                parent_hash: format!("0x{:04x}", height - 1),
                extrinsics,
            },
            events: vec![RawEvent {
                index: 0,
                extrinsic_index: 1,
                section: "balances".to_string(),
                method: "Transfer".to_string(),
                phase: "ApplyExtrinsic".to_string(),
                data: json!(["nominator-1", "nominator-2", "10"]),
            }],
            validators,
            staking: (height % 4 == 0).then(|| Self::staking(height)),
        })
    }
}

/// The built-in targets with the current version replaced by `version`
pub fn targets(version: i64) -> IndexTargets {
    let mut raw: serde_json::Value = serde_json::from_str(DEFAULT_TARGETS).unwrap();
    raw["versions"][0]["id"] = json!(version);
    IndexTargets::from_json(&raw.to_string()).unwrap()
}

pub struct Harness {
    pub chain: Arc<ScriptedChain>,
    pub memory: InMemoryStore,
    pub stores: Stores,
}

impl Harness {
    pub fn new(chain: ScriptedChain) -> Self {
        let memory = InMemoryStore::new();
        let stores = memory.stores();
        Self {
            chain: Arc::new(chain),
            memory,
            stores,
        }
    }

    pub fn pipeline(&self, version: i64, parallel_workers: usize) -> Arc<IndexingPipeline> {
        Arc::new(IndexingPipeline::new(
            self.chain.clone(),
            self.stores.clone(),
            targets(version),
            1,
            parallel_workers,
        ))
    }
}
