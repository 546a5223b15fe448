use async_trait::async_trait;
use std::sync::Arc;

use crate::application::indexer::payload::Payload;
use crate::application::pipeline::{StageName, Task};
use crate::application::pipeline::TaskError;
use crate::domain::models::ValidatorAgg;
use crate::infrastructure::persistence::stores::ValidatorAggStore;
use crate::utils::logging;

pub const VALIDATOR_AGG_CREATOR_TASK_NAME: &str = "ValidatorAggCreator";

/// Folds the height's validators into their running aggregates.
///
/// Results are split into new and updated lists; nothing is written here.
pub struct ValidatorAggCreatorTask {
    validator_aggs: Arc<dyn ValidatorAggStore>,
}

impl ValidatorAggCreatorTask {
    pub fn new(validator_aggs: Arc<dyn ValidatorAggStore>) -> Self {
        Self { validator_aggs }
    }
}

#[async_trait]
impl Task<Payload> for ValidatorAggCreatorTask {
    fn name(&self) -> &'static str {
        VALIDATOR_AGG_CREATOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        logging::log_task(
            StageName::Aggregator.as_str(),
            self.name(),
            payload.current_height,
            "running indexer task",
        );

        let syncable = payload.syncable()?;
        let (height, time, last_in_session) = (syncable.height, syncable.time, syncable.last_in_session);

        let mut new_aggs = Vec::new();
        let mut updated_aggs = Vec::new();

        for (stash, validator) in &payload.parsed_validators {
            let online = validator
                .performance
                .as_ref()
                .map(|performance| performance.online)
                .unwrap_or(false);

            match self.validator_aggs.find_by_stash_account(stash).await? {
                None => new_aggs.push(ValidatorAgg::first_observation(
                    stash,
                    &validator.display_name,
                    height,
                    time,
                    last_in_session,
                    online,
                )),
                // already folded by an earlier run of this height
                Some(existing) if existing.aggregate.recent_at_height >= height => {}
                Some(mut existing) => {
                    // staking-only observations carry no identity
                    let display_name = if validator.display_name.is_empty() {
                        existing.display_name.clone()
                    } else {
                        validator.display_name.clone()
                    };
                    existing.observe(&display_name, height, time, last_in_session, online);
                    updated_aggs.push(existing);
                }
            }
        }

        payload.new_validator_aggregates = new_aggs;
        payload.updated_validator_aggregates = updated_aggs;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::indexer::sequencer_tasks::tests::{syncable, validator};
    use crate::application::pipeline::HeightPayload;
    use crate::infrastructure::persistence::InMemoryStore;

    fn observe(height: i64, last_in_session: bool, online: bool) -> Payload {
        let mut payload = Payload::for_height(height);
        payload.syncable = Some(syncable(height, last_in_session, false));
        payload
            .parsed_validators
            .insert("a".to_string(), validator("a", Some(online), &[]));
        payload
    }

    #[tokio::test]
    async fn test_counters_move_only_at_session_end() {
        let store = InMemoryStore::new();
        let aggs = store.stores().validator_aggs;
        let task = ValidatorAggCreatorTask::new(aggs.clone());

        // (last_in_session, online) per height
        let heights = [
            (false, true),
            (true, true),
            (false, false),
            (true, false),
            (false, true),
            (true, true),
        ];
        for (i, (last_in_session, online)) in heights.iter().enumerate() {
            let mut payload = observe(100 + i as i64, *last_in_session, *online);
            task.run(&mut payload).await.unwrap();
            for agg in &payload.new_validator_aggregates {
                aggs.create(agg).await.unwrap();
            }
            for agg in &payload.updated_validator_aggregates {
                aggs.save(agg).await.unwrap();
            }
        }

        let agg = aggs.find_by_stash_account("a").await.unwrap().unwrap();
        assert_eq!(agg.accumulated_uptime_count, 3);
        assert_eq!(agg.accumulated_uptime, 2);
        assert_eq!(agg.aggregate.started_at_height, 100);
        assert_eq!(agg.aggregate.recent_at_height, 105);
        assert_eq!(agg.recent_as_validator_height, 105);
    }

    #[tokio::test]
    async fn test_heights_already_folded_leave_counters_alone() {
        let store = InMemoryStore::new();
        let aggs = store.stores().validator_aggs;
        let task = ValidatorAggCreatorTask::new(aggs.clone());

        for pass in 0..2 {
            for height in 1..=4 {
                let mut payload = observe(height, height % 2 == 0, true);
                task.run(&mut payload).await.unwrap();
                if pass == 1 {
                    assert!(payload.new_validator_aggregates.is_empty());
                    assert!(payload.updated_validator_aggregates.is_empty());
                }
                for agg in &payload.new_validator_aggregates {
                    aggs.create(agg).await.unwrap();
                }
                for agg in &payload.updated_validator_aggregates {
                    aggs.save(agg).await.unwrap();
                }
            }
        }

        let agg = aggs.find_by_stash_account("a").await.unwrap().unwrap();
        assert_eq!((agg.accumulated_uptime, agg.accumulated_uptime_count), (2, 2));
        assert_eq!(agg.aggregate.recent_at_height, 4);
    }

    #[tokio::test]
    async fn test_partitions_new_and_updated() {
        let store = InMemoryStore::new();
        let aggs = store.stores().validator_aggs;
        let first = ValidatorAgg::first_observation("a", "A", 1, syncable(1, false, false).time, false, true);
        aggs.create(&first).await.unwrap();

        let task = ValidatorAggCreatorTask::new(aggs);
        let mut payload = observe(2, true, true);
        payload
            .parsed_validators
            .insert("b".to_string(), validator("b", None, &[("n", 1)]));
        task.run(&mut payload).await.unwrap();

        assert_eq!(payload.updated_validator_aggregates.len(), 1);
        assert_eq!(payload.updated_validator_aggregates[0].stash_account, "a");
        assert_eq!(payload.new_validator_aggregates.len(), 1);

        // no performance reported means offline
        let b = &payload.new_validator_aggregates[0];
        assert_eq!(b.stash_account, "b");
        assert_eq!((b.accumulated_uptime, b.accumulated_uptime_count), (0, 1));
    }

    #[tokio::test]
    async fn test_empty_display_name_keeps_the_known_one() {
        let store = InMemoryStore::new();
        let aggs = store.stores().validator_aggs;
        let first = ValidatorAgg::first_observation("a", "Alice", 1, syncable(1, false, false).time, false, true);
        aggs.create(&first).await.unwrap();

        let task = ValidatorAggCreatorTask::new(aggs);
        let mut payload = observe(2, false, true);
        payload.parsed_validators.get_mut("a").unwrap().display_name = String::new();
        task.run(&mut payload).await.unwrap();

        assert_eq!(payload.updated_validator_aggregates[0].display_name, "Alice");
    }
}
