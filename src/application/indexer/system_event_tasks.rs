use async_trait::async_trait;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::application::indexer::payload::Payload;
use crate::application::pipeline::{StageName, Task};
use crate::application::pipeline::TaskError;
use crate::domain::models::{SystemEvent, SystemEventKind};
use crate::infrastructure::persistence::stores::ValidatorSessionSeqStore;
use crate::utils::logging;

pub const SYSTEM_EVENT_CREATOR_TASK_NAME: &str = "SystemEventCreator";

/// Emits joined/left active set events at session-final heights.
///
/// The active set is compared with the validator session sequences stored
/// for the previous session. Nothing is emitted when that session is unknown.
pub struct SystemEventCreatorTask {
    session_seqs: Arc<dyn ValidatorSessionSeqStore>,
}

impl SystemEventCreatorTask {
    pub fn new(session_seqs: Arc<dyn ValidatorSessionSeqStore>) -> Self {
        Self { session_seqs }
    }
}

#[async_trait]
impl Task<Payload> for SystemEventCreatorTask {
    fn name(&self) -> &'static str {
        SYSTEM_EVENT_CREATOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        logging::log_task(
            StageName::Sequencer.as_str(),
            self.name(),
            payload.current_height,
            "running indexer task",
        );

        let syncable = payload.syncable()?;
        if !syncable.last_in_session {
            return Ok(());
        }
        let sequence = syncable.sequence();
        let session = syncable.session;

        let previous: BTreeSet<String> = self
            .session_seqs
            .find_by_session(session - 1)
            .await?
            .into_iter()
            .map(|seq| seq.stash_account)
            .collect();
        if previous.is_empty() {
            return Ok(());
        }

        let current: BTreeSet<String> = payload
            .active_validators()
            .map(|(validator, _)| validator.stash_account.clone())
            .collect();

        let event = |actor: &String, kind: SystemEventKind| SystemEvent {
            sequence,
            actor: actor.clone(),
            kind,
            data: json!({ "session": session }),
        };

        let mut events: Vec<SystemEvent> = current
            .difference(&previous)
            .map(|actor| event(actor, SystemEventKind::JoinedSet))
            .collect();
        events.extend(
            previous
                .difference(&current)
                .map(|actor| event(actor, SystemEventKind::LeftSet)),
        );

        payload.system_events = events;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::indexer::sequencer_tasks::tests::{syncable, validator};
    use crate::application::pipeline::HeightPayload;
    use crate::domain::models::{RawHeightData, ValidatorSessionSeq};
    use crate::infrastructure::persistence::InMemoryStore;

    fn session_payload(last_in_session: bool, active: &[&str]) -> Payload {
        let mut payload = Payload::for_height(20);
        payload.syncable = Some(syncable(20, last_in_session, false));
        payload.raw = Some(RawHeightData::default());
        payload.parsed_validators = active
            .iter()
            .map(|stash| (stash.to_string(), validator(stash, Some(true), &[])))
            .collect();
        payload
    }

    async fn store_with_previous_session(stashes: &[&str]) -> InMemoryStore {
        let store = InMemoryStore::new();
        let previous = syncable(10, true, false);
        let seqs: Vec<_> = stashes
            .iter()
            .map(|stash| ValidatorSessionSeq {
                sequence: previous.sequence(),
                session: 9,
                stash_account: stash.to_string(),
                online: true,
            })
            .collect();
        store.stores().validator_session_seqs.bulk_upsert(&seqs).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_diffs_against_previous_session() {
        let store = store_with_previous_session(&["a", "b"]).await;
        let task = SystemEventCreatorTask::new(store.stores().validator_session_seqs);

        let mut payload = session_payload(true, &["b", "c"]);
        task.run(&mut payload).await.unwrap();

        let events: Vec<_> = payload
            .system_events
            .iter()
            .map(|e| (e.actor.as_str(), e.kind))
            .collect();
        assert_eq!(
            events,
            vec![("c", SystemEventKind::JoinedSet), ("a", SystemEventKind::LeftSet)]
        );
        assert_eq!(payload.system_events[0].data, json!({ "session": 10 }));
    }

    #[tokio::test]
    async fn test_unknown_previous_session_emits_nothing() {
        let store = InMemoryStore::new();
        let task = SystemEventCreatorTask::new(store.stores().validator_session_seqs);

        let mut payload = session_payload(true, &["a"]);
        task.run(&mut payload).await.unwrap();
        assert!(payload.system_events.is_empty());
    }

    #[tokio::test]
    async fn test_mid_session_emits_nothing() {
        let store = store_with_previous_session(&["a"]).await;
        let task = SystemEventCreatorTask::new(store.stores().validator_session_seqs);

        let mut payload = session_payload(false, &["b"]);
        task.run(&mut payload).await.unwrap();
        assert!(payload.system_events.is_empty());
    }
}
