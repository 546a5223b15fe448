use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::application::indexer::payload::Payload;
use crate::application::pipeline::{StageName, Task};
use crate::application::pipeline::TaskError;
use crate::domain::models::Syncable;
use crate::infrastructure::chain::ChainClient;
use crate::utils::logging;

pub const MAIN_SYNCER_TASK_NAME: &str = "MainSyncer";

/// Reads the height's session and era placement and builds its syncable
pub struct MainSyncerTask {
    client: Arc<dyn ChainClient>,
    index_version: i64,
}

impl MainSyncerTask {
    pub fn new(client: Arc<dyn ChainClient>, index_version: i64) -> Self {
        Self {
            client,
            index_version,
        }
    }
}

#[async_trait]
impl Task<Payload> for MainSyncerTask {
    fn name(&self) -> &'static str {
        MAIN_SYNCER_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        logging::log_task(
            StageName::Syncer.as_str(),
            self.name(),
            payload.current_height,
            "running indexer task",
        );

        let meta = self.client.get_meta_by_height(payload.current_height).await?;
        if meta.height != payload.current_height {
            return Err(TaskError::InvalidData(format!(
                "chain returned meta for height {} instead of {}",
                meta.height, payload.current_height
            )));
        }

        payload.syncable = Some(Syncable {
            height: meta.height,
            session: meta.session,
            era: meta.era,
            last_in_session: meta.last_in_session,
            last_in_era: meta.last_in_era,
            spec_version: meta.spec_version,
            index_version: self.index_version,
            time: meta.time,
            created_at: Utc::now(),
        });

        Ok(())
    }
}
