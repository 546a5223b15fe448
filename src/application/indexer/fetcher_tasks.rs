use async_trait::async_trait;
use std::sync::Arc;

use crate::application::indexer::payload::Payload;
use crate::application::pipeline::{StageName, Task};
use crate::application::pipeline::TaskError;
use crate::infrastructure::chain::ChainClient;
use crate::utils::logging;

pub const FETCHER_TASK_NAME: &str = "Fetcher";

/// Reads the raw block, events, validators and staking data of the height
pub struct FetcherTask {
    client: Arc<dyn ChainClient>,
}

impl FetcherTask {
    pub fn new(client: Arc<dyn ChainClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Task<Payload> for FetcherTask {
    fn name(&self) -> &'static str {
        FETCHER_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        logging::log_task(
            StageName::Fetcher.as_str(),
            self.name(),
            payload.current_height,
            "running indexer task",
        );

        let raw = self.client.get_block_at_height(payload.current_height).await?;
        payload.raw = Some(raw);
        Ok(())
    }
}
