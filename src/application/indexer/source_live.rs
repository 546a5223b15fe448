use crate::application::pipeline::{HeightCursor, Source, StageName};
use crate::application::pipeline::SourceError;
use crate::infrastructure::chain::ChainClient;
use crate::infrastructure::persistence::stores::SyncableStore;
use crate::utils::logging;

/// Follows the chain head, starting after the most recently indexed height
#[derive(Debug, Clone)]
pub struct LiveSource {
    cursor: HeightCursor,
}

impl LiveSource {
    /// `batch_size` caps the number of heights visited; zero means no cap
    pub async fn new(
        syncables: &dyn SyncableStore,
        client: &dyn ChainClient,
        first_block_height: i64,
        batch_size: i64,
    ) -> Result<Self, SourceError> {
        let start = match syncables.find_most_recent().await? {
            Some(syncable) => syncable.height + 1,
            None => first_block_height,
        };

        let head = client.get_head().await?;
        let end = if batch_size > 0 {
            head.min(start + batch_size - 1)
        } else {
            head
        };

        logging::log_info(&format!(
            "Live source ready [start_height={}] [end_height={}] [chain_head={}]",
            start, end, head
        ));
        Ok(Self::with_range(start, end))
    }

    pub fn with_range(start: i64, end: i64) -> Self {
        Self {
            cursor: HeightCursor::new(start, end),
        }
    }

    pub fn start_height(&self) -> i64 {
        self.cursor.start()
    }

    pub fn end_height(&self) -> i64 {
        self.cursor.end()
    }
}

impl Source for LiveSource {
    fn next(&mut self) -> bool {
        self.cursor.advance()
    }

    fn current(&self) -> i64 {
        self.cursor.current()
    }

    fn skip(&self, _stage: StageName) -> bool {
        false
    }

    fn err(&self) -> Option<&SourceError> {
        None
    }

    fn len(&self) -> i64 {
        self.cursor.len()
    }
}
