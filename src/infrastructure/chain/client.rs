use async_trait::async_trait;

use crate::domain::models::{ChainStatus, HeightMeta, RawHeightData};
use crate::infrastructure::chain::error::ChainClientError;

/// Read access to the chain, one call per piece of height data
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Height of the most recent finalized block
    async fn get_head(&self) -> Result<i64, ChainClientError>;

    async fn get_status(&self) -> Result<ChainStatus, ChainClientError>;

    /// Session and era placement of `height`
    async fn get_meta_by_height(&self, height: i64) -> Result<HeightMeta, ChainClientError>;

    /// Block, events, validator performance and staking snapshot at `height`
    async fn get_block_at_height(&self, height: i64) -> Result<RawHeightData, ChainClientError>;
}
