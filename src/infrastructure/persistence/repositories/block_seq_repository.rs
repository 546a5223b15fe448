use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::models::{ActivityPeriod, BlockSeq, Sequence};
use crate::infrastructure::persistence::entities::block_seqs;
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::stores::BlockSeqStore;

/// Repository for block sequence operations
#[derive(Clone)]
pub struct BlockSeqRepository {
    conn: DatabaseConnection,
}

impl BlockSeqRepository {
    /// Create a new BlockSeqRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn to_active_model(seq: &BlockSeq) -> block_seqs::ActiveModel {
        block_seqs::ActiveModel {
            height: Set(seq.sequence.height),
            time: Set(seq.sequence.time),
            extrinsics_count: Set(seq.extrinsics_count),
            signed_extrinsics_count: Set(seq.signed_extrinsics_count),
            unsigned_extrinsics_count: Set(seq.unsigned_extrinsics_count),
        }
    }
}

impl From<block_seqs::Model> for BlockSeq {
    fn from(model: block_seqs::Model) -> Self {
        BlockSeq {
            sequence: Sequence {
                height: model.height,
                time: model.time,
            },
            extrinsics_count: model.extrinsics_count,
            signed_extrinsics_count: model.signed_extrinsics_count,
            unsigned_extrinsics_count: model.unsigned_extrinsics_count,
        }
    }
}

#[async_trait]
impl BlockSeqStore for BlockSeqRepository {
    async fn find_by_height(&self, height: i64) -> Result<Option<BlockSeq>, DbError> {
        let result = block_seqs::Entity::find_by_id(height).one(&self.conn).await?;
        Ok(result.map(BlockSeq::from))
    }

    async fn find_first(&self) -> Result<Option<BlockSeq>, DbError> {
        let result = block_seqs::Entity::find()
            .order_by_asc(block_seqs::Column::Height)
            .one(&self.conn)
            .await?;
        Ok(result.map(BlockSeq::from))
    }

    async fn find_most_recent(&self) -> Result<Option<BlockSeq>, DbError> {
        let result = block_seqs::Entity::find()
            .order_by_desc(block_seqs::Column::Height)
            .one(&self.conn)
            .await?;
        Ok(result.map(BlockSeq::from))
    }

    async fn find_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BlockSeq>, DbError> {
        let results = block_seqs::Entity::find()
            .filter(block_seqs::Column::Time.gte(start))
            .filter(block_seqs::Column::Time.lt(end))
            .order_by_asc(block_seqs::Column::Height)
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(BlockSeq::from).collect())
    }

    async fn create(&self, seq: &BlockSeq) -> Result<(), DbError> {
        Self::to_active_model(seq).insert(&self.conn).await?;
        Ok(())
    }

    async fn save(&self, seq: &BlockSeq) -> Result<(), DbError> {
        Self::to_active_model(seq).update(&self.conn).await?;
        Ok(())
    }

    async fn delete_older_than(
        &self,
        threshold: DateTime<Utc>,
        periods: &[ActivityPeriod],
    ) -> Result<u64, DbError> {
        if periods.is_empty() {
            return Ok(0);
        }

        let mut summarized = Condition::any();
        for period in periods {
            summarized = summarized.add(
                Condition::all()
                    .add(block_seqs::Column::Time.gte(period.start))
                    .add(block_seqs::Column::Time.lt(period.end)),
            );
        }

        let result = block_seqs::Entity::delete_many()
            .filter(block_seqs::Column::Time.lt(threshold))
            .filter(summarized)
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }
}
