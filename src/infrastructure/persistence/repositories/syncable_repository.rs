use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::models::Syncable;
use crate::infrastructure::persistence::entities::syncables;
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::stores::SyncableStore;

/// Repository for syncable operations
#[derive(Clone)]
pub struct SyncableRepository {
    conn: DatabaseConnection,
}

impl SyncableRepository {
    /// Create a new SyncableRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

impl From<syncables::Model> for Syncable {
    fn from(model: syncables::Model) -> Self {
        Syncable {
            height: model.height,
            session: model.session,
            era: model.era,
            last_in_session: model.last_in_session,
            last_in_era: model.last_in_era,
            spec_version: model.spec_version,
            index_version: model.index_version,
            time: model.time,
            created_at: model.created_at,
        }
    }
}

#[async_trait]
impl SyncableStore for SyncableRepository {
    async fn find_by_height(&self, height: i64) -> Result<Option<Syncable>, DbError> {
        let result = syncables::Entity::find_by_id(height).one(&self.conn).await?;
        Ok(result.map(Syncable::from))
    }

    async fn find_most_recent(&self) -> Result<Option<Syncable>, DbError> {
        let result = syncables::Entity::find()
            .order_by_desc(syncables::Column::Height)
            .one(&self.conn)
            .await?;
        Ok(result.map(Syncable::from))
    }

    async fn find_first_by_different_index_version(
        &self,
        index_version: i64,
    ) -> Result<Option<Syncable>, DbError> {
        let result = syncables::Entity::find()
            .filter(syncables::Column::IndexVersion.ne(index_version))
            .order_by_asc(syncables::Column::Height)
            .one(&self.conn)
            .await?;
        Ok(result.map(Syncable::from))
    }

    async fn find_most_recent_by_different_index_version(
        &self,
        index_version: i64,
    ) -> Result<Option<Syncable>, DbError> {
        let result = syncables::Entity::find()
            .filter(syncables::Column::IndexVersion.ne(index_version))
            .order_by_desc(syncables::Column::Height)
            .one(&self.conn)
            .await?;
        Ok(result.map(Syncable::from))
    }

    async fn find_all_by_last_in_session_or_era(
        &self,
        index_version: i64,
        last_in_session: bool,
        last_in_era: bool,
    ) -> Result<Vec<Syncable>, DbError> {
        if !last_in_session && !last_in_era {
            return Ok(Vec::new());
        }

        let mut flags = Condition::any();
        if last_in_session {
            flags = flags.add(syncables::Column::LastInSession.eq(true));
        }
        if last_in_era {
            flags = flags.add(syncables::Column::LastInEra.eq(true));
        }

        let results = syncables::Entity::find()
            .filter(syncables::Column::IndexVersion.ne(index_version))
            .filter(flags)
            .order_by_asc(syncables::Column::Height)
            .all(&self.conn)
            .await?;

        Ok(results.into_iter().map(Syncable::from).collect())
    }

    async fn create_or_update(&self, syncable: &Syncable) -> Result<(), DbError> {
        let now = Utc::now();
        let model = syncables::ActiveModel {
            height: Set(syncable.height),
            session: Set(syncable.session),
            era: Set(syncable.era),
            last_in_session: Set(syncable.last_in_session),
            last_in_era: Set(syncable.last_in_era),
            spec_version: Set(syncable.spec_version.clone()),
            index_version: Set(syncable.index_version),
            time: Set(syncable.time),
            created_at: Set(syncable.created_at),
            updated_at: Set(now),
        };

        syncables::Entity::insert(model)
            .on_conflict(
                OnConflict::column(syncables::Column::Height)
                    .update_columns([
                        syncables::Column::Session,
                        syncables::Column::Era,
                        syncables::Column::LastInSession,
                        syncables::Column::LastInEra,
                        syncables::Column::SpecVersion,
                        syncables::Column::IndexVersion,
                        syncables::Column::Time,
                        syncables::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }
}
