use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::domain::models::{Report, ReportKind};
use crate::infrastructure::persistence::entities::reports;
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::stores::ReportStore;

/// Repository for run report operations
#[derive(Clone)]
pub struct ReportRepository {
    conn: DatabaseConnection,
}

impl ReportRepository {
    /// Create a new ReportRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn to_active_model(report: &Report) -> reports::ActiveModel {
        reports::ActiveModel {
            id: if report.id == 0 { NotSet } else { Set(report.id) },
            kind: Set(report.kind.as_str().to_string()),
            status: Set(report.status.as_str().to_string()),
            index_version: Set(report.index_version),
            start_height: Set(report.start_height),
            end_height: Set(report.end_height),
            success_count: Set(report.success_count),
            error_count: Set(report.error_count),
            error_msg: Set(report.error_msg.clone()),
            duration: Set(report.duration),
            created_at: Set(report.created_at),
            completed_at: Set(report.completed_at),
        }
    }

    fn kind_names(kinds: &[ReportKind]) -> Vec<String> {
        kinds.iter().map(|kind| kind.as_str().to_string()).collect()
    }
}

impl TryFrom<reports::Model> for Report {
    type Error = DbError;

    fn try_from(model: reports::Model) -> Result<Self, Self::Error> {
        Ok(Report {
            id: model.id,
            kind: model.kind.parse().map_err(DbError::DecodeError)?,
            status: model.status.parse().map_err(DbError::DecodeError)?,
            index_version: model.index_version,
            start_height: model.start_height,
            end_height: model.end_height,
            success_count: model.success_count,
            error_count: model.error_count,
            error_msg: model.error_msg,
            duration: model.duration,
            created_at: model.created_at,
            completed_at: model.completed_at,
        })
    }
}

#[async_trait]
impl ReportStore for ReportRepository {
    async fn find_not_completed_by_kinds(
        &self,
        kinds: &[ReportKind],
    ) -> Result<Option<Report>, DbError> {
        let result = reports::Entity::find()
            .filter(reports::Column::Kind.is_in(Self::kind_names(kinds)))
            .filter(reports::Column::CompletedAt.is_null())
            .order_by_desc(reports::Column::CreatedAt)
            .one(&self.conn)
            .await?;

        result.map(Report::try_from).transpose()
    }

    async fn create(&self, report: &Report) -> Result<Report, DbError> {
        let model = Self::to_active_model(report).insert(&self.conn).await?;
        Report::try_from(model)
    }

    async fn save(&self, report: &Report) -> Result<(), DbError> {
        Self::to_active_model(report).update(&self.conn).await?;
        Ok(())
    }

    async fn delete_by_kinds(&self, kinds: &[ReportKind]) -> Result<u64, DbError> {
        let result = reports::Entity::delete_many()
            .filter(reports::Column::Kind.is_in(Self::kind_names(kinds)))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}
