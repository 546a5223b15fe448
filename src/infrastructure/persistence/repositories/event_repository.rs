//! Repositories for runtime events and indexer-derived system events

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use crate::domain::models::{EventSeq, SystemEvent};
use crate::infrastructure::persistence::entities::{event_seqs, system_events};
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::stores::{EventSeqStore, SystemEventStore};

/// Repository for event sequence operations
#[derive(Clone)]
pub struct EventSeqRepository {
    conn: DatabaseConnection,
}

impl EventSeqRepository {
    /// Create a new EventSeqRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl EventSeqStore for EventSeqRepository {
    async fn bulk_upsert(&self, seqs: &[EventSeq]) -> Result<(), DbError> {
        if seqs.is_empty() {
            return Ok(());
        }

        let models = seqs.iter().map(|seq| event_seqs::ActiveModel {
            height: Set(seq.sequence.height),
            index: Set(seq.index),
            time: Set(seq.sequence.time),
            extrinsic_index: Set(seq.extrinsic_index),
            section: Set(seq.section.clone()),
            method: Set(seq.method.clone()),
            phase: Set(seq.phase.clone()),
            data: Set(seq.data.clone()),
        });

        event_seqs::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([event_seqs::Column::Height, event_seqs::Column::Index])
                    .update_columns([
                        event_seqs::Column::Time,
                        event_seqs::Column::ExtrinsicIndex,
                        event_seqs::Column::Section,
                        event_seqs::Column::Method,
                        event_seqs::Column::Phase,
                        event_seqs::Column::Data,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }
}

/// Repository for system event operations
#[derive(Clone)]
pub struct SystemEventRepository {
    conn: DatabaseConnection,
}

impl SystemEventRepository {
    /// Create a new SystemEventRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl SystemEventStore for SystemEventRepository {
    async fn bulk_upsert(&self, events: &[SystemEvent]) -> Result<(), DbError> {
        if events.is_empty() {
            return Ok(());
        }

        let models = events.iter().map(|event| system_events::ActiveModel {
            height: Set(event.sequence.height),
            actor: Set(event.actor.clone()),
            kind: Set(event.kind.as_str().to_string()),
            time: Set(event.sequence.time),
            data: Set(event.data.clone()),
        });

        system_events::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    system_events::Column::Height,
                    system_events::Column::Actor,
                    system_events::Column::Kind,
                ])
                .update_columns([system_events::Column::Time, system_events::Column::Data])
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }
}
