use std::collections::HashSet;
use std::sync::Arc;

use crate::application::indexer::persistor_tasks::SYNCER_PERSISTOR_TASK_NAME;
use crate::application::pipeline::{HeightCursor, Source, StageName};
use crate::application::pipeline::SourceError;
use crate::infrastructure::persistence::stores::SyncableStore;
use crate::utils::logging;

/// Revisits every height indexed under an index version other than the target.
///
/// With a whitelist, heights outside it only run the syncer stage and persist
/// their refreshed syncable.
#[derive(Debug, Clone)]
pub struct BackfillSource {
    cursor: HeightCursor,
    whitelist: Option<Arc<HashSet<i64>>>,
}

impl BackfillSource {
    pub async fn new(
        syncables: &dyn SyncableStore,
        index_version: i64,
        last_in_session: bool,
        last_in_era: bool,
    ) -> Result<Self, SourceError> {
        let start = syncables
            .find_first_by_different_index_version(index_version)
            .await?
            .ok_or(SourceError::NothingToBackfill { index_version })?
            .height;
        let end = syncables
            .find_most_recent_by_different_index_version(index_version)
            .await?
            .ok_or(SourceError::NothingToBackfill { index_version })?
            .height;

        let whitelist = if last_in_session || last_in_era {
            let heights: HashSet<i64> = syncables
                .find_all_by_last_in_session_or_era(index_version, last_in_session, last_in_era)
                .await?
                .into_iter()
                .map(|syncable| syncable.height)
                .filter(|height| (start..=end).contains(height))
                .collect();
            if heights.is_empty() {
                return Err(SourceError::NoWhitelistHeights { index_version });
            }
            Some(Arc::new(heights))
        } else {
            None
        };

        logging::log_info(&format!(
            "Backfill source ready [start_height={}] [end_height={}] [whitelisted={}]",
            start,
            end,
            whitelist.as_ref().map(|w| w.len()).unwrap_or(0)
        ));
        Ok(Self {
            cursor: HeightCursor::new(start, end),
            whitelist,
        })
    }

    pub fn with_range(start: i64, end: i64, whitelist: Option<Arc<HashSet<i64>>>) -> Self {
        Self {
            cursor: HeightCursor::new(start, end),
            whitelist,
        }
    }

    /// Disjoint sub-sources covering this source's range, sharing its whitelist
    pub fn split(&self, n: usize) -> Vec<BackfillSource> {
        self.cursor
            .split(n)
            .into_iter()
            .map(|(start, end)| Self::with_range(start, end, self.whitelist.clone()))
            .collect()
    }

    pub fn start_height(&self) -> i64 {
        self.cursor.start()
    }

    pub fn end_height(&self) -> i64 {
        self.cursor.end()
    }

    pub fn uses_whitelist(&self) -> bool {
        self.whitelist.is_some()
    }
}

impl Source for BackfillSource {
    fn next(&mut self) -> bool {
        self.cursor.advance()
    }

    fn current(&self) -> i64 {
        self.cursor.current()
    }

    fn skip(&self, stage: StageName) -> bool {
        match &self.whitelist {
            Some(heights) => stage != StageName::Syncer && !heights.contains(&self.cursor.current()),
            None => false,
        }
    }

    fn skip_task(&self, stage: StageName, task: &str) -> bool {
        self.skip(stage) && task != SYNCER_PERSISTOR_TASK_NAME
    }

    fn err(&self) -> Option<&SourceError> {
        None
    }

    fn len(&self) -> i64 {
        self.cursor.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::indexer::sequencer_tasks::tests::syncable;
    use crate::domain::models::Syncable;
    use crate::infrastructure::persistence::InMemoryStore;

    async fn seeded(rows: &[(i64, i64, bool)]) -> InMemoryStore {
        let store = InMemoryStore::new();
        for (height, index_version, last_in_session) in rows {
            let row = Syncable {
                index_version: *index_version,
                ..syncable(*height, *last_in_session, false)
            };
            store.create_or_update(&row).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_range_spans_outdated_heights() {
        let store = seeded(&[(10, 1, false), (11, 1, false), (12, 2, false), (13, 1, false), (14, 2, false)]).await;

        let mut source = BackfillSource::new(&store, 2, false, false).await.unwrap();
        assert_eq!((source.start_height(), source.end_height()), (10, 13));
        assert_eq!(source.len(), 4);

        let mut visited = Vec::new();
        while source.next() {
            visited.push(source.current());
        }
        assert_eq!(visited, vec![10, 11, 12, 13]);
    }

    #[tokio::test]
    async fn test_nothing_to_backfill() {
        let store = seeded(&[(10, 2, false), (11, 2, false)]).await;
        let err = BackfillSource::new(&store, 2, false, false).await.unwrap_err();
        assert!(matches!(err, SourceError::NothingToBackfill { index_version: 2 }));

        let empty = InMemoryStore::new();
        let err = BackfillSource::new(&empty, 2, false, false).await.unwrap_err();
        assert!(matches!(err, SourceError::NothingToBackfill { .. }));
    }

    #[tokio::test]
    async fn test_no_whitelist_heights() {
        let store = seeded(&[(10, 1, false), (11, 1, false)]).await;
        let err = BackfillSource::new(&store, 2, true, false).await.unwrap_err();
        assert!(matches!(err, SourceError::NoWhitelistHeights { index_version: 2 }));
    }

    #[tokio::test]
    async fn test_whitelist_skips_everything_but_syncer() {
        let store = seeded(&[
            (10, 1, false),
            (11, 1, true),
            (12, 1, false),
            (13, 1, true),
            (14, 1, false),
        ])
        .await;
        let mut source = BackfillSource::new(&store, 2, true, false).await.unwrap();
        assert!(source.uses_whitelist());

        while source.next() {
            let height = source.current();
            assert!(!source.skip(StageName::Syncer));
            let whitelisted = height == 11 || height == 13;
            for stage in &StageName::ORDERED[1..] {
                assert_eq!(source.skip(*stage), !whitelisted, "height {} stage {}", height, stage);
            }
        }
    }

    #[test]
    fn test_syncable_is_persisted_outside_whitelist() {
        use crate::application::indexer::persistor_tasks::BLOCK_SEQ_PERSISTOR_TASK_NAME;

        let whitelist: HashSet<i64> = [2].into_iter().collect();
        let mut source = BackfillSource::with_range(1, 2, Some(Arc::new(whitelist)));

        assert!(source.next());
        assert!(!source.skip_task(StageName::Persistor, SYNCER_PERSISTOR_TASK_NAME));
        assert!(source.skip_task(StageName::Persistor, BLOCK_SEQ_PERSISTOR_TASK_NAME));
        assert!(source.skip_task(StageName::Parser, "BlockParser"));

        assert!(source.next());
        assert!(!source.skip_task(StageName::Persistor, BLOCK_SEQ_PERSISTOR_TASK_NAME));
    }

    #[test]
    fn test_split_shares_whitelist() {
        let whitelist: HashSet<i64> = [3, 8].into_iter().collect();
        let source = BackfillSource::with_range(1, 10, Some(Arc::new(whitelist)));

        let mut chunks = source.split(2);
        assert_eq!(chunks.len(), 2);
        assert_eq!((chunks[0].start_height(), chunks[0].end_height()), (1, 5));
        assert_eq!((chunks[1].start_height(), chunks[1].end_height()), (6, 10));

        let second = &mut chunks[1];
        assert!(second.next());
        assert!(second.skip(StageName::Parser));
        while second.current() != 8 {
            assert!(second.next());
        }
        assert!(!second.skip(StageName::Parser));
    }
}
