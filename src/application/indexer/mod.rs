//! Polkadot indexing tasks, sources and their wiring

pub mod aggregator_tasks;
pub mod fetcher_tasks;
pub mod parser_tasks;
pub mod payload;
pub mod persistor_tasks;
pub mod pipeline;
pub mod reward_tasks;
pub mod sequencer_tasks;
pub mod source_backfill;
pub mod source_live;
pub mod syncer_tasks;
pub mod system_event_tasks;

pub use payload::Payload;
pub use pipeline::{BackfillConfig, IndexConfig, IndexingPipeline};
pub use source_backfill::BackfillSource;
pub use source_live::LiveSource;
