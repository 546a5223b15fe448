//! Entry points driven by the CLI and the worker loop

pub mod backfill;
pub mod purge;
pub mod start;
pub mod summarize;

pub use backfill::{BackfillUseCase, BackfillUseCaseConfig};
pub use purge::{PurgeOutcome, PurgeReport, PurgeUseCase};
pub use start::StartUseCase;
pub use summarize::{SummarizeReport, SummarizeUseCase};
