pub mod error;
pub mod indexer;
pub mod pipeline;
pub mod usecase;
