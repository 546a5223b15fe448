pub mod client;
pub mod error;
pub mod http_client;

pub use client::ChainClient;
pub use error::ChainClientError;
pub use http_client::HttpChainClient;
