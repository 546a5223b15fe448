use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::config::ChainConfig;
use crate::domain::models::{ChainStatus, HeightMeta, RawHeightData};
use crate::infrastructure::chain::client::ChainClient;
use crate::infrastructure::chain::error::ChainClientError;
use crate::utils::logging;

#[derive(Debug, Deserialize)]
struct HeadResponse {
    height: i64,
}

/// Chain client talking JSON to the chain proxy
pub struct HttpChainClient {
    client: Client,
    proxy_url: String,
}

impl HttpChainClient {
    /// Create a new chain proxy client
    pub fn new(config: &ChainConfig) -> Result<Self, ChainClientError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                ChainClientError::ResponseError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(HttpChainClient {
            client,
            proxy_url: config.proxy_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ChainClientError> {
        let url = format!("{}{}", self.proxy_url, path);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            logging::log_error(&format!("Chain proxy returned {} for {}", status, url));
            return Err(ChainClientError::ApiError {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn get_head(&self) -> Result<i64, ChainClientError> {
        let head: HeadResponse = self.get_json("/head").await?;
        Ok(head.height)
    }

    async fn get_status(&self) -> Result<ChainStatus, ChainClientError> {
        self.get_json("/status").await
    }

    async fn get_meta_by_height(&self, height: i64) -> Result<HeightMeta, ChainClientError> {
        self.get_json(&format!("/meta/{}", height)).await
    }

    async fn get_block_at_height(&self, height: i64) -> Result<RawHeightData, ChainClientError> {
        self.get_json(&format!("/height/{}", height)).await
    }
}
