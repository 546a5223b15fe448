use std::error::Error;
use std::fmt;

/// Error type for chain proxy operations
#[derive(Debug)]
pub enum ChainClientError {
    /// Error from the reqwest HTTP client
    HttpError(reqwest::Error),
    /// Error parsing JSON
    JsonError(serde_json::Error),
    /// The proxy answered with a non-success status
    ApiError { status: u16, url: String },
    /// Response error
    ResponseError(String),
}

impl fmt::Display for ChainClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainClientError::HttpError(e) => write!(f, "HTTP error: {}", e),
            ChainClientError::JsonError(e) => write!(f, "JSON error: {}", e),
            ChainClientError::ApiError { status, url } => {
                write!(f, "chain proxy returned status {} for {}", status, url)
            }
            ChainClientError::ResponseError(msg) => write!(f, "Response error: {}", msg),
        }
    }
}

impl Error for ChainClientError {}

impl From<reqwest::Error> for ChainClientError {
    fn from(error: reqwest::Error) -> Self {
        ChainClientError::HttpError(error)
    }
}

impl From<serde_json::Error> for ChainClientError {
    fn from(error: serde_json::Error) -> Self {
        ChainClientError::JsonError(error)
    }
}
