use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("response from {url} is not a JSON array of strings: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("api_host is not configured")]
    MissingApiHost,
    #[error("api_host '{value}' is invalid: {reason}")]
    InvalidApiHost { value: String, reason: String },
    #[error("failed to read environment configuration: {0}")]
    Source(#[from] config::ConfigError),
}
