use async_trait::async_trait;
use reqwest::Client;
use shared::{domain::OrganizationList, protocol::ORGANIZATIONS_PATH};
use tracing::debug;

use crate::{environment::Environment, error::FetchError};

/// One-shot read of a JSON string array from the API. The view depends on
/// this capability rather than on a concrete client.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Vec<String>, FetchError>;
}

/// `<api_host><path>`, with `api_host` already stripped of its trailing slash.
pub fn request_url(api_host: &str, path: &str) -> String {
    format!("{api_host}{path}")
}

pub async fn fetch_organizations<F>(fetcher: &F) -> Result<OrganizationList, FetchError>
where
    F: Fetcher + ?Sized,
{
    fetcher.fetch(ORGANIZATIONS_PATH).await
}

#[derive(Clone)]
pub struct HttpFetcher {
    http: Client,
    api_host: String,
}

impl HttpFetcher {
    pub fn new(environment: &Environment) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = environment.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(FetchError::Client)?;
        Ok(Self::with_client(http, environment))
    }

    pub fn with_client(http: Client, environment: &Environment) -> Self {
        Self {
            http,
            api_host: environment.api_host().to_string(),
        }
    }

    pub fn api_host(&self) -> &str {
        &self.api_host
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<String>, FetchError> {
        let url = request_url(&self.api_host, path);
        debug!(%url, "GET");

        let transport = |source| FetchError::Transport {
            url: url.clone(),
            source,
        };
        let response = self.http.get(&url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        let names: Vec<String> =
            serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
                url: url.clone(),
                source,
            })?;
        debug!(%url, count = names.len(), "decoded string array");
        Ok(names)
    }
}

#[cfg(test)]
#[path = "tests/fetch_tests.rs"]
mod tests;
