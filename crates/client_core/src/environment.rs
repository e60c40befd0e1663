use std::time::Duration;

use config::{Config, File};
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// Prefix of environment variables read by [`Environment::load`], e.g. `APP__API_HOST`.
pub const ENV_PREFIX: &str = "APP";

#[derive(Debug, Default, Deserialize)]
struct RawEnvironment {
    api_host: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Startup configuration of the front end. Built once and never mutated;
/// share it by reference or clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    api_host: String,
    request_timeout: Option<Duration>,
}

impl Environment {
    pub fn new(api_host: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_host: validate_api_host(api_host)?,
            request_timeout: None,
        })
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Reads `<file_stem>.{toml,json,yaml,..}` if present, then `APP__*`
    /// variables, then the explicit override.
    pub fn load(file_stem: &str, api_host_override: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name(file_stem).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );
        if let Some(api_host) = api_host_override {
            builder = builder.set_override("api_host", api_host)?;
        }
        Self::from_config(builder.build()?)
    }

    pub fn from_config(cfg: Config) -> Result<Self, ConfigError> {
        let raw: RawEnvironment = cfg.try_deserialize()?;
        let api_host = raw.api_host.ok_or(ConfigError::MissingApiHost)?;
        Ok(Self {
            api_host: validate_api_host(&api_host)?,
            request_timeout: raw.request_timeout_secs.map(Duration::from_secs),
        })
    }

    /// Base URL without a trailing slash.
    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }
}

fn validate_api_host(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::MissingApiHost);
    }

    let invalid = |reason: String| ConfigError::InvalidApiHost {
        value: raw.to_string(),
        reason,
    };

    let parsed = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".into()));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed".into()));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/environment_tests.rs"]
mod tests;
