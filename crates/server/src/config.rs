use std::fs;

use serde::Deserialize;

pub const LOCAL_ENV: &str = "local";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
    pub replica_database_urls: Vec<String>,
    pub allowed_origins: Vec<String>,
    pub environment: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8000".into(),
            database_url: "sqlite://./data/server.db".into(),
            replica_database_urls: Vec::new(),
            allowed_origins: vec!["http://localhost:4200".into()],
            environment: None,
        }
    }
}

impl Settings {
    pub fn is_local(&self) -> bool {
        self.environment.as_deref() == Some(LOCAL_ENV)
    }

    pub fn default_log_filter(&self) -> &'static str {
        if self.is_local() {
            "debug,sqlx=debug"
        } else {
            "info"
        }
    }
}

/// Shape of `server.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    database_url: Option<String>,
    replica_database_urls: Option<Vec<String>>,
    allowed_origins: Option<Vec<String>>,
    env: Option<String>,
}

pub fn load_settings() -> Settings {
    let raw = fs::read_to_string("server.toml").ok();
    settings_from_sources(raw.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then the toml file, then environment variables. Later sources win.
pub fn settings_from_sources(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file_contents {
        match toml::from_str::<FileSettings>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.bind_addr {
                    settings.server_bind = v;
                }
                if let Some(v) = file_cfg.database_url {
                    settings.database_url = v;
                }
                if let Some(v) = file_cfg.replica_database_urls {
                    settings.replica_database_urls = v;
                }
                if let Some(v) = file_cfg.allowed_origins {
                    settings.allowed_origins = v;
                }
                if let Some(v) = file_cfg.env {
                    settings.environment = Some(v);
                }
            }
            Err(error) => {
                tracing::warn!(%error, "ignoring malformed server.toml");
            }
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("APP__REPLICA_DATABASE_URLS") {
        settings.replica_database_urls = split_list(&v);
    }

    if let Some(v) = env("APP__ALLOWED_ORIGINS") {
        settings.allowed_origins = split_list(&v);
    }

    if let Some(v) = env("ENV") {
        settings.environment = Some(v);
    }

    settings
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn prepare_database_url(raw_database_url: &str) -> anyhow::Result<String> {
    let database_url = normalize_database_url(raw_database_url);
    storage::ensure_sqlite_parent_dir_exists(&database_url)?;
    Ok(database_url)
}

pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
