use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tracing::{debug, info};

use shared::domain::{
    validate_organization_name, OrganizationId, OrganizationList, OrganizationSummary,
};

/// Primary pool plus optional read replicas. Writes always hit the primary;
/// reads rotate across replicas when any are attached.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
    replicas: Arc<Vec<Pool<Sqlite>>>,
    next_replica: Arc<AtomicUsize>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self {
            pool,
            replicas: Arc::new(Vec::new()),
            next_replica: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Opens the primary and attaches each replica as a reader pool.
    /// Replicas must already exist and carry the schema.
    pub async fn with_replicas(database_url: &str, replica_urls: &[String]) -> Result<Self> {
        let mut storage = Self::new(database_url).await?;
        let mut replicas = Vec::with_capacity(replica_urls.len());
        for replica_url in replica_urls {
            let connect_options = SqliteConnectOptions::from_str(replica_url)
                .with_context(|| format!("invalid replica database url '{replica_url}'"))?;
            let pool = SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(connect_options)
                .await
                .with_context(|| format!("failed to open replica '{replica_url}'"))?;
            info!(%replica_url, "attached read replica");
            replicas.push(pool);
        }
        storage.replicas = Arc::new(replicas);
        Ok(storage)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub fn replica_count(&self) -> usize {
        self.replicas.len()
    }

    fn read_pool(&self) -> &Pool<Sqlite> {
        if self.replicas.is_empty() {
            return &self.pool;
        }
        let index = self.next_replica.fetch_add(1, Ordering::Relaxed) % self.replicas.len();
        debug!(replica = index, "routing read to replica");
        &self.replicas[index]
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn create_organization(&self, name: &str) -> Result<OrganizationId> {
        let name = validate_organization_name(name).map_err(|e| anyhow!(e))?;
        let now = Utc::now();
        let rec = sqlx::query(
            "INSERT INTO organizations (name, created_at, updated_at) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("failed to insert organization '{name}'"))?;
        Ok(OrganizationId(rec.get::<i64, _>(0)))
    }

    pub async fn list_organizations(&self) -> Result<Vec<OrganizationSummary>> {
        let rows = sqlx::query(
            "SELECT id, name, created_at, updated_at FROM organizations ORDER BY id ASC",
        )
        .fetch_all(self.read_pool())
        .await
        .context("failed to list organizations")?;

        Ok(rows
            .into_iter()
            .map(|row| OrganizationSummary {
                organization_id: OrganizationId(row.get::<i64, _>("id")),
                name: row.get::<String, _>("name"),
                created_at: row.get::<DateTime<Utc>, _>("created_at"),
                updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
            })
            .collect())
    }

    pub async fn list_organization_names(&self) -> Result<OrganizationList> {
        let names = sqlx::query_scalar::<_, String>("SELECT name FROM organizations ORDER BY id ASC")
            .fetch_all(self.read_pool())
            .await
            .context("failed to list organization names")?;
        Ok(names)
    }
}

/// Creates the directory holding a file-backed SQLite database. No-op for
/// in-memory and non-SQLite urls.
pub fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
