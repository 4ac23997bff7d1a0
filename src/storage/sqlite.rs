use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

use super::{Record, RecordKind, SnapshotStore, Storage};
use crate::config::DatabaseConfig;
use crate::error::{StorageError, StorageResult};
use crate::story::{StoryPath, StorySnapshot};

/// Static migrator that embeds migrations at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Name of the snapshot row used by authoring sessions.
const CURRENT_SNAPSHOT: &str = "current";

/// SQLite-backed storage implementation
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    pub async fn new(config: &DatabaseConfig) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Connection {
                message: format!("Failed to create database directory: {}", e),
            })?;
        }

        let database_url = format!("sqlite://{}?mode=rwc", config.path.display());

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to connect to database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Create an in-memory database (single connection, so every query sees
    /// the same database)
    pub async fn new_in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(|e| {
            StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            }
        })?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to open in-memory database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Run database migrations using embedded sqlx migrations
    async fn run_migrations(&self) -> StorageResult<()> {
        info!("Running database migrations...");

        MIGRATOR.run(&self.pool).await.map_err(|e| StorageError::Migration {
            message: format!("Failed to run migrations: {}", e),
        })?;

        info!("Database migrations completed successfully");
        Ok(())
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn list_records(&self, kind: RecordKind) -> StorageResult<Vec<Record>> {
        let rows: Vec<RecordRow> = sqlx::query_as(
            r#"
            SELECT id, kind, story_path, story_line, created_at, updated_at
            FROM records
            WHERE kind = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(kind.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Record::try_from).collect()
    }

    async fn get_record(&self, kind: RecordKind, id: &str) -> StorageResult<Option<Record>> {
        let row: Option<RecordRow> = sqlx::query_as(
            r#"
            SELECT id, kind, story_path, story_line, created_at, updated_at
            FROM records
            WHERE kind = ? AND id = ?
            "#,
        )
        .bind(kind.to_string())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Record::try_from).transpose()
    }

    async fn create_record(&self, record: &Record) -> StorageResult<()> {
        let story_line = serde_json::to_string(&record.document.dialogs)?;

        sqlx::query(
            r#"
            INSERT INTO records (id, kind, story_path, story_line, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(record.kind.to_string())
        .bind(&record.document.label)
        .bind(&story_line)
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(kind = %record.kind, id = %record.id, "Record created");
        Ok(())
    }

    async fn update_record(&self, record: &Record) -> StorageResult<()> {
        let story_line = serde_json::to_string(&record.document.dialogs)?;

        let result = sqlx::query(
            r#"
            UPDATE records
            SET story_path = ?, story_line = ?, updated_at = ?
            WHERE kind = ? AND id = ?
            "#,
        )
        .bind(&record.document.label)
        .bind(&story_line)
        .bind(record.updated_at.to_rfc3339())
        .bind(record.kind.to_string())
        .bind(&record.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::RecordNotFound {
                kind: record.kind.to_string(),
                id: record.id.clone(),
            });
        }

        debug!(kind = %record.kind, id = %record.id, "Record updated");
        Ok(())
    }

    async fn delete_record(&self, kind: RecordKind, id: &str) -> StorageResult<()> {
        sqlx::query("DELETE FROM records WHERE kind = ? AND id = ?")
            .bind(kind.to_string())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for SqliteStorage {
    async fn load_snapshot(&self) -> StorageResult<Option<StorySnapshot>> {
        let document: Option<String> =
            sqlx::query_scalar("SELECT document FROM snapshots WHERE name = ?")
                .bind(CURRENT_SNAPSHOT)
                .fetch_optional(&self.pool)
                .await?;

        match document {
            Some(document) => Ok(StorySnapshot::from_json(&document)?),
            None => Ok(None),
        }
    }

    async fn save_snapshot(&self, snapshot: &StorySnapshot) -> StorageResult<()> {
        let document = serde_json::to_string(snapshot)?;

        sqlx::query(
            r#"
            INSERT INTO snapshots (name, document, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET document = excluded.document, updated_at = excluded.updated_at
            "#,
        )
        .bind(CURRENT_SNAPSHOT)
        .bind(&document)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        info!(paths = snapshot.story.len(), "Snapshot written to database");
        Ok(())
    }
}

// Internal row types for SQLx mapping
#[derive(sqlx::FromRow)]
struct RecordRow {
    id: String,
    kind: String,
    story_path: String,
    story_line: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<RecordRow> for Record {
    type Error = StorageError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let kind = RecordKind::from_str(&row.kind)
            .map_err(|message| StorageError::Query { message })?;

        Ok(Self {
            id: row.id,
            kind,
            document: StoryPath {
                label: row.story_path,
                dialogs: serde_json::from_str(&row.story_line)?,
            },
            created_at: parse_timestamp(&row.created_at),
            updated_at: parse_timestamp(&row.updated_at),
        })
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
