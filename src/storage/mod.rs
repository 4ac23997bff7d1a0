//! Storage layer for stories.
//!
//! Two concerns live here:
//! - [`SnapshotStore`]: whole-story save/load used by the authoring session,
//!   backed by a JSON flat file ([`FileSnapshotStore`]) or SQLite.
//! - [`Storage`]: find/insert/update/delete of path-shaped [`Record`]s by
//!   identifier, backed by SQLite ([`SqliteStorage`]).

mod file;
mod sqlite;


pub use file::FileSnapshotStore;
pub use sqlite::SqliteStorage;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};
use crate::story::{StoryPath, StorySnapshot};

/// Kind of stored record. Both kinds share the same document shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// A single story path.
    #[default]
    Path,
    /// A path stored as part of a published story.
    Story,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Path => write!(f, "path"),
            RecordKind::Story => write!(f, "story"),
        }
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "path" => Ok(RecordKind::Path),
            "story" => Ok(RecordKind::Story),
            _ => Err(format!("Unknown record kind: {}", s)),
        }
    }
}

/// A stored path document with its identity and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique record identifier.
    pub id: String,
    /// Record kind.
    pub kind: RecordKind,
    /// The `{ storyPath, storyLine }` document.
    #[serde(flatten)]
    pub document: StoryPath,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Create a new record with a fresh id.
    pub fn new(kind: RecordKind, document: StoryPath) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            document,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the document and bump `updated_at`.
    pub fn with_document(mut self, document: StoryPath) -> Self {
        self.document = document;
        self.updated_at = Utc::now();
        self
    }
}

/// Reject documents that cannot be stored as new records.
pub fn validate_document(document: &StoryPath) -> StorageResult<()> {
    if document.label.trim().is_empty() {
        return Err(StorageError::InvalidDocument {
            message: "storyPath must not be empty".to_string(),
        });
    }
    if document.dialogs.is_empty() {
        return Err(StorageError::InvalidDocument {
            message: "storyLine must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Whole-story persistence used by the authoring session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the stored snapshot. `None` means there is no prior story.
    async fn load_snapshot(&self) -> StorageResult<Option<StorySnapshot>>;
    /// Overwrite the stored snapshot.
    async fn save_snapshot(&self, snapshot: &StorySnapshot) -> StorageResult<()>;
}

/// Storage trait for record operations.
///
/// Each call is independent; concurrent writers are last-write-wins.
#[async_trait]
pub trait Storage: Send + Sync {
    /// List every record of a kind, oldest first.
    async fn list_records(&self, kind: RecordKind) -> StorageResult<Vec<Record>>;
    /// Get a record by ID.
    async fn get_record(&self, kind: RecordKind, id: &str) -> StorageResult<Option<Record>>;
    /// Insert a new record.
    async fn create_record(&self, record: &Record) -> StorageResult<()>;
    /// Update an existing record.
    async fn update_record(&self, record: &Record) -> StorageResult<()>;
    /// Delete a record by ID. Deleting a missing record is not an error.
    async fn delete_record(&self, kind: RecordKind, id: &str) -> StorageResult<()>;
}
