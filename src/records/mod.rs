//! CRUD over stored path records.
//!
//! This is the persistence contract the story web API works against:
//! list, get by id, create, update and delete for records of kind `path`
//! and `story`. Requests are independent and last-write-wins.

use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::storage::{validate_document, Record, RecordKind, Storage};
use crate::story::StoryPath;

/// Record operations on top of a [`Storage`] backend.
#[derive(Clone)]
pub struct RecordService<S> {
    storage: S,
}

impl<S: Storage> RecordService<S> {
    /// Wrap a storage backend.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// All records of a kind, oldest first.
    pub async fn list(&self, kind: RecordKind) -> StorageResult<Vec<Record>> {
        let records = self.storage.list_records(kind).await?;
        debug!(kind = %kind, count = records.len(), "Listed records");
        Ok(records)
    }

    /// One record, or [`StorageError::RecordNotFound`].
    pub async fn get(&self, kind: RecordKind, id: &str) -> StorageResult<Record> {
        self.storage
            .get_record(kind, id)
            .await?
            .ok_or_else(|| not_found(kind, id))
    }

    /// Store a new record. Documents with an empty `storyLine` are rejected.
    pub async fn create(&self, kind: RecordKind, document: StoryPath) -> StorageResult<Record> {
        validate_document(&document)?;

        let record = Record::new(kind, document);
        self.storage.create_record(&record).await?;

        info!(kind = %kind, id = %record.id, "Record created");
        Ok(record)
    }

    /// Replace the document of an existing record and return the result.
    pub async fn update(
        &self,
        kind: RecordKind,
        id: &str,
        document: StoryPath,
    ) -> StorageResult<Record> {
        let record = self.get(kind, id).await?.with_document(document);
        self.storage.update_record(&record).await?;

        info!(kind = %kind, id = %id, "Record updated");
        Ok(record)
    }

    /// Remove a record. Missing ids are ignored.
    pub async fn delete(&self, kind: RecordKind, id: &str) -> StorageResult<()> {
        self.storage.delete_record(kind, id).await?;
        info!(kind = %kind, id = %id, "Record deleted");
        Ok(())
    }
}

fn not_found(kind: RecordKind, id: &str) -> StorageError {
    StorageError::RecordNotFound {
        kind: kind.to_string(),
        id: id.to_string(),
    }
}
