use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use super::SnapshotStore;
use crate::error::StorageResult;
use crate::story::StorySnapshot;

/// Snapshot store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Store snapshots at `path`. Nothing is touched until the first call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load_snapshot(&self) -> StorageResult<Option<StorySnapshot>> {
        if !fs::try_exists(&self.path).await? {
            debug!(path = %self.path.display(), "No snapshot file");
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).await?;
        Ok(StorySnapshot::from_json(&content)?)
    }

    async fn save_snapshot(&self, snapshot: &StorySnapshot) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let content = snapshot.to_json()?;
        fs::write(&self.path, content).await?;

        info!(path = %self.path.display(), paths = snapshot.story.len(), "Snapshot written");
        Ok(())
    }
}
