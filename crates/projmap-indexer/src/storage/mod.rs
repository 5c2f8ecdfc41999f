//! Persistence of the project index.
//!
//! The index is stored as one pretty-printed JSON document. Writes go to a
//! temporary sibling file first and are then renamed over the target, so a
//! reader never sees a half-written index.

use crate::index::ProjectIndex;
use crate::IndexerError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory under the project root used by [`IndexStore::for_project`].
pub const INDEX_DIR: &str = ".projmap";

/// File name of the index artifact.
pub const INDEX_FILE: &str = "index.json";

/// Reads and writes one index artifact.
#[derive(Debug, Clone)]
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    /// Store backed by an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<root>/.projmap/index.json`.
    pub fn for_project(root: &Path) -> Self {
        Self::new(root.join(INDEX_DIR).join(INDEX_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Write the index, replacing any previous artifact.
    pub async fn save(&self, index: &ProjectIndex) -> Result<(), IndexerError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }

        let json = to_json(index)?;

        // Atomic write: write to temp file, then rename
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, &json).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        debug!(path = ?self.path, size = json.len(), "Saved index");

        Ok(())
    }

    /// Read the index. A missing file is [`IndexerError::IndexNotFound`].
    pub async fn load(&self) -> Result<ProjectIndex, IndexerError> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(IndexerError::IndexNotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        let index: ProjectIndex = serde_json::from_str(&json)?;

        debug!(path = ?self.path, files = index.nodes.len(), "Loaded index");

        Ok(index)
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| INDEX_FILE.to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

/// The serialized form written by [`IndexStore::save`].
pub fn to_json(index: &ProjectIndex) -> Result<String, IndexerError> {
    let mut json = serde_json::to_string_pretty(index)?;
    json.push('\n');
    Ok(json)
}
