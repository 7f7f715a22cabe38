//! Filesystem storage backend.

use async_trait::async_trait;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thumbs_core::path::validate_relative_path;
use thumbs_core::ports::Storage;
use thumbs_core::{Error, Result};
use tracing::debug;

/// Stores files under a root directory.
///
/// Writes go to a temporary file in the destination directory and are
/// renamed into place, so concurrent writers of the same path are safe and
/// readers only ever see complete files.
pub struct FilesystemStorage {
    root_dir: PathBuf,
}

impl FilesystemStorage {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        validate_relative_path(path)?;
        Ok(self.root_dir.join(path))
    }
}

#[async_trait]
impl Storage for FilesystemStorage {
    async fn exists(&self, path: &str) -> Result<bool> {
        let full_path = self.resolve(path)?;
        match tokio::fs::metadata(&full_path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Storage(format!(
                "Failed to stat {}: {}",
                full_path.display(),
                e
            ))),
        }
    }

    async fn open(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let full_path = self.resolve(path)?;
        match tokio::fs::read(&full_path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!(
                "Failed to read {}: {}",
                full_path.display(),
                e
            ))),
        }
    }

    async fn save(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let full_path = self.resolve(path)?;
        let bytes = bytes.to_vec();

        debug!(path = %full_path.display(), size = bytes.len(), "Writing file");

        tokio::task::spawn_blocking(move || write_atomic(&full_path, &bytes))
            .await
            .map_err(|e| Error::StorageWrite(format!("Write task failed: {}", e)))?
    }
}

fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    let parent = target
        .parent()
        .ok_or_else(|| Error::StorageWrite(format!("No parent for {}", target.display())))?;

    std::fs::create_dir_all(parent)
        .map_err(|e| Error::StorageWrite(format!("Failed to create dir: {}", e)))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .map_err(|e| Error::StorageWrite(format!("Failed to create temp file: {}", e)))?;
    tmp.write_all(bytes)
        .map_err(|e| Error::StorageWrite(format!("Failed to write: {}", e)))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| Error::StorageWrite(format!("Failed to sync: {}", e)))?;
    tmp.persist(target)
        .map_err(|e| Error::StorageWrite(format!("Failed to persist: {}", e.error)))?;

    Ok(())
}
