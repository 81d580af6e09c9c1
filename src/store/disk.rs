use crate::core::cache::BlobStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// Blob store backed by a single file.
pub struct DiskStore {
    path: PathBuf,
}

impl DiskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl BlobStore for DiskStore {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(blob) => {
                debug!("Disk store LOAD from {}", self.path.display());
                Ok(Some(blob))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Disk store MISS, no file at {}", self.path.display());
                Ok(None)
            }
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read cache file: {}", self.path.display())),
        }
    }

    async fn save(&self, blob: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        tokio::fs::write(&self.path, blob)
            .await
            .with_context(|| format!("Failed to write cache file: {}", self.path.display()))?;
        debug!("Disk store SAVE to {}", self.path.display());
        Ok(())
    }
}
