use crate::core::cache::BlobStore;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory blob store, lost when dropped
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty MemoryStore
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a MemoryStore already holding `blob`
    pub fn with_blob(blob: impl Into<Vec<u8>>) -> Self {
        Self {
            slot: Mutex::new(Some(blob.into())),
        }
    }

    /// Returns a copy of the stored blob
    pub async fn snapshot(&self) -> Option<Vec<u8>> {
        self.slot.lock().await.clone()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        let slot = self.slot.lock().await;
        debug!("Memory store LOAD ({} bytes)", slot.as_ref().map_or(0, Vec::len));
        Ok(slot.clone())
    }

    async fn save(&self, blob: &[u8]) -> Result<()> {
        let mut slot = self.slot.lock().await;
        debug!("Memory store SAVE ({} bytes)", blob.len());
        *slot = Some(blob.to_vec());
        Ok(())
    }
}
