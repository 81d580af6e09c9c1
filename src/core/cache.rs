use crate::core::currency::RateTable;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Storage holding a single serialized blob.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns `None` when nothing has been stored yet.
    async fn load(&self) -> Result<Option<Vec<u8>>>;

    /// Replaces the stored blob.
    async fn save(&self, blob: &[u8]) -> Result<()>;
}

/// Rates persisted together with the time they were fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Seconds since the unix epoch, fractional part allowed.
    pub timestamp: f64,
    pub rates: RateTable,
}

impl CacheRecord {
    pub fn new(rates: RateTable, timestamp: f64) -> Self {
        Self { timestamp, rates }
    }

    pub fn from_slice(blob: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(blob)
    }

    pub fn to_vec(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn age_secs(&self, now: f64) -> f64 {
        now - self.timestamp
    }

    /// A record is stale once its age reaches the expiry.
    pub fn is_fresh(&self, now: f64, expiry: Duration) -> bool {
        self.age_secs(now) < expiry.as_secs_f64()
    }
}

pub fn now_epoch_secs() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}
