use std::collections::HashMap;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::key::CacheKey;

/// Persisted form of one cache entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    /// Raw source payload.
    pub data: Value,
    /// Write time in epoch milliseconds.
    pub stored_at_epoch_millis: i64,
}

/// Failure inside a storage backend. Never escapes [`TtlCache`](crate::TtlCache).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("cache io: {0}")]
    Io(#[from] std::io::Error),
    /// Stored bytes could not be (de)serialized.
    #[error("cache record: {0}")]
    Serde(#[from] serde_json::Error),
    /// Backend cannot be used at all.
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Key/value storage used by the TTL cache.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Backend name used in logs.
    fn name(&self) -> &'static str;

    /// Read the record for `key`, `Ok(None)` if missing.
    async fn read(&self, key: &CacheKey) -> Result<Option<StoredRecord>, StoreError>;

    /// Replace the record for `key`.
    async fn write(&self, key: &CacheKey, record: &StoredRecord) -> Result<(), StoreError>;

    /// Remove the record for `key`; missing keys are not an error.
    async fn remove(&self, key: &CacheKey) -> Result<(), StoreError>;
}

/// In-process backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    inner: Mutex<HashMap<CacheKey, StoredRecord>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// True if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn read(&self, key: &CacheKey) -> Result<Option<StoredRecord>, StoreError> {
        Ok(self.inner.lock().await.get(key).cloned())
    }

    async fn write(&self, key: &CacheKey, record: &StoredRecord) -> Result<(), StoreError> {
        self.inner.lock().await.insert(key.clone(), record.clone());
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> Result<(), StoreError> {
        self.inner.lock().await.remove(key);
        Ok(())
    }
}

/// Durable backend storing `<dir>/<key>.json`, one file per key.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader sees either the previous record or the new one.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

impl FileBackend {
    /// Use `dir` as the cache root. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache root.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for `key`.
    #[must_use]
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl Backend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn read(&self, key: &CacheKey) -> Result<Option<StoredRecord>, StoreError> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &CacheKey, record: &StoredRecord) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec(record)?;
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = self.dir.join(format!("{key}.{seq}.tmp"));
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, self.path_for(key)).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
