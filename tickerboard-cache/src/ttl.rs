use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tickerboard_core::{Clock, SystemClock};
use tickerboard_types::CacheConfig;

use crate::backend::{Backend, FileBackend, MemoryBackend, StoredRecord};
use crate::key::CacheKey;

/// A cache hit.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Key the entry was stored under.
    pub key: CacheKey,
    /// Raw payload as stored.
    pub payload: Value,
    /// Write time in epoch milliseconds.
    pub stored_at_epoch_millis: i64,
}

impl CacheEntry {
    /// Age of the entry at `now_ms`. Negative when stamped in the future.
    #[must_use]
    pub const fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.stored_at_epoch_millis)
    }
}

/// Freshness layer over a [`Backend`].
///
/// An entry is fresh while `0 <= now - stored_at < ttl`; entries stamped in the
/// future never count as fresh. A zero TTL disables the cache entirely: nothing
/// is written and nothing is fresh. A non-zero TTL below one millisecond is
/// rounded up to one millisecond. None of the
/// operations fail; backend errors are logged and treated as a miss.
#[derive(Clone)]
pub struct TtlCache {
    backend: Arc<dyn Backend>,
    ttl_ms: i64,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("backend", &self.backend.name())
            .field("ttl_ms", &self.ttl_ms)
            .finish_non_exhaustive()
    }
}

impl TtlCache {
    /// Cache over `backend` with the given TTL and clock.
    pub fn new(backend: Arc<dyn Backend>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let mut ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        if ttl_ms == 0 && !ttl.is_zero() {
            ttl_ms = 1;
        }
        Self {
            backend,
            ttl_ms,
            clock,
        }
    }

    /// In-memory cache on the system clock.
    #[must_use]
    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(Arc::new(MemoryBackend::new()), ttl, Arc::new(SystemClock))
    }

    /// Build from configuration: a file backend when `dir` is set, memory otherwise.
    pub fn from_config(cfg: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let backend: Arc<dyn Backend> = match &cfg.dir {
            Some(dir) => Arc::new(FileBackend::new(dir.clone())),
            None => Arc::new(MemoryBackend::new()),
        };
        Self::new(backend, cfg.default_ttl(), clock)
    }

    /// Same backend and clock, different TTL.
    #[must_use]
    pub fn with_ttl(&self, ttl: Duration) -> Self {
        Self::new(Arc::clone(&self.backend), ttl, Arc::clone(&self.clock))
    }

    /// Configured TTL.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(u64::try_from(self.ttl_ms).unwrap_or(0))
    }

    /// True when the TTL is zero.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.ttl_ms <= 0
    }

    /// Clock used for freshness checks.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Fresh entry for `key`, if any.
    pub async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        if self.is_disabled() {
            return None;
        }
        let entry = self.load(key).await?;
        let age = entry.age_ms(self.clock.now_ms());
        if (0..self.ttl_ms).contains(&age) {
            #[cfg(feature = "tracing")]
            tracing::debug!(key = %key, age_ms = age, "cache hit");
            Some(entry)
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!(key = %key, age_ms = age, "cache entry expired");
            None
        }
    }

    /// Entry for `key` regardless of age. Used for stale fallbacks.
    pub async fn get_stale(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.load(key).await
    }

    /// Store `payload` under `key` stamped with the current time.
    pub async fn put(&self, key: &CacheKey, payload: Value) {
        if self.is_disabled() {
            return;
        }
        let record = StoredRecord {
            data: payload,
            stored_at_epoch_millis: self.clock.now_ms(),
        };
        if let Err(_e) = self.backend.write(key, &record).await {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                key = %key,
                backend = self.backend.name(),
                error = %_e,
                "cache write failed"
            );
        }
    }

    /// Drop the entry for `key`.
    pub async fn invalidate(&self, key: &CacheKey) {
        if let Err(_e) = self.backend.remove(key).await {
            #[cfg(feature = "tracing")]
            tracing::warn!(key = %key, backend = self.backend.name(), error = %_e, "cache remove failed");
        }
    }

    async fn load(&self, key: &CacheKey) -> Option<CacheEntry> {
        match self.backend.read(key).await {
            Ok(Some(record)) => Some(CacheEntry {
                key: key.clone(),
                payload: record.data,
                stored_at_epoch_millis: record.stored_at_epoch_millis,
            }),
            Ok(None) => None,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    key = %key,
                    backend = self.backend.name(),
                    error = %_e,
                    "cache read failed; treating as empty"
                );
                None
            }
        }
    }
}
