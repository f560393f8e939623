//! Configuration types shared by the aggregator and its cache.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Two hours, the refresh window used for market-wide snapshots.
pub const DEFAULT_TTL_MS: u64 = 2 * 60 * 60 * 1000;

/// Global configuration for the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Bound on each source fetch when its spec does not set one.
    pub default_timeout: Duration,
    /// When a live fetch fails, fall back to an expired cache entry if one exists.
    pub serve_stale_on_failure: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(10),
            serve_stale_on_failure: true,
        }
    }
}

/// Cache backend selection and default freshness window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory for the durable file backend; `None` keeps entries in memory.
    pub dir: Option<PathBuf>,
    /// TTL applied to sources that do not declare their own.
    pub default_ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            default_ttl_ms: DEFAULT_TTL_MS,
        }
    }
}

impl CacheConfig {
    /// Durable cache rooted at `dir` with the default TTL.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Default TTL as a `Duration`.
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }
}
