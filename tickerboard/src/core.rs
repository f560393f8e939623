use std::sync::Arc;
use std::time::Duration;

use tickerboard_cache::TtlCache;
use tickerboard_core::{
    AggregatorConfig, CacheConfig, Clock, SourceSpec, SystemClock, TickerboardError, Transport,
};

/// Orchestrator that runs declared sources against a transport and a cache.
///
/// Cheap to clone; clones share the transport, the cache backend and the clock.
#[derive(Clone)]
pub struct Aggregator {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) cache: TtlCache,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) cfg: AggregatorConfig,
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("transport", &self.transport.name())
            .field("cache", &self.cache)
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing an [`Aggregator`].
pub struct AggregatorBuilder {
    transport: Option<Arc<dyn Transport>>,
    cache: Option<TtlCache>,
    cache_cfg: CacheConfig,
    clock: Option<Arc<dyn Clock>>,
    cfg: AggregatorConfig,
}

impl Default for AggregatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregatorBuilder {
    /// Create a new builder with defaults: in-memory cache with a two hour TTL,
    /// system clock, 10 s per-source timeout, stale fallback enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transport: None,
            cache: None,
            cache_cfg: CacheConfig::default(),
            clock: None,
            cfg: AggregatorConfig::default(),
        }
    }

    /// Set the transport used for every fetch. Required.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a prebuilt cache. Overrides [`cache_config`](Self::cache_config).
    #[must_use]
    pub fn cache(mut self, cache: TtlCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Choose the cache backend and default TTL.
    #[must_use]
    pub fn cache_config(mut self, cfg: CacheConfig) -> Self {
        self.cache_cfg = cfg;
        self
    }

    /// Replace the clock used for cache freshness and report timestamps.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replace the whole aggregator configuration.
    #[must_use]
    pub const fn config(mut self, cfg: AggregatorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Bound on each fetch for sources that do not set their own timeout.
    #[must_use]
    pub const fn default_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.default_timeout = timeout;
        self
    }

    /// Fall back to expired cache entries when a live fetch fails.
    #[must_use]
    pub const fn serve_stale_on_failure(mut self, yes: bool) -> Self {
        self.cfg.serve_stale_on_failure = yes;
        self
    }

    /// Build the aggregator.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no transport was set or the default timeout is zero.
    pub fn build(self) -> Result<Aggregator, TickerboardError> {
        let transport = self.transport.ok_or_else(|| {
            TickerboardError::invalid_arg("no transport set; add one via transport(...)")
        })?;
        if self.cfg.default_timeout.is_zero() {
            return Err(TickerboardError::invalid_arg(
                "default_timeout must be greater than zero",
            ));
        }
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let cache = self
            .cache
            .unwrap_or_else(|| TtlCache::from_config(&self.cache_cfg, Arc::clone(&clock)));
        Ok(Aggregator {
            transport,
            cache,
            clock,
            cfg: self.cfg,
        })
    }
}

impl Aggregator {
    /// Start building a new `Aggregator`.
    #[must_use]
    pub fn builder() -> AggregatorBuilder {
        AggregatorBuilder::new()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &AggregatorConfig {
        &self.cfg
    }

    /// The shared cache.
    #[must_use]
    pub const fn cache(&self) -> &TtlCache {
        &self.cache
    }

    /// Current time according to the aggregator's clock.
    #[must_use]
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Cache view for one source: its own TTL when declared, else the default.
    pub(crate) fn cache_for(&self, spec: &SourceSpec) -> TtlCache {
        spec.ttl
            .map_or_else(|| self.cache.clone(), |ttl| self.cache.with_ttl(ttl))
    }

    /// Effective fetch timeout for one source.
    pub(crate) fn timeout_for(&self, spec: &SourceSpec) -> Duration {
        spec.timeout.unwrap_or(self.cfg.default_timeout)
    }
}
