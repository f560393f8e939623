//! Tickerboard aggregates several market-data sources into one chart-ready view.
//!
//! Overview
//! - Each source is described declaratively by a [`SourceSpec`]: the request,
//!   the expected body shape, how to extract day-keyed series, and its TTL.
//! - [`Aggregator::run`] checks the cache for every source, fetches all misses
//!   concurrently, caches the successes, aligns series onto one ascending day
//!   axis and returns an [`AggregationReport`].
//! - A failing source never fails the run. It is listed in `report.failures`
//!   and, when enabled, backfilled from an expired cache entry.
//!
//! Key behaviors
//! - Cache checks all finish before any fetch starts; the report is assembled
//!   only after every fetch settles.
//! - A [`Session`] tags runs with a generation. Starting a new run or calling
//!   [`Session::cancel`] supersedes older runs: their in-flight fetches are
//!   dropped and their responses never reach the cache.
//! - [`Aggregator::refresh_every`] repeats a run on an interval until the
//!   returned [`RefreshHandle`] is stopped or dropped.
//! - Retries are left to the caller.
//!
//! Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickerboard::{Aggregator, presets};
//! use tickerboard_http::{HttpConfig, HttpTransport};
//!
//! let http = Arc::new(HttpTransport::new(&HttpConfig::default())?);
//! let agg = Aggregator::builder().transport(http).build()?;
//! let specs = presets::backend::analysis(presets::backend::DEFAULT_BASE, "AAPL", 30);
//! let report = agg.run("AAPL", &specs).await?;
//! for (source, kind) in &report.failures {
//!     eprintln!("{source} unavailable ({kind})");
//! }
//! ```
#![warn(missing_docs)]

mod core;
mod pipeline;

pub use crate::core::{Aggregator, AggregatorBuilder};
pub use pipeline::refresh::RefreshHandle;
pub use pipeline::selection::{CHART_DAYS, SelectionInsight, SelectionSources};
pub use pipeline::session::{RunGuard, Session};

pub use tickerboard_cache::{
    Backend, CacheEntry, CacheKey, FileBackend, MemoryBackend, StoreError, TtlCache,
};
pub use tickerboard_core::{
    AggregationReport, AggregatorConfig, CacheConfig, Clock, ErrorKind, Extract, FieldSummary,
    ManualClock, Method, RequestSpec, Series, Shape, SourceFailure, SourceResult, SourceSpec,
    SystemClock, TickerboardError, TimePoint, Transport, align, fetch_source,
};
pub use tickerboard_http::{extract_symbol, presets};
