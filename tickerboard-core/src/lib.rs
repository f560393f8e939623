//! tickerboard-core
//!
//! Building blocks shared by the aggregator and its transports.
//!
//! - `transport`: the `Transport` trait, the only place network I/O happens.
//! - `clock`: wall-clock abstraction so freshness checks are testable.
//! - `source`: per-source declarations (`SourceSpec`, `Shape`, `Extract`).
//! - `fetch`: the source fetcher, which bounds a call and shape-checks its body.
//! - `align`: merges independently keyed series onto one day axis.
//!
//! Async runtime (Tokio)
//! ---------------------
//! `fetch_source` bounds calls with `tokio::time::timeout`, so it must run
//! under a Tokio 1.x runtime with the time driver enabled.
#![warn(missing_docs)]

/// Day-axis alignment of named series.
pub mod align;
/// Clock abstraction.
pub mod clock;
/// Timeout-bounded, shape-checked single-source fetch.
pub mod fetch;
/// Source declarations: shape checks and payload extractors.
pub mod source;
/// The transport seam.
pub mod transport;

pub use align::{Series, align, parse_day};
pub use clock::{Clock, ManualClock, SystemClock};
pub use fetch::fetch_source;
pub use source::{Extract, ExtractFn, Shape, SourceSpec};
pub use transport::Transport;

pub use tickerboard_types::{
    AggregationReport, AggregatorConfig, CacheConfig, ErrorKind, FieldSummary, Method,
    RequestSpec, SourceFailure, SourceResult, TickerboardError, TimePoint,
};
