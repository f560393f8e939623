//! Tickerboard data transfer objects and configuration primitives.
//!
//! Everything here is plain data: request descriptions handed to a transport,
//! the per-source failure taxonomy, aligned day-granular series and the report
//! envelope returned by the aggregator.
#![warn(missing_docs)]

mod config;
mod error;
mod failure;
mod reports;
mod request;
mod series;

pub use config::{AggregatorConfig, CacheConfig, DEFAULT_TTL_MS};
pub use error::TickerboardError;
pub use failure::{ErrorKind, SourceFailure, SourceResult};
pub use reports::{AggregationReport, FieldSummary};
pub use request::{Method, RequestSpec};
pub use series::TimePoint;
