//! tickerboard-http
//!
//! A [`Transport`](tickerboard_core::Transport) over `reqwest`, plus ready-made
//! [`SourceSpec`](tickerboard_core::SourceSpec) presets for the upstream
//! services a dashboard talks to.
//!
//! Presets are pure: they only describe requests, shapes and extractors, so
//! they work with any transport (including the mock one in tests).
#![warn(missing_docs)]

/// Source presets grouped by upstream service.
pub mod presets;
mod symbol;
mod transport;

pub use symbol::extract_symbol;
pub use transport::{HttpConfig, HttpTransport};
