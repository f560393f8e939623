use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for caller mistakes and configuration problems.
///
/// Runtime failures of individual sources never surface here; they are carried
/// as [`SourceFailure`](crate::SourceFailure) values inside a report.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TickerboardError {
    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Two source specs in the same run share a name.
    #[error("duplicate source name: {name}")]
    DuplicateSource {
        /// The repeated source name.
        name: String,
    },

    /// A source spec carries a URL that cannot be parsed.
    #[error("invalid url for source {name}: {msg}")]
    InvalidUrl {
        /// Source whose request spec is malformed.
        name: String,
        /// Parser message.
        msg: String,
    },

    /// Issues with returned or expected data.
    #[error("data issue: {0}")]
    Data(String),

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl TickerboardError {
    /// Helper: build an `InvalidArg` error.
    pub fn invalid_arg(msg: impl Into<String>) -> Self {
        Self::InvalidArg(msg.into())
    }

    /// Helper: build a `DuplicateSource` error.
    pub fn duplicate_source(name: impl Into<String>) -> Self {
        Self::DuplicateSource { name: name.into() }
    }

    /// Helper: build an `InvalidUrl` error.
    pub fn invalid_url(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidUrl {
            name: name.into(),
            msg: msg.into(),
        }
    }
}
