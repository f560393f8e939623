use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure taxonomy for a single source fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Transport or connection failure, including timeouts.
    Network,
    /// Non-2xx HTTP status.
    HttpError,
    /// 2xx response whose body is not JSON or lacks the declared shape.
    MalformedPayload,
    /// Provider throttling signal; a distinguished kind of `HttpError`.
    RateLimited,
}

impl ErrorKind {
    /// Stable camelCase identifier, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::HttpError => "httpError",
            Self::MalformedPayload => "malformedPayload",
            Self::RateLimited => "rateLimited",
        }
    }

    /// True for `HttpError` and its `RateLimited` subtype.
    #[must_use]
    pub const fn is_http_error(self) -> bool {
        matches!(self, Self::HttpError | Self::RateLimited)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed fetch attempt, returned as data rather than raised.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct SourceFailure {
    /// Failure category.
    pub kind: ErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl SourceFailure {
    /// Build a failure of an arbitrary kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Helper: transport failure or timeout.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    /// Helper: non-2xx status.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::HttpError,
            format!("status {status}: {}", message.into()),
        )
    }

    /// Helper: body present but not in the declared shape.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedPayload, message)
    }

    /// Helper: provider throttled the request.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }
}

/// Outcome of one fetch attempt: the parsed body, or a typed failure.
pub type SourceResult = Result<serde_json::Value, SourceFailure>;
