//! Pure descriptions of outbound requests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::TickerboardError;

/// HTTP method used by a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// `GET`
    #[default]
    Get,
    /// `POST` with an optional JSON body.
    Post,
}

impl Method {
    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Description of one external call. Building it performs no I/O.
///
/// Secret query parameters (API keys) are sent on the wire but excluded from
/// [`params_snapshot`](Self::params_snapshot), so rotating a key does not
/// invalidate cached payloads and keys never reach the persistent store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// Absolute URL without the query string.
    pub url: String,
    /// HTTP method.
    #[serde(default)]
    pub method: Method,
    /// Query parameters in insertion order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<(String, String)>,
    /// Optional JSON body (POST only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Extra request headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip)]
    secret_query: Vec<(String, String)>,
}

impl RequestSpec {
    /// A `GET` request for `url`.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            query: Vec::new(),
            body: None,
            headers: BTreeMap::new(),
            secret_query: Vec::new(),
        }
    }

    /// A `POST` request for `url` carrying a JSON body.
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            body: Some(body),
            ..Self::get(url)
        }
    }

    /// Append a query parameter that participates in cache identity.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter that is sent but never cached or logged.
    #[must_use]
    pub fn secret_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.secret_query.push((key.into(), value.into()));
        self
    }

    /// Add a request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// All query parameters to put on the wire, public ones first.
    pub fn wire_query(&self) -> impl Iterator<Item = (&str, &str)> {
        self.query
            .iter()
            .chain(self.secret_query.iter())
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Canonical JSON identity of this request, used to derive cache keys.
    #[must_use]
    pub fn params_snapshot(&self) -> Value {
        json!({
            "method": self.method.as_str(),
            "url": self.url,
            "query": self.query,
            "body": self.body,
        })
    }

    /// Check that the URL is absolute and uses http(s).
    ///
    /// # Errors
    /// Returns `InvalidUrl` tagged with `source_name` when parsing fails or the
    /// scheme is not `http`/`https`.
    pub fn validate(&self, source_name: &str) -> Result<(), TickerboardError> {
        let parsed = url::Url::parse(&self.url)
            .map_err(|e| TickerboardError::invalid_url(source_name, e.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(TickerboardError::invalid_url(
                source_name,
                format!("unsupported scheme '{other}'"),
            )),
        }
    }
}
