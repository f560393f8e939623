use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tickerboard_core::Transport;
use tickerboard_types::{Method, RequestSpec, SourceFailure, SourceResult, TickerboardError};

/// Settings for the underlying `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Bound on establishing a connection. Whole-request bounds are applied by
    /// the fetcher, per source.
    pub connect_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("tickerboard/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: Duration::from_secs(4),
        }
    }
}

/// JSON-over-HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with its own client.
    ///
    /// # Errors
    /// Returns `TickerboardError::Other` if the TLS backend cannot be initialised.
    pub fn new(cfg: &HttpConfig) -> Result<Self, TickerboardError> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .connect_timeout(cfg.connect_timeout)
            .build()
            .map_err(|e| TickerboardError::Other(e.to_string()))?;
        Ok(Self { http })
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn classify_status(status: StatusCode, body: &str) -> SourceFailure {
        let detail = provider_message(body);
        if status == StatusCode::TOO_MANY_REQUESTS {
            return SourceFailure::rate_limited(format!("status 429: {detail}"));
        }
        SourceFailure::http(status.as_u16(), detail)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "tickerboard::http::send",
            skip(self, req),
            fields(method = req.method.as_str(), url = %req.url),
        )
    )]
    async fn send(&self, req: &RequestSpec) -> SourceResult {
        let mut builder = match req.method {
            Method::Get => self.http.get(&req.url),
            Method::Post => self.http.post(&req.url),
        };
        let query: Vec<(&str, &str)> = req.wire_query().collect();
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        for (name, value) in &req.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(network_failure)?;
        let status = resp.status();
        let text = resp.text().await.map_err(network_failure)?;

        if !status.is_success() {
            #[cfg(feature = "tracing")]
            tracing::debug!(status = status.as_u16(), "non-success status");
            return Err(Self::classify_status(status, &text));
        }
        serde_json::from_str::<Value>(&text)
            .map_err(|e| SourceFailure::malformed(format!("body is not JSON: {e}")))
    }
}

fn network_failure(e: reqwest::Error) -> SourceFailure {
    if e.is_timeout() {
        SourceFailure::network(format!("timed out: {e}"))
    } else {
        SourceFailure::network(e.to_string())
    }
}

/// Prefer the backend's `{"error": ...}` message; fall back to a trimmed body.
fn provider_message(body: &str) -> String {
    const MAX: usize = 200;
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(body)
        && let Some(msg) = obj.get("error").and_then(Value::as_str)
    {
        return msg.to_string();
    }
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
