use async_trait::async_trait;
use serde_json::Value;
use tickerboard_core::{Method, RequestSpec, SourceFailure, SourceResult, Transport};

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockController, DynamicMockTransport, MockBehavior};

/// Mock transport for CI-safe tests and demos. Answers from static fixtures.
///
/// Routing follows the request path: `/query` is served as Alpha Vantage,
/// `/api/*` as the analytics backend and `/analyze` as the sentiment endpoint.
/// A few magic symbols force failure modes:
///
/// - `FAIL`: HTTP 500
/// - `TIMEOUT`: never answers, so any fetch bound expires
/// - `THROTTLE`: Alpha Vantage throttling notice in a 200 body
/// - `GARBAGE`: a 200 body that is not in the declared shape
pub struct MockTransport;

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn not_found(what: &str) -> SourceFailure {
        SourceFailure::http(404, format!("not found: {what}"))
    }

    async fn maybe_fail_or_timeout(symbol: &str) -> Result<(), SourceFailure> {
        match symbol {
            "FAIL" => Err(SourceFailure::http(500, "forced failure")),
            "TIMEOUT" => std::future::pending().await,
            _ => Ok(()),
        }
    }
}

/// The `symbol` a request is about, from the query string or the JSON body.
fn symbol_of(req: &RequestSpec) -> Option<String> {
    req.query
        .iter()
        .find(|(k, _)| k == "symbol")
        .map(|(_, v)| v.clone())
        .or_else(|| {
            req.body
                .as_ref()
                .and_then(|b| b.get("symbol"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
}

fn query_param<'a>(req: &'a RequestSpec, key: &str) -> Option<&'a str> {
    req.query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn send(&self, req: &RequestSpec) -> SourceResult {
        let url = url::Url::parse(&req.url)
            .map_err(|e| SourceFailure::network(format!("bad url: {e}")))?;
        let symbol = symbol_of(req).unwrap_or_default();
        Self::maybe_fail_or_timeout(&symbol).await?;

        match (req.method, url.path()) {
            (Method::Get, "/query") => {
                let function = query_param(req, "function").unwrap_or_default();
                match function {
                    "TIME_SERIES_DAILY" => fixtures::alpha_vantage::daily(&symbol),
                    "TIME_SERIES_INTRADAY" => {
                        let interval = query_param(req, "interval").unwrap_or("5min");
                        fixtures::alpha_vantage::intraday(&symbol, interval)
                    }
                    "GLOBAL_QUOTE" => fixtures::alpha_vantage::global_quote(&symbol),
                    other => Ok(fixtures::alpha_vantage::invalid_call(other)),
                }
            }
            (Method::Get, "/api/stock_data") => fixtures::backend::stock_data(&symbol),
            (Method::Get, "/api/forecast") => {
                let days = query_param(req, "forecast_days")
                    .and_then(|d| d.parse().ok())
                    .unwrap_or(fixtures::backend::FORECAST_DAYS);
                fixtures::backend::forecast(&symbol, days)
            }
            (Method::Post, "/api/predictions") => fixtures::backend::predictions(&symbol),
            (Method::Get, "/api/news") => fixtures::backend::news(&symbol),
            (Method::Get, "/api/recommendation") => fixtures::backend::recommendation(&symbol),
            (Method::Post, "/analyze") => fixtures::sentiment::analyze(req.body.as_ref()),
            (_, path) => Err(Self::not_found(path)),
        }
    }
}
