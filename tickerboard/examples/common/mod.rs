use std::sync::Arc;

use tickerboard::Transport;
use tickerboard_http::{HttpConfig, HttpTransport};

/// Live HTTP transport, or the fixture mock when `TICKERBOARD_EXAMPLES_USE_MOCK` is set.
#[must_use]
pub fn get_transport() -> Arc<dyn Transport> {
    if std::env::var("TICKERBOARD_EXAMPLES_USE_MOCK").is_ok() {
        println!("--- (Using Mock Transport for CI) ---");
        return Arc::new(tickerboard_mock::MockTransport::new());
    }
    match HttpTransport::new(&HttpConfig::default()) {
        Ok(http) => Arc::new(http),
        Err(e) => {
            eprintln!("http client unavailable ({e}); falling back to the mock");
            Arc::new(tickerboard_mock::MockTransport::new())
        }
    }
}

/// Alpha Vantage key from `ALPHAVANTAGE_API_KEY`, or the public demo key.
#[must_use]
pub fn api_key() -> String {
    std::env::var("ALPHAVANTAGE_API_KEY").unwrap_or_else(|_| "demo".to_string())
}
