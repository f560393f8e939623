use std::sync::LazyLock;

use regex::Regex;

static TICKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{1,5}\b").expect("ticker regex"));

/// First run of one to five upper-case ASCII letters that forms a whole word.
///
/// ```
/// assert_eq!(tickerboard_http::extract_symbol("Is AAPL a buy?"), Some("AAPL".into()));
/// assert_eq!(tickerboard_http::extract_symbol("nothing here"), None);
/// ```
#[must_use]
pub fn extract_symbol(text: &str) -> Option<String> {
    TICKER.find(text).map(|m| m.as_str().to_string())
}
