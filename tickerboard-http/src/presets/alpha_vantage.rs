use serde_json::Value;
use tickerboard_core::{Extract, RequestSpec, Shape, SourceSpec};

/// Public query endpoint.
pub const BASE_URL: &str = "https://www.alphavantage.co/query";
/// Top-level key of the daily series payload.
pub const DAILY_KEY: &str = "Time Series (Daily)";
/// Top-level key of the quote payload.
pub const QUOTE_KEY: &str = "Global Quote";
/// Close price field inside each series entry.
pub const CLOSE_FIELD: &str = "4. close";

fn query(function: &str, symbol: &str, api_key: &str) -> RequestSpec {
    RequestSpec::get(BASE_URL)
        .query("function", function)
        .query("symbol", symbol)
        .secret_query("apikey", api_key)
}

/// `TIME_SERIES_DAILY` (compact), closes as a series named `daily`.
pub fn daily(symbol: &str, api_key: &str) -> SourceSpec {
    let request = query("TIME_SERIES_DAILY", symbol, api_key).query("outputsize", "compact");
    SourceSpec::new("daily", request)
        .shape(Shape::alpha_vantage(DAILY_KEY))
        .extract(Extract::date_map(&[DAILY_KEY], CLOSE_FIELD))
}

/// `TIME_SERIES_INTRADAY`, closes collapsed to one value per day (the last bar).
///
/// The series takes the source name (`intraday` unless renamed).
pub fn intraday(symbol: &str, interval: &str, api_key: &str) -> SourceSpec {
    let key = format!("Time Series ({interval})");
    let request = query("TIME_SERIES_INTRADAY", symbol, api_key).query("interval", interval);
    SourceSpec::new("intraday", request)
        .shape(Shape::alpha_vantage(key.clone()))
        .extract(Extract::date_map(&[key.as_str()], CLOSE_FIELD))
}

/// `GLOBAL_QUOTE`, passed through. Read the price with [`quote_price`].
pub fn global_quote(symbol: &str, api_key: &str) -> SourceSpec {
    SourceSpec::new("quote", query("GLOBAL_QUOTE", symbol, api_key))
        .shape(Shape::alpha_vantage(QUOTE_KEY))
}

/// `"Global Quote"."05. price"` as a number.
#[must_use]
pub fn quote_price(payload: &Value) -> Option<f64> {
    let raw = payload.get(QUOTE_KEY)?.get("05. price")?;
    let price = match raw {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        other => other.as_f64()?,
    };
    price.is_finite().then_some(price)
}
