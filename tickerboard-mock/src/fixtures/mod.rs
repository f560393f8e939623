pub mod alpha_vantage;
pub mod backend;
pub mod sentiment;

use chrono::NaiveDate;

/// First fixture day.
pub fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

/// Deterministic base price per symbol.
pub fn base_price(symbol: &str) -> Option<f64> {
    match symbol {
        "AAPL" => Some(185.0),
        "MSFT" => Some(370.0),
        "NVDA" => Some(480.0),
        "GOOGL" => Some(140.0),
        "IBM" => Some(160.0),
        "NIFTY" => Some(21_700.0),
        "SENSEX" => Some(71_800.0),
        "TIMEOUT" | "THROTTLE" | "GARBAGE" => Some(100.0),
        _ => None,
    }
}

/// Close on day `i` (0-based): a gentle deterministic drift.
pub fn close(base: f64, i: u32) -> f64 {
    base + f64::from(i) * 1.25
}
