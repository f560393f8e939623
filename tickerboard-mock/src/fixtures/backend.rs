use chrono::Days;
use serde_json::{Map, Value, json};
use tickerboard_core::{SourceFailure, SourceResult};

use super::{base_price, close, start};

/// Days of history served by `/api/stock_data`.
pub const HISTORY_DAYS: u32 = 5;
/// Default forecast horizon.
pub const FORECAST_DAYS: u32 = 3;

fn unknown(symbol: &str) -> SourceFailure {
    SourceFailure::http(404, format!("No data available for {symbol}"))
}

fn iso(i: u32) -> String {
    (start() + Days::new(u64::from(i)))
        .format("%Y-%m-%dT00:00:00.000")
        .to_string()
}

pub fn stock_data(symbol: &str) -> SourceResult {
    if symbol == "GARBAGE" {
        return Ok(json!({"current_price": 1.0}));
    }
    let base = base_price(symbol).ok_or_else(|| unknown(symbol))?;
    let mut frame = Map::new();
    let columns: [(&str, f64); 4] = [
        ("Close", 0.0),
        ("BB Lower", -5.0),
        ("BB Upper", 5.0),
        ("50 Day SMA", -2.0),
    ];
    for (column, offset) in columns {
        let values: Map<String, Value> = (0..HISTORY_DAYS)
            .map(|i| (iso(i), json!(close(base, i) + offset)))
            .collect();
        frame.insert(format!("('{column}', '{symbol}')"), Value::Object(values));
    }
    // Not enough history for the long average: the column exists but is empty.
    let sma_200: Map<String, Value> = (0..HISTORY_DAYS).map(|i| (iso(i), Value::Null)).collect();
    frame.insert(format!("('200 Day SMA', '{symbol}')"), Value::Object(sma_200));

    Ok(json!({
        "historical_data": frame,
        "current_price": close(base, HISTORY_DAYS - 1),
    }))
}

/// Forecast rows for the `days` days after the history window.
pub fn forecast(symbol: &str, days: u32) -> SourceResult {
    let base = base_price(symbol).ok_or_else(|| unknown(symbol))?;
    let rows: Vec<Value> = (HISTORY_DAYS..HISTORY_DAYS + days)
        .map(|i| {
            let yhat = close(base, i);
            json!({"ds": iso(i), "yhat": yhat, "yhat_lower": yhat - 3.0, "yhat_upper": yhat + 3.0})
        })
        .collect();
    Ok(json!({"historical": [], "forecast": rows}))
}

pub fn predictions(symbol: &str) -> SourceResult {
    let base = base_price(symbol).ok_or_else(|| unknown(symbol))?;
    Ok(json!({
        "symbol": symbol,
        "models": {
            "linear": {"next_close": close(base, HISTORY_DAYS)},
            "lstm": {"next_close": close(base, HISTORY_DAYS) + 0.75},
        }
    }))
}

pub fn news(symbol: &str) -> SourceResult {
    base_price(symbol).ok_or_else(|| unknown(symbol))?;
    Ok(json!([
        {
            "title": format!("{symbol} shares edge higher"),
            "description": "Steady gains through the session.",
            "url": "https://news.example.com/1",
            "sentiment_score": 0.42
        },
        {
            "title": format!("Analysts split on {symbol}"),
            "description": "Mixed views ahead of earnings.",
            "url": "https://news.example.com/2",
            "sentiment_score": -0.05
        }
    ]))
}

pub fn recommendation(symbol: &str) -> SourceResult {
    let base = base_price(symbol).ok_or_else(|| unknown(symbol))?;
    Ok(json!({
        "symbol": symbol,
        "recommendation": "HOLD",
        "confidence": 0.61,
        "current_price": close(base, HISTORY_DAYS - 1),
    }))
}
