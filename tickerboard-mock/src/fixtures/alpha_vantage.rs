use chrono::Days;
use serde_json::{Map, Value, json};
use tickerboard_core::SourceResult;

use super::{base_price, close, start};

pub const DAILY_DAYS: u32 = 7;

fn special(symbol: &str) -> Option<Value> {
    match symbol {
        "THROTTLE" => Some(json!({
            "Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."
        })),
        "GARBAGE" => Some(json!({"unexpected": true})),
        _ => None,
    }
}

pub fn invalid_call(function: &str) -> Value {
    json!({
        "Error Message": format!("Invalid API call. Please retry or visit the documentation for {function}.")
    })
}

pub fn daily(symbol: &str) -> SourceResult {
    if let Some(v) = special(symbol) {
        return Ok(v);
    }
    let Some(base) = base_price(symbol) else {
        return Ok(invalid_call("TIME_SERIES_DAILY"));
    };
    let mut series = Map::new();
    for i in 0..DAILY_DAYS {
        let day = start() + Days::new(u64::from(i));
        let c = close(base, i);
        series.insert(
            day.format("%Y-%m-%d").to_string(),
            json!({
                "1. open": format!("{:.4}", c - 0.5),
                "2. high": format!("{:.4}", c + 1.0),
                "3. low": format!("{:.4}", c - 1.0),
                "4. close": format!("{c:.4}"),
                "5. volume": "1000000"
            }),
        );
    }
    Ok(json!({
        "Meta Data": {"1. Information": "Daily Prices", "2. Symbol": symbol},
        "Time Series (Daily)": series
    }))
}

/// Two sessions of bars; the last bar of each day closes at `close(base, i) + 0.5`.
pub fn intraday(symbol: &str, interval: &str) -> SourceResult {
    if let Some(v) = special(symbol) {
        return Ok(v);
    }
    let Some(base) = base_price(symbol) else {
        return Ok(invalid_call("TIME_SERIES_INTRADAY"));
    };
    let mut series = Map::new();
    for i in 0..2u32 {
        let day = (start() + Days::new(u64::from(i))).format("%Y-%m-%d");
        let c = close(base, i);
        for (time, px) in [("09:35:00", c - 0.5), ("12:00:00", c), ("15:55:00", c + 0.5)] {
            series.insert(format!("{day} {time}"), json!({"4. close": format!("{px:.4}")}));
        }
    }
    let mut body = Map::new();
    body.insert(
        "Meta Data".into(),
        json!({"2. Symbol": symbol, "4. Interval": interval}),
    );
    body.insert(format!("Time Series ({interval})"), Value::Object(series));
    Ok(Value::Object(body))
}

pub fn global_quote(symbol: &str) -> SourceResult {
    if let Some(v) = special(symbol) {
        return Ok(v);
    }
    let Some(base) = base_price(symbol) else {
        return Ok(json!({"Global Quote": {}}));
    };
    let price = close(base, DAILY_DAYS - 1);
    Ok(json!({
        "Global Quote": {
            "01. symbol": symbol,
            "05. price": format!("{price:.4}"),
            "08. previous close": format!("{:.4}", close(base, DAILY_DAYS - 2)),
        }
    }))
}
