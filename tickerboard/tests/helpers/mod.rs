// Shared fixtures so test modules can `use crate::helpers::*;`
#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{Map, Value, json};
use tickerboard::{
    Aggregator, Extract, ManualClock, RequestSpec, Shape, SourceSpec, Transport,
};
use tickerboard_mock::{DynamicMockController, DynamicMockTransport, MockTransport};

pub const AAPL: &str = "AAPL";
pub const MSFT: &str = "MSFT";

/// Backend base URL as seen by the mock transport.
pub const BASE: &str = "http://localhost:5000";

/// Fixed starting instant for manual clocks (2024-01-08T00:00:00Z).
pub const T0: i64 = 1_704_672_000_000;

/// Two hours, the default TTL, in milliseconds.
pub const TWO_HOURS_MS: i64 = 7_200_000;

pub fn clock() -> ManualClock {
    ManualClock::new(T0)
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub fn aggregator(transport: Arc<dyn Transport>, clock: &ManualClock) -> Aggregator {
    Aggregator::builder()
        .transport(transport)
        .clock(Arc::new(clock.clone()))
        .build()
        .unwrap()
}

/// Aggregator over the fixture-backed mock transport.
pub fn fixture_aggregator(clock: &ManualClock) -> Aggregator {
    aggregator(Arc::new(MockTransport::new()), clock)
}

/// Aggregator over a scriptable mock and the controller driving it.
pub fn dynamic_aggregator(clock: &ManualClock) -> (Aggregator, DynamicMockController) {
    let (transport, ctrl) = DynamicMockTransport::new_with_controller("dynamic");
    (aggregator(transport, clock), ctrl)
}

pub fn url(path: &str) -> String {
    format!("{BASE}{path}")
}

/// A series-shaped source reading `{"data": {date: {"v": x}}}` from `path`.
pub fn series_spec(name: &str, path: &str, symbol: &str) -> SourceSpec {
    SourceSpec::new(name, RequestSpec::get(url(path)).query("symbol", symbol))
        .shape(Shape::any().requires("data").error_on("error"))
        .extract(Extract::date_map(&["data"], "v"))
}

/// A pass-through source at `path`.
pub fn extra_spec(name: &str, path: &str, symbol: &str) -> SourceSpec {
    SourceSpec::new(name, RequestSpec::get(url(path)).query("symbol", symbol))
        .shape(Shape::any().error_on("error"))
}

/// Body understood by [`series_spec`].
pub fn series_body(points: &[(&str, f64)]) -> Value {
    let data: Map<String, Value> = points
        .iter()
        .map(|(d, v)| ((*d).to_string(), json!({ "v": v })))
        .collect();
    json!({ "data": data })
}
