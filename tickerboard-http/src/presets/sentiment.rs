use std::time::Duration;

use serde_json::{Value, json};
use tickerboard_core::{RequestSpec, Shape, SourceSpec};

/// Where the classifier listens by default.
pub const DEFAULT_URL: &str = "http://localhost:5000/analyze";

/// `POST /analyze {text}`. Requires a `sentiment` label in the answer.
///
/// Sentiment of a given text does not change, so it is cached for a day.
pub fn analyze(url: &str, text: &str) -> SourceSpec {
    SourceSpec::new("sentiment", RequestSpec::post(url, json!({ "text": text })))
        .shape(Shape::any().requires("sentiment").error_on("error"))
        .ttl(Duration::from_secs(24 * 60 * 60))
}

/// The `sentiment` label of a classifier answer.
#[must_use]
pub fn label(payload: &Value) -> Option<&str> {
    payload.get("sentiment").and_then(Value::as_str)
}
