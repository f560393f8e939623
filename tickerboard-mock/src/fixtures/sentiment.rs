use serde_json::{Value, json};
use tickerboard_core::{SourceFailure, SourceResult};

const POSITIVE: [&str; 5] = ["beat", "beats", "surge", "gain", "record"];
const NEGATIVE: [&str; 5] = ["miss", "misses", "plunge", "loss", "lawsuit"];

/// Word-count classifier standing in for the model endpoint.
pub fn analyze(body: Option<&Value>) -> SourceResult {
    let text = body
        .and_then(|b| b.get("text"))
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| SourceFailure::http(400, "No text provided"))?;
    let lower = text.to_lowercase();
    let score = |words: &[&str]| {
        lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| words.contains(w))
            .count()
    };
    let (pos, neg) = (score(&POSITIVE), score(&NEGATIVE));
    let label = match pos.cmp(&neg) {
        std::cmp::Ordering::Greater => "positive",
        std::cmp::Ordering::Less => "negative",
        std::cmp::Ordering::Equal => "neutral",
    };
    Ok(json!({ "sentiment": label }))
}
