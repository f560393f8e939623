use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use tickerboard_core::{RequestSpec, SourceFailure, SourceResult, Transport};

/// Instruction for how a request should be answered.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Answer 200 with this body.
    Return(Value),
    /// Answer with an explicit status and body. Non-2xx statuses are classified
    /// like the HTTP transport does (429 is `rateLimited`).
    Status(u16, Value),
    /// Fail immediately with the provided failure.
    Fail(SourceFailure),
    /// Hang indefinitely (simulate a stalled upstream).
    Hang,
    /// Wait, then behave as the inner instruction.
    Delay(Duration, Box<MockBehavior>),
}

impl MockBehavior {
    /// Shorthand for `Delay(after, Box::new(Return(body)))`.
    #[must_use]
    pub fn delayed(after: Duration, body: Value) -> Self {
        Self::Delay(after, Box::new(Self::Return(body)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RuleKey {
    url: String,
    symbol: Option<String>,
}

#[derive(Default)]
struct InternalState {
    rules: HashMap<RuleKey, MockBehavior>,
    calls: HashMap<String, usize>,
    requests: Vec<RequestSpec>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the behavior for every request to `url`.
    pub async fn set_behavior(&self, url: impl Into<String>, behavior: MockBehavior) {
        let key = RuleKey {
            url: url.into(),
            symbol: None,
        };
        self.state.lock().await.rules.insert(key, behavior);
    }

    /// Set the behavior for requests to `url` about `symbol`. Takes precedence
    /// over a rule without a symbol.
    pub async fn set_symbol_behavior(
        &self,
        url: impl Into<String>,
        symbol: impl Into<String>,
        behavior: MockBehavior,
    ) {
        let key = RuleKey {
            url: url.into(),
            symbol: Some(symbol.into()),
        };
        self.state.lock().await.rules.insert(key, behavior);
    }

    /// Number of requests received for `url`.
    pub async fn calls(&self, url: &str) -> usize {
        self.state.lock().await.calls.get(url).copied().unwrap_or(0)
    }

    /// Total number of requests received.
    pub async fn total_calls(&self) -> usize {
        self.state.lock().await.requests.len()
    }

    /// Copy of the request log, in arrival order.
    pub async fn requests(&self) -> Vec<RequestSpec> {
        self.state.lock().await.requests.clone()
    }

    /// Clear all configured behaviors and request logs.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.rules.clear();
        guard.calls.clear();
        guard.requests.clear();
    }
}

/// A transport that defers all behavior to an external controller.
///
/// Requests without a matching rule fail with HTTP 404.
pub struct DynamicMockTransport {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockTransport {
    /// Create a new dynamic mock transport and its controller.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Arc<Self>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        (Arc::new(Self { name, state }), controller)
    }

    async fn resolve(behavior: MockBehavior) -> SourceResult {
        let mut current = behavior;
        loop {
            match current {
                MockBehavior::Return(v) => return Ok(v),
                MockBehavior::Status(status, body) => return classify(status, body),
                MockBehavior::Fail(f) => return Err(f),
                MockBehavior::Hang => std::future::pending::<()>().await,
                MockBehavior::Delay(after, inner) => {
                    tokio::time::sleep(after).await;
                    current = *inner;
                }
            }
        }
    }
}

fn classify(status: u16, body: Value) -> SourceResult {
    if (200..300).contains(&status) {
        return Ok(body);
    }
    let detail = body
        .get("error")
        .and_then(Value::as_str)
        .map_or_else(|| body.to_string(), str::to_string);
    if status == 429 {
        Err(SourceFailure::rate_limited(format!("status 429: {detail}")))
    } else {
        Err(SourceFailure::http(status, detail))
    }
}

#[async_trait]
impl Transport for DynamicMockTransport {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn send(&self, req: &RequestSpec) -> SourceResult {
        let symbol = crate::symbol_of(req);
        // Snapshot the behavior without holding the lock across await points
        let behavior = {
            let mut guard = self.state.lock().await;
            *guard.calls.entry(req.url.clone()).or_insert(0) += 1;
            guard.requests.push(req.clone());
            let exact = RuleKey {
                url: req.url.clone(),
                symbol,
            };
            let any = RuleKey {
                url: req.url.clone(),
                symbol: None,
            };
            guard
                .rules
                .get(&exact)
                .or_else(|| guard.rules.get(&any))
                .cloned()
        };

        match behavior {
            Some(b) => Self::resolve(b).await,
            None => Err(SourceFailure::http(
                404,
                format!("no mock rule for {}", req.url),
            )),
        }
    }
}
