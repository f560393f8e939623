#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tickerboard_core::{RequestSpec, SourceResult, Transport};

/// Replies with a fixed result after an optional delay, recording each URL.
pub struct Scripted {
    pub reply: SourceResult,
    pub delay: Option<Duration>,
    pub seen: Mutex<Vec<String>>,
}

impl Scripted {
    pub fn ok(body: Value) -> Self {
        Self {
            reply: Ok(body),
            delay: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Transport for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn send(&self, req: &RequestSpec) -> SourceResult {
        self.seen.lock().unwrap().push(req.url.clone());
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        self.reply.clone()
    }
}
