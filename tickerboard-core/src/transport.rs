use async_trait::async_trait;

use tickerboard_types::{RequestSpec, SourceResult};

/// Executes a [`RequestSpec`] and classifies the outcome.
///
/// Implementations map transport-level problems onto the failure taxonomy:
/// connection errors become `network`, non-2xx statuses become `httpError`
/// (`rateLimited` for 429) and bodies that are not JSON become
/// `malformedPayload`. They never retry and never panic on bad input.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Stable transport name used in logs.
    fn name(&self) -> &'static str;

    /// Perform the request and return the parsed JSON body or a failure.
    async fn send(&self, req: &RequestSpec) -> SourceResult;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn send(&self, req: &RequestSpec) -> SourceResult {
        (**self).send(req).await
    }
}
