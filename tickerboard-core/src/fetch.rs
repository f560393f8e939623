use std::time::Duration;

use crate::source::SourceSpec;
use crate::transport::Transport;
use tickerboard_types::{SourceFailure, SourceResult};

/// Fetch one source: send the request with a bounded wait, then shape-check
/// the body.
///
/// Never retries and never errors out of band: every outcome, including a
/// timeout (`network`), comes back as a `SourceResult`.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "tickerboard::core::fetch_source",
        skip(transport, spec),
        fields(
            source = %spec.name,
            transport = transport.name(),
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        ),
    )
)]
pub async fn fetch_source<T>(transport: &T, spec: &SourceSpec, timeout: Duration) -> SourceResult
where
    T: Transport + ?Sized,
{
    let body = tokio::time::timeout(timeout, transport.send(&spec.request))
        .await
        .unwrap_or_else(|_| {
            Err(SourceFailure::network(format!(
                "timed out after {} ms",
                timeout.as_millis()
            )))
        })?;
    spec.shape.check(&body)?;
    Ok(body)
}
