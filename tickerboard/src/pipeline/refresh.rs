use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use tickerboard_core::{AggregationReport, SourceSpec, TickerboardError};

use super::util::validate_specs;
use crate::Aggregator;

/// Handle to a periodic refresh loop.
///
/// Dropping the handle stops the loop; [`stop`](Self::stop) does the same and
/// waits for the loop to exit.
#[derive(Debug)]
pub struct RefreshHandle {
    inner: Option<JoinHandle<()>>,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl RefreshHandle {
    fn new(inner: JoinHandle<()>, stop_tx: oneshot::Sender<()>) -> Self {
        Self {
            inner: Some(inner),
            stop_tx: Some(stop_tx),
        }
    }

    /// Request shutdown and wait for the loop to finish.
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(inner) = self.inner.take() {
            let _ = inner.await;
        }
    }

    /// True once the loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        // Ask the loop to cancel its run, then abort in case it is parked elsewhere.
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(inner) = self.inner.take()
            && !inner.is_finished()
        {
            inner.abort();
        }
    }
}

impl Aggregator {
    /// Run `specs` now and then every `period`, delivering each report on the
    /// returned channel.
    ///
    /// Behavior:
    /// - Runs never overlap; a slow run delays the next tick instead of
    ///   bursting to catch up.
    /// - Each run supersedes the previous one through an internal [`Session`](crate::Session),
    ///   so stopping mid-run drops its fetches and skips its cache writes.
    /// - The loop exits when the handle is stopped or dropped, or when the
    ///   receiver is dropped.
    ///
    /// # Errors
    /// Returns the same validation errors as [`run`](Self::run), or
    /// `InvalidArg` for a zero period. Nothing is spawned in that case.
    pub fn refresh_every(
        &self,
        subject: &str,
        specs: Vec<SourceSpec>,
        period: Duration,
    ) -> Result<(RefreshHandle, mpsc::Receiver<AggregationReport>), TickerboardError> {
        if period.is_zero() {
            return Err(TickerboardError::invalid_arg(
                "refresh period must be greater than zero",
            ));
        }
        validate_specs(subject, &specs)?;

        let (tx, rx) = mpsc::channel::<AggregationReport>(8);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let session = self.session();
        let subject = subject.to_string();

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {}
                }
                let report = tokio::select! {
                    biased;
                    _ = &mut stop_rx => {
                        session.cancel();
                        break;
                    }
                    res = session.run(&subject, &specs) => res,
                };
                match report {
                    Ok(report) => {
                        if tx.send(report).await.is_err() {
                            break;
                        }
                    }
                    Err(_e) => {
                        #[cfg(feature = "tracing")]
                        tracing::error!(subject = %subject, error = %_e, "refresh run rejected");
                        break;
                    }
                }
            }
        });

        Ok((RefreshHandle::new(join, stop_tx), rx))
    }
}
