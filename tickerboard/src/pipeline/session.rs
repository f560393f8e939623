use std::sync::Arc;

use tokio::sync::watch;

use tickerboard_core::{AggregationReport, SourceSpec, TickerboardError};

use crate::Aggregator;

/// Generation token carried by one run.
///
/// A run is current while its session's generation still equals the token it
/// started with. Superseded runs stop fetching and never write the cache.
#[derive(Debug, Clone)]
pub struct RunGuard {
    rx: Option<watch::Receiver<u64>>,
    token: u64,
}

impl RunGuard {
    /// A guard that is never superseded.
    #[must_use]
    pub const fn detached() -> Self {
        Self { rx: None, token: 0 }
    }

    /// Generation this run started with.
    #[must_use]
    pub const fn token(&self) -> u64 {
        self.token
    }

    /// True while no newer run or cancellation happened.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.rx.as_ref().is_none_or(|rx| *rx.borrow() == self.token)
    }

    /// Resolves once this run is superseded; pending forever otherwise.
    pub async fn superseded(&self) {
        if let Some(rx) = &self.rx {
            let mut rx = rx.clone();
            let token = self.token;
            if rx.wait_for(|g| *g != token).await.is_ok() {
                return;
            }
        }
        std::future::pending::<()>().await;
    }
}

/// A sequence of runs where only the latest one counts.
///
/// Typical use: one session per dashboard view. Each [`run`](Self::run)
/// supersedes the previous one; [`cancel`](Self::cancel) supersedes whatever
/// is in flight when the view goes away.
#[derive(Debug, Clone)]
pub struct Session {
    agg: Aggregator,
    generation: Arc<watch::Sender<u64>>,
}

impl Session {
    /// New session over `agg`.
    #[must_use]
    pub fn new(agg: Aggregator) -> Self {
        let (tx, _rx) = watch::channel(0u64);
        Self {
            agg,
            generation: Arc::new(tx),
        }
    }

    /// Current generation number.
    #[must_use]
    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    /// Supersede every run started so far and return a guard for a new one.
    #[must_use]
    pub fn begin(&self) -> RunGuard {
        let rx = self.generation.subscribe();
        let mut token = 0;
        self.generation.send_modify(|g| {
            *g += 1;
            token = *g;
        });
        RunGuard {
            rx: Some(rx),
            token,
        }
    }

    /// Supersede every run in flight without starting a new one.
    pub fn cancel(&self) {
        self.generation.send_modify(|g| *g += 1);
    }

    /// Run `specs` for `subject` as the session's latest run.
    ///
    /// # Errors
    /// Same as [`Aggregator::run`].
    pub async fn run(
        &self,
        subject: &str,
        specs: &[SourceSpec],
    ) -> Result<AggregationReport, TickerboardError> {
        let guard = self.begin();
        self.agg.run_guarded(subject, specs, &guard).await
    }
}

impl Aggregator {
    /// Start a [`Session`] on this aggregator.
    #[must_use]
    pub fn session(&self) -> Session {
        Session::new(self.clone())
    }
}
