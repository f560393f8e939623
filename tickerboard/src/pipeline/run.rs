use std::collections::BTreeMap;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde_json::Value;

use tickerboard_cache::{CacheKey, TtlCache};
use tickerboard_core::{
    AggregationReport, Series, SourceFailure, SourceSpec, TickerboardError, align, fetch_source,
};

use super::session::RunGuard;
use super::util::validate_specs;
use crate::Aggregator;

/// What one source contributed to a run.
enum Outcome {
    Fresh(Extracted),
    Cached(Extracted),
    Failed {
        failure: SourceFailure,
        stale: Option<Extracted>,
    },
}

/// A payload together with the series pulled out of it.
struct Extracted {
    payload: Value,
    series: Option<Vec<Series>>,
}

/// Per-source state shared by the three phases of a run.
struct Slot<'a> {
    spec: &'a SourceSpec,
    key: CacheKey,
    cache: TtlCache,
    outcome: Option<Outcome>,
}

fn extract(spec: &SourceSpec, payload: Value) -> Result<Extracted, SourceFailure> {
    let series = spec.extract.apply(&spec.name, &payload)?;
    Ok(Extracted { payload, series })
}

impl Aggregator {
    /// Run every source for `subject` and fold the results into one report.
    ///
    /// Behavior:
    /// - Cache lookups for all sources complete before any fetch starts. A
    ///   fresh entry is used without fetching.
    /// - All misses are fetched concurrently; the run waits for every fetch to
    ///   settle, each bounded by its timeout.
    /// - Successful payloads are written to the cache before the report is
    ///   assembled. Payloads that fail extraction are reported as
    ///   `malformedPayload` and not cached.
    /// - Failed sources are listed in `failures`; with stale fallback enabled,
    ///   an expired entry still contributes data and the source is listed in
    ///   `stale` as well.
    /// - Series-shaped payloads are aligned in source order (later sources win
    ///   same-name collisions); other payloads go to `extras` verbatim.
    ///
    /// # Errors
    /// Only for programmer errors: blank subject, blank or duplicate source
    /// names, or invalid URLs. Source failures never error the run.
    pub async fn run(
        &self,
        subject: &str,
        specs: &[SourceSpec],
    ) -> Result<AggregationReport, TickerboardError> {
        self.run_guarded(subject, specs, &RunGuard::detached()).await
    }

    /// [`run`](Self::run) under a generation guard.
    ///
    /// Once `guard` is superseded, fetches still in flight are dropped and
    /// reported as `network` failures, no cache writes happen and the report
    /// is flagged `superseded`.
    ///
    /// # Errors
    /// Same as [`run`](Self::run).
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "tickerboard::run",
            skip(self, specs, guard),
            fields(sources = specs.len(), generation = guard.token()),
        )
    )]
    pub async fn run_guarded(
        &self,
        subject: &str,
        specs: &[SourceSpec],
        guard: &RunGuard,
    ) -> Result<AggregationReport, TickerboardError> {
        validate_specs(subject, specs)?;

        let mut slots: Vec<Slot<'_>> = specs
            .iter()
            .map(|spec| Slot {
                spec,
                key: CacheKey::new(subject, &spec.name, &spec.params_snapshot()),
                cache: self.cache_for(spec),
                outcome: None,
            })
            .collect();

        self.resolve_from_cache(&mut slots).await;
        let fetched = self.fetch_misses(&slots, guard).await;
        self.settle(&mut slots, fetched, guard).await;

        Ok(self.assemble(subject, slots, guard))
    }

    async fn resolve_from_cache(&self, slots: &mut [Slot<'_>]) {
        for slot in slots.iter_mut() {
            let Some(entry) = slot.cache.get(&slot.key).await else {
                continue;
            };
            match extract(slot.spec, entry.payload) {
                Ok(ex) => slot.outcome = Some(Outcome::Cached(ex)),
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(source = %slot.spec.name, error = %_e, "cached payload unusable; refetching");
                }
            }
        }
    }

    /// Fetch every unresolved slot concurrently. Returns `(slot index, result)`
    /// for the fetches that settled before the guard was superseded.
    async fn fetch_misses(
        &self,
        slots: &[Slot<'_>],
        guard: &RunGuard,
    ) -> Vec<(usize, Result<Value, SourceFailure>)> {
        let mut in_flight: FuturesUnordered<_> = slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.outcome.is_none())
            .map(|(idx, s)| {
                let timeout = self.timeout_for(s.spec);
                let transport = &self.transport;
                async move { (idx, fetch_source(transport.as_ref(), s.spec, timeout).await) }
            })
            .collect();

        let mut settled = Vec::with_capacity(in_flight.len());
        loop {
            tokio::select! {
                biased;
                () = guard.superseded() => break,
                next = in_flight.next() => match next {
                    Some(result) => settled.push(result),
                    None => break,
                },
            }
        }
        settled
    }

    async fn settle(
        &self,
        slots: &mut [Slot<'_>],
        fetched: Vec<(usize, Result<Value, SourceFailure>)>,
        guard: &RunGuard,
    ) {
        for (idx, result) in fetched {
            let Some(slot) = slots.get_mut(idx) else {
                continue;
            };
            let outcome = match result.and_then(|body| {
                let copy = body.clone();
                extract(slot.spec, body).map(|ex| (ex, copy))
            }) {
                Ok((ex, body)) => {
                    if guard.is_current() {
                        slot.cache.put(&slot.key, body).await;
                    } else {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(source = %slot.spec.name, "superseded; skipping cache write");
                    }
                    Outcome::Fresh(ex)
                }
                Err(failure) => self.failed(slot, failure).await,
            };
            slot.outcome = Some(outcome);
        }

        for slot in slots.iter_mut().filter(|s| s.outcome.is_none()) {
            let failure = SourceFailure::network("run superseded before the fetch settled");
            let outcome = self.failed(slot, failure).await;
            slot.outcome = Some(outcome);
        }
    }

    async fn failed(&self, slot: &Slot<'_>, failure: SourceFailure) -> Outcome {
        #[cfg(feature = "tracing")]
        tracing::warn!(source = %slot.spec.name, kind = %failure.kind, message = %failure.message, "source failed");

        let stale = if self.cfg.serve_stale_on_failure {
            match slot.cache.get_stale(&slot.key).await {
                Some(entry) => extract(slot.spec, entry.payload).ok(),
                None => None,
            }
        } else {
            None
        };
        Outcome::Failed { failure, stale }
    }

    fn assemble(&self, subject: &str, slots: Vec<Slot<'_>>, guard: &RunGuard) -> AggregationReport {
        let mut report = AggregationReport {
            subject: subject.to_string(),
            ..AggregationReport::default()
        };
        let mut series: Vec<Series> = Vec::new();
        let mut extras: BTreeMap<String, Value> = BTreeMap::new();

        for slot in slots {
            let name = slot.spec.name.clone();
            let data = match slot.outcome {
                Some(Outcome::Fresh(ex)) => Some(ex),
                Some(Outcome::Cached(ex)) => {
                    report.cached.insert(name.clone());
                    Some(ex)
                }
                Some(Outcome::Failed { failure, stale }) => {
                    report.failures.insert(name.clone(), failure.kind);
                    report.messages.insert(name.clone(), failure.message);
                    if stale.is_some() {
                        report.stale.insert(name.clone());
                    }
                    stale
                }
                None => None,
            };
            match data {
                Some(Extracted {
                    series: Some(list), ..
                }) => series.extend(list),
                Some(Extracted {
                    payload,
                    series: None,
                }) => {
                    extras.insert(name, payload);
                }
                None => {}
            }
        }

        report.series = align(series);
        report.extras = extras;
        report.superseded = !guard.is_current();
        report.completed_at_epoch_millis = self.clock.now_ms();
        report
    }
}
