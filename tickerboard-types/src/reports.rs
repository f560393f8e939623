//! Report envelope produced by the aggregator.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ErrorKind, TimePoint};

/// Consolidated outcome of one aggregation run.
///
/// `series` may be partial. Every source that did not produce live data in
/// this run appears in `failures`, even when a stale cached copy was used in
/// its place (those sources are additionally listed in `stale`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationReport {
    /// Subject the run was issued for (usually a ticker symbol).
    pub subject: String,
    /// Aligned timeline, strictly ascending by date.
    pub series: Vec<TimePoint>,
    /// Non-series payloads keyed by source name, passed through verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, Value>,
    /// Failed sources and their failure category.
    #[serde(default)]
    pub failures: BTreeMap<String, ErrorKind>,
    /// Failure detail for each entry in `failures`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub messages: BTreeMap<String, String>,
    /// Sources answered from a fresh cache entry.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub cached: BTreeSet<String>,
    /// Failed sources whose data was filled from an expired cache entry.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub stale: BTreeSet<String>,
    /// True when a newer run replaced this one before it completed.
    #[serde(default)]
    pub superseded: bool,
    /// Completion time in epoch milliseconds.
    pub completed_at_epoch_millis: i64,
}

impl AggregationReport {
    /// True when no source failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failure category for `source`, if it failed.
    #[must_use]
    pub fn failure(&self, source: &str) -> Option<ErrorKind> {
        self.failures.get(source).copied()
    }

    /// Pass-through payload for `source`, if any.
    #[must_use]
    pub fn extra(&self, source: &str) -> Option<&Value> {
        self.extras.get(source)
    }

    /// `(date, value)` pairs for one series, ascending, skipping days without data.
    pub fn values<'a>(&'a self, field: &'a str) -> impl DoubleEndedIterator<Item = (NaiveDate, f64)> + 'a {
        self.series
            .iter()
            .filter_map(move |p| p.get(field).map(|v| (p.date, v)))
    }

    /// Latest-versus-previous summary for one series.
    ///
    /// Returns `None` when the series has no values in this report.
    #[must_use]
    pub fn summary(&self, field: &str) -> Option<FieldSummary> {
        let mut last_two = self.values(field).rev().take(2);
        let (date, latest) = last_two.next()?;
        let previous = last_two.next().map(|(_, v)| v);
        Some(FieldSummary::new(date, latest, previous))
    }
}

/// Latest value of a series together with its change against the prior day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    /// Day of the latest value.
    pub date: NaiveDate,
    /// Latest value.
    pub latest: f64,
    /// Value on the previous day that has data.
    pub previous: Option<f64>,
    /// Percent change from `previous` to `latest`; absent when `previous` is
    /// missing or zero.
    pub change_pct: Option<f64>,
}

impl FieldSummary {
    /// Build a summary, deriving `change_pct`.
    #[must_use]
    pub fn new(date: NaiveDate, latest: f64, previous: Option<f64>) -> Self {
        let change_pct = previous
            .filter(|p| *p != 0.0)
            .map(|p| (latest - p) / p * 100.0);
        Self {
            date,
            latest,
            previous,
            change_pct,
        }
    }

    /// Absolute change from `previous` to `latest`.
    #[must_use]
    pub fn change(&self) -> Option<f64> {
        self.previous.map(|p| self.latest - p)
    }
}
