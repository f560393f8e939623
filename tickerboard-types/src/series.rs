use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar day on an aligned timeline.
///
/// `fields` holds only the series that have a value on `date`; a missing key
/// means "no data", which is distinct from a value of zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    /// Calendar day (serialized as `YYYY-MM-DD`).
    pub date: NaiveDate,
    /// Series name to value.
    pub fields: BTreeMap<String, f64>,
}

impl TimePoint {
    /// Create an empty point for `date`.
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self {
            date,
            fields: BTreeMap::new(),
        }
    }

    /// Value of `series` on this day, if present.
    #[must_use]
    pub fn get(&self, series: &str) -> Option<f64> {
        self.fields.get(series).copied()
    }

    /// True if `series` has a value on this day.
    #[must_use]
    pub fn has(&self, series: &str) -> bool {
        self.fields.contains_key(series)
    }
}
