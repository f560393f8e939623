use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use tickerboard_types::{TickerboardError, TimePoint};

/// A named series of day-keyed values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    /// Series name; becomes the field key in each aligned `TimePoint`.
    pub name: String,
    /// Day to value. Days without data are simply not present.
    pub points: BTreeMap<NaiveDate, f64>,
}

impl Series {
    /// Create an empty series.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: BTreeMap::new(),
        }
    }

    /// Build a series from `(date string, value)` pairs.
    ///
    /// Non-finite values are dropped. When two strings fall on the same day the
    /// later pair wins.
    ///
    /// # Errors
    /// Returns `TickerboardError::Data` if a date string cannot be parsed.
    pub fn from_date_strings<I, S>(name: impl Into<String>, pairs: I) -> Result<Self, TickerboardError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut series = Self::new(name);
        for (raw, value) in pairs {
            let day = parse_day(raw.as_ref()).ok_or_else(|| {
                TickerboardError::Data(format!("unparseable date '{}'", raw.as_ref()))
            })?;
            series.insert(day, value);
        }
        Ok(series)
    }

    /// Insert a value, ignoring NaN and infinities.
    pub fn insert(&mut self, day: NaiveDate, value: f64) {
        if value.is_finite() {
            self.points.insert(day, value);
        }
    }

    /// Number of days with data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the series has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Merge series onto a single day axis.
///
/// - One `TimePoint` per distinct day across all inputs, ascending.
/// - A point's `fields` contain exactly the series with a value that day.
/// - Duplicate `(series name, day)` pairs resolve to the later input.
pub fn align<I>(series: I) -> Vec<TimePoint>
where
    I: IntoIterator<Item = Series>,
{
    let mut by_day: BTreeMap<NaiveDate, BTreeMap<String, f64>> = BTreeMap::new();
    for s in series {
        for (day, value) in s.points {
            by_day.entry(day).or_default().insert(s.name.clone(), value);
        }
    }
    by_day
        .into_iter()
        .map(|(date, fields)| TimePoint { date, fields })
        .collect()
}

/// Parse a provider timestamp down to its calendar day.
///
/// Accepts `YYYY-MM-DD`, space or `T` separated date-times with optional
/// fractional seconds, and RFC 3339 stamps (the day in the stamp's own offset).
#[must_use]
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    parse_stamp(raw).map(|(day, _)| day)
}

pub(crate) fn parse_stamp(raw: &str) -> Option<(NaiveDate, Option<NaiveTime>)> {
    const DATE_TIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    let s = raw.trim();
    if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some((day, None));
    }
    for fmt in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some((dt.date(), Some(dt.time())));
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| {
        let local = dt.naive_local();
        (local.date(), Some(local.time()))
    })
}
