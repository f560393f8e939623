use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use serde_json::{Map, Value};

use crate::align::{Series, parse_stamp};
use tickerboard_types::{RequestSpec, SourceFailure};

/// Caller-supplied extractor turning a shape-checked payload into series.
pub type ExtractFn = Arc<dyn Fn(&Value) -> Result<Vec<Series>, SourceFailure> + Send + Sync>;

/// Declared shape of a successful (2xx) response body.
///
/// Checks run in order: error keys, throttle keys, then required keys. Providers
/// that report problems inside a 200 body are classified here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shape {
    required: Vec<String>,
    throttle_keys: Vec<String>,
    error_keys: Vec<String>,
}

impl Shape {
    /// Accept any JSON body.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Require a top-level key; a body lacking it is `malformedPayload`.
    #[must_use]
    pub fn requires(mut self, key: impl Into<String>) -> Self {
        self.required.push(key.into());
        self
    }

    /// Treat the presence of `key` as a throttling signal (`rateLimited`).
    #[must_use]
    pub fn throttle_on(mut self, key: impl Into<String>) -> Self {
        self.throttle_keys.push(key.into());
        self
    }

    /// Treat the presence of `key` as a provider error (`malformedPayload`).
    #[must_use]
    pub fn error_on(mut self, key: impl Into<String>) -> Self {
        self.error_keys.push(key.into());
        self
    }

    /// Alpha Vantage conventions: `Error Message` is an error, `Note` and
    /// `Information` are throttling notices.
    #[must_use]
    pub fn alpha_vantage(required: impl Into<String>) -> Self {
        Self::any()
            .requires(required)
            .error_on("Error Message")
            .throttle_on("Note")
            .throttle_on("Information")
    }

    /// Validate a parsed body.
    ///
    /// # Errors
    /// Returns `rateLimited` for throttle keys and `malformedPayload` for error
    /// keys, missing required keys, or a non-object body when keys are declared.
    pub fn check(&self, body: &Value) -> Result<(), SourceFailure> {
        let Some(obj) = body.as_object() else {
            if self.required.is_empty() {
                return Ok(());
            }
            return Err(SourceFailure::malformed(format!(
                "expected JSON object, got {}",
                kind_of(body)
            )));
        };
        for key in &self.error_keys {
            if let Some(v) = obj.get(key) {
                return Err(SourceFailure::malformed(format!(
                    "provider error: {}",
                    text_of(v)
                )));
            }
        }
        for key in &self.throttle_keys {
            if let Some(v) = obj.get(key) {
                return Err(SourceFailure::rate_limited(text_of(v)));
            }
        }
        for key in &self.required {
            if !obj.contains_key(key) {
                return Err(SourceFailure::malformed(format!("missing key '{key}'")));
            }
        }
        Ok(())
    }
}

/// How to turn a shape-checked payload into series.
#[derive(Clone)]
pub enum Extract {
    /// An object keyed by date string. Each entry is either a number or an
    /// object from which `field` is read. Intraday keys collapse to their day,
    /// keeping the latest time of day.
    DateMap {
        /// Object keys leading to the date map; empty means the root.
        path: Vec<String>,
        /// Field read from each entry, if entries are objects.
        field: Option<String>,
        /// Series name; defaults to the source name.
        series: Option<String>,
    },
    /// A column-major frame: `{column: {date: value}}`. Columns absent from
    /// the payload are skipped, but at least one must be present.
    Columns {
        /// Object keys leading to the frame.
        path: Vec<String>,
        /// `(column key, series name)` pairs.
        columns: Vec<(String, String)>,
    },
    /// An array of records each carrying a date field and value fields.
    Records {
        /// Object keys leading to the array.
        path: Vec<String>,
        /// Field holding the record's date.
        date_field: String,
        /// `(record field, series name)` pairs.
        fields: Vec<(String, String)>,
    },
    /// Not series-shaped; the payload is passed through verbatim.
    Passthrough,
    /// Caller-supplied extraction.
    Custom(ExtractFn),
}

impl fmt::Debug for Extract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DateMap {
                path,
                field,
                series,
            } => f
                .debug_struct("DateMap")
                .field("path", path)
                .field("field", field)
                .field("series", series)
                .finish(),
            Self::Columns { path, columns } => f
                .debug_struct("Columns")
                .field("path", path)
                .field("columns", columns)
                .finish(),
            Self::Records {
                path,
                date_field,
                fields,
            } => f
                .debug_struct("Records")
                .field("path", path)
                .field("date_field", date_field)
                .field("fields", fields)
                .finish(),
            Self::Passthrough => f.write_str("Passthrough"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Extract {
    /// Date map at `path` whose entries are objects carrying `field`.
    pub fn date_map(path: &[&str], field: impl Into<String>) -> Self {
        Self::DateMap {
            path: owned(path),
            field: Some(field.into()),
            series: None,
        }
    }

    /// Wrap a closure as an extractor.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Vec<Series>, SourceFailure> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// True unless this is `Passthrough`.
    #[must_use]
    pub const fn is_series_shaped(&self) -> bool {
        !matches!(self, Self::Passthrough)
    }

    /// Apply the extractor. `Passthrough` yields `Ok(None)`.
    ///
    /// # Errors
    /// Returns `malformedPayload` when the declared structure is missing or a
    /// date cannot be parsed. Values that are null, non-numeric or non-finite
    /// are treated as absent rather than as errors.
    pub fn apply(
        &self,
        source_name: &str,
        payload: &Value,
    ) -> Result<Option<Vec<Series>>, SourceFailure> {
        match self {
            Self::Passthrough => Ok(None),
            Self::Custom(f) => f(payload).map(Some),
            Self::DateMap {
                path,
                field,
                series,
            } => {
                let obj = object_at(payload, path)?;
                let name = series.as_deref().unwrap_or(source_name);
                date_map(name, obj, field.as_deref()).map(|s| Some(vec![s]))
            }
            Self::Columns { path, columns } => {
                let frame = object_at(payload, path)?;
                let mut out = Vec::with_capacity(columns.len());
                for (column, name) in columns {
                    let Some(col) = frame.get(column) else {
                        continue;
                    };
                    let col = col.as_object().ok_or_else(|| {
                        SourceFailure::malformed(format!("column '{column}' is not an object"))
                    })?;
                    out.push(date_map(name, col, None)?);
                }
                if out.is_empty() && !columns.is_empty() {
                    return Err(SourceFailure::malformed("none of the declared columns present"));
                }
                Ok(Some(out))
            }
            Self::Records {
                path,
                date_field,
                fields,
            } => {
                let rows = value_at(payload, path)?.as_array().ok_or_else(|| {
                    SourceFailure::malformed(format!("'{}' is not an array", path.join(".")))
                })?;
                let mut out: Vec<Series> = fields.iter().map(|(_, n)| Series::new(n)).collect();
                for row in rows {
                    let raw = row.get(date_field).and_then(Value::as_str).ok_or_else(|| {
                        SourceFailure::malformed(format!("record without '{date_field}'"))
                    })?;
                    let day = parse_day_or_malformed(raw)?;
                    for ((field, _), series) in fields.iter().zip(out.iter_mut()) {
                        if let Some(v) = row.get(field).and_then(number) {
                            series.insert(day, v);
                        }
                    }
                }
                Ok(Some(out))
            }
        }
    }
}

/// Declarative description of one source within a run.
#[derive(Debug, Clone)]
pub struct SourceSpec {
    /// Unique name within a run; used as the failure key and default series name.
    pub name: String,
    /// Outbound request.
    pub request: RequestSpec,
    /// Cache freshness window; `None` uses the cache default, zero disables caching.
    pub ttl: Option<Duration>,
    /// Bound on the fetch; `None` uses the aggregator default.
    pub timeout: Option<Duration>,
    /// Body validation applied to 2xx responses.
    pub shape: Shape,
    /// Payload-to-series mapping.
    pub extract: Extract,
    /// Overrides the request-derived cache identity when set.
    pub params: Option<Value>,
}

impl SourceSpec {
    /// A pass-through source with no shape requirements.
    pub fn new(name: impl Into<String>, request: RequestSpec) -> Self {
        Self {
            name: name.into(),
            request,
            ttl: None,
            timeout: None,
            shape: Shape::any(),
            extract: Extract::Passthrough,
            params: None,
        }
    }

    /// Replace the source name.
    #[must_use]
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the body shape.
    #[must_use]
    pub fn shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    /// Set the extractor.
    #[must_use]
    pub fn extract(mut self, extract: Extract) -> Self {
        self.extract = extract;
        self
    }

    /// Set the cache TTL.
    #[must_use]
    pub const fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set the fetch timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the cache identity.
    #[must_use]
    pub fn params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    /// True if the payload feeds the aligner.
    #[must_use]
    pub const fn is_series_shaped(&self) -> bool {
        self.extract.is_series_shaped()
    }

    /// Cache identity: the explicit override or the request snapshot.
    #[must_use]
    pub fn params_snapshot(&self) -> Value {
        self.params
            .clone()
            .unwrap_or_else(|| self.request.params_snapshot())
    }
}

fn owned(path: &[&str]) -> Vec<String> {
    path.iter().map(|s| (*s).to_string()).collect()
}

fn value_at<'a>(payload: &'a Value, path: &[String]) -> Result<&'a Value, SourceFailure> {
    path.iter().try_fold(payload, |v, key| {
        v.get(key)
            .ok_or_else(|| SourceFailure::malformed(format!("missing key '{key}'")))
    })
}

fn object_at<'a>(payload: &'a Value, path: &[String]) -> Result<&'a Map<String, Value>, SourceFailure> {
    value_at(payload, path)?.as_object().ok_or_else(|| {
        SourceFailure::malformed(format!("'{}' is not an object", path.join(".")))
    })
}

fn date_map(
    name: &str,
    obj: &Map<String, Value>,
    field: Option<&str>,
) -> Result<Series, SourceFailure> {
    let mut latest: BTreeMap<NaiveDate, (Option<NaiveTime>, f64)> = BTreeMap::new();
    for (raw, entry) in obj {
        let (day, time) = parse_stamp(raw)
            .ok_or_else(|| SourceFailure::malformed(format!("unparseable date '{raw}'")))?;
        let cell = match field {
            Some(f) => entry.get(f),
            None => Some(entry),
        };
        let Some(value) = cell.and_then(number) else {
            continue;
        };
        match latest.get(&day) {
            Some((seen, _)) if *seen > time => {}
            _ => {
                latest.insert(day, (time, value));
            }
        }
    }
    let mut series = Series::new(name);
    for (day, (_, value)) in latest {
        series.insert(day, value);
    }
    Ok(series)
}

fn parse_day_or_malformed(raw: &str) -> Result<NaiveDate, SourceFailure> {
    parse_stamp(raw)
        .map(|(day, _)| day)
        .ok_or_else(|| SourceFailure::malformed(format!("unparseable date '{raw}'")))
}

fn number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn text_of(v: &Value) -> String {
    v.as_str().map_or_else(|| v.to_string(), str::to_string)
}

const fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
