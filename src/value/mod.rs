//! Typed runtime values.
//!
//! Records handed to the engine are trees of [`Value`]. Besides the JSON-like
//! variants, a value can carry the special scalars the model schema declares
//! (dates, datetimes, durations and decimals). Those have canonical string forms
//! used when a result is requested "as JSON" or a view is serialized:
//!
//! * date: `YYYY-MM-DD`
//! * datetime: RFC 3339 in UTC with a `Z` suffix, fractional seconds only when present
//! * duration: `"<amount> <unit>"` (see [`Duration`])
//! * decimal: the exact base-10 representation
//!
//! `Value::Null` is the absent value: the engine makes no difference between an
//! explicit null and a missing entry.

mod duration;
mod json;

pub use duration::{Duration, DurationParseError, DurationUnit};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;

/// Map type used for object values.
pub type Object = BTreeMap<String, Value>;

/// A runtime value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// The absent value
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Duration(Duration),
    Decimal(Decimal),
    Object(Object),
    Array(Vec<Value>),
}

/// Shared absent value, handy when a lookup needs a `&Value` fallback.
pub static NULL: Value = Value::Null;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short name of the runtime shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Duration(_) => "duration",
            Value::Decimal(_) => "decimal",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
        }
    }

    /// Object member or array element addressed by `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Schemaless dotted lookup (`"address.city"`, `"items.0.name"`).
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(self, |current, segment| current.get(segment))
    }

    /// True for the scalars that have a canonical string form.
    pub fn is_special_scalar(&self) -> bool {
        matches!(
            self,
            Value::Date(_) | Value::DateTime(_) | Value::Duration(_) | Value::Decimal(_)
        )
    }

    /// Canonical string of a special scalar, `None` for every other value.
    pub fn canonical_string(&self) -> Option<String> {
        match self {
            Value::Date(date) => Some(date.format("%Y-%m-%d").to_string()),
            Value::DateTime(datetime) => {
                Some(datetime.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::Duration(duration) => Some(duration.to_string()),
            Value::Decimal(decimal) => Some(decimal.to_string()),
            _ => None,
        }
    }

    /// Replaces every special scalar reachable from this value with its canonical string.
    pub fn canonicalize(&mut self) {
        match self {
            Value::Object(map) => map.values_mut().for_each(Value::canonicalize),
            Value::Array(items) => items.iter_mut().for_each(Value::canonicalize),
            other => {
                if let Some(s) = other.canonical_string() {
                    *other = Value::String(s);
                }
            }
        }
    }

    pub fn into_canonical(mut self) -> Value {
        self.canonicalize();
        self
    }

    /// String usable as an object key: strings as-is, other scalars in their
    /// display or canonical form. Containers and null have no key form.
    pub fn key_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Object(_) | Value::Array(_) => None,
            special => special.canonical_string(),
        }
    }

    pub fn parse_date(s: &str) -> Option<Value> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(Value::Date)
    }

    pub fn parse_datetime(s: &str) -> Option<Value> {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| Value::DateTime(dt.with_timezone(&Utc)))
    }

    pub fn parse_duration(s: &str) -> Option<Value> {
        s.parse::<Duration>().ok().map(Value::Duration)
    }

    pub fn parse_decimal(s: &str) -> Option<Value> {
        s.parse::<Decimal>().ok().map(Value::Decimal)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value)
    }
}

impl From<Duration> for Value {
    fn from(value: Duration) -> Self {
        Value::Duration(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
