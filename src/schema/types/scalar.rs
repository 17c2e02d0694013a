use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Declared type of a scalar model field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "options", rename_all = "snake_case")]
pub enum ScalarType {
    Boolean,
    Int,
    Float,
    String,
    Date,
    Datetime,
    Duration,
    Decimal,
    /// String restricted to the listed options
    Enum(Vec<String>),
    /// File descriptor object, kept opaque
    File,
    Any,
}

impl ScalarType {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Boolean => "boolean",
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::String => "string",
            ScalarType::Date => "date",
            ScalarType::Datetime => "datetime",
            ScalarType::Duration => "duration",
            ScalarType::Decimal => "decimal",
            ScalarType::Enum(_) => "enum",
            ScalarType::File => "file",
            ScalarType::Any => "any",
        }
    }

    /// Whether a present (non-null) value has the primitive shape this type declares.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ScalarType::Any, _) => true,
            (ScalarType::Boolean, Value::Bool(_)) => true,
            (ScalarType::Int, Value::Int(_)) => true,
            (ScalarType::Float, Value::Float(_) | Value::Int(_)) => true,
            (ScalarType::String, Value::String(_)) => true,
            (ScalarType::Date, Value::Date(_)) => true,
            (ScalarType::Datetime, Value::DateTime(_)) => true,
            (ScalarType::Duration, Value::Duration(_)) => true,
            (ScalarType::Decimal, Value::Decimal(_)) => true,
            (ScalarType::Enum(options), Value::String(s)) => options.iter().any(|o| o == s),
            (ScalarType::File, Value::Object(_)) => true,
            _ => false,
        }
    }

    /// Parses the canonical string form of a special scalar back into a value.
    ///
    /// Returns `None` for types without a canonical string form or for text that
    /// does not parse.
    pub fn parse_canonical(&self, text: &str) -> Option<Value> {
        match self {
            ScalarType::Date => Value::parse_date(text),
            ScalarType::Datetime => Value::parse_datetime(text),
            ScalarType::Duration => Value::parse_duration(text),
            ScalarType::Decimal => Value::parse_decimal(text),
            _ => None,
        }
    }
}
