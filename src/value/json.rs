//! Conversions between [`Value`] and `serde_json::Value`.
//!
//! JSON has no date, duration or decimal types, so the special scalars leave as
//! their canonical strings and come back as plain strings.

use super::{Object, Value};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

impl Value {
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Object(map) => JsonValue::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Value::Array(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            special => special
                .canonical_string()
                .map(JsonValue::String)
                .unwrap_or(JsonValue::Null),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(0.0)),
            },
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect::<Object>(),
            ),
        }
    }
}

impl From<&Value> for JsonValue {
    fn from(value: &Value) -> Self {
        value.to_json()
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        JsonValue::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_round_trip_for_plain_values() {
        let json = json!({"a": 1, "b": [true, null, "x"], "c": 1.5});
        let value = Value::from(json.clone());
        assert_eq!(value.lookup("a"), Some(&Value::Int(1)));
        assert_eq!(value.lookup("c"), Some(&Value::Float(1.5)));
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn special_scalars_become_strings() {
        let value = Value::Decimal("3.14".parse().unwrap());
        assert_eq!(value.to_json(), json!("3.14"));
    }
}
