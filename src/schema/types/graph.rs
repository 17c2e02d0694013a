//! Graph schema: named links from one bucket to another.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::value::Value;

/// How many related records a link yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    One,
    Many,
}

/// How the condition reaches the target bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GraphMechanism {
    /// Condition keyed by target-bucket fields
    Aggregation,
    /// Condition keyed by fields of the `pivot` bucket; each pivot record is then
    /// joined to the target through `join` (target field -> pivot field path)
    Composition {
        pivot: String,
        join: BTreeMap<String, String>,
    },
}

/// Value of a condition entry: a literal, or a path into the source record.
///
/// Serialized as the literal itself, or as `{".": "<path>"}` for a path.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    Literal(Value),
    Path(String),
}

impl ConditionValue {
    pub fn path(path: impl Into<String>) -> Self {
        ConditionValue::Path(path.into())
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        ConditionValue::Literal(value.into())
    }
}

const PATH_KEY: &str = ".";

impl Serialize for ConditionValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ConditionValue::Literal(value) => value.serialize(serializer),
            ConditionValue::Path(path) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(PATH_KEY, path)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ConditionValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if let Value::Object(map) = &value {
            if map.len() == 1 {
                if let Some(path) = map.get(PATH_KEY) {
                    return match path {
                        Value::String(path) => Ok(ConditionValue::Path(path.clone())),
                        other => Err(de::Error::custom(format!(
                            "condition path must be a string, found {}",
                            other.kind()
                        ))),
                    };
                }
            }
        }
        Ok(ConditionValue::Literal(value))
    }
}

/// A declared relation from the owning bucket to `bucket`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
    pub bucket: String,
    pub cardinality: Cardinality,
    pub mechanism: GraphMechanism,
    #[serde(default)]
    pub condition: BTreeMap<String, ConditionValue>,
}

impl GraphLink {
    pub fn new(bucket: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            bucket: bucket.into(),
            cardinality,
            mechanism: GraphMechanism::Aggregation,
            condition: BTreeMap::new(),
        }
    }

    pub fn one(bucket: impl Into<String>) -> Self {
        Self::new(bucket, Cardinality::One)
    }

    pub fn many(bucket: impl Into<String>) -> Self {
        Self::new(bucket, Cardinality::Many)
    }

    /// Adds a condition entry whose value comes from `path` in the source record.
    pub fn when(mut self, field: impl Into<String>, path: impl Into<String>) -> Self {
        self.condition
            .insert(field.into(), ConditionValue::Path(path.into()));
        self
    }

    /// Adds a condition entry with a constant value.
    pub fn when_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition
            .insert(field.into(), ConditionValue::Literal(value.into()));
        self
    }

    /// Routes the link through `pivot`; `join` maps target fields to pivot field paths.
    pub fn through<I, K, V>(mut self, pivot: impl Into<String>, join: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.mechanism = GraphMechanism::Composition {
            pivot: pivot.into(),
            join: join
                .into_iter()
                .map(|(target, pivot_field)| (target.into(), pivot_field.into()))
                .collect(),
        };
        self
    }
}

/// Links of a bucket, by name.
pub type GraphSchema = BTreeMap<String, GraphLink>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn condition_paths_use_dot_key() {
        let link = GraphLink::one("color").when("id", "color_id").when_eq("active", true);
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["condition"]["id"], json!({".": "color_id"}));
        assert_eq!(json["condition"]["active"], json!(true));

        let back: GraphLink = serde_json::from_value(json).unwrap();
        assert_eq!(back, link);
    }

    #[test]
    fn composition_deserializes() {
        let link: GraphLink = serde_json::from_value(json!({
            "bucket": "product",
            "cardinality": "many",
            "mechanism": {"type": "composition", "pivot": "order_item", "join": {"id": "product_id"}},
            "condition": {"order_id": {".": "id"}}
        }))
        .unwrap();
        assert!(matches!(link.mechanism, GraphMechanism::Composition { ref pivot, .. } if pivot == "order_item"));
        assert_eq!(link.condition["order_id"], ConditionValue::path("id"));
    }
}
