//! Condition evaluation: turns a link's condition map into a loader query.

use std::collections::BTreeMap;

use super::loader::Query;
use crate::path::{self, GetOptions, PathResult};
use crate::schema::types::{ConditionValue, GraphLink, ModelField};
use crate::value::Value;
use serde_json::{json, Value as JsonValue};

/// Evaluates `link.condition` against `record`: literals are copied, `{".": path}`
/// entries are resolved in `record` through the path engine.
///
/// For a composition link this is the query against the pivot bucket.
pub fn evaluate(model: &ModelField, link: &GraphLink, record: &Value) -> PathResult<Query> {
    evaluate_map(model, &link.condition, record)
}

/// Builds a target query from a pivot record through a composition `join` map
/// (target field to pivot field path).
pub fn join(pivot_model: &ModelField, join: &BTreeMap<String, String>, pivot: &Value) -> PathResult<Query> {
    join.iter()
        .map(|(target, path)| {
            path::get(pivot_model, pivot, path, GetOptions::default())
                .map(|value| (target.clone(), value))
        })
        .collect()
}

fn evaluate_map(
    model: &ModelField,
    condition: &BTreeMap<String, ConditionValue>,
    record: &Value,
) -> PathResult<Query> {
    condition
        .iter()
        .map(|(field, entry)| {
            let value = match entry {
                ConditionValue::Literal(value) => value.clone(),
                ConditionValue::Path(path) => {
                    path::get(model, record, path, GetOptions::default())?
                }
            };
            Ok((field.clone(), value))
        })
        .collect()
}

/// Stable string form of a query, used as the batching key.
///
/// Every value is tagged with its kind, so a date and the string of that date
/// never share a key.
pub fn canonical_key(query: &Query) -> String {
    tagged(&Value::Object(query.clone())).to_string()
}

fn tagged(value: &Value) -> JsonValue {
    let payload = match value {
        Value::Object(map) => JsonValue::Object(
            map.iter()
                .map(|(key, entry)| (key.clone(), tagged(entry)))
                .collect(),
        ),
        Value::Array(items) => JsonValue::Array(items.iter().map(tagged).collect()),
        other => other.to_json(),
    };
    json!([value.kind(), payload])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Object;

    #[test]
    fn literal_and_path_entries() {
        let model = ModelField::structure([("color_id", ModelField::int())]);
        let link = GraphLink::one("color").when("id", "color_id").when_eq("active", true);
        let record = Value::Object(Object::from([("color_id".to_string(), Value::Int(3))]));

        let query = evaluate(&model, &link, &record).unwrap();
        assert_eq!(query["id"], Value::Int(3));
        assert_eq!(query["active"], Value::Bool(true));
        assert_eq!(
            canonical_key(&query),
            r#"["object",{"active":["boolean",true],"id":["int",3]}]"#
        );
    }

    #[test]
    fn keys_distinguish_value_kinds() {
        let query = |value: Value| Query::from([("released".to_string(), value)]);
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_ne!(
            canonical_key(&query(Value::Date(date))),
            canonical_key(&query(Value::from("2024-01-01")))
        );
        assert_ne!(
            canonical_key(&query(Value::Int(1))),
            canonical_key(&query(Value::from("1")))
        );
        assert_eq!(
            canonical_key(&query(Value::Date(date))),
            canonical_key(&query(Value::Date(date)))
        );
    }

    #[test]
    fn bad_condition_path_is_reported() {
        let model = ModelField::structure([("color_id", ModelField::int())]);
        let link = GraphLink::one("color").when("id", "colour_id");
        let err = evaluate(&model, &link, &Value::Object(Object::new())).unwrap_err();
        assert!(err.is_invalid_modelpath());
    }
}
