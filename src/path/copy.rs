//! Schema-directed deep copy.

use super::error::{PathError, PathResult};
use super::parser::{join_keys, PathKey};
use crate::schema::types::{ModelField, ModelKind};
use crate::value::{Object, Value};

/// Clones `value` following `schema` rather than the value's own shape: undeclared
/// structure keys are dropped, absent children stay absent.
pub fn copy(schema: &ModelField, value: &Value) -> PathResult<Value> {
    let mut at = Vec::new();
    copy_node(schema, value, &mut at)
}

fn copy_node(schema: &ModelField, value: &Value, at: &mut Vec<PathKey>) -> PathResult<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    match &schema.kind {
        ModelKind::Scalar { scalar } => {
            if scalar.accepts(value) {
                Ok(value.clone())
            } else {
                Err(mismatch(at, schema, value))
            }
        }
        ModelKind::Structure { children } => {
            let map = value.as_object().ok_or_else(|| mismatch(at, schema, value))?;
            let mut out = Object::new();
            for (name, child) in children {
                let Some(entry) = map.get(name) else {
                    continue;
                };
                at.push(PathKey::Key(name.clone()));
                let copied = copy_node(child, entry, at)?;
                at.pop();
                if !copied.is_null() {
                    out.insert(name.clone(), copied);
                }
            }
            Ok(Value::Object(out))
        }
        ModelKind::Record { of } => {
            let map = value.as_object().ok_or_else(|| mismatch(at, schema, value))?;
            let mut out = Object::new();
            for (key, entry) in map {
                at.push(PathKey::Key(key.clone()));
                let copied = copy_node(of, entry, at)?;
                at.pop();
                out.insert(key.clone(), copied);
            }
            Ok(Value::Object(out))
        }
        ModelKind::Sequence { of } => {
            let items = value.as_array().ok_or_else(|| mismatch(at, schema, value))?;
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                at.push(PathKey::Index(index));
                out.push(copy_node(of, item, at)?);
                at.pop();
            }
            Ok(Value::Array(out))
        }
        ModelKind::Union { .. } => {
            let alternative = schema.select_alternative(value).ok_or_else(|| {
                PathError::corrupted(
                    join_keys(at),
                    format!("no union alternative matches a {} value", value.kind()),
                )
            })?;
            copy_node(alternative, value, at)
        }
    }
}

fn mismatch(at: &[PathKey], schema: &ModelField, value: &Value) -> PathError {
    PathError::corrupted(
        join_keys(at),
        format!("expected {}, found {}", schema.kind_name(), value.kind()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_undeclared_structure_keys() {
        let schema = ModelField::structure([("id", ModelField::int())]);
        let value = Value::Object(Object::from([
            ("id".to_string(), Value::Int(1)),
            ("extra".to_string(), Value::from("x")),
        ]));
        let copied = copy(&schema, &value).unwrap();
        assert_eq!(copied, Value::Object(Object::from([("id".to_string(), Value::Int(1))])));
    }

    #[test]
    fn reports_location_of_bad_scalar() {
        let schema = ModelField::structure([("tags", ModelField::sequence(ModelField::string()))]);
        let value = Value::Object(Object::from([(
            "tags".to_string(),
            Value::Array(vec![Value::from("a"), Value::Int(2)]),
        )]));
        let err = copy(&schema, &value).unwrap_err();
        assert!(err.is_corrupted_data());
        assert_eq!(err.path(), "tags.1");
    }
}
