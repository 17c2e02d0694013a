//! Model schema tree.
//!
//! Every node is a [`ModelField`]: a [`ModelKind`] plus a `required` flag. The five
//! kinds are closed; containers nest any kind recursively.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::scalar::ScalarType;
use crate::value::{Value, NULL};

/// Shape of a model node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelKind {
    Scalar {
        scalar: ScalarType,
    },
    /// Fixed named children
    Structure {
        children: BTreeMap<String, ModelField>,
    },
    /// Dynamic string keys, one child schema
    Record {
        of: Box<ModelField>,
    },
    /// Dynamic integer indices, one child schema
    Sequence {
        of: Box<ModelField>,
    },
    /// Alternatives, discriminated by runtime shape in declared order
    Union {
        alternatives: Vec<ModelField>,
    },
}

/// A node of the model schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelField {
    #[serde(flatten)]
    pub kind: ModelKind,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl ModelField {
    pub fn new(kind: ModelKind) -> Self {
        Self {
            kind,
            required: true,
        }
    }

    pub fn scalar(scalar: ScalarType) -> Self {
        Self::new(ModelKind::Scalar { scalar })
    }

    pub fn boolean() -> Self {
        Self::scalar(ScalarType::Boolean)
    }

    pub fn int() -> Self {
        Self::scalar(ScalarType::Int)
    }

    pub fn float() -> Self {
        Self::scalar(ScalarType::Float)
    }

    pub fn string() -> Self {
        Self::scalar(ScalarType::String)
    }

    pub fn date() -> Self {
        Self::scalar(ScalarType::Date)
    }

    pub fn datetime() -> Self {
        Self::scalar(ScalarType::Datetime)
    }

    pub fn duration() -> Self {
        Self::scalar(ScalarType::Duration)
    }

    pub fn decimal() -> Self {
        Self::scalar(ScalarType::Decimal)
    }

    pub fn enumeration<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::scalar(ScalarType::Enum(options.into_iter().map(Into::into).collect()))
    }

    pub fn file() -> Self {
        Self::scalar(ScalarType::File)
    }

    pub fn any() -> Self {
        Self::scalar(ScalarType::Any)
    }

    pub fn structure<I, S>(children: I) -> Self
    where
        I: IntoIterator<Item = (S, ModelField)>,
        S: Into<String>,
    {
        Self::new(ModelKind::Structure {
            children: children
                .into_iter()
                .map(|(name, field)| (name.into(), field))
                .collect(),
        })
    }

    pub fn record(of: ModelField) -> Self {
        Self::new(ModelKind::Record { of: Box::new(of) })
    }

    pub fn sequence(of: ModelField) -> Self {
        Self::new(ModelKind::Sequence { of: Box::new(of) })
    }

    pub fn union<I>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = ModelField>,
    {
        Self::new(ModelKind::Union {
            alternatives: alternatives.into_iter().collect(),
        })
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ModelKind::Scalar { scalar } => scalar.name(),
            ModelKind::Structure { .. } => "structure",
            ModelKind::Record { .. } => "record",
            ModelKind::Sequence { .. } => "sequence",
            ModelKind::Union { .. } => "union",
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(
            &self.kind,
            ModelKind::Scalar {
                scalar: ScalarType::Any
            }
        )
    }

    /// Declared child of a structure.
    pub fn child(&self, name: &str) -> Option<&ModelField> {
        match &self.kind {
            ModelKind::Structure { children } => children.get(name),
            _ => None,
        }
    }

    /// Deep shape check: does `value` conform to this node?
    ///
    /// Absent values conform to optional nodes only. Structures ignore runtime keys
    /// they do not declare.
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            return !self.required;
        }
        match &self.kind {
            ModelKind::Scalar { scalar } => scalar.accepts(value),
            ModelKind::Structure { children } => match value.as_object() {
                Some(map) => children
                    .iter()
                    .all(|(name, child)| child.accepts(map.get(name).unwrap_or(&NULL))),
                None => false,
            },
            ModelKind::Record { of } => value
                .as_object()
                .is_some_and(|map| map.values().all(|entry| entry.is_null() || of.accepts(entry))),
            ModelKind::Sequence { of } => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| item.is_null() || of.accepts(item))),
            ModelKind::Union { alternatives } => alternatives.iter().any(|alt| alt.accepts(value)),
        }
    }

    /// For a union, the first alternative accepting `value`; any other node is its
    /// own alternative.
    pub fn select_alternative(&self, value: &Value) -> Option<&ModelField> {
        match &self.kind {
            ModelKind::Union { alternatives } => alternatives.iter().find(|alt| alt.accepts(value)),
            _ => Some(self),
        }
    }
}
