//! Runtime path resolution: recursive descent carrying the schema node and the
//! data node together.

use super::copy::copy;
use super::error::{PathError, PathResult};
use super::parser::{join_keys, PathKey, PathSegment};
use super::resolution::{FanKind, Resolution};
use super::walk::walk_with;
use crate::schema::types::{ModelField, ModelKind};
use crate::value::{Value, NULL};

/// Captures and concrete keys accumulated on the way down.
#[derive(Debug, Clone, Default)]
struct Trail {
    captures: Vec<PathKey>,
    path: Vec<PathKey>,
    /// Below a record or sequence fan and not yet below a structure fan
    lenient: bool,
}

impl Trail {
    fn descend(&self, key: PathKey) -> Trail {
        let mut next = self.clone();
        next.path.push(key);
        next
    }

    fn capture(&self, key: PathKey) -> Trail {
        let mut next = self.descend(key.clone());
        next.captures.push(key);
        next
    }

    fn with_lenient(mut self, lenient: bool) -> Trail {
        self.lenient = lenient;
        self
    }

    fn absent(self) -> Resolution {
        Resolution::leaf(Value::Null, self.captures, self.path)
    }
}

pub(crate) struct Resolver<'p> {
    raw: &'p str,
    segments: &'p [PathSegment],
    as_json: bool,
}

impl<'p> Resolver<'p> {
    pub(crate) fn new(raw: &'p str, segments: &'p [PathSegment], as_json: bool) -> Self {
        Self {
            raw,
            segments,
            as_json,
        }
    }

    pub(crate) fn run(
        &self,
        schema: &ModelField,
        value: &Value,
        captures: &[PathKey],
    ) -> PathResult<Resolution> {
        let trail = Trail {
            captures: captures.to_vec(),
            ..Trail::default()
        };
        self.resolve(schema, value, 0, trail)
    }

    fn corrupted(&self, trail: &Trail, reason: impl Into<String>) -> PathError {
        PathError::corrupted(
            format!("{} (at {})", self.raw, join_keys(&trail.path)),
            reason,
        )
    }

    fn resolve(
        &self,
        schema: &ModelField,
        value: &Value,
        pos: usize,
        trail: Trail,
    ) -> PathResult<Resolution> {
        let Some(segment) = self.segments.get(pos) else {
            return self.finish(schema, value, trail);
        };

        if value.is_null() {
            // Nothing to descend into, but the rest of the path must still fit the schema.
            walk_with(
                self.raw,
                schema,
                &self.segments[pos..],
                &trail.captures,
                trail.captures.len(),
                trail.lenient,
            )?;
            return Ok(trail.absent());
        }

        if let ModelKind::Union { .. } = &schema.kind {
            let alternative = schema.select_alternative(value).ok_or_else(|| {
                self.corrupted(
                    &trail,
                    format!("no union alternative matches a {} value", value.kind()),
                )
            })?;
            return self.resolve(alternative, value, pos, trail);
        }

        match segment {
            PathSegment::Key(key) => self.literal(schema, value, key, pos, trail),
            PathSegment::BackRef(index) => {
                let key = trail.captures.get(*index).cloned().ok_or_else(|| {
                    PathError::invalid(
                        self.raw,
                        format!(
                            "back-reference ${} is out of range ({} captures)",
                            index,
                            trail.captures.len()
                        ),
                    )
                })?;
                self.literal(schema, value, &key.to_string(), pos, trail)
            }
            PathSegment::Wildcard => self.wildcard(schema, value, pos, trail),
        }
    }

    fn literal(
        &self,
        schema: &ModelField,
        value: &Value,
        key: &str,
        pos: usize,
        trail: Trail,
    ) -> PathResult<Resolution> {
        match &schema.kind {
            ModelKind::Structure { children } => {
                let Some(child) = children.get(key) else {
                    if trail.lenient {
                        return Ok(trail.absent());
                    }
                    return Err(PathError::invalid(
                        self.raw,
                        format!("field '{}' is not declared", key),
                    ));
                };
                let map = value.as_object().ok_or_else(|| {
                    self.corrupted(&trail, format!("expected structure, found {}", value.kind()))
                })?;
                let entry = map.get(key).unwrap_or(&NULL);
                self.resolve(child, entry, pos + 1, trail.descend(PathKey::Key(key.to_string())))
            }
            ModelKind::Record { of } => {
                let map = value.as_object().ok_or_else(|| {
                    self.corrupted(&trail, format!("expected record, found {}", value.kind()))
                })?;
                let entry = map.get(key).unwrap_or(&NULL);
                self.resolve(of, entry, pos + 1, trail.descend(PathKey::Key(key.to_string())))
            }
            ModelKind::Sequence { of } => {
                let index = key.parse::<usize>().map_err(|_| {
                    PathError::invalid(
                        self.raw,
                        format!("sequence index must be an integer, found '{}'", key),
                    )
                })?;
                let items = value.as_array().ok_or_else(|| {
                    self.corrupted(&trail, format!("expected sequence, found {}", value.kind()))
                })?;
                let entry = items.get(index).unwrap_or(&NULL);
                self.resolve(of, entry, pos + 1, trail.descend(PathKey::Index(index)))
            }
            ModelKind::Scalar { .. } if schema.is_any() => {
                let (entry, at) = match value {
                    Value::Array(items) => match key.parse::<usize>() {
                        Ok(index) => (items.get(index).unwrap_or(&NULL), PathKey::Index(index)),
                        Err(_) => (&NULL, PathKey::Key(key.to_string())),
                    },
                    other => (
                        other.get(key).unwrap_or(&NULL),
                        PathKey::Key(key.to_string()),
                    ),
                };
                self.resolve(schema, entry, pos + 1, trail.descend(at))
            }
            ModelKind::Scalar { .. } => Err(PathError::invalid(
                self.raw,
                format!("cannot descend into '{}' of {} field", key, schema.kind_name()),
            )),
            // Unions are narrowed by `resolve` before reaching here.
            ModelKind::Union { .. } => self.resolve(schema, value, pos, trail),
        }
    }

    fn wildcard(
        &self,
        schema: &ModelField,
        value: &Value,
        pos: usize,
        trail: Trail,
    ) -> PathResult<Resolution> {
        match &schema.kind {
            ModelKind::Structure { children } => {
                if pos + 1 < self.segments.len() {
                    walk_with(
                        self.raw,
                        schema,
                        &self.segments[pos..],
                        &trail.captures,
                        trail.captures.len(),
                        trail.lenient,
                    )?;
                }
                let map = value.as_object().ok_or_else(|| {
                    self.corrupted(&trail, format!("expected structure, found {}", value.kind()))
                })?;
                let mut entries = Vec::with_capacity(children.len());
                for (name, child) in children {
                    let key = PathKey::Key(name.clone());
                    let entry = map.get(name).unwrap_or(&NULL);
                    let branch = trail.capture(key.clone()).with_lenient(false);
                    let resolved = self.resolve(child, entry, pos + 1, branch)?;
                    entries.push((key, resolved));
                }
                Ok(self.fanout(FanKind::Structure, trail, entries))
            }
            ModelKind::Record { of } => {
                let map = value.as_object().ok_or_else(|| {
                    self.corrupted(&trail, format!("expected record, found {}", value.kind()))
                })?;
                let entries = map
                    .iter()
                    .map(|(name, entry)| self.dynamic_entry(of, entry, pos, &trail, PathKey::Key(name.clone())))
                    .collect::<PathResult<Vec<_>>>()?;
                Ok(self.fanout(FanKind::Record, trail, entries))
            }
            ModelKind::Sequence { of } => {
                let items = value.as_array().ok_or_else(|| {
                    self.corrupted(&trail, format!("expected sequence, found {}", value.kind()))
                })?;
                let entries = items
                    .iter()
                    .enumerate()
                    .map(|(index, entry)| self.dynamic_entry(of, entry, pos, &trail, PathKey::Index(index)))
                    .collect::<PathResult<Vec<_>>>()?;
                Ok(self.fanout(FanKind::Sequence, trail, entries))
            }
            ModelKind::Scalar { .. } if schema.is_any() => match value {
                Value::Object(map) => {
                    let entries = map
                        .iter()
                        .map(|(name, entry)| {
                            self.dynamic_entry(schema, entry, pos, &trail, PathKey::Key(name.clone()))
                        })
                        .collect::<PathResult<Vec<_>>>()?;
                    Ok(self.fanout(FanKind::Record, trail, entries))
                }
                Value::Array(items) => {
                    let entries = items
                        .iter()
                        .enumerate()
                        .map(|(index, entry)| {
                            self.dynamic_entry(schema, entry, pos, &trail, PathKey::Index(index))
                        })
                        .collect::<PathResult<Vec<_>>>()?;
                    Ok(self.fanout(FanKind::Sequence, trail, entries))
                }
                _ => Ok(trail.absent()),
            },
            ModelKind::Scalar { .. } => Err(PathError::invalid(
                self.raw,
                format!("wildcard cannot fan over a {} field", schema.kind_name()),
            )),
            ModelKind::Union { .. } => self.resolve(schema, value, pos, trail),
        }
    }

    /// One entry of a record or sequence fan. Keys are data, so a follow-on field
    /// the entry schema does not declare is absent for that entry.
    fn dynamic_entry(
        &self,
        of: &ModelField,
        entry: &Value,
        pos: usize,
        trail: &Trail,
        key: PathKey,
    ) -> PathResult<(PathKey, Resolution)> {
        let next = trail.capture(key.clone()).with_lenient(true);
        let resolved = self.resolve(of, entry, pos + 1, next)?;
        Ok((key, resolved))
    }

    fn fanout(&self, kind: FanKind, trail: Trail, entries: Vec<(PathKey, Resolution)>) -> Resolution {
        Resolution::Fanout {
            kind,
            captures: trail.captures,
            entries,
        }
    }

    /// End of the path: shape-check the value against its schema node and keep only
    /// what the schema declares, so a trailing `*` never changes the result.
    fn finish(&self, schema: &ModelField, value: &Value, trail: Trail) -> PathResult<Resolution> {
        if value.is_null() {
            return Ok(trail.absent());
        }
        let schema = schema.select_alternative(value).ok_or_else(|| {
            self.corrupted(
                &trail,
                format!("no union alternative matches a {} value", value.kind()),
            )
        })?;
        let conforms = match &schema.kind {
            ModelKind::Scalar { scalar } => scalar.accepts(value),
            ModelKind::Structure { .. } | ModelKind::Record { .. } => value.as_object().is_some(),
            ModelKind::Sequence { .. } => value.as_array().is_some(),
            ModelKind::Union { .. } => true,
        };
        if !conforms {
            return Err(self.corrupted(
                &trail,
                format!("expected {}, found {}", schema.kind_name(), value.kind()),
            ));
        }
        let value = copy(schema, value).map_err(|e| {
            self.corrupted(&trail, format!("{} below: {}", e.path(), e.reason()))
        })?;
        let value = if self.as_json {
            value.into_canonical()
        } else {
            value
        };
        Ok(Resolution::leaf(value, trail.captures, trail.path))
    }
}
