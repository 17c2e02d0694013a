//! Static path resolution against a schema, without any record.
//!
//! Used by `path::validate`, by the resolver before it fans over a structure, and
//! when the data under a path is absent (schema errors are reported regardless of
//! the instance).

use super::error::{PathError, PathResult};
use super::parser::{PathKey, PathSegment};
use crate::schema::types::{ModelField, ModelKind};

/// Walks `segments` from `schema`.
///
/// `known` holds captures with concrete keys; `available` counts every capture a
/// `$N` may refer to at this point (known ones plus wildcards already walked).
/// Returns the leaf schema, or `None` when it is only known at runtime (below a
/// dynamic container fan or an `any` scalar).
pub(crate) fn walk<'s>(
    raw: &str,
    schema: &'s ModelField,
    segments: &[PathSegment],
    known: &[PathKey],
    available: usize,
) -> PathResult<Option<&'s ModelField>> {
    walk_with(raw, schema, segments, known, available, false)
}

/// Like [`walk`], but with `lenient` set a structure field the schema does not
/// declare resolves to `None` instead of failing. Record and sequence fans walk
/// their entry schema leniently; structure fans never do.
pub(crate) fn walk_with<'s>(
    raw: &str,
    schema: &'s ModelField,
    segments: &[PathSegment],
    known: &[PathKey],
    available: usize,
    lenient: bool,
) -> PathResult<Option<&'s ModelField>> {
    Walk {
        raw,
        known,
        lenient,
    }
    .step(schema, segments, available)
}

#[derive(Clone, Copy)]
struct Walk<'w> {
    raw: &'w str,
    known: &'w [PathKey],
    lenient: bool,
}

impl<'w> Walk<'w> {
    fn with_lenient(self, lenient: bool) -> Self {
        Self { lenient, ..self }
    }

    fn step<'s>(
        self,
        schema: &'s ModelField,
        segments: &[PathSegment],
        available: usize,
    ) -> PathResult<Option<&'s ModelField>> {
        let Some((segment, rest)) = segments.split_first() else {
            return Ok(Some(schema));
        };

        if let ModelKind::Union { alternatives } = &schema.kind {
            return self.union(alternatives, segments, available);
        }

        match segment {
            PathSegment::Key(key) => self.literal(schema, key, rest, available),
            PathSegment::BackRef(index) => {
                if *index >= available {
                    return Err(PathError::invalid(
                        self.raw,
                        format!("back-reference ${} has no captured wildcard", index),
                    ));
                }
                match self.known.get(*index) {
                    Some(key) => self.literal(schema, &key.to_string(), rest, available),
                    None => self.dynamic_key(schema, *index, rest, available),
                }
            }
            PathSegment::Wildcard => self.wildcard(schema, rest, available),
        }
    }

    fn union<'s>(
        self,
        alternatives: &'s [ModelField],
        segments: &[PathSegment],
        available: usize,
    ) -> PathResult<Option<&'s ModelField>> {
        let mut leaves = Vec::new();
        let mut last_error = None;
        for alternative in alternatives {
            match self.step(alternative, segments, available) {
                Ok(leaf) => leaves.push(leaf),
                Err(e) => last_error = Some(e),
            }
        }
        match leaves.split_first() {
            None => Err(last_error
                .unwrap_or_else(|| PathError::invalid(self.raw, "union declares no alternatives"))),
            Some((first, others)) => Ok(if others.iter().all(|leaf| leaf == first) {
                *first
            } else {
                None
            }),
        }
    }

    fn literal<'s>(
        self,
        schema: &'s ModelField,
        key: &str,
        rest: &[PathSegment],
        available: usize,
    ) -> PathResult<Option<&'s ModelField>> {
        match &schema.kind {
            ModelKind::Structure { children } => match children.get(key) {
                Some(child) => self.step(child, rest, available),
                None if self.lenient => Ok(None),
                None => Err(PathError::invalid(
                    self.raw,
                    format!("field '{}' is not declared", key),
                )),
            },
            ModelKind::Record { of } => self.step(of, rest, available),
            ModelKind::Sequence { of } => {
                key.parse::<usize>().map_err(|_| {
                    PathError::invalid(
                        self.raw,
                        format!("sequence index must be an integer, found '{}'", key),
                    )
                })?;
                self.step(of, rest, available)
            }
            ModelKind::Scalar { .. } if schema.is_any() => Ok(None),
            ModelKind::Scalar { .. } => Err(PathError::invalid(
                self.raw,
                format!("cannot descend into '{}' of {} field", key, schema.kind_name()),
            )),
            ModelKind::Union { .. } => self.step(schema, &[], available),
        }
    }

    fn dynamic_key<'s>(
        self,
        schema: &'s ModelField,
        index: usize,
        rest: &[PathSegment],
        available: usize,
    ) -> PathResult<Option<&'s ModelField>> {
        match &schema.kind {
            ModelKind::Record { of } | ModelKind::Sequence { of } => {
                self.step(of, rest, available)
            }
            ModelKind::Scalar { .. } if schema.is_any() => Ok(None),
            _ => Err(PathError::invalid(
                self.raw,
                format!(
                    "back-reference ${} cannot address a {} field statically",
                    index,
                    schema.kind_name()
                ),
            )),
        }
    }

    fn wildcard<'s>(
        self,
        schema: &'s ModelField,
        rest: &[PathSegment],
        available: usize,
    ) -> PathResult<Option<&'s ModelField>> {
        match &schema.kind {
            ModelKind::Structure { children } => {
                let strict = self.with_lenient(false);
                let mut leaves = Vec::with_capacity(children.len());
                for (name, child) in children {
                    let leaf = strict.step(child, rest, available + 1).map_err(|e| {
                        PathError::invalid(
                            self.raw,
                            format!(
                                "follow-on path is not declared on structure field '{}': {}",
                                name,
                                e.reason()
                            ),
                        )
                    })?;
                    leaves.push(leaf);
                }
                match leaves.split_first() {
                    None => Ok(None),
                    Some((first, others)) => {
                        if others.iter().any(|leaf| leaf != first) {
                            return Err(PathError::invalid(
                                self.raw,
                                "follow-on path resolves to different schemas across structure fields",
                            ));
                        }
                        Ok(*first)
                    }
                }
            }
            // Keys of dynamic containers are data: a follow-on field the entry
            // schema does not declare resolves to absent per entry.
            ModelKind::Record { of } | ModelKind::Sequence { of } => {
                self.with_lenient(true).step(of, rest, available + 1)
            }
            ModelKind::Scalar { .. } if schema.is_any() => Ok(None),
            ModelKind::Scalar { .. } => Err(PathError::invalid(
                self.raw,
                format!("wildcard cannot fan over a {} field", schema.kind_name()),
            )),
            ModelKind::Union { .. } => self.step(schema, &[], available),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::parser::parse;

    fn leaf_of(schema: &ModelField, path: &str) -> PathResult<Option<ModelField>> {
        let parsed = parse(path)?;
        walk(path, schema, parsed.segments(), &[], 0).map(|leaf| leaf.cloned())
    }

    #[test]
    fn literal_paths_return_leaf_schema() {
        let schema = ModelField::structure([(
            "address",
            ModelField::structure([("city", ModelField::string())]),
        )]);
        assert_eq!(
            leaf_of(&schema, "address.city").unwrap(),
            Some(ModelField::string())
        );
        assert!(leaf_of(&schema, "address.zip").unwrap_err().is_invalid_modelpath());
    }

    #[test]
    fn structure_wildcard_requires_identical_follow_on() {
        let same = ModelField::structure([
            ("front", ModelField::structure([("psi", ModelField::int())])),
            ("rear", ModelField::structure([("psi", ModelField::int())])),
        ]);
        assert_eq!(leaf_of(&same, "*.psi").unwrap(), Some(ModelField::int()));

        let different = ModelField::structure([
            ("front", ModelField::structure([("psi", ModelField::int())])),
            ("rear", ModelField::structure([("psi", ModelField::float())])),
        ]);
        assert!(leaf_of(&different, "*.psi").unwrap_err().is_invalid_modelpath());
    }

    #[test]
    fn dynamic_fans_only_forgive_undeclared_fields() {
        let schema = ModelField::record(ModelField::structure([
            ("a", ModelField::structure([("x", ModelField::int())])),
            ("b", ModelField::structure([("y", ModelField::int())])),
        ]));
        assert_eq!(leaf_of(&schema, "*.a.z").unwrap(), None);
        assert!(leaf_of(&schema, "*.*.x").unwrap_err().is_invalid_modelpath());
        assert!(leaf_of(&schema, "*.$3").unwrap_err().is_invalid_modelpath());
    }

    #[test]
    fn back_references_need_a_capture() {
        let schema = ModelField::record(ModelField::int());
        assert!(leaf_of(&schema, "$0").unwrap_err().is_invalid_modelpath());
    }
}
