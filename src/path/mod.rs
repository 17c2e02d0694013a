//! Path engine: resolution of dotted model paths against a model schema and a record.
//!
//! Paths address nested data across the four container kinds:
//!
//! * `address.city`: literal segments
//! * `wheels.*.pressure`: wildcard fan-out, reassembled into a parallel container
//! * `prices.$0`: back-reference to the first captured wildcard key
//!
//! The engine is pure and synchronous. Errors are [`PathError::InvalidModelpath`] when
//! the path does not fit the schema and [`PathError::CorruptedData`] when the record
//! disagrees with it. Missing data is never an error.

mod copy;
pub mod error;
pub mod parser;
pub mod resolution;
mod resolver;
mod walk;

pub use copy::copy;
pub use error::{PathError, PathResult};
pub use parser::{join_keys, parse, ModelPath, PathKey, PathSegment};
pub use resolution::{FanKind, Resolution, ResolvedLeaf, Skeleton};

use crate::log_path_debug;
use crate::schema::types::ModelField;
use crate::value::Value;
use resolver::Resolver;

/// Options for [`get`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetOptions {
    /// Replace dates, datetimes, durations and decimals by their canonical strings
    pub as_json: bool,
}

impl GetOptions {
    pub fn as_json() -> Self {
        Self { as_json: true }
    }
}

/// Resolves `path` in `value` and reassembles the result into a plain value.
///
/// Values come back as the schema sees them: undeclared structure keys and absent
/// structure fields are left out, whether or not the path ends in a wildcard.
pub fn get(
    schema: &ModelField,
    value: &Value,
    path: &str,
    options: GetOptions,
) -> PathResult<Value> {
    get_with_captures(schema, value, path, &[], options).map(Resolution::into_value)
}

/// Resolves `path` keeping the fan-out tree, with `captures` inherited from an
/// enclosing resolution (targets of `$0`, `$1`, ...).
pub fn get_with_captures(
    schema: &ModelField,
    value: &Value,
    path: &str,
    captures: &[PathKey],
    options: GetOptions,
) -> PathResult<Resolution> {
    let parsed = ModelPath::parse(path)?;
    resolve_path(schema, value, &parsed, captures, options)
}

/// Same as [`get_with_captures`] for an already parsed path.
pub fn resolve_path(
    schema: &ModelField,
    value: &Value,
    path: &ModelPath,
    captures: &[PathKey],
    options: GetOptions,
) -> PathResult<Resolution> {
    log_path_debug!("Resolving '{}' with {} captures", path, captures.len());
    Resolver::new(path.as_str(), path.segments(), options.as_json).run(schema, value, captures)
}

/// Statically resolves `path` against `schema`.
///
/// Returns the leaf schema, or `None` when it only becomes known at runtime (below a
/// record or sequence fan or an `any` field). Back-references are checked against the
/// wildcards of the path itself.
pub fn validate(schema: &ModelField, path: &str) -> PathResult<Option<ModelField>> {
    let parsed = ModelPath::parse(path)?;
    walk::walk(parsed.as_str(), schema, parsed.segments(), &[], 0).map(|leaf| leaf.cloned())
}

/// Like [`validate`], for a continuation path that may reference `available`
/// captures of an enclosing resolution whose keys are not known yet.
pub fn validate_with_captures(
    schema: &ModelField,
    path: &str,
    available: usize,
) -> PathResult<Option<ModelField>> {
    let parsed = ModelPath::parse(path)?;
    walk::walk(parsed.as_str(), schema, parsed.segments(), &[], available)
        .map(|leaf| leaf.cloned())
}
