use crate::path::PathKey;
use crate::schema::types::InjectSource;
use crate::schema::Bucket;
use crate::value::{Value, NULL};

/// Ambient values visible to `computed` and `transform` functions.
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a> {
    /// Top-level record being projected
    pub root: &'a Value,
    /// Container the current value was taken from during a chain or map
    pub parent: &'a Value,
    /// Value fed by the enclosing chain or map (the record itself at top level)
    pub value: &'a Value,
    /// Model node being projected (the record, or a `model_with` leaf)
    pub current: &'a Value,
    /// Wildcard keys captured by the enclosing resolution
    pub captures: &'a [PathKey],
    /// Name of the bucket being projected
    pub bucket: &'a str,
}

impl<'a> ViewContext<'a> {
    pub fn ambient(&self, source: InjectSource) -> &'a Value {
        match source {
            InjectSource::Root => self.root,
            InjectSource::Parent => self.parent,
            InjectSource::Value => self.value,
            InjectSource::Current => self.current,
        }
    }
}

/// Where the builder stands while projecting one field.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope<'a> {
    pub bucket: &'a Bucket,
    pub root: &'a Value,
    pub parent: &'a Value,
    pub value: &'a Value,
    pub current: &'a Value,
    /// Concrete path model paths are resolved below
    pub base: &'a [PathKey],
    pub captures: &'a [PathKey],
}

impl<'a> Scope<'a> {
    pub fn root(bucket: &'a Bucket, record: &'a Value) -> Self {
        Self {
            bucket,
            root: record,
            parent: &NULL,
            value: record,
            current: record,
            base: &[],
            captures: &[],
        }
    }

    /// Scope of a continuation over a record fetched through a graph link.
    pub fn related(
        bucket: &'a Bucket,
        record: &'a Value,
        parent: &'a Value,
        captures: &'a [PathKey],
    ) -> Self {
        Self {
            bucket,
            root: record,
            parent,
            value: record,
            current: record,
            base: &[],
            captures,
        }
    }

    /// Scope of a chain or map continuation: model paths resolve from the root again.
    pub fn continuation(
        self,
        value: &'a Value,
        parent: &'a Value,
        captures: &'a [PathKey],
    ) -> Scope<'a> {
        Scope {
            value,
            parent,
            captures,
            base: &[],
            ..self
        }
    }

    /// Scope of a `model_with` leaf: paths resolve below the leaf.
    pub fn below(self, current: &'a Value, base: &'a [PathKey], captures: &'a [PathKey]) -> Scope<'a> {
        Scope {
            current,
            base,
            captures,
            ..self
        }
    }

    pub fn context(&self) -> ViewContext<'a> {
        ViewContext {
            root: self.root,
            parent: self.parent,
            value: self.value,
            current: self.current,
            captures: self.captures,
            bucket: &self.bucket.name,
        }
    }
}
