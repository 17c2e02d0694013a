use super::bucket::{Bucket, BucketRegistry};
use super::types::{
    ConditionValue, FieldModifier, FieldSource, GraphLink, GraphMechanism, ModelField, SchemaError,
    ViewField,
};
use crate::path::{self, ModelPath, PathSegment};
use crate::view::compose::{self, FlatEntry};
use crate::{log_schema_debug, log_schema_warn};

/// Checks the buckets of a [`BucketRegistry`] against each other before use.
///
/// The engines re-check everything at resolution time; the validator reports
/// authoring mistakes up front and independent of any record.
pub struct SchemaValidator<'a> {
    registry: &'a BucketRegistry,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(registry: &'a BucketRegistry) -> Self {
        Self { registry }
    }

    /// Validate one bucket, stopping at the first finding.
    pub fn validate_bucket(&self, name: &str) -> Result<(), SchemaError> {
        match self.bucket_findings(name).into_iter().next() {
            Some(finding) => Err(finding),
            None => Ok(()),
        }
    }

    /// Validate every registered bucket, stopping at the first finding.
    pub fn validate_all(&self) -> Result<(), SchemaError> {
        match self.findings().into_iter().next() {
            Some(finding) => Err(finding),
            None => Ok(()),
        }
    }

    /// Every finding across the registry, buckets in name order.
    pub fn findings(&self) -> Vec<SchemaError> {
        self.registry
            .names()
            .into_iter()
            .flat_map(|name| self.bucket_findings(name))
            .collect()
    }

    /// Every finding for one bucket.
    pub fn bucket_findings(&self, name: &str) -> Vec<SchemaError> {
        let Some(bucket) = self.registry.get(name) else {
            return vec![SchemaError::BucketNotFound(name.to_string())];
        };
        let mut findings = Vec::new();
        for (link_name, link) in &bucket.graph {
            self.check_link(bucket, link_name, link, &mut findings);
        }
        for view_name in bucket.views.keys() {
            self.check_view(bucket, view_name, &mut findings);
        }
        for finding in &findings {
            log_schema_warn!("{}", finding);
        }
        log_schema_debug!("Validated bucket '{}': {} findings", name, findings.len());
        findings
    }

    fn check_link(
        &self,
        bucket: &Bucket,
        link_name: &str,
        link: &GraphLink,
        findings: &mut Vec<SchemaError>,
    ) {
        let invalid = |reason: String| SchemaError::InvalidLink {
            bucket: bucket.name.clone(),
            link: link_name.to_string(),
            reason,
        };

        if !self.registry.contains(&link.bucket) {
            findings.push(invalid(format!("target bucket '{}' is not registered", link.bucket)));
        }
        for (field, value) in &link.condition {
            if let ConditionValue::Path(condition_path) = value {
                if let Err(e) = path::validate(&bucket.model, condition_path) {
                    findings.push(invalid(format!("condition '{}': {}", field, e)));
                }
            }
        }
        if let GraphMechanism::Composition { pivot, join } = &link.mechanism {
            match self.registry.get(pivot) {
                None => findings.push(invalid(format!("pivot bucket '{}' is not registered", pivot))),
                Some(pivot_bucket) => {
                    for (target, pivot_path) in join {
                        if let Err(e) = path::validate(&pivot_bucket.model, pivot_path) {
                            findings.push(invalid(format!("join '{}': {}", target, e)));
                        }
                    }
                }
            }
        }
    }

    fn check_view(&self, bucket: &Bucket, view_name: &str, findings: &mut Vec<SchemaError>) {
        let Some(view) = bucket.view(view_name) else {
            return;
        };
        let entries = match compose::flatten(bucket, view) {
            Ok(entries) => entries,
            Err(e) => {
                findings.push(SchemaError::InvalidView {
                    bucket: bucket.name.clone(),
                    view: view_name.to_string(),
                    reason: e.to_string(),
                });
                return;
            }
        };
        let mut check = FieldCheck {
            registry: self.registry,
            bucket,
            scope: bucket,
            view: view_name,
            findings,
        };
        check.entries(&entries, Some(&bucket.model), 0);
    }
}

/// Walks the fields of one flattened view.
struct FieldCheck<'r, 'f> {
    registry: &'r BucketRegistry,
    bucket: &'r Bucket,
    /// Bucket whose links and views the current field refers to; the target of a
    /// graph link inside that link's continuations
    scope: &'r Bucket,
    view: &'r str,
    findings: &'f mut Vec<SchemaError>,
}

impl<'r, 'f> FieldCheck<'r, 'f> {
    fn report(&mut self, field: &str, reason: impl std::fmt::Display) {
        self.findings.push(SchemaError::InvalidView {
            bucket: self.bucket.name.clone(),
            view: self.view.to_string(),
            reason: format!("field '{}': {}", field, reason),
        });
    }

    /// `schema` is the node model paths resolve against; `None` inside continuations
    /// and below dynamic leaves, where paths are only checked at runtime. `captures`
    /// counts the wildcards of enclosing `model_with` paths.
    fn entries(&mut self, entries: &[FlatEntry<'_>], schema: Option<&ModelField>, captures: usize) {
        for entry in entries {
            if let FlatEntry::Field { name, field } = entry {
                self.field(name, field, schema, captures);
            }
        }
    }

    fn field(&mut self, name: &str, field: &ViewField, schema: Option<&ModelField>, captures: usize) {
        match &field.source {
            FieldSource::Model { path: model_path, subfields } => {
                let leaf = match schema {
                    Some(schema) => match path::validate_with_captures(schema, model_path, captures) {
                        Ok(leaf) => leaf,
                        Err(e) => {
                            self.report(name, e);
                            None
                        }
                    },
                    None => None,
                };
                if let Some(subfields) = subfields {
                    let below = captures + wildcard_count(model_path);
                    match compose::flatten_entries(self.scope, name, subfields) {
                        Ok(flat) => self.entries(&flat, leaf.as_ref(), below),
                        Err(e) => self.report(name, e),
                    }
                }
            }
            FieldSource::Computed(_) => {}
            FieldSource::Graph { link, view } => match self.scope.link(link) {
                None => self.report(name, format!("graph link '{}' is not declared", link)),
                Some(declared) => {
                    if let Some(view) = view {
                        let target = self.registry.get(&declared.bucket);
                        if !target.is_some_and(|target| target.view(view).is_some()) {
                            self.report(
                                name,
                                format!("bucket '{}' has no view '{}'", declared.bucket, view),
                            );
                        }
                    }
                }
            },
        }

        let related = match &field.source {
            FieldSource::Graph { link, .. } => self
                .scope
                .link(link)
                .and_then(|declared| self.registry.get(&declared.bucket)),
            _ => None,
        };
        let outer = self.scope;
        self.scope = related.unwrap_or(outer);
        for modifier in &field.modifiers {
            if let FieldModifier::Chain(next) | FieldModifier::Map(next) | FieldModifier::Obj(next) =
                modifier
            {
                self.field(name, next, None, captures);
            }
        }
        self.scope = outer;
    }
}

fn wildcard_count(model_path: &str) -> usize {
    ModelPath::parse(model_path)
        .map(|parsed| {
            parsed
                .segments()
                .iter()
                .filter(|segment| matches!(segment, PathSegment::Wildcard))
                .count()
        })
        .unwrap_or(0)
}
