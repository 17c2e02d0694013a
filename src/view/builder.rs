use futures::future::{join_all, try_join_all, BoxFuture, FutureExt};

use super::compose::{self, FlatEntry};
use super::context::Scope;
use super::error::{ViewError, ViewResult};
use super::BuildOptions;
use crate::graph::{BucketLoader, GraphResolver};
use crate::path::{self, GetOptions, ModelPath, PathKey, Resolution, ResolvedLeaf};
use crate::schema::types::{FieldModifier, FieldSource, ViewEntry, ViewField};
use crate::schema::{Bucket, BucketRegistry};
use crate::value::{Object, Value};
use crate::{log_view_debug, log_view_info, log_view_warn};

/// Projects bucket records through their views.
///
/// Every call to [`ViewBuilder::build`] or [`ViewBuilder::build_many`] gets its own
/// graph resolver, so fetches are deduplicated within the call and never cached
/// across calls.
pub struct ViewBuilder<'a> {
    registry: &'a BucketRegistry,
    loader: &'a dyn BucketLoader,
    options: BuildOptions,
}

impl<'a> ViewBuilder<'a> {
    pub fn new(registry: &'a BucketRegistry, loader: &'a dyn BucketLoader) -> Self {
        Self {
            registry,
            loader,
            options: BuildOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    fn bucket(&self, name: &str) -> ViewResult<&'a Bucket> {
        self.registry
            .get(name)
            .ok_or_else(|| ViewError::BucketNotFound(name.to_string()))
    }

    fn session(&self) -> Projection<'a, '_> {
        Projection {
            registry: self.registry,
            graph: GraphResolver::new(self.registry, self.loader)
                .with_max_concurrent_fetches(self.options.max_concurrent_fetches),
            options: &self.options,
        }
    }

    /// Projects one record of `bucket` through `view`.
    pub async fn build(&self, bucket: &str, view: &str, record: &Value) -> ViewResult<Value> {
        let bucket = self.bucket(bucket)?;
        log_view_debug!("Building view '{}.{}'", bucket.name, view);
        let session = self.session();
        let projected = session.project(bucket, view, record).await?;
        Ok(session.finalize(projected))
    }

    /// Projects many records, keeping input order.
    ///
    /// Graph links used directly by the view are prefetched for the whole batch
    /// first, so each distinct related key is fetched once. A record that fails to
    /// project yields an error in its own slot only.
    pub async fn build_many(
        &self,
        bucket: &str,
        view: &str,
        records: &[Value],
    ) -> Vec<ViewResult<Value>> {
        let prepared = self.bucket(bucket).and_then(|bucket| {
            let schema = bucket.view(view).ok_or_else(|| ViewError::ViewNotFound {
                bucket: bucket.name.clone(),
                view: view.to_string(),
            })?;
            Ok((bucket, compose::flatten(bucket, schema)?))
        });
        let (bucket, entries) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => return records.iter().map(|_| Err(e.clone())).collect(),
        };

        log_view_info!(
            "Building view '{}.{}' for {} records",
            bucket.name,
            view,
            records.len()
        );
        let session = self.session();
        for entry in &entries {
            if let FlatEntry::Field {
                field:
                    ViewField {
                        source: FieldSource::Graph { link, .. },
                        ..
                    },
                ..
            } = entry
            {
                if let Err(e) = session.graph.prefetch(bucket, link, records).await {
                    log_view_warn!("Prefetch of '{}.{}' failed: {}", bucket.name, link, e);
                }
            }
        }

        let results = join_all(records.iter().map(|record| {
            let session = &session;
            let entries = &entries;
            async move {
                session
                    .project_flat(bucket, view, entries, record)
                    .await
                    .map(|projected| session.finalize(projected))
            }
        }))
        .await;

        log_view_debug!(
            "View '{}.{}' done: {} distinct fetches",
            bucket.name,
            view,
            session.graph.distinct_fetches()
        );
        results
    }
}

/// State of one build call.
struct Projection<'a, 'b> {
    registry: &'a BucketRegistry,
    graph: GraphResolver<'a>,
    options: &'b BuildOptions,
}

impl<'a, 'b> Projection<'a, 'b> {
    fn finalize(&self, value: Value) -> Value {
        if self.options.serialize {
            value.into_canonical()
        } else {
            value
        }
    }

    async fn project(&self, bucket: &Bucket, view: &str, record: &Value) -> ViewResult<Value> {
        let schema = bucket.view(view).ok_or_else(|| ViewError::ViewNotFound {
            bucket: bucket.name.clone(),
            view: view.to_string(),
        })?;
        let entries = compose::flatten(bucket, schema)?;
        self.project_flat(bucket, view, &entries, record).await
    }

    async fn project_flat(
        &self,
        bucket: &Bucket,
        view: &str,
        entries: &[FlatEntry<'_>],
        record: &Value,
    ) -> ViewResult<Value> {
        let mut out = self.build_entries(entries, Scope::root(bucket, record)).await?;
        out.insert(
            self.options.view_marker.clone(),
            Value::String(view.to_string()),
        );
        Ok(Value::Object(out))
    }

    fn build_entries<'s>(
        &'s self,
        entries: &'s [FlatEntry<'s>],
        scope: Scope<'s>,
    ) -> BoxFuture<'s, ViewResult<Object>> {
        async move {
            let mut out = Object::new();
            for entry in entries {
                match entry {
                    FlatEntry::Field { name, field } => {
                        let value = self.build_field(field, scope).await?;
                        out.insert(name.to_string(), value);
                    }
                    FlatEntry::Inject(source) => {
                        if let Value::Object(fields) = scope.context().ambient(*source) {
                            out.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                        }
                    }
                }
            }
            Ok(out)
        }
        .boxed()
    }

    fn build_field<'s>(
        &'s self,
        field: &'s ViewField,
        scope: Scope<'s>,
    ) -> BoxFuture<'s, ViewResult<Value>> {
        async move {
            let mut related_bucket = None;
            let resolution = match &field.source {
                FieldSource::Model { path, subfields } => {
                    let parsed = ModelPath::parse(path)?.prefixed(scope.base);
                    let resolved = path::resolve_path(
                        &scope.bucket.model,
                        scope.root,
                        &parsed,
                        scope.captures,
                        GetOptions::default(),
                    )?;
                    match subfields {
                        Some(subfields) => self.project_subfields(resolved, subfields, scope).await?,
                        None => resolved,
                    }
                }
                FieldSource::Computed(compute) => Resolution::leaf(
                    compute(&scope.context()),
                    scope.captures.to_vec(),
                    Vec::new(),
                ),
                FieldSource::Graph { link, view } => {
                    let related = self.graph.resolve(scope.bucket, link, scope.root).await?;
                    let target = self.link_target(scope.bucket, link)?;
                    related_bucket = Some(target);
                    let related = match view {
                        Some(view) => self.project_related(target, view, related).await?,
                        None => related,
                    };
                    Resolution::leaf(related, scope.captures.to_vec(), Vec::new())
                }
            };
            self.apply_modifiers(resolution, &field.modifiers, scope, related_bucket)
                .await
        }
        .boxed()
    }

    async fn project_subfields<'s>(
        &'s self,
        resolved: Resolution,
        subfields: &'s [ViewEntry],
        scope: Scope<'s>,
    ) -> ViewResult<Resolution> {
        let entries = compose::flatten_entries(scope.bucket, "<subfields>", subfields)?;
        let (skeleton, leaves) = resolved.into_leaves();
        let mut projected = Vec::with_capacity(leaves.len());
        for leaf in leaves {
            let value = if leaf.value.is_null() {
                Value::Null
            } else {
                let below = scope.below(&leaf.value, &leaf.path, &leaf.captures);
                Value::Object(self.build_entries(&entries, below).await?)
            };
            projected.push(ResolvedLeaf { value, ..leaf });
        }
        Ok(Resolution::from_leaves(skeleton, projected))
    }

    /// Bucket the records of `owner.link` come from.
    fn link_target(&self, owner: &Bucket, link: &str) -> ViewResult<&'a Bucket> {
        let target = owner
            .link(link)
            .map(|declared| declared.bucket.as_str())
            .ok_or_else(|| crate::graph::GraphError::link_not_found(&owner.name, link))?;
        self.registry
            .get(target)
            .ok_or_else(|| ViewError::BucketNotFound(target.to_string()))
    }

    async fn project_related(&self, target: &Bucket, view: &str, related: Value) -> ViewResult<Value> {
        match related {
            Value::Null => Ok(Value::Null),
            Value::Array(records) => {
                let projected = try_join_all(
                    records
                        .iter()
                        .map(|record| self.project(target, view, record).boxed()),
                )
                .await?;
                Ok(Value::Array(projected))
            }
            record => self.project(target, view, &record).boxed().await,
        }
    }

    async fn apply_modifiers<'s>(
        &'s self,
        mut resolution: Resolution,
        modifiers: &'s [FieldModifier],
        scope: Scope<'s>,
        related: Option<&'s Bucket>,
    ) -> ViewResult<Value> {
        for modifier in modifiers {
            resolution = match modifier {
                FieldModifier::Chain(next) => self.chain(resolution, next, scope, related).await?,
                FieldModifier::Map(next) => {
                    let mapped = match self.each_entry(resolution, next, scope, related).await? {
                        Some(entries) => Value::Array(entries.into_iter().map(|(_, v)| v).collect()),
                        None => Value::Null,
                    };
                    whole(mapped, scope)
                }
                FieldModifier::Obj(next) => {
                    let mapped = match self.each_entry(resolution, next, scope, related).await? {
                        Some(entries) => Value::Object(
                            entries
                                .into_iter()
                                .map(|(key, v)| (key.to_string(), v))
                                .collect(),
                        ),
                        None => Value::Null,
                    };
                    whole(mapped, scope)
                }
                FieldModifier::Pick(key) => resolution.map_values(|value| match value.get(key) {
                    Some(picked) => picked.clone(),
                    None => Value::Null,
                }),
                FieldModifier::AsDict(key_path) => whole(as_dict(resolution.into_value(), key_path), scope),
                FieldModifier::Transform(transform) => {
                    whole(transform(resolution.into_value(), &scope.context()), scope)
                }
            };
        }
        Ok(resolution.into_value())
    }

    /// Builds `next` once per leaf of `resolution`, keeping the fan-out shape.
    ///
    /// With `related` set the leaves are records of that bucket, and `next`
    /// resolves model paths against them.
    async fn chain<'s>(
        &'s self,
        resolution: Resolution,
        next: &'s ViewField,
        scope: Scope<'s>,
        related: Option<&'s Bucket>,
    ) -> ViewResult<Resolution> {
        let parent = if resolution.is_fanout() {
            resolution.clone().into_value()
        } else {
            scope.current.clone()
        };
        let (skeleton, leaves) = resolution.into_leaves();
        let mut chained = Vec::with_capacity(leaves.len());
        for leaf in leaves {
            let value = if leaf.value.is_null() {
                Value::Null
            } else {
                let inner = continuation(scope, related, &leaf.value, &parent, &leaf.captures);
                self.build_field(next, inner).await?
            };
            chained.push(ResolvedLeaf { value, ..leaf });
        }
        Ok(Resolution::from_leaves(skeleton, chained))
    }

    /// Builds `next` once per top-level entry: fan-out entries, or the elements of a
    /// single array or object value. `None` when the value is absent.
    async fn each_entry<'s>(
        &'s self,
        resolution: Resolution,
        next: &'s ViewField,
        scope: Scope<'s>,
        related: Option<&'s Bucket>,
    ) -> ViewResult<Option<Vec<(PathKey, Value)>>> {
        let parent = resolution.clone().into_value();
        let items: Vec<(PathKey, Value, Vec<PathKey>)> = match resolution {
            Resolution::Fanout {
                captures, entries, ..
            } => entries
                .into_iter()
                .map(|(key, entry)| {
                    let mut inner = captures.clone();
                    inner.push(key.clone());
                    (key, entry.into_value(), inner)
                })
                .collect(),
            Resolution::Leaf(leaf) => {
                let captured = |key: &PathKey| {
                    let mut inner = leaf.captures.clone();
                    inner.push(key.clone());
                    inner
                };
                match leaf.value {
                    Value::Null => return Ok(None),
                    Value::Array(elements) => elements
                        .into_iter()
                        .enumerate()
                        .map(|(index, element)| {
                            let key = PathKey::Index(index);
                            let inner = captured(&key);
                            (key, element, inner)
                        })
                        .collect(),
                    Value::Object(fields) => fields
                        .into_iter()
                        .map(|(name, element)| {
                            let key = PathKey::Key(name);
                            let inner = captured(&key);
                            (key, element, inner)
                        })
                        .collect(),
                    other => {
                        return Err(ViewError::invalid(
                            &scope.bucket.name,
                            format!("cannot map over a {} value", other.kind()),
                        ))
                    }
                }
            }
        };

        let mut out = Vec::with_capacity(items.len());
        for (key, value, captures) in items {
            let built = if value.is_null() {
                Value::Null
            } else {
                let inner = continuation(scope, related, &value, &parent, &captures);
                self.build_field(next, inner).await?
            };
            out.push((key, built));
        }
        Ok(Some(out))
    }
}

fn continuation<'s>(
    scope: Scope<'s>,
    related: Option<&'s Bucket>,
    value: &'s Value,
    parent: &'s Value,
    captures: &'s [PathKey],
) -> Scope<'s> {
    match related {
        Some(bucket) => Scope::related(bucket, value, parent, captures),
        None => scope.continuation(value, parent, captures),
    }
}

/// Wraps a whole-value result back into a single resolution leaf.
fn whole(value: Value, scope: Scope<'_>) -> Resolution {
    Resolution::leaf(value, scope.captures.to_vec(), Vec::new())
}

/// Keys an array of objects by the string form of each element's `key_path`.
/// Elements without a usable key are skipped; other values pass through.
fn as_dict(value: Value, key_path: &str) -> Value {
    match value {
        Value::Array(elements) => Value::Object(
            elements
                .into_iter()
                .filter_map(|element| {
                    let key = element.lookup(key_path).and_then(Value::key_string)?;
                    Some((key, element))
                })
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_dict_skips_elements_without_key() {
        let element = |id: Option<i64>| {
            let mut fields = Object::new();
            if let Some(id) = id {
                fields.insert("id".to_string(), Value::Int(id));
            }
            Value::Object(fields)
        };
        let keyed = as_dict(
            Value::Array(vec![element(Some(1)), element(None), element(Some(2))]),
            "id",
        );
        let keyed = keyed.as_object().unwrap();
        assert_eq!(keyed.len(), 2);
        assert!(keyed.contains_key("1") && keyed.contains_key("2"));
        assert_eq!(as_dict(Value::Int(3), "id"), Value::Int(3));
    }
}
