use futures::future::join_all;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;

use super::cache::{CacheKey, GraphCache};
use super::condition;
use super::error::{GraphError, GraphResult};
use super::loader::{BucketLoader, Query};
use crate::schema::types::{Cardinality, GraphLink, GraphMechanism, ModelField};
use crate::schema::{Bucket, BucketRegistry};
use crate::value::Value;
use crate::{log_graph_debug, log_graph_warn};

/// Default bound on loader calls in flight during a batch prefetch.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 16;

/// Resolves graph links through a [`BucketLoader`].
///
/// A resolver lives for one build call: its cache dedupes identical fetches within
/// the call and is dropped with it.
pub struct GraphResolver<'a> {
    registry: &'a BucketRegistry,
    loader: &'a dyn BucketLoader,
    cache: GraphCache,
    max_concurrent_fetches: usize,
}

impl<'a> GraphResolver<'a> {
    pub fn new(registry: &'a BucketRegistry, loader: &'a dyn BucketLoader) -> Self {
        Self {
            registry,
            loader,
            cache: GraphCache::new(),
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }

    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max.max(1);
        self
    }

    /// Distinct fetches requested through this resolver.
    pub fn distinct_fetches(&self) -> usize {
        self.cache.len()
    }

    /// Related record of a `one` link: the first match, or absent.
    pub async fn resolve_one(&self, bucket: &Bucket, link: &str, record: &Value) -> GraphResult<Value> {
        let related = self.related(bucket, link, record).await?;
        Ok(related.into_iter().next().unwrap_or(Value::Null))
    }

    /// Related records of a `many` link; empty when nothing matches.
    pub async fn resolve_many(
        &self,
        bucket: &Bucket,
        link: &str,
        record: &Value,
    ) -> GraphResult<Vec<Value>> {
        self.related(bucket, link, record).await
    }

    /// Resolves according to the link's cardinality: a record or absent for `one`,
    /// an array for `many`.
    pub async fn resolve(&self, bucket: &Bucket, link: &str, record: &Value) -> GraphResult<Value> {
        let cardinality = find_link(bucket, link)?.cardinality;
        let related = self.related(bucket, link, record).await?;
        Ok(shape(cardinality, related))
    }

    pub async fn resolve_one_batch(
        &self,
        bucket: &Bucket,
        link: &str,
        records: &[Value],
    ) -> GraphResult<Vec<Value>> {
        self.prefetch(bucket, link, records).await?;
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            out.push(self.resolve_one(bucket, link, record).await?);
        }
        Ok(out)
    }

    pub async fn resolve_many_batch(
        &self,
        bucket: &Bucket,
        link: &str,
        records: &[Value],
    ) -> GraphResult<Vec<Vec<Value>>> {
        self.prefetch(bucket, link, records).await?;
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            out.push(self.resolve_many(bucket, link, record).await?);
        }
        Ok(out)
    }

    /// Batch form of [`GraphResolver::resolve`].
    pub async fn resolve_batch(
        &self,
        bucket: &Bucket,
        link: &str,
        records: &[Value],
    ) -> GraphResult<Vec<Value>> {
        self.prefetch(bucket, link, records).await?;
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            out.push(self.resolve(bucket, link, record).await?);
        }
        Ok(out)
    }

    /// Computes the query of every record first, then fetches each distinct query
    /// once with bounded concurrency. Later resolutions of the same records are
    /// served from the cache.
    ///
    /// Records whose condition cannot be evaluated are skipped here; they fail when
    /// resolved individually. Fetch failures are cached and surface the same way.
    pub async fn prefetch(&self, bucket: &Bucket, link: &str, records: &[Value]) -> GraphResult<()> {
        let declared = find_link(bucket, link)?;
        let mut seen = HashSet::new();
        let mut distinct = Vec::new();
        for record in records {
            match condition::evaluate(&bucket.model, declared, record) {
                Ok(query) => {
                    if seen.insert(condition::canonical_key(&query)) {
                        distinct.push(query);
                    }
                }
                Err(e) => {
                    log_graph_warn!("Skipping prefetch of '{}.{}' for one record: {}", bucket.name, link, e)
                }
            }
        }
        log_graph_debug!(
            "Prefetching '{}.{}': {} records, {} distinct queries",
            bucket.name,
            link,
            records.len(),
            distinct.len()
        );

        stream::iter(
            distinct
                .into_iter()
                .map(|query| self.related_for_query(bucket, link, declared, query)),
        )
        .buffer_unordered(self.max_concurrent_fetches)
        .for_each(|_| async {})
        .await;
        Ok(())
    }

    async fn related(&self, bucket: &Bucket, link: &str, record: &Value) -> GraphResult<Vec<Value>> {
        let declared = find_link(bucket, link)?;
        let query = condition::evaluate(&bucket.model, declared, record)?;
        self.related_for_query(bucket, link, declared, query).await
    }

    async fn related_for_query(
        &self,
        bucket: &Bucket,
        link: &str,
        declared: &GraphLink,
        query: Query,
    ) -> GraphResult<Vec<Value>> {
        match &declared.mechanism {
            GraphMechanism::Aggregation => {
                let found = self.fetch(&bucket.name, link, &declared.bucket, query).await?;
                Ok(found.as_ref().clone())
            }
            GraphMechanism::Composition { pivot, join } => {
                let pivots = self.fetch(&bucket.name, link, pivot, query).await?;
                let any = ModelField::any();
                let pivot_model = self.registry.get(pivot).map_or(&any, |b| &b.model);
                let targets = pivots
                    .iter()
                    .map(|record| condition::join(pivot_model, join, record))
                    .collect::<Result<Vec<_>, _>>()?;

                let fetched = join_all(
                    targets
                        .into_iter()
                        .map(|target| self.fetch(&bucket.name, link, &declared.bucket, target)),
                )
                .await;

                let mut related = Vec::new();
                for found in fetched {
                    related.extend(found?.iter().cloned());
                }
                Ok(related)
            }
        }
    }

    async fn fetch(
        &self,
        owner: &str,
        link: &str,
        target: &str,
        query: Query,
    ) -> GraphResult<Arc<Vec<Value>>> {
        let key = CacheKey {
            owner: owner.to_string(),
            link: link.to_string(),
            bucket: target.to_string(),
            query: condition::canonical_key(&query),
        };
        self.cache
            .get_or_fetch(key, || async move {
                log_graph_debug!("Fetching from '{}' with {:?}", target, query);
                self.loader
                    .fetch(target, &query)
                    .await
                    .map_err(|e| GraphError::Loader {
                        bucket: target.to_string(),
                        reason: e.message,
                    })
            })
            .await
    }
}

fn find_link<'b>(bucket: &'b Bucket, link: &str) -> GraphResult<&'b GraphLink> {
    bucket
        .link(link)
        .ok_or_else(|| GraphError::link_not_found(&bucket.name, link))
}

fn shape(cardinality: Cardinality, related: Vec<Value>) -> Value {
    match cardinality {
        Cardinality::One => related.into_iter().next().unwrap_or(Value::Null),
        Cardinality::Many => Value::Array(related),
    }
}
