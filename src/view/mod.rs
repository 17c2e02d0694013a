//! # View builder
//!
//! Projects bucket records into output shapes declared by [`ViewSchema`]s: model
//! fields through the path engine, computed values, and related records through the
//! graph resolver. Output objects carry a view marker naming the view they came from.
//!
//! [`ViewSchema`]: crate::schema::types::ViewSchema

pub mod builder;
pub mod compose;
pub mod context;
pub mod error;

pub use builder::ViewBuilder;
pub use compose::{flatten, FlatEntry};
pub use context::ViewContext;
pub use error::{ViewError, ViewResult};

use crate::config::EngineConfig;
use crate::graph::{BucketLoader, DEFAULT_MAX_CONCURRENT_FETCHES};
use crate::schema::BucketRegistry;
use crate::value::Value;

/// Key of the view marker added to every projected object.
pub const DEFAULT_VIEW_MARKER: &str = "$v";

/// Options of a build call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Canonicalize dates, datetimes, durations and decimals in the output
    pub serialize: bool,
    pub view_marker: String,
    /// Bound on loader calls in flight while prefetching a batch
    pub max_concurrent_fetches: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            serialize: false,
            view_marker: DEFAULT_VIEW_MARKER.to_string(),
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

impl BuildOptions {
    pub fn serialized() -> Self {
        Self {
            serialize: true,
            ..Self::default()
        }
    }
}

impl From<&EngineConfig> for BuildOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            serialize: config.view.serialize,
            view_marker: config.view.view_marker.clone(),
            max_concurrent_fetches: config.graph.max_concurrent_fetches,
        }
    }
}

/// Input of [`build_view`]: one record or a batch.
#[derive(Debug, Clone, Copy)]
pub enum Records<'r> {
    One(&'r Value),
    Many(&'r [Value]),
}

/// Output of [`build_view`], mirroring [`Records`]. Batch slots fail independently.
#[derive(Debug, Clone, PartialEq)]
pub enum Projected {
    One(Value),
    Many(Vec<ViewResult<Value>>),
}

impl Projected {
    /// The single projection, or `None` for a batch.
    pub fn into_one(self) -> Option<Value> {
        match self {
            Projected::One(value) => Some(value),
            Projected::Many(_) => None,
        }
    }

    pub fn into_many(self) -> Option<Vec<ViewResult<Value>>> {
        match self {
            Projected::Many(values) => Some(values),
            Projected::One(_) => None,
        }
    }
}

/// Projects `records` of `bucket` through `view` in one call.
pub async fn build_view(
    registry: &BucketRegistry,
    loader: &dyn BucketLoader,
    bucket: &str,
    view: &str,
    records: Records<'_>,
    options: BuildOptions,
) -> ViewResult<Projected> {
    let builder = ViewBuilder::new(registry, loader).with_options(options);
    match records {
        Records::One(record) => builder.build(bucket, view, record).await.map(Projected::One),
        Records::Many(records) => Ok(Projected::Many(
            builder.build_many(bucket, view, records).await,
        )),
    }
}
