//! # BucketView
//!
//! Read-side engine for schema-typed buckets of records: dotted paths into nested
//! data, declarative views over records, and batched loading of related records.
//!
//! ## Components
//!
//! * `path` - Path engine: `get` and `copy` of model paths against a record
//! * `graph` - Graph resolver: related records through a pluggable [`BucketLoader`]
//! * `view` - View builder: projections of records through bucket views
//! * `schema` - Model, graph and view schemas, bucket registry and validation
//! * `value` - Typed runtime values and their canonical forms
//! * `config` - Engine configuration loaded from TOML
//! * `logging` - Per-engine log targets on top of `env_logger`
//! * `error` - Unified error type
//!
//! Bucket loaders are the only I/O boundary; everything else is pure computation
//! over in-memory values.

pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod path;
pub mod schema;
#[cfg(feature = "mock")]
pub mod testing;
pub mod value;
pub mod view;

// Re-export main types for convenience
pub use config::{ConfigError, EngineConfig};
pub use error::{BucketViewError, BucketViewResult};
pub use graph::{BucketLoader, GraphError, GraphResolver, LoaderError, Query};
#[cfg(feature = "mock")]
pub use graph::MemoryLoader;
pub use logging::{LogFeature, LoggingSystem};
pub use path::{copy, get, GetOptions, ModelPath, PathError};
pub use schema::types::{
    GraphLink, InjectSource, ModelField, ScalarType, SchemaError, ViewEntry, ViewField,
    ViewSchema,
};
pub use schema::{Bucket, BucketRegistry, SchemaValidator};
pub use value::{Duration, Object, Value};
pub use view::{build_view, BuildOptions, Projected, Records, ViewBuilder, ViewContext, ViewError};
