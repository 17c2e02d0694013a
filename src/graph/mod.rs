//! Graph resolver: related records of a bucket's graph links.
//!
//! A link's condition is evaluated against the source record into a [`Query`], which
//! is handed to the injected [`BucketLoader`]. Composition links go through a pivot
//! bucket first. Within one [`GraphResolver`] every distinct fetch is issued once.

pub mod cache;
pub mod condition;
pub mod error;
pub mod loader;
#[cfg(feature = "mock")]
pub mod mock;
pub mod resolver;

pub use cache::{CacheKey, GraphCache};
pub use error::{GraphError, GraphResult};
pub use loader::{BucketLoader, LoaderError, Query};
#[cfg(feature = "mock")]
pub use mock::MemoryLoader;
pub use resolver::{GraphResolver, DEFAULT_MAX_CONCURRENT_FETCHES};
