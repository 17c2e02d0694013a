use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::value::Value;

/// Query handed to a loader: target field name to expected value.
///
/// An array value means "any of these".
pub type Query = BTreeMap<String, Value>;

/// Failure reported by a [`BucketLoader`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LoaderError {
    pub message: String,
}

impl LoaderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Storage capability the graph resolver fetches related records through.
#[async_trait]
pub trait BucketLoader: Send + Sync {
    /// Returns every record of `bucket` matching `query`.
    async fn fetch(&self, bucket: &str, query: &Query) -> Result<Vec<Value>, LoaderError>;
}
