use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

use super::error::GraphResult;
use crate::value::Value;

/// Identity of one loader fetch within a build call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Bucket declaring the link
    pub owner: String,
    pub link: String,
    /// Bucket actually fetched from (the pivot or the target)
    pub bucket: String,
    /// Canonical JSON of the query
    pub query: String,
}

type Slot = Arc<OnceCell<GraphResult<Arc<Vec<Value>>>>>;

/// Fetch results of a single build call.
///
/// Each key owns a `OnceCell`: the first caller runs the fetch, concurrent callers
/// for the same key wait on it, later callers read the stored result. Failed fetches
/// are stored too, so every record depending on the key sees the same error.
#[derive(Debug, Default)]
pub struct GraphCache {
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_fetch<F, Fut>(&self, key: CacheKey, fetch: F) -> GraphResult<Arc<Vec<Value>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = GraphResult<Vec<Value>>>,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(key).or_default().clone()
        };
        slot.get_or_init(|| async { fetch().await.map(Arc::new) })
            .await
            .clone()
    }

    /// Number of distinct keys requested so far.
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
