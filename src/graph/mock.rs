use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError, RwLock};

use super::loader::{BucketLoader, LoaderError, Query};
use crate::value::{Value, NULL};

/// In-memory loader for tests and examples.
///
/// Matches records by equality on each query field (dotted lookups are allowed; an
/// array query value matches any of its elements) and records every fetch so tests
/// can assert how many loader calls a build issued.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    records: RwLock<HashMap<String, Vec<Value>>>,
    failing: RwLock<HashSet<String>>,
    calls: Mutex<Vec<(String, Query)>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(self, bucket: impl Into<String>, records: Vec<Value>) -> Self {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(bucket.into())
            .or_default()
            .extend(records);
        self
    }

    /// Every fetch against `bucket` fails.
    pub fn failing(self, bucket: impl Into<String>) -> Self {
        self.failing
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(bucket.into());
        self
    }

    pub fn insert(&self, bucket: &str, record: Value) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(bucket.to_string())
            .or_default()
            .push(record);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn calls_for(&self, bucket: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(b, _)| b == bucket)
            .count()
    }

    pub fn calls(&self) -> Vec<(String, Query)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn reset_calls(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn matches(record: &Value, query: &Query) -> bool {
        query.iter().all(|(field, expected)| {
            let actual = record.lookup(field).unwrap_or(&NULL);
            match expected {
                Value::Array(options) => options.iter().any(|option| option == actual),
                single => single == actual,
            }
        })
    }
}

#[async_trait]
impl BucketLoader for MemoryLoader {
    async fn fetch(&self, bucket: &str, query: &Query) -> Result<Vec<Value>, LoaderError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((bucket.to_string(), query.clone()));

        // Suspend once so concurrent callers actually interleave.
        tokio::task::yield_now().await;

        if self
            .failing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(bucket)
        {
            return Err(LoaderError::new(format!("bucket '{}' is unavailable", bucket)));
        }

        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let stored = records
            .get(bucket)
            .ok_or_else(|| LoaderError::new(format!("unknown bucket '{}'", bucket)))?;
        Ok(stored
            .iter()
            .filter(|record| Self::matches(record, query))
            .cloned()
            .collect())
    }
}
