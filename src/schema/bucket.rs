//! Bucket definitions and the registry that ties them together.

use std::collections::{BTreeMap, HashMap};

use super::types::{GraphLink, GraphSchema, ModelField, ViewSchema};

/// Everything the engines know about one bucket: its model, its links and its views.
///
/// Built once per bucket definition and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Bucket {
    pub name: String,
    pub model: ModelField,
    pub graph: GraphSchema,
    pub views: BTreeMap<String, ViewSchema>,
}

impl Bucket {
    pub fn new(name: impl Into<String>, model: ModelField) -> Self {
        Self {
            name: name.into(),
            model,
            graph: GraphSchema::new(),
            views: BTreeMap::new(),
        }
    }

    pub fn with_link(mut self, name: impl Into<String>, link: GraphLink) -> Self {
        self.graph.insert(name.into(), link);
        self
    }

    pub fn with_view(mut self, view: ViewSchema) -> Self {
        self.views.insert(view.name.clone(), view);
        self
    }

    pub fn link(&self, name: &str) -> Option<&GraphLink> {
        self.graph.get(name)
    }

    pub fn view(&self, name: &str) -> Option<&ViewSchema> {
        self.views.get(name)
    }
}

/// Buckets by name. Graph sub-views look their target bucket up here.
#[derive(Debug, Clone, Default)]
pub struct BucketRegistry {
    buckets: HashMap<String, Bucket>,
}

impl BucketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a bucket, returning the one it replaced.
    pub fn register(&mut self, bucket: Bucket) -> Option<Bucket> {
        self.buckets.insert(bucket.name.clone(), bucket)
    }

    pub fn with(mut self, bucket: Bucket) -> Self {
        self.register(bucket);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Bucket> {
        self.buckets.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.buckets.contains_key(name)
    }

    /// Registered bucket names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.buckets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
