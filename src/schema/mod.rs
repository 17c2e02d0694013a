//! # Schema
//!
//! Model, graph and view schemas of a bucket, the [`Bucket`] bundle and the
//! [`BucketRegistry`], plus a static [`SchemaValidator`].

pub mod bucket;
pub mod types;
pub mod validator;

pub use bucket::{Bucket, BucketRegistry};
pub use types::*;
pub use validator::SchemaValidator;
