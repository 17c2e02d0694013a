use crate::path::PathError;

/// Problems found while validating bucket schemas.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),
    #[error("Invalid link '{link}' on bucket '{bucket}': {reason}")]
    InvalidLink {
        bucket: String,
        link: String,
        reason: String,
    },
    #[error("Invalid view '{view}' on bucket '{bucket}': {reason}")]
    InvalidView {
        bucket: String,
        view: String,
        reason: String,
    },
    #[error("Invalid model path: {0}")]
    InvalidPath(#[from] PathError),
}
