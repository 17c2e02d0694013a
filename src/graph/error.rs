use crate::path::PathError;

/// Errors raised while resolving graph links.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("Bucket '{bucket}' has no graph link '{link}'")]
    LinkNotFound { bucket: String, link: String },

    /// The loader failed to fetch from `bucket`
    #[error("Loader failed for bucket '{bucket}': {reason}")]
    Loader { bucket: String, reason: String },

    /// A condition path could not be resolved on the source record
    #[error(transparent)]
    Path(#[from] PathError),
}

impl GraphError {
    pub fn link_not_found(bucket: impl Into<String>, link: impl Into<String>) -> Self {
        Self::LinkNotFound {
            bucket: bucket.into(),
            link: link.into(),
        }
    }
}

pub type GraphResult<T> = Result<T, GraphError>;
