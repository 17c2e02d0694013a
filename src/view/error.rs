use crate::graph::GraphError;
use crate::path::PathError;

/// Errors raised while building a view.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Bucket '{bucket}' has no view '{view}'")]
    ViewNotFound { bucket: String, view: String },

    #[error("Bucket '{0}' is not registered")]
    BucketNotFound(String),

    /// The view definition itself is unusable (cycles, collisions, bad modifiers)
    #[error("Invalid view '{view}': {reason}")]
    InvalidView { view: String, reason: String },
}

impl ViewError {
    pub fn invalid(view: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidView {
            view: view.into(),
            reason: reason.into(),
        }
    }

    /// The path engine error behind this failure, if any.
    pub fn path_error(&self) -> Option<&PathError> {
        match self {
            ViewError::Path(e) | ViewError::Graph(GraphError::Path(e)) => Some(e),
            _ => None,
        }
    }
}

pub type ViewResult<T> = Result<T, ViewError>;
