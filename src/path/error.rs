/// Errors raised while resolving or copying through a model schema.
///
/// Neither kind is retriable: `InvalidModelpath` is an authoring mistake in the path
/// or schema, `CorruptedData` means the stored record disagrees with its schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The path does not fit the declared schema shape
    #[error("Invalid model path '{path}': {reason}")]
    InvalidModelpath { path: String, reason: String },

    /// The record's runtime shape disagrees with the declared schema
    #[error("Corrupted data at '{path}': {reason}")]
    CorruptedData { path: String, reason: String },
}

impl PathError {
    pub fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidModelpath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn corrupted(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorruptedData {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_invalid_modelpath(&self) -> bool {
        matches!(self, Self::InvalidModelpath { .. })
    }

    pub fn is_corrupted_data(&self) -> bool {
        matches!(self, Self::CorruptedData { .. })
    }

    pub fn path(&self) -> &str {
        match self {
            Self::InvalidModelpath { path, .. } | Self::CorruptedData { path, .. } => path,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::InvalidModelpath { reason, .. } | Self::CorruptedData { reason, .. } => reason,
        }
    }
}

/// Result type for path engine operations
pub type PathResult<T> = Result<T, PathError>;
