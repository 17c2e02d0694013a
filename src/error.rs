use std::fmt;

use crate::config::ConfigError;
use crate::graph::GraphError;
use crate::logging::LoggingError;
use crate::path::PathError;
use crate::schema::types::SchemaError;
use crate::view::ViewError;

/// Unified error type of the crate.
///
/// Each engine has its own error enum; this one wraps them for callers that drive
/// several engines and want a single `?`-friendly type.
#[derive(Debug)]
pub enum BucketViewError {
    /// Path resolution or copy failed
    Path(PathError),

    /// Graph link resolution failed
    Graph(GraphError),

    /// View projection failed
    View(ViewError),

    /// Schema validation found a problem
    Schema(SchemaError),

    /// Configuration could not be loaded or is invalid
    Config(ConfigError),

    Logging(LoggingError),
}

impl BucketViewError {
    /// The path engine error behind this failure, if any.
    pub fn path_error(&self) -> Option<&PathError> {
        match self {
            Self::Path(err) | Self::Graph(GraphError::Path(err)) => Some(err),
            Self::View(err) => err.path_error(),
            Self::Schema(SchemaError::InvalidPath(err)) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for BucketViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(err) => write!(f, "Path error: {}", err),
            Self::Graph(err) => write!(f, "Graph error: {}", err),
            Self::View(err) => write!(f, "View error: {}", err),
            Self::Schema(err) => write!(f, "Schema error: {}", err),
            Self::Config(err) => write!(f, "Configuration error: {}", err),
            Self::Logging(err) => write!(f, "Logging error: {}", err),
        }
    }
}

impl std::error::Error for BucketViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Path(err) => Some(err),
            Self::Graph(err) => Some(err),
            Self::View(err) => Some(err),
            Self::Schema(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
        }
    }
}

impl From<PathError> for BucketViewError {
    fn from(error: PathError) -> Self {
        BucketViewError::Path(error)
    }
}

impl From<GraphError> for BucketViewError {
    fn from(error: GraphError) -> Self {
        BucketViewError::Graph(error)
    }
}

impl From<ViewError> for BucketViewError {
    fn from(error: ViewError) -> Self {
        BucketViewError::View(error)
    }
}

impl From<SchemaError> for BucketViewError {
    fn from(error: SchemaError) -> Self {
        BucketViewError::Schema(error)
    }
}

impl From<ConfigError> for BucketViewError {
    fn from(error: ConfigError) -> Self {
        BucketViewError::Config(error)
    }
}

impl From<LoggingError> for BucketViewError {
    fn from(error: LoggingError) -> Self {
        BucketViewError::Logging(error)
    }
}

pub type BucketViewResult<T> = Result<T, BucketViewError>;
