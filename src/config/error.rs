//! Errors of [`EngineConfig`](super::EngineConfig) loading and checking.

/// Raised by `EngineConfig::from_file`/`save_to_file`, `from_toml_str` and the
/// environment overrides, and by `validate` on the loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read, or its directory or file written
    #[error("cannot access engine config file: {0}")]
    Io(#[from] std::io::Error),

    /// The text is not TOML, or a section has fields of the wrong type
    #[error("malformed engine config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("cannot render engine config as TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// A setting or an environment override is out of range (empty view marker,
    /// zero fetch concurrency, unknown log level or feature)
    #[error("invalid engine config: {0}")]
    Validation(String),
}

impl ConfigError {
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
