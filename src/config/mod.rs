//! Engine configuration
//!
//! Loaded from TOML; every section is optional and falls back to defaults. A few
//! settings can be overridden from the environment:
//!
//! * `BUCKETVIEW_LOG_LEVEL`: default log level
//! * `BUCKETVIEW_LOG_FEATURE_<NAME>`: level of one logging feature
//! * `BUCKETVIEW_MAX_CONCURRENT_FETCHES`: loader calls in flight during a batch prefetch

pub mod error;

pub use error::{ConfigError, ConfigResult};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::graph::DEFAULT_MAX_CONCURRENT_FETCHES;
use crate::logging::config::LogConfig;
use crate::view::DEFAULT_VIEW_MARKER;

pub const ENV_LOG_LEVEL: &str = "BUCKETVIEW_LOG_LEVEL";
pub const ENV_LOG_FEATURE_PREFIX: &str = "BUCKETVIEW_LOG_FEATURE_";
pub const ENV_MAX_CONCURRENT_FETCHES: &str = "BUCKETVIEW_MAX_CONCURRENT_FETCHES";

/// `[view]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Canonicalize special scalars in build output by default
    pub serialize: bool,
    /// Key of the view marker in projected objects
    pub view_marker: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            serialize: false,
            view_marker: DEFAULT_VIEW_MARKER.to_string(),
        }
    }
}

/// `[graph]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub max_concurrent_fetches: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub view: ViewConfig,
    pub graph: GraphConfig,
    pub logging: LogConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text (no environment overrides)
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = self.to_toml_string()?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.view.view_marker.is_empty() {
            return Err(ConfigError::validation("view.view_marker must not be empty"));
        }
        if self.graph.max_concurrent_fetches == 0 {
            return Err(ConfigError::validation(
                "graph.max_concurrent_fetches must be at least 1",
            ));
        }
        self.logging.validate()
    }

    /// Apply environment variable overrides to the configuration
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        let vars: Vec<(String, String)> = std::env::vars().collect();
        self.apply_overrides_from(&vars)
    }

    /// Same as [`EngineConfig::apply_env_overrides`] with explicit variables.
    pub fn apply_overrides_from(&mut self, vars: &[(String, String)]) -> ConfigResult<()> {
        for (key, value) in vars {
            if key == ENV_LOG_LEVEL {
                self.logging.default_level = value.clone();
            } else if key == ENV_MAX_CONCURRENT_FETCHES {
                self.graph.max_concurrent_fetches = value.parse().map_err(|_| {
                    ConfigError::validation(format!(
                        "{} must be a positive integer, found '{}'",
                        ENV_MAX_CONCURRENT_FETCHES, value
                    ))
                })?;
            } else if let Some(feature) = key.strip_prefix(ENV_LOG_FEATURE_PREFIX) {
                self.logging
                    .features
                    .insert(feature.to_lowercase(), value.clone());
            }
        }
        Ok(())
    }
}
