//! Configuration for the logging system

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use super::features::LogFeature;
use crate::config::{ConfigError, ConfigResult};

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default log level for all modules
    pub default_level: String,
    /// Enable colored output
    pub enable_colors: bool,
    /// Feature-specific log levels, keyed by feature name (`path`, `graph`, ...)
    pub features: BTreeMap<String, String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: "INFO".to_string(),
            enable_colors: true,
            features: BTreeMap::new(),
        }
    }
}

/// Parses `TRACE`/`DEBUG`/`INFO`/`WARN`/`ERROR`/`OFF`, case-insensitively.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    LevelFilter::from_str(level).ok()
}

impl LogConfig {
    pub fn default_filter(&self) -> LevelFilter {
        parse_level(&self.default_level).unwrap_or(LevelFilter::Info)
    }

    /// Per-feature filters, skipping unknown features.
    pub fn feature_filters(&self) -> Vec<(LogFeature, LevelFilter)> {
        self.features
            .iter()
            .filter_map(|(name, level)| Some((LogFeature::from_name(name)?, parse_level(level)?)))
            .collect()
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if parse_level(&self.default_level).is_none() {
            return Err(ConfigError::validation(format!(
                "invalid log level '{}'",
                self.default_level
            )));
        }
        for (feature, level) in &self.features {
            if LogFeature::from_name(feature).is_none() {
                return Err(ConfigError::validation(format!(
                    "unknown logging feature '{}'",
                    feature
                )));
            }
            if parse_level(level).is_none() {
                return Err(ConfigError::validation(format!(
                    "invalid log level '{}' for feature '{}'",
                    level, feature
                )));
            }
        }
        Ok(())
    }
}
