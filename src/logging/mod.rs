//! # Logging
//!
//! `log` facade with one target per engine (see [`features`]), installed through
//! `env_logger`. The active configuration is kept globally once initialized.

pub mod config;
pub mod features;

use config::LogConfig;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio::sync::RwLock;

pub use features::LogFeature;

/// Global logging configuration instance
static LOGGING_CONFIG: OnceCell<Arc<RwLock<LogConfig>>> = OnceCell::new();

pub struct LoggingSystem;

impl LoggingSystem {
    /// Initialize the logging system with default configuration
    pub async fn init_default() -> Result<(), LoggingError> {
        Self::init_with_config(LogConfig::default()).await
    }

    /// Initialize the logging system with a custom configuration
    pub async fn init_with_config(config: LogConfig) -> Result<(), LoggingError> {
        config
            .validate()
            .map_err(|e| LoggingError::Config(e.to_string()))?;

        let default_level = config.default_filter();
        let mut builder = env_logger::Builder::new();
        builder.filter_level(default_level);
        let mut max_level = default_level;
        for (feature, level) in config.feature_filters() {
            builder.filter_module(feature.target(), level);
            max_level = max_level.max(level);
        }
        builder.write_style(if config.enable_colors {
            env_logger::WriteStyle::Auto
        } else {
            env_logger::WriteStyle::Never
        });

        LOGGING_CONFIG
            .set(Arc::new(RwLock::new(config)))
            .map_err(|_| LoggingError::AlreadyInitialized)?;

        // Another logger may already be installed by the host application.
        if builder.try_init().is_err() {
            log::debug!("A global logger is already installed; keeping it");
        }
        log::set_max_level(max_level);
        Ok(())
    }

    pub fn is_initialized() -> bool {
        LOGGING_CONFIG.get().is_some()
    }

    /// Get the global logging configuration
    pub async fn get_config() -> Option<LogConfig> {
        match LOGGING_CONFIG.get() {
            Some(config) => Some(config.read().await.clone()),
            None => None,
        }
    }

    /// Record a new level for one feature and raise the global max level if needed.
    pub async fn update_feature_level(feature: LogFeature, level: &str) -> Result<(), LoggingError> {
        let filter = config::parse_level(level)
            .ok_or_else(|| LoggingError::Config(format!("Invalid log level: {}", level)))?;
        let config = LOGGING_CONFIG
            .get()
            .ok_or_else(|| LoggingError::Config("Logging system not initialized".to_string()))?;

        let mut guard = config.write().await;
        guard
            .features
            .insert(feature.name().to_string(), level.to_string());
        if filter > log::max_level() {
            log::set_max_level(filter);
        }
        Ok(())
    }
}

/// Logging system errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Logging system already initialized")]
    AlreadyInitialized,
    #[error("Configuration error: {0}")]
    Config(String),
}
