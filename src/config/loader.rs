//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::EngineConfig;

/// Loads and provides access to the engine configuration.
///
/// # File Layout
///
/// ```text
/// batch:
///   page_size: 50
/// workers:
///   count: 2
///   queue_capacity: 16
/// calculation:
///   hours_per_day: 8
///   overtime_multiplier: 2
///   money_scale: 2
/// logging:
///   level: info
///   format: pretty
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/payroll.yaml")?;
/// println!("Page size: {}", loader.config().batch.page_size);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads and validates configuration from a YAML file.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - The file is missing (`ConfigNotFound`)
    /// - The file contains invalid YAML (`ConfigParseError`)
    /// - A value is out of range (`InvalidConfig`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let config = Self::load_yaml::<EngineConfig>(path.as_ref())?;
        config.validate()?;
        Ok(Self { config })
    }

    /// Parses and validates configuration held in memory.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::from_yaml_str("batch:\n  page_size: 10\n")?;
    /// assert_eq!(loader.config().batch.page_size, 10);
    /// assert_eq!(loader.config().workers.count, 2);
    /// # Ok::<(), payroll_engine::error::EngineError>(())
    /// ```
    pub fn from_yaml_str(content: &str) -> EngineResult<Self> {
        let config: EngineConfig =
            serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }
}
