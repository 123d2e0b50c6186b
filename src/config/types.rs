//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML configuration file. Every section and
//! field is optional in the file and falls back to its default.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::batch::DEFAULT_PAGE_SIZE;
use crate::calculation::CalculationPolicy;
use crate::error::{EngineError, EngineResult};

/// Employee pagination settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Employees computed and inserted per page.
    pub page_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of runs that may execute at once.
    pub count: usize,
    /// Number of accepted runs that may wait for a worker.
    pub queue_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            count: 2,
            queue_capacity: 16,
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// The complete engine configuration.
///
/// # Example
///
/// ```
/// use payroll_engine::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.batch.page_size, 50);
/// assert_eq!(config.workers.count, 2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Employee pagination.
    pub batch: BatchConfig,
    /// Worker pool.
    pub workers: WorkerConfig,
    /// Pay formula constants.
    pub calculation: CalculationPolicy,
    /// Logging.
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> EngineResult<()> {
        if self.batch.page_size == 0 {
            return Err(invalid("batch.page_size", "must be at least 1"));
        }
        if self.workers.count == 0 {
            return Err(invalid("workers.count", "must be at least 1"));
        }
        if self.workers.queue_capacity == 0 {
            return Err(invalid("workers.queue_capacity", "must be at least 1"));
        }
        if self.calculation.hours_per_day <= Decimal::ZERO {
            return Err(invalid("calculation.hours_per_day", "must be positive"));
        }
        if self.calculation.overtime_multiplier < Decimal::ZERO {
            return Err(invalid(
                "calculation.overtime_multiplier",
                "cannot be negative",
            ));
        }
        if self.calculation.money_scale > 28 {
            return Err(invalid("calculation.money_scale", "cannot exceed 28"));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> EngineError {
    EngineError::InvalidConfig {
        field: field.to_string(),
        message: message.to_string(),
    }
}
