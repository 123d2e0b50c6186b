//! Configuration loading and management for the payroll engine.
//!
//! This module loads the engine configuration from a YAML file: employee
//! page size, worker pool sizing, pay formula constants and logging.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/payroll.yaml").unwrap();
//! println!("Workers: {}", config.config().workers.count);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{BatchConfig, EngineConfig, LogFormat, LoggingConfig, WorkerConfig};
