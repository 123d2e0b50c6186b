//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while validating, computing and
//! committing a payroll run.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::PeriodStatus;
use crate::store::StoreError;

/// The main error type for the payroll engine.
///
/// Request-time validation errors (`PeriodNotFound`, `InvalidState`) are
/// returned synchronously by the coordinator. Everything raised during a
/// run is classified by the runner as either fatal or employee-scoped.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::PeriodNotFound { period_id: 7 };
/// assert_eq!(error.to_string(), "Period not found: 7");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but holds an unusable value.
    #[error("Invalid configuration value '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// The requested period does not exist (or was deleted).
    #[error("Period not found: {period_id}")]
    PeriodNotFound {
        /// The period that was requested.
        period_id: u64,
    },

    /// The period is not in a state that allows the requested operation.
    #[error("Period {period_id} is {status}, expected {expected}")]
    InvalidState {
        /// The period that was requested.
        period_id: u64,
        /// The status the period was found in.
        status: PeriodStatus,
        /// The status the operation requires.
        expected: PeriodStatus,
    },

    /// An employee referenced by the run does not exist.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The missing employee.
        employee_id: u64,
    },

    /// An employee record was invalid or contained inconsistent data.
    #[error("Invalid employee {employee_id} field '{field}': {message}")]
    InvalidEmployee {
        /// The employee the record belongs to.
        employee_id: u64,
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The period contains no weekdays, so no daily rate can be derived.
    #[error("Period {start} to {end} contains no payable days")]
    NoPayableDays {
        /// First day of the period.
        start: NaiveDate,
        /// Last day of the period.
        end: NaiveDate,
    },

    /// The employee cursor was handed an id at or below its position.
    #[error("Employee page regressed: id {id} is not after cursor position {last_seen}")]
    CursorRegression {
        /// The offending id.
        id: u64,
        /// The cursor position when the page was read.
        last_seen: u64,
    },

    /// No queue slot is free for another run.
    #[error("Run queue is full ({capacity} pending jobs)")]
    QueueFull {
        /// The configured queue capacity.
        capacity: usize,
    },

    /// The worker pool has shut down and accepts no more runs.
    #[error("Worker pool is closed")]
    WorkerPoolClosed,

    /// A run task panicked or was aborted before reporting.
    #[error("Payroll job '{job_id}' crashed: {message}")]
    JobCrashed {
        /// The job that crashed.
        job_id: String,
        /// What the runtime reported.
        message: String,
    },

    /// A storage operation failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
