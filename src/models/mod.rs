//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod employee;
mod facts;
mod payroll_line;
mod period;
mod summary;

pub use employee::{Employee, Role};
pub use facts::{AttendanceFact, OvertimeFact, ReimbursementFact};
pub use payroll_line::{OvertimeEntry, PayrollComputation, PayrollLine, ReimbursementEntry};
pub use period::{
    MarkCompleted, MarkFailed, MarkProcessing, Period, PeriodStatus, PeriodTransition,
};
pub use summary::{PeriodSummary, SummaryEntry};
