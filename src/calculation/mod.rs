//! Calculation logic for the payroll engine.
//!
//! This module contains the pure functions that price one employee's facts
//! over a period: payable day detection, working day counting, overtime
//! pricing, reimbursement collection and the [`compute_payroll`] pipeline that
//! combines them. [`summarize_period`] aggregates the persisted result.
//!
//! Nothing in here performs I/O.

mod overtime;
mod payable_days;
mod payroll;
mod reimbursement;
mod summary;
mod working_days;

pub use overtime::{OvertimePayResult, calculate_overtime_pay};
pub use payable_days::{DayType, get_day_type, is_payable_day, payable_days};
pub use payroll::{
    CalculationPolicy, DEFAULT_HOURS_PER_DAY, DEFAULT_MONEY_SCALE, DEFAULT_OVERTIME_MULTIPLIER,
    EmployeeFacts, compute_payroll,
};
pub use reimbursement::{ReimbursementPayResult, calculate_reimbursements};
pub use summary::summarize_period;
pub use working_days::{WorkingDaysResult, count_working_days};
