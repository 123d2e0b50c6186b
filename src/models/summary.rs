//! Per-period payroll summary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PeriodStatus;

/// One employee's row in a [`PeriodSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    /// 1-based position in the summary.
    pub no: usize,
    /// The employee paid.
    pub employee_id: u64,
    /// Payable days with a check-in.
    pub total_working_days: u32,
    /// Net amount paid.
    pub take_home_pay: Decimal,
}

/// Totals over every payroll line persisted for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// The summarized period.
    pub period_id: u64,
    /// Its human-readable name.
    pub period_name: String,
    /// The period's status when the summary was taken.
    pub status: PeriodStatus,
    /// Number of employees with a line.
    pub total_employees: usize,
    /// Highest number of days worked by any employee.
    pub total_working_days: u32,
    /// Sum of every employee's take-home pay.
    pub total_take_home_pay: Decimal,
    /// Per-employee rows ordered by employee id.
    pub employees: Vec<SummaryEntry>,
}
