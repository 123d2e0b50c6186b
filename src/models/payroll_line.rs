//! Computed payroll output models.
//!
//! This module contains [`PayrollComputation`], the pure result of the
//! calculator for one employee, and [`PayrollLine`], the persisted row a run
//! writes for each employee of a period.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One overtime fact as priced by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeEntry {
    /// The overtime fact this entry prices.
    pub id: u64,
    /// The day the overtime was worked.
    pub date: NaiveDate,
    /// Hours worked.
    pub hours: Decimal,
    /// Amount paid for the hours.
    pub amount: Decimal,
}

/// One reimbursement fact as paid by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReimbursementEntry {
    /// The reimbursement fact this entry pays.
    pub id: u64,
    /// Title of the claim.
    pub title: String,
    /// The day the expense was incurred.
    pub date: NaiveDate,
    /// Amount reimbursed.
    pub amount: Decimal,
}

/// The calculator's output for one employee over one period.
///
/// Holds no identity or audit fields, so two computations over identical
/// facts compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollComputation {
    /// The employee the computation is for.
    pub employee_id: u64,
    /// Weekdays in the period.
    pub pay_day_count: u32,
    /// Salary divided by the number of payable days, rounded to the money
    /// scale for display.
    pub daily_rate: Decimal,
    /// Payable days with a check-in.
    pub total_working_days: u32,
    /// The unrounded daily rate times `total_working_days`, then rounded. May
    /// differ by a cent from the rounded `daily_rate * total_working_days`.
    pub base_amount: Decimal,
    /// Priced overtime facts.
    pub overtime_breakdown: Vec<OvertimeEntry>,
    /// Sum of the overtime entries.
    pub overtime_amount: Decimal,
    /// Paid reimbursement facts.
    pub reimbursement_breakdown: Vec<ReimbursementEntry>,
    /// Sum of the reimbursement entries.
    pub reimbursement_amount: Decimal,
    /// `base_amount + overtime_amount + reimbursement_amount`.
    pub take_home_pay: Decimal,
}

/// The persisted payroll result for one employee in one period.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{PayrollComputation, PayrollLine};
/// use chrono::Utc;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let computation = PayrollComputation {
///     employee_id: 7,
///     pay_day_count: 22,
///     daily_rate: Decimal::from(100_000),
///     total_working_days: 20,
///     base_amount: Decimal::from(2_000_000),
///     overtime_breakdown: vec![],
///     overtime_amount: Decimal::ZERO,
///     reimbursement_breakdown: vec![],
///     reimbursement_amount: Decimal::ZERO,
///     take_home_pay: Decimal::from(2_000_000),
/// };
///
/// let line = PayrollLine::from_computation(Uuid::new_v4(), 1, computation, 99, Utc::now());
/// assert_eq!(line.period_id, 1);
/// assert_eq!(line.take_home_pay, Decimal::from(2_000_000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollLine {
    /// Unique identifier for the row.
    pub id: Uuid,
    /// The period the row belongs to.
    pub period_id: u64,
    /// The employee the row pays.
    pub employee_id: u64,
    /// Salary divided by the number of payable days, rounded to the money
    /// scale. Display only: `base_amount` is derived from the unrounded rate.
    pub daily_rate: Decimal,
    /// Payable days with a check-in.
    pub total_working_days: u32,
    /// Pay for days worked.
    pub base_amount: Decimal,
    /// Priced overtime facts.
    pub overtime_breakdown: Vec<OvertimeEntry>,
    /// Total overtime pay.
    pub overtime_amount: Decimal,
    /// Paid reimbursement facts.
    pub reimbursement_breakdown: Vec<ReimbursementEntry>,
    /// Total reimbursements.
    pub reimbursement_amount: Decimal,
    /// Net amount paid to the employee.
    pub take_home_pay: Decimal,
    /// The user whose run created the row.
    pub created_by: u64,
    /// When the row was computed.
    pub created_at: DateTime<Utc>,
}

impl PayrollLine {
    /// Stamps a computation with its identity and audit fields.
    pub fn from_computation(
        id: Uuid,
        period_id: u64,
        computation: PayrollComputation,
        created_by: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            period_id,
            employee_id: computation.employee_id,
            daily_rate: computation.daily_rate,
            total_working_days: computation.total_working_days,
            base_amount: computation.base_amount,
            overtime_breakdown: computation.overtime_breakdown,
            overtime_amount: computation.overtime_amount,
            reimbursement_breakdown: computation.reimbursement_breakdown,
            reimbursement_amount: computation.reimbursement_amount,
            take_home_pay: computation.take_home_pay,
            created_by,
            created_at,
        }
    }
}
