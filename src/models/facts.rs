//! Immutable attendance, overtime and reimbursement facts.
//!
//! Facts are recorded independently by the surrounding application and are
//! only ever read by the engine.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A check-in (and optional check-out) recorded for one employee.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AttendanceFact;
/// use chrono::NaiveDate;
///
/// let fact = AttendanceFact {
///     id: 1,
///     employee_id: 7,
///     check_in_date: NaiveDate::from_ymd_opt(2026, 1, 13).unwrap().and_hms_opt(8, 2, 0).unwrap(),
///     check_out_date: None,
/// };
/// assert_eq!(fact.work_date(), NaiveDate::from_ymd_opt(2026, 1, 13).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceFact {
    /// Unique identifier for the record.
    pub id: u64,
    /// The employee who checked in.
    pub employee_id: u64,
    /// When the employee checked in.
    pub check_in_date: NaiveDateTime,
    /// When the employee checked out, if they have.
    #[serde(default)]
    pub check_out_date: Option<NaiveDateTime>,
}

impl AttendanceFact {
    /// The calendar day this check-in counts towards.
    pub fn work_date(&self) -> NaiveDate {
        self.check_in_date.date()
    }
}

/// Overtime hours recorded for one employee on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeFact {
    /// Unique identifier for the record.
    pub id: u64,
    /// The employee who worked the overtime.
    pub employee_id: u64,
    /// The day the overtime was worked.
    pub date: NaiveDate,
    /// Hours worked; capped per day by the recording module.
    pub hours: Decimal,
}

/// An expense claim to be paid back with the period's payroll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReimbursementFact {
    /// Unique identifier for the record.
    pub id: u64,
    /// The employee who filed the claim.
    pub employee_id: u64,
    /// The day the expense was incurred.
    pub date: NaiveDate,
    /// Short title of the claim.
    pub title: String,
    /// Amount to reimburse.
    pub amount: Decimal,
    /// Free-form notes.
    #[serde(default)]
    pub description: Option<String>,
}
