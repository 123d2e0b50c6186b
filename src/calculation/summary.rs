//! Aggregation of a period's persisted payroll lines.

use super::payroll::checked_total;
use crate::error::EngineResult;
use crate::models::{PayrollLine, Period, PeriodSummary, SummaryEntry};

/// Summarizes the lines a run persisted for `period`.
///
/// Rows are ordered by employee id and numbered from 1. `total_working_days`
/// is the highest day count among the lines, which is the period's worked
/// span as reported on payslips.
///
/// Fails with `CalculationError` if the take-home total overflows.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::summarize_period;
/// use payroll_engine::models::{Period, PeriodStatus};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let period = Period {
///     id: 1,
///     code: "PRD-2026-01".to_string(),
///     name: "January 2026".to_string(),
///     start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
///     status: PeriodStatus::Completed,
///     executed_by: Some(1),
///     executed_at: None,
/// };
///
/// let summary = summarize_period(&period, &[])?;
/// assert_eq!(summary.total_employees, 0);
/// assert_eq!(summary.total_take_home_pay, Decimal::ZERO);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub fn summarize_period(period: &Period, lines: &[PayrollLine]) -> EngineResult<PeriodSummary> {
    let mut sorted: Vec<&PayrollLine> = lines.iter().collect();
    sorted.sort_by_key(|line| line.employee_id);

    let employees: Vec<SummaryEntry> = sorted
        .iter()
        .enumerate()
        .map(|(index, line)| SummaryEntry {
            no: index + 1,
            employee_id: line.employee_id,
            total_working_days: line.total_working_days,
            take_home_pay: line.take_home_pay,
        })
        .collect();

    let total_take_home_pay = checked_total(
        employees.iter().map(|entry| entry.take_home_pay),
        "period take-home total",
    )?;
    let total_working_days = employees
        .iter()
        .map(|entry| entry.total_working_days)
        .max()
        .unwrap_or(0);

    Ok(PeriodSummary {
        period_id: period.id,
        period_name: period.name.clone(),
        status: period.status,
        total_employees: employees.len(),
        total_working_days,
        total_take_home_pay,
        employees,
    })
}
