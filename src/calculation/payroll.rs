//! Per-employee payroll computation.
//!
//! [`compute_payroll`] turns one employee's facts for a period into a
//! [`PayrollComputation`]. It performs no I/O and, since all arithmetic is
//! exact decimal math, is reproducible for identical inputs.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::overtime::calculate_overtime_pay;
use super::payable_days::payable_days;
use super::reimbursement::calculate_reimbursements;
use super::working_days::count_working_days;
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceFact, Employee, OvertimeFact, PayrollComputation, ReimbursementFact};

/// Standard hours in one working day.
pub const DEFAULT_HOURS_PER_DAY: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Multiple of the hourly rate paid for overtime.
pub const DEFAULT_OVERTIME_MULTIPLIER: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

/// Decimal places kept on persisted money amounts.
pub const DEFAULT_MONEY_SCALE: u32 = 2;

/// Tunable constants of the pay formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationPolicy {
    /// Divisor turning a daily rate into an hourly rate.
    pub hours_per_day: Decimal,
    /// Multiple of the hourly rate paid per overtime hour.
    pub overtime_multiplier: Decimal,
    /// Decimal places money amounts are rounded to.
    pub money_scale: u32,
}

impl Default for CalculationPolicy {
    fn default() -> Self {
        Self {
            hours_per_day: DEFAULT_HOURS_PER_DAY,
            overtime_multiplier: DEFAULT_OVERTIME_MULTIPLIER,
            money_scale: DEFAULT_MONEY_SCALE,
        }
    }
}

/// The facts gathered for one employee over one period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFacts {
    /// Check-ins on the period's payable days.
    pub attendance: Vec<AttendanceFact>,
    /// Overtime recorded within the period.
    pub overtime: Vec<OvertimeFact>,
    /// Reimbursements filed within the period.
    pub reimbursements: Vec<ReimbursementFact>,
}

/// Rounds a money amount half away from zero.
pub(crate) fn round_money(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// Sums `amounts`, failing with `CalculationError` instead of overflowing.
pub(crate) fn checked_total(
    amounts: impl IntoIterator<Item = Decimal>,
    what: &str,
) -> EngineResult<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("{what} overflow"),
        })
}

/// Computes one employee's payroll over `[start, end]`.
///
/// 1. Every weekday in the period is a payable day.
/// 2. A payable day is worked if the employee checked in on it.
/// 3. `daily_rate = salary / payable days`; `base = daily_rate * worked days`.
/// 4. Overtime pays `hours * (daily_rate / hours_per_day) * overtime_multiplier`.
/// 5. Reimbursements are paid at face value.
/// 6. `take_home_pay = base + overtime + reimbursements`.
///
/// Facts dated outside the period are ignored.
///
/// # Errors
///
/// - [`EngineError::NoPayableDays`] if the period has no weekday.
/// - [`EngineError::InvalidEmployee`] if the salary is negative.
/// - [`EngineError::CalculationError`] if the policy is unusable or the
///   arithmetic overflows.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{CalculationPolicy, EmployeeFacts, compute_payroll};
/// use payroll_engine::models::{Employee, Role};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     id: 7,
///     username: "dewi".to_string(),
///     salary: Decimal::from(2_200_000),
///     role: Role::Employee,
/// };
/// let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
///
/// let result = compute_payroll(
///     &employee,
///     start,
///     end,
///     &EmployeeFacts::default(),
///     &CalculationPolicy::default(),
/// )?;
/// assert_eq!(result.daily_rate, Decimal::from(100_000));
/// assert_eq!(result.take_home_pay, Decimal::ZERO);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub fn compute_payroll(
    employee: &Employee,
    start: NaiveDate,
    end: NaiveDate,
    facts: &EmployeeFacts,
    policy: &CalculationPolicy,
) -> EngineResult<PayrollComputation> {
    if employee.salary < Decimal::ZERO {
        return Err(EngineError::InvalidEmployee {
            employee_id: employee.id,
            field: "salary".to_string(),
            message: format!("cannot be negative (got {})", employee.salary),
        });
    }
    if policy.hours_per_day <= Decimal::ZERO {
        return Err(EngineError::CalculationError {
            message: format!("hours_per_day must be positive (got {})", policy.hours_per_day),
        });
    }

    let days = payable_days(start, end);
    if days.is_empty() {
        return Err(EngineError::NoPayableDays { start, end });
    }

    let working = count_working_days(&days, &facts.attendance);

    let daily_rate = employee
        .salary
        .checked_div(Decimal::from(working.pay_day_count))
        .ok_or_else(|| EngineError::CalculationError {
            message: format!(
                "daily rate overflow for employee {} ({} / {})",
                employee.id, employee.salary, working.pay_day_count
            ),
        })?;

    let base_amount = daily_rate
        .checked_mul(Decimal::from(working.total_working_days))
        .map(|amount| round_money(amount, policy.money_scale))
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("base amount overflow for employee {}", employee.id),
        })?;

    let overtime = calculate_overtime_pay(&facts.overtime, daily_rate, start, end, policy)?;
    let reimbursements =
        calculate_reimbursements(&facts.reimbursements, start, end, policy.money_scale)?;

    let take_home_pay = checked_total(
        [base_amount, overtime.amount, reimbursements.amount],
        &format!("take-home pay for employee {}", employee.id),
    )?;

    Ok(PayrollComputation {
        employee_id: employee.id,
        pay_day_count: working.pay_day_count,
        daily_rate: round_money(daily_rate, policy.money_scale),
        total_working_days: working.total_working_days,
        base_amount,
        overtime_breakdown: overtime.entries,
        overtime_amount: overtime.amount,
        reimbursement_breakdown: reimbursements.entries,
        reimbursement_amount: reimbursements.amount,
        take_home_pay,
    })
}
