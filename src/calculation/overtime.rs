//! Overtime pricing.
//!
//! Overtime is paid per recorded fact at a multiple of the employee's hourly
//! rate, where the hourly rate is the daily rate spread over a standard day.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payroll::{CalculationPolicy, checked_total, round_money};
use crate::error::{EngineError, EngineResult};
use crate::models::{OvertimeEntry, OvertimeFact};

/// The result of pricing an employee's overtime facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimePayResult {
    /// `daily_rate / hours_per_day`, unrounded.
    pub hourly_rate: Decimal,
    /// One entry per fact in range, in input order.
    pub entries: Vec<OvertimeEntry>,
    /// Sum of the rounded entry amounts.
    pub amount: Decimal,
}

/// Prices every overtime fact dated within `[start, end]`.
///
/// Each entry is `hours * hourly_rate * overtime_multiplier`, rounded to the
/// policy's money scale.
///
/// # Errors
///
/// [`EngineError::CalculationError`] if `hours_per_day` is zero or any
/// amount overflows.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{CalculationPolicy, calculate_overtime_pay};
/// use payroll_engine::models::OvertimeFact;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
/// let facts = vec![OvertimeFact {
///     id: 1,
///     employee_id: 7,
///     date: NaiveDate::from_ymd_opt(2026, 1, 14).unwrap(),
///     hours: Decimal::from(2),
/// }];
///
/// let result = calculate_overtime_pay(
///     &facts,
///     Decimal::from(100_000),
///     start,
///     end,
///     &CalculationPolicy::default(),
/// )?;
/// assert_eq!(result.hourly_rate, Decimal::from(12_500));
/// assert_eq!(result.amount, Decimal::from(50_000));
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub fn calculate_overtime_pay(
    facts: &[OvertimeFact],
    daily_rate: Decimal,
    start: NaiveDate,
    end: NaiveDate,
    policy: &CalculationPolicy,
) -> EngineResult<OvertimePayResult> {
    let hourly_rate = daily_rate.checked_div(policy.hours_per_day).ok_or_else(|| {
        EngineError::CalculationError {
            message: format!(
                "hourly rate undefined ({daily_rate} / {})",
                policy.hours_per_day
            ),
        }
    })?;

    let entries = facts
        .iter()
        .filter(|fact| fact.date >= start && fact.date <= end)
        .map(|fact| {
            let amount = fact
                .hours
                .checked_mul(hourly_rate)
                .and_then(|amount| amount.checked_mul(policy.overtime_multiplier))
                .ok_or_else(|| EngineError::CalculationError {
                    message: format!("overtime amount overflow for fact {}", fact.id),
                })?;
            Ok(OvertimeEntry {
                id: fact.id,
                date: fact.date,
                hours: fact.hours,
                amount: round_money(amount, policy.money_scale),
            })
        })
        .collect::<EngineResult<Vec<OvertimeEntry>>>()?;

    let amount = checked_total(entries.iter().map(|entry| entry.amount), "overtime total")?;

    Ok(OvertimePayResult {
        hourly_rate,
        entries,
        amount,
    })
}
