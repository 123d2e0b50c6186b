//! Payable day detection.
//!
//! This module classifies calendar dates as weekdays or weekend days and
//! enumerates the payable days (Monday through Friday) of a period.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Represents the type of day for pay purposes.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{DayType, get_day_type};
/// use chrono::NaiveDate;
///
/// // 2026-01-17 is a Saturday
/// let saturday = NaiveDate::from_ymd_opt(2026, 1, 17).unwrap();
/// assert_eq!(get_day_type(saturday), DayType::Saturday);
///
/// // 2026-01-12 is a Monday
/// let monday = NaiveDate::from_ymd_opt(2026, 1, 12).unwrap();
/// assert_eq!(get_day_type(monday), DayType::Weekday);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    /// Monday through Friday, a payable day.
    Weekday,
    /// Saturday.
    Saturday,
    /// Sunday.
    Sunday,
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayType::Weekday => write!(f, "Weekday"),
            DayType::Saturday => write!(f, "Saturday"),
            DayType::Sunday => write!(f, "Sunday"),
        }
    }
}

/// Determines the day type for a given date.
pub fn get_day_type(date: NaiveDate) -> DayType {
    match date.weekday() {
        Weekday::Sat => DayType::Saturday,
        Weekday::Sun => DayType::Sunday,
        _ => DayType::Weekday,
    }
}

/// Returns true if the date is a payable day (Monday to Friday).
pub fn is_payable_day(date: NaiveDate) -> bool {
    get_day_type(date) == DayType::Weekday
}

/// Lists every payable day in `[start, end]`, in calendar order.
///
/// Returns an empty vector if `end` is before `start`.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::payable_days;
/// use chrono::NaiveDate;
///
/// // Friday 2026-01-16 through Monday 2026-01-19
/// let days = payable_days(
///     NaiveDate::from_ymd_opt(2026, 1, 16).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 1, 19).unwrap(),
/// );
/// assert_eq!(days.len(), 2);
/// ```
pub fn payable_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|date| *date <= end)
        .filter(|date| is_payable_day(*date))
        .collect()
}
