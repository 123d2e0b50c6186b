//! Working day counting from attendance facts.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::models::AttendanceFact;

/// Payable and worked day counts for one employee over one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingDaysResult {
    /// Weekdays in the period.
    pub pay_day_count: u32,
    /// Weekdays in the period with at least one check-in.
    pub total_working_days: u32,
}

/// Counts how many of `payable_days` have a check-in.
///
/// A day counts once however many check-ins it holds. Check-ins on days not
/// in `payable_days` (weekends, or outside the period) are ignored.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{count_working_days, payable_days};
/// use payroll_engine::models::AttendanceFact;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2026, 1, 12).unwrap();
/// let end = NaiveDate::from_ymd_opt(2026, 1, 18).unwrap();
/// let attendance = vec![AttendanceFact {
///     id: 1,
///     employee_id: 7,
///     check_in_date: start.and_hms_opt(8, 0, 0).unwrap(),
///     check_out_date: None,
/// }];
///
/// let result = count_working_days(&payable_days(start, end), &attendance);
/// assert_eq!(result.pay_day_count, 5);
/// assert_eq!(result.total_working_days, 1);
/// ```
pub fn count_working_days(
    payable_days: &[NaiveDate],
    attendance: &[AttendanceFact],
) -> WorkingDaysResult {
    let checked_in: BTreeSet<NaiveDate> = attendance.iter().map(AttendanceFact::work_date).collect();

    let total_working_days = payable_days
        .iter()
        .filter(|day| checked_in.contains(day))
        .count();

    WorkingDaysResult {
        pay_day_count: payable_days.len() as u32,
        total_working_days: total_working_days as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::payable_days;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn check_in(id: u64, day: NaiveDate, hour: u32) -> AttendanceFact {
        AttendanceFact {
            id,
            employee_id: 1,
            check_in_date: day.and_hms_opt(hour, 0, 0).unwrap(),
            check_out_date: Some(day.and_hms_opt(17, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_no_attendance_counts_zero() {
        let days = payable_days(date(2026, 1, 12), date(2026, 1, 16));
        let result = count_working_days(&days, &[]);
        assert_eq!(result.pay_day_count, 5);
        assert_eq!(result.total_working_days, 0);
    }

    #[test]
    fn test_weekend_check_in_is_ignored() {
        let days = payable_days(date(2026, 1, 12), date(2026, 1, 18));
        let attendance = vec![check_in(1, date(2026, 1, 17), 9)];
        assert_eq!(count_working_days(&days, &attendance).total_working_days, 0);
    }

    #[test]
    fn test_duplicate_check_ins_count_once() {
        let days = payable_days(date(2026, 1, 12), date(2026, 1, 16));
        let attendance = vec![
            check_in(1, date(2026, 1, 13), 8),
            check_in(2, date(2026, 1, 13), 13),
        ];
        assert_eq!(count_working_days(&days, &attendance).total_working_days, 1);
    }

    #[test]
    fn test_check_in_outside_period_is_ignored() {
        let days = payable_days(date(2026, 1, 12), date(2026, 1, 16));
        let attendance = vec![
            check_in(1, date(2026, 1, 9), 8),
            check_in(2, date(2026, 1, 19), 8),
            check_in(3, date(2026, 1, 14), 8),
        ];
        assert_eq!(count_working_days(&days, &attendance).total_working_days, 1);
    }
}
