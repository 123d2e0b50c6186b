//! Payroll period model and its status transitions.
//!
//! A [`Period`] is only mutated by a payroll run, and only through one of the
//! narrow transition structs in this module. Each transition names the status
//! it expects to find, which lets stores apply it as a compare-and-swap.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a payroll period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    /// Open for attendance and accepting a payroll run.
    Active,
    /// A run has been accepted and is executing in the background.
    Processing,
    /// The last run committed its payroll lines.
    Completed,
    /// The last run hit a fatal error and was rolled back.
    Failed,
    /// Soft-deleted by the surrounding CRUD module.
    Deleted,
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PeriodStatus::Active => "active",
            PeriodStatus::Processing => "processing",
            PeriodStatus::Completed => "completed",
            PeriodStatus::Failed => "failed",
            PeriodStatus::Deleted => "deleted",
        };
        f.write_str(name)
    }
}

/// A closed date range that payroll is computed for.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{Period, PeriodStatus};
/// use chrono::NaiveDate;
///
/// let period = Period {
///     id: 1,
///     code: "PRD-2026-01".to_string(),
///     name: "January 2026".to_string(),
///     start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
///     status: PeriodStatus::Active,
///     executed_by: None,
///     executed_at: None,
/// };
///
/// assert!(period.is_runnable());
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Unique identifier for the period.
    pub id: u64,
    /// Short unique code (e.g. "PRD-2026-01").
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// First day of the period (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the period (inclusive).
    pub end_date: NaiveDate,
    /// Current lifecycle status.
    pub status: PeriodStatus,
    /// The user who triggered the most recent run.
    pub executed_by: Option<u64>,
    /// When the most recent run was triggered.
    pub executed_at: Option<DateTime<Utc>>,
}

impl Period {
    /// Checks if a date falls within the period, inclusive of both ends.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// A run may only start from `active`.
    pub fn is_runnable(&self) -> bool {
        self.status == PeriodStatus::Active
    }

    /// Deleted periods are invisible to the engine.
    pub fn is_deleted(&self) -> bool {
        self.status == PeriodStatus::Deleted
    }
}

/// Accept a run: `active → processing`, stamping who ran it and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkProcessing {
    /// The user who triggered the run.
    pub executed_by: u64,
    /// When the run was accepted.
    pub executed_at: DateTime<Utc>,
}

/// Finish a run successfully: `processing → completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkCompleted {}

/// Abandon a run: `processing → failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkFailed {}

/// One of the status transitions a payroll run may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodTransition {
    /// See [`MarkProcessing`].
    Processing(MarkProcessing),
    /// See [`MarkCompleted`].
    Completed(MarkCompleted),
    /// See [`MarkFailed`].
    Failed(MarkFailed),
}

impl PeriodTransition {
    /// The status the period must currently hold for the transition to apply.
    pub fn expected_status(&self) -> PeriodStatus {
        match self {
            PeriodTransition::Processing(_) => PeriodStatus::Active,
            PeriodTransition::Completed(_) | PeriodTransition::Failed(_) => {
                PeriodStatus::Processing
            }
        }
    }

    /// The status the period holds afterwards.
    pub fn target_status(&self) -> PeriodStatus {
        match self {
            PeriodTransition::Processing(_) => PeriodStatus::Processing,
            PeriodTransition::Completed(_) => PeriodStatus::Completed,
            PeriodTransition::Failed(_) => PeriodStatus::Failed,
        }
    }

    /// Applies the transition if the period is in the expected status.
    ///
    /// Returns `false` and leaves the period untouched otherwise.
    pub fn apply(&self, period: &mut Period) -> bool {
        if period.status != self.expected_status() {
            return false;
        }
        period.status = self.target_status();
        if let PeriodTransition::Processing(mark) = self {
            period.executed_by = Some(mark.executed_by);
            period.executed_at = Some(mark.executed_at);
        }
        true
    }
}

impl From<MarkProcessing> for PeriodTransition {
    fn from(mark: MarkProcessing) -> Self {
        PeriodTransition::Processing(mark)
    }
}

impl From<MarkCompleted> for PeriodTransition {
    fn from(mark: MarkCompleted) -> Self {
        PeriodTransition::Completed(mark)
    }
}

impl From<MarkFailed> for PeriodTransition {
    fn from(mark: MarkFailed) -> Self {
        PeriodTransition::Failed(mark)
    }
}
