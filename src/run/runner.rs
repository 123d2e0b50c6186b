//! Transactional execution of one payroll run.

use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::job::{RunJob, RunReport};
use crate::batch::BatchCursor;
use crate::calculation::{CalculationPolicy, EmployeeFacts, compute_payroll, payable_days};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    MarkCompleted, MarkFailed, PayrollComputation, PayrollLine, Period, PeriodStatus,
};
use crate::store::Backend;

#[derive(Debug, Default)]
struct RunProgress {
    pages: usize,
    employees_computed: usize,
    employees_skipped: usize,
    lines_written: usize,
}

/// Executes accepted runs against a [`Backend`].
///
/// A run is one transaction: prior lines of the period are deleted, every
/// eligible employee is computed page by page, each page is bulk-inserted,
/// and the period is moved to `completed` before the commit. An error for a
/// single employee skips that employee. Any other error rolls the whole
/// transaction back and marks the period `failed` in a transaction of its
/// own.
pub struct BackgroundRunner<B: Backend> {
    backend: Arc<B>,
    page_size: usize,
    policy: CalculationPolicy,
}

impl<B: Backend> BackgroundRunner<B> {
    /// Creates a runner.
    pub fn new(backend: Arc<B>, page_size: usize, policy: CalculationPolicy) -> Self {
        Self {
            backend,
            page_size,
            policy,
        }
    }

    /// The backend runs are executed against.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Runs a job to completion and reports its outcome.
    #[instrument(skip_all, fields(job_id = %job.job_id, period_id = job.period_id))]
    pub async fn execute(&self, job: RunJob) -> RunReport {
        let started = Instant::now();
        let mut progress = RunProgress::default();
        info!(initiator_id = job.initiator_id, "payroll run started");

        let outcome = self.run_in_transaction(&job, &mut progress).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let (status, error) = match outcome {
            Ok(()) => {
                info!(
                    pages = progress.pages,
                    employees_computed = progress.employees_computed,
                    employees_skipped = progress.employees_skipped,
                    duration_ms,
                    "payroll run completed"
                );
                (PeriodStatus::Completed, None)
            }
            Err(error) => {
                error!(error = %error, pages = progress.pages, duration_ms, "payroll run failed");
                self.mark_failed(job.period_id).await;
                (PeriodStatus::Failed, Some(error.to_string()))
            }
        };

        RunReport {
            job_id: job.job_id,
            period_id: job.period_id,
            status,
            pages: progress.pages,
            employees_computed: progress.employees_computed,
            employees_skipped: progress.employees_skipped,
            lines_written: progress.lines_written,
            error,
            duration_ms,
        }
    }

    /// Moves the period from `processing` to `failed` in a fresh transaction.
    ///
    /// Failures are logged, not returned: this is the last step of a run
    /// that has already failed.
    pub async fn mark_failed(&self, period_id: u64) {
        let backend = &*self.backend;
        let result = async {
            let mut tx = backend.begin().await?;
            let moved = backend
                .periods()
                .transition(&mut tx, period_id, MarkFailed {}.into())
                .await?;
            backend.commit(tx).await?;
            Ok::<bool, EngineError>(moved)
        }
        .await;

        match result {
            Ok(true) => info!(period_id, "period marked failed"),
            Ok(false) => warn!(period_id, "period was not processing; failed status not recorded"),
            Err(error) => error!(period_id, error = %error, "could not mark period failed"),
        }
    }

    async fn run_in_transaction(&self, job: &RunJob, progress: &mut RunProgress) -> EngineResult<()> {
        let backend = &*self.backend;
        let mut tx = backend.begin().await?;

        match self.process(&mut tx, job, progress).await {
            Ok(()) => {
                backend.commit(tx).await?;
                Ok(())
            }
            Err(error) => {
                if let Err(rollback_error) = backend.rollback(tx).await {
                    warn!(error = %rollback_error, "rollback failed");
                }
                Err(error)
            }
        }
    }

    async fn process(
        &self,
        tx: &mut B::Tx,
        job: &RunJob,
        progress: &mut RunProgress,
    ) -> EngineResult<()> {
        let backend = &*self.backend;

        let period = backend
            .periods()
            .get_by_id(tx, job.period_id)
            .await?
            .filter(|period| !period.is_deleted())
            .ok_or(EngineError::PeriodNotFound {
                period_id: job.period_id,
            })?;
        if period.status != PeriodStatus::Processing {
            return Err(EngineError::InvalidState {
                period_id: period.id,
                status: period.status,
                expected: PeriodStatus::Processing,
            });
        }

        let days = payable_days(period.start_date, period.end_date);
        if days.is_empty() {
            return Err(EngineError::NoPayableDays {
                start: period.start_date,
                end: period.end_date,
            });
        }

        let deleted = backend.payroll_lines().delete_by_period(tx, period.id).await?;
        if deleted > 0 {
            info!(deleted, "cleared lines of previous run");
        }

        let mut cursor = BatchCursor::new(self.page_size);
        loop {
            let page = cursor.next_page(backend.payroll_lines(), tx).await?;
            if page.is_empty() {
                break;
            }
            progress.pages += 1;

            let mut lines = Vec::with_capacity(page.len());
            for employee_id in page {
                match self.compute_employee(tx, &period, &days, employee_id).await {
                    Ok(computation) => lines.push(PayrollLine::from_computation(
                        Uuid::new_v4(),
                        period.id,
                        computation,
                        job.initiator_id,
                        Utc::now(),
                    )),
                    Err(error) => {
                        warn!(employee_id, error = %error, "skipping employee");
                        progress.employees_skipped += 1;
                    }
                }
            }

            let written = lines.len();
            if written > 0 {
                backend.payroll_lines().bulk_insert(tx, lines).await?;
            }
            progress.employees_computed += written;
            progress.lines_written += written;
            info!(
                last_id = cursor.last_seen(),
                batch_size = written,
                "persisted payroll page"
            );
        }

        let completed = backend
            .periods()
            .transition(tx, period.id, MarkCompleted {}.into())
            .await?;
        if !completed {
            let status = backend
                .periods()
                .get_by_id(tx, period.id)
                .await?
                .map(|period| period.status)
                .unwrap_or(PeriodStatus::Deleted);
            return Err(EngineError::InvalidState {
                period_id: period.id,
                status,
                expected: PeriodStatus::Processing,
            });
        }

        Ok(())
    }

    /// Gathers one employee's facts and computes their line.
    async fn compute_employee(
        &self,
        tx: &mut B::Tx,
        period: &Period,
        days: &[NaiveDate],
        employee_id: u64,
    ) -> EngineResult<PayrollComputation> {
        let backend = &*self.backend;

        let employee = backend
            .employees()
            .get_by_id(tx, employee_id)
            .await?
            .ok_or(EngineError::EmployeeNotFound { employee_id })?;

        let mut facts = EmployeeFacts::default();
        for &day in days {
            if let Some(fact) = backend
                .attendance()
                .get_by_employee_and_date(tx, employee_id, day)
                .await?
            {
                facts.attendance.push(fact);
            }
        }
        facts.overtime = backend
            .overtime()
            .get_by_employee_and_date_range(tx, employee_id, period.start_date, period.end_date)
            .await?;
        facts.reimbursements = backend
            .reimbursements()
            .get_by_employee_and_date_range(tx, employee_id, period.start_date, period.end_date)
            .await?;

        compute_payroll(
            &employee,
            period.start_date,
            period.end_date,
            &facts,
            &self.policy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceFact, Employee, OvertimeFact, ReimbursementFact, Role};
    use crate::store::MemoryBackend;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn january(status: PeriodStatus) -> Period {
        Period {
            id: 1,
            code: "PRD-2026-01".to_string(),
            name: "January 2026".to_string(),
            start_date: date(2026, 1, 1),
            end_date: date(2026, 1, 31),
            status,
            executed_by: Some(99),
            executed_at: None,
        }
    }

    async fn seed_employees(backend: &MemoryBackend, ids: &[u64]) {
        for &id in ids {
            backend
                .insert_employee(Employee {
                    id,
                    username: format!("user{id}"),
                    salary: dec("2200000"),
                    role: Role::Employee,
                })
                .await;
        }
    }

    fn runner(backend: &Arc<MemoryBackend>, page_size: usize) -> BackgroundRunner<MemoryBackend> {
        BackgroundRunner::new(backend.clone(), page_size, CalculationPolicy::default())
    }

    #[tokio::test]
    async fn test_run_computes_every_employee_and_completes() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_period(january(PeriodStatus::Processing)).await;
        seed_employees(&backend, &[1, 2, 3, 4, 5]).await;
        let weekdays = payable_days(date(2026, 1, 1), date(2026, 1, 31));
        for (index, day) in weekdays.into_iter().take(20).enumerate() {
            backend
                .insert_attendance(AttendanceFact {
                    id: index as u64 + 1,
                    employee_id: 3,
                    check_in_date: day.and_hms_opt(8, 0, 0).unwrap(),
                    check_out_date: None,
                })
                .await;
        }
        backend
            .insert_overtime(OvertimeFact {
                id: 1,
                employee_id: 3,
                date: date(2026, 1, 14),
                hours: dec("2"),
            })
            .await;
        backend
            .insert_reimbursement(ReimbursementFact {
                id: 1,
                employee_id: 3,
                date: date(2026, 1, 20),
                title: "Travel".to_string(),
                amount: dec("50000"),
                description: None,
            })
            .await;

        let report = runner(&backend, 2).execute(RunJob::new(1, 99, "t1")).await;

        assert!(report.is_success(), "{:?}", report.error);
        assert_eq!(report.pages, 3);
        assert_eq!(report.employees_computed, 5);
        assert_eq!(report.lines_written, 5);
        assert_eq!(backend.period(1).await.unwrap().status, PeriodStatus::Completed);

        let lines = backend.lines(1).await;
        assert_eq!(lines.len(), 5);
        let third = lines.iter().find(|l| l.employee_id == 3).unwrap();
        assert_eq!(third.take_home_pay, dec("2100000"));
        assert_eq!(third.created_by, 99);
    }

    #[tokio::test]
    async fn test_employee_errors_are_skipped() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_period(january(PeriodStatus::Processing)).await;
        seed_employees(&backend, &[1, 2, 3]).await;
        backend.fail_facts_for(2).await;

        let report = runner(&backend, 50).execute(RunJob::new(1, 99, "t2")).await;

        assert!(report.is_success());
        assert_eq!(report.employees_skipped, 1);
        let ids: Vec<u64> = backend.lines(1).await.iter().map(|l| l.employee_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_overflowing_employee_is_skipped() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_period(january(PeriodStatus::Processing)).await;
        seed_employees(&backend, &[1, 2]).await;
        for id in 1..=2 {
            backend
                .insert_reimbursement(ReimbursementFact {
                    id,
                    employee_id: 2,
                    date: date(2026, 1, 20),
                    title: "Claim".to_string(),
                    amount: Decimal::MAX,
                    description: None,
                })
                .await;
        }

        let report = runner(&backend, 50).execute(RunJob::new(1, 99, "t-overflow")).await;

        assert!(report.is_success(), "{:?}", report.error);
        assert_eq!(report.employees_skipped, 1);
        let ids: Vec<u64> = backend.lines(1).await.iter().map(|l| l.employee_id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn test_negative_salary_is_skipped() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_period(january(PeriodStatus::Processing)).await;
        seed_employees(&backend, &[1]).await;
        backend
            .insert_employee(Employee {
                id: 2,
                username: "broken".to_string(),
                salary: dec("-5"),
                role: Role::Employee,
            })
            .await;

        let report = runner(&backend, 50).execute(RunJob::new(1, 99, "t3")).await;
        assert!(report.is_success());
        assert_eq!(report.employees_skipped, 1);
        assert_eq!(backend.lines(1).await.len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_insert_failure_rolls_back_and_fails() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_period(january(PeriodStatus::Processing)).await;
        seed_employees(&backend, &[1, 2, 3, 4]).await;
        backend.fail_bulk_insert_on_call(2).await;

        let report = runner(&backend, 2).execute(RunJob::new(1, 99, "t4")).await;

        assert_eq!(report.status, PeriodStatus::Failed);
        assert!(report.error.unwrap().contains("bulk insert"));
        assert!(backend.lines(1).await.is_empty());
        assert_eq!(backend.period(1).await.unwrap().status, PeriodStatus::Failed);
    }

    #[tokio::test]
    async fn test_commit_failure_fails_run() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_period(january(PeriodStatus::Processing)).await;
        seed_employees(&backend, &[1, 2]).await;
        backend.fail_commit_on_call(1).await;

        let report = runner(&backend, 50).execute(RunJob::new(1, 99, "t5")).await;

        assert_eq!(report.status, PeriodStatus::Failed);
        assert!(backend.lines(1).await.is_empty());
        assert_eq!(backend.period(1).await.unwrap().status, PeriodStatus::Failed);
    }

    #[tokio::test]
    async fn test_weekend_only_period_fails_up_front() {
        let backend = Arc::new(MemoryBackend::new());
        let mut period = january(PeriodStatus::Processing);
        period.start_date = date(2026, 1, 17);
        period.end_date = date(2026, 1, 18);
        backend.insert_period(period).await;
        seed_employees(&backend, &[1]).await;

        let report = runner(&backend, 50).execute(RunJob::new(1, 99, "t6")).await;

        assert_eq!(report.status, PeriodStatus::Failed);
        assert_eq!(report.pages, 0);
        assert!(report.error.unwrap().contains("no payable days"));
    }

    #[tokio::test]
    async fn test_rerun_replaces_previous_lines() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_period(january(PeriodStatus::Processing)).await;
        seed_employees(&backend, &[1, 2]).await;

        runner(&backend, 50).execute(RunJob::new(1, 99, "first")).await;
        backend.set_period_status(1, PeriodStatus::Processing).await;
        runner(&backend, 50).execute(RunJob::new(1, 99, "second")).await;

        assert_eq!(backend.lines(1).await.len(), 2);
    }

    #[tokio::test]
    async fn test_period_not_processing_is_fatal() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_period(january(PeriodStatus::Active)).await;
        seed_employees(&backend, &[1]).await;

        let report = runner(&backend, 50).execute(RunJob::new(1, 99, "t7")).await;

        assert_eq!(report.status, PeriodStatus::Failed);
        assert!(backend.lines(1).await.is_empty());
        // MarkFailed only applies from processing
        assert_eq!(backend.period(1).await.unwrap().status, PeriodStatus::Active);
    }
}
