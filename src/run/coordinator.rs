//! Request-time validation and hand-off of payroll runs.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::oneshot;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::job::{QueuedRun, RunHandle, RunJob};
use super::worker::RunQueue;
use crate::calculation::summarize_period;
use crate::error::{EngineError, EngineResult};
use crate::models::{MarkProcessing, Period, PeriodStatus, PeriodSummary};
use crate::store::{Backend, StoreError};

/// Accepts payroll run requests.
///
/// A request is accepted only if a queue slot is free and the period is
/// `active`. Acceptance moves the period to `processing` with a
/// compare-and-swap, so of two racing requests for one period exactly one
/// wins and the other sees [`EngineError::InvalidState`]. The call returns as
/// soon as the job is queued; the run itself happens on the worker pool.
pub struct RunCoordinator<B: Backend> {
    backend: Arc<B>,
    queue: RunQueue,
}

impl<B: Backend> RunCoordinator<B> {
    /// Creates a coordinator submitting to `queue`.
    pub fn new(backend: Arc<B>, queue: RunQueue) -> Self {
        Self { backend, queue }
    }

    /// Starts a run under a fresh request id.
    pub async fn run(&self, period_id: u64, initiator_id: u64) -> EngineResult<RunHandle> {
        self.run_with_request_id(period_id, initiator_id, Uuid::new_v4().to_string())
            .await
    }

    /// Starts a run, deriving the job id from the caller's request id.
    ///
    /// # Errors
    ///
    /// - [`EngineError::QueueFull`] / [`EngineError::WorkerPoolClosed`] if no
    ///   worker can take the run. Nothing is written.
    /// - [`EngineError::PeriodNotFound`] if the period is missing or deleted.
    /// - [`EngineError::InvalidState`] if it is not `active`, including when
    ///   a concurrent request moved it first.
    #[instrument(skip(self, request_id), fields(request_id = %request_id))]
    pub async fn run_with_request_id(
        &self,
        period_id: u64,
        initiator_id: u64,
        request_id: String,
    ) -> EngineResult<RunHandle> {
        let permit = self.queue.reserve()?;

        let backend = &*self.backend;
        let mut tx = backend.begin().await?;
        if let Err(error) = self.accept(&mut tx, period_id, initiator_id).await {
            if let Err(rollback_error) = backend.rollback(tx).await {
                warn!(error = %rollback_error, "rollback failed");
            }
            return Err(error);
        }
        backend.commit(tx).await.map_err(|error| match error {
            StoreError::Conflict { found, .. } => EngineError::InvalidState {
                period_id,
                status: found,
                expected: PeriodStatus::Active,
            },
            other => other.into(),
        })?;

        let job = RunJob::new(period_id, initiator_id, request_id);
        let job_id = job.job_id.clone();
        let (completion, receiver) = oneshot::channel();
        permit.send(QueuedRun { job, completion });

        info!(job_id = %job_id, "payroll run accepted");
        Ok(RunHandle::new(job_id, receiver))
    }

    async fn accept(&self, tx: &mut B::Tx, period_id: u64, initiator_id: u64) -> EngineResult<()> {
        let periods = self.backend.periods();
        let period = periods
            .get_by_id(tx, period_id)
            .await?
            .filter(|period| !period.is_deleted())
            .ok_or(EngineError::PeriodNotFound { period_id })?;

        if !period.is_runnable() {
            return Err(EngineError::InvalidState {
                period_id,
                status: period.status,
                expected: PeriodStatus::Active,
            });
        }

        let mark = MarkProcessing {
            executed_by: initiator_id,
            executed_at: Utc::now(),
        };
        if !periods.transition(tx, period_id, mark.into()).await? {
            return Err(EngineError::InvalidState {
                period_id,
                status: period.status,
                expected: PeriodStatus::Active,
            });
        }
        Ok(())
    }

    /// Reads a period's committed state, the polling surface for run progress.
    pub async fn period(&self, period_id: u64) -> EngineResult<Period> {
        let backend = &*self.backend;
        let mut tx = backend.begin().await?;
        let period = backend.periods().get_by_id(&mut tx, period_id).await;
        backend.rollback(tx).await?;
        period?
            .filter(|period| !period.is_deleted())
            .ok_or(EngineError::PeriodNotFound { period_id })
    }

    /// Summarizes the committed lines of a period.
    pub async fn summary(&self, period_id: u64) -> EngineResult<PeriodSummary> {
        let backend = &*self.backend;
        let mut tx = backend.begin().await?;
        let read = async {
            let period = backend
                .periods()
                .get_by_id(&mut tx, period_id)
                .await?
                .filter(|period| !period.is_deleted())
                .ok_or(EngineError::PeriodNotFound { period_id })?;
            let lines = backend
                .payroll_lines()
                .list_by_period(&mut tx, period_id)
                .await?;
            summarize_period(&period, &lines)
        }
        .await;
        backend.rollback(tx).await?;
        read
    }
}
