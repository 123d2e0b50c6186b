//! Run jobs, their handles and their reports.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::{EngineError, EngineResult};
use crate::models::PeriodStatus;

/// Message returned to the caller when a run is accepted.
pub const STATUS_MESSAGE: &str = "Payroll processing started";

/// Builds the identifier of a run from its period and request ids.
///
/// # Example
///
/// ```
/// use payroll_engine::run::job_id;
///
/// assert_eq!(job_id(12, "req-7"), "payroll_12_req-7");
/// ```
pub fn job_id(period_id: u64, request_id: &str) -> String {
    format!("payroll_{period_id}_{request_id}")
}

/// One accepted payroll run, waiting for or held by a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunJob {
    /// `payroll_{period_id}_{request_id}`.
    pub job_id: String,
    /// The period being computed.
    pub period_id: u64,
    /// The user who triggered the run; stamped on every line.
    pub initiator_id: u64,
    /// Correlation id of the triggering request.
    pub request_id: String,
}

impl RunJob {
    /// Creates a job, deriving its id.
    pub fn new(period_id: u64, initiator_id: u64, request_id: impl Into<String>) -> Self {
        let request_id = request_id.into();
        Self {
            job_id: job_id(period_id, &request_id),
            period_id,
            initiator_id,
            request_id,
        }
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// The job that ran.
    pub job_id: String,
    /// The period it computed.
    pub period_id: u64,
    /// `completed` or `failed`.
    pub status: PeriodStatus,
    /// Non-empty employee pages processed.
    pub pages: usize,
    /// Employees with a computed line.
    pub employees_computed: usize,
    /// Employees skipped after a per-employee error.
    pub employees_skipped: usize,
    /// Lines handed to the store. Zero survive a failed run.
    pub lines_written: usize,
    /// The fatal error, for failed runs.
    pub error: Option<String>,
    /// Wall-clock run time.
    pub duration_ms: u64,
}

impl RunReport {
    /// True if the run committed.
    pub fn is_success(&self) -> bool {
        self.status == PeriodStatus::Completed
    }
}

/// A queued run with the channel its outcome is reported on.
#[derive(Debug)]
pub(crate) struct QueuedRun {
    pub(crate) job: RunJob,
    pub(crate) completion: oneshot::Sender<EngineResult<RunReport>>,
}

/// Returned by the coordinator once a run has been accepted.
///
/// Dropping the handle does not cancel the run.
#[derive(Debug)]
pub struct RunHandle {
    /// Human-readable acknowledgement.
    pub status_message: String,
    /// Identifier of the accepted job.
    pub job_id: String,
    completion: oneshot::Receiver<EngineResult<RunReport>>,
}

impl RunHandle {
    pub(crate) fn new(job_id: String, completion: oneshot::Receiver<EngineResult<RunReport>>) -> Self {
        Self {
            status_message: STATUS_MESSAGE.to_string(),
            job_id,
            completion,
        }
    }

    /// Waits for the run to finish.
    ///
    /// Fatal run errors are reported inside the [`RunReport`]; an `Err` means
    /// the job crashed or was lost before it could report.
    pub async fn wait(self) -> EngineResult<RunReport> {
        match self.completion.await {
            Ok(outcome) => outcome,
            Err(_) => Err(EngineError::JobCrashed {
                job_id: self.job_id,
                message: "job was dropped before reporting".to_string(),
            }),
        }
    }
}
