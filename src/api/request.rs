//! Request and acknowledgement bodies for the payroll engine API.

use serde::{Deserialize, Serialize};

use crate::run::RunHandle;

/// Request body for `POST /periods/:period_id/payroll`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPayrollRequest {
    /// The user triggering the run.
    pub initiator_id: u64,
}

/// Body of the `202 Accepted` answer to a run request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPayrollResponse {
    /// Human-readable acknowledgement.
    pub status_message: String,
    /// Identifier of the accepted job.
    pub job_id: String,
}

impl From<&RunHandle> for RunPayrollResponse {
    fn from(handle: &RunHandle) -> Self {
        Self {
            status_message: handle.status_message.clone(),
            job_id: handle.job_id.clone(),
        }
    }
}
