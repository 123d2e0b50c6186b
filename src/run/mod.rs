//! Payroll run orchestration.
//!
//! - [`RunCoordinator`] validates a request, moves the period to
//!   `processing` and queues the job.
//! - [`RunWorkerPool`] executes queued jobs on supervised tokio tasks.
//! - [`BackgroundRunner`] performs one run inside a single transaction.

mod coordinator;
mod job;
mod runner;
mod worker;

pub use coordinator::RunCoordinator;
pub use job::{RunHandle, RunJob, RunReport, STATUS_MESSAGE, job_id};
pub use runner::BackgroundRunner;
pub use worker::{RunQueue, RunWorkerPool};
