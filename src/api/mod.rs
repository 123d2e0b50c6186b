//! HTTP API module for the payroll engine.
//!
//! A thin axum adapter over [`RunCoordinator`](crate::run::RunCoordinator):
//! one endpoint starts a run, two read the period state it produces.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::{REQUEST_ID_HEADER, create_router};
pub use request::{RunPayrollRequest, RunPayrollResponse};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
