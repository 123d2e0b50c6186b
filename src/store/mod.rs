//! Storage seam for the payroll engine.
//!
//! The engine reads facts and writes payroll output exclusively through the
//! traits in this module. Every call takes the transaction it runs in as an
//! explicit `&mut Tx`, so the span of a unit of work is visible in the
//! signatures of the code that drives it.
//!
//! # Implementations
//!
//! - [`MemoryBackend`]: in-process backend with buffered transactions and
//!   fault injection, used by tests and benches.

mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{
    AttendanceFact, Employee, OvertimeFact, PayrollLine, Period, PeriodStatus, PeriodTransition,
    ReimbursementFact,
};

pub use memory::{MemoryBackend, MemoryTx};

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or failed to serve the call.
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// What the backend reported.
        message: String,
    },

    /// A status transition lost a race against another committed transaction.
    #[error("Conflicting update on period {period_id}: expected {expected}, found {found}")]
    Conflict {
        /// The period both transactions touched.
        period_id: u64,
        /// The status the transition was validated against.
        expected: PeriodStatus,
        /// The status committed by the winner.
        found: PeriodStatus,
    },

    /// A failure injected by a test backend.
    #[error("Injected failure: {message}")]
    Injected {
        /// Which fault fired.
        message: String,
    },
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Read and status-transition access to payroll periods.
#[async_trait]
pub trait PeriodStore<Tx: Send + 'static>: Send + Sync {
    /// Fetches a period, including uncommitted transitions made through `tx`.
    async fn get_by_id(&self, tx: &mut Tx, period_id: u64) -> StoreResult<Option<Period>>;

    /// Applies `transition` if the period holds its expected status.
    ///
    /// Returns `false` without writing anything when the period is missing or
    /// in any other status. The check is repeated on commit, which fails with
    /// [`StoreError::Conflict`] if another transaction moved the period first.
    async fn transition(
        &self,
        tx: &mut Tx,
        period_id: u64,
        transition: PeriodTransition,
    ) -> StoreResult<bool>;
}

/// Read access to employee salary and role data.
#[async_trait]
pub trait EmployeeStore<Tx: Send + 'static>: Send + Sync {
    /// Fetches one employee.
    async fn get_by_id(&self, tx: &mut Tx, employee_id: u64) -> StoreResult<Option<Employee>>;
}

/// Read access to attendance facts.
#[async_trait]
pub trait AttendanceStore<Tx: Send + 'static>: Send + Sync {
    /// Fetches the employee's check-in for one calendar day, if any.
    async fn get_by_employee_and_date(
        &self,
        tx: &mut Tx,
        employee_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceFact>>;
}

/// Read access to overtime facts.
#[async_trait]
pub trait OvertimeStore<Tx: Send + 'static>: Send + Sync {
    /// Fetches the employee's overtime dated within `[start, end]`.
    async fn get_by_employee_and_date_range(
        &self,
        tx: &mut Tx,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<OvertimeFact>>;
}

/// Read access to reimbursement facts.
#[async_trait]
pub trait ReimbursementStore<Tx: Send + 'static>: Send + Sync {
    /// Fetches the employee's reimbursements dated within `[start, end]`.
    async fn get_by_employee_and_date_range(
        &self,
        tx: &mut Tx,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<ReimbursementFact>>;
}

/// Payroll output plus the paged employee scan that feeds a run.
#[async_trait]
pub trait PayrollLineStore<Tx: Send + 'static>: Send + Sync {
    /// Removes every line of the period. Returns how many were removed.
    async fn delete_by_period(&self, tx: &mut Tx, period_id: u64) -> StoreResult<usize>;

    /// Writes a page of lines.
    async fn bulk_insert(&self, tx: &mut Tx, lines: Vec<PayrollLine>) -> StoreResult<()>;

    /// Ids of payroll-eligible employees strictly above `last_id`, ascending,
    /// at most `page_size` of them.
    async fn get_employee_ids_page(
        &self,
        tx: &mut Tx,
        last_id: u64,
        page_size: usize,
    ) -> StoreResult<Vec<u64>>;

    /// Every line of the period, in insertion order.
    async fn list_by_period(&self, tx: &mut Tx, period_id: u64) -> StoreResult<Vec<PayrollLine>>;
}

/// A transactional storage backend.
///
/// Writes made through a transaction become visible to other transactions
/// only once [`Backend::commit`] succeeds. Dropping a transaction without
/// committing discards its writes.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// An open unit of work.
    type Tx: Send + 'static;

    /// Opens a transaction.
    async fn begin(&self) -> StoreResult<Self::Tx>;

    /// Makes the transaction's writes durable and visible.
    async fn commit(&self, tx: Self::Tx) -> StoreResult<()>;

    /// Discards the transaction's writes.
    async fn rollback(&self, tx: Self::Tx) -> StoreResult<()>;

    /// Period access.
    fn periods(&self) -> &dyn PeriodStore<Self::Tx>;

    /// Employee access.
    fn employees(&self) -> &dyn EmployeeStore<Self::Tx>;

    /// Attendance access.
    fn attendance(&self) -> &dyn AttendanceStore<Self::Tx>;

    /// Overtime access.
    fn overtime(&self) -> &dyn OvertimeStore<Self::Tx>;

    /// Reimbursement access.
    fn reimbursements(&self) -> &dyn ReimbursementStore<Self::Tx>;

    /// Payroll line access.
    fn payroll_lines(&self) -> &dyn PayrollLineStore<Self::Tx>;
}
