//! In-memory storage backend.
//!
//! Committed state lives behind a lock; a [`MemoryTx`] buffers its writes and
//! replays them over the committed state when read through, so a transaction
//! sees its own writes while other transactions do not. Commit re-validates
//! every buffered status transition before swapping the new state in.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{RwLock, watch};
use tracing::debug;

use super::{
    AttendanceStore, Backend, EmployeeStore, OvertimeStore, PayrollLineStore, PeriodStore,
    ReimbursementStore, StoreError, StoreResult,
};
use crate::models::{
    AttendanceFact, Employee, OvertimeFact, PayrollLine, Period, PeriodStatus, PeriodTransition,
    ReimbursementFact,
};

/// Period and payroll line state, replaced wholesale on commit.
#[derive(Debug, Default, Clone)]
struct Ledger {
    periods: BTreeMap<u64, Period>,
    lines: BTreeMap<u64, Vec<PayrollLine>>,
}

/// Read-only inputs. Never written through a transaction.
#[derive(Debug, Default)]
struct FactTables {
    employees: BTreeMap<u64, Employee>,
    attendance: Vec<AttendanceFact>,
    overtime: Vec<OvertimeFact>,
    reimbursements: Vec<ReimbursementFact>,
}

/// Armed faults. Countdowns fire once, on the n-th matching call.
#[derive(Debug, Default)]
struct Faults {
    page_read_failure: Option<usize>,
    bulk_insert_failure: Option<usize>,
    commit_failure: Option<usize>,
    failing_employees: HashSet<u64>,
    panicking_employees: HashSet<u64>,
}

fn trip(countdown: &mut Option<usize>) -> bool {
    match countdown {
        Some(remaining) if *remaining <= 1 => {
            *countdown = None;
            true
        }
        Some(remaining) => {
            *remaining -= 1;
            false
        }
        None => false,
    }
}

#[derive(Debug)]
enum PendingWrite {
    Transition {
        period_id: u64,
        transition: PeriodTransition,
    },
    DeleteLines {
        period_id: u64,
    },
    InsertLines(Vec<PayrollLine>),
}

/// A buffered transaction against a [`MemoryBackend`].
#[derive(Debug)]
pub struct MemoryTx {
    id: u64,
    writes: Vec<PendingWrite>,
}

impl MemoryTx {
    /// Backend-unique transaction number.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of writes waiting for commit.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    fn overlay_period(&self, mut period: Period) -> Period {
        for write in &self.writes {
            if let PendingWrite::Transition {
                period_id,
                transition,
            } = write
            {
                if *period_id == period.id {
                    transition.apply(&mut period);
                }
            }
        }
        period
    }

    fn overlay_lines(&self, period_id: u64, mut lines: Vec<PayrollLine>) -> Vec<PayrollLine> {
        for write in &self.writes {
            match write {
                PendingWrite::DeleteLines { period_id: id } if *id == period_id => lines.clear(),
                PendingWrite::InsertLines(inserted) => lines.extend(
                    inserted
                        .iter()
                        .filter(|line| line.period_id == period_id)
                        .cloned(),
                ),
                _ => {}
            }
        }
        lines
    }
}

/// A complete in-process [`Backend`].
///
/// # Example
///
/// ```
/// use payroll_engine::store::{Backend, MemoryBackend};
///
/// # tokio_test_block_on(async {
/// let backend = MemoryBackend::new();
/// let mut tx = backend.begin().await?;
/// let page = backend.payroll_lines().get_employee_ids_page(&mut tx, 0, 50).await?;
/// assert!(page.is_empty());
/// backend.rollback(tx).await?;
/// # Ok::<(), payroll_engine::store::StoreError>(())
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryBackend {
    ledger: RwLock<Ledger>,
    facts: RwLock<FactTables>,
    faults: RwLock<Faults>,
    page_gate: watch::Sender<bool>,
    held_page_reads: watch::Sender<usize>,
    next_tx: AtomicU64,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self {
            ledger: RwLock::new(Ledger::default()),
            facts: RwLock::new(FactTables::default()),
            faults: RwLock::new(Faults::default()),
            page_gate: watch::channel(true).0,
            held_page_reads: watch::channel(0).0,
            next_tx: AtomicU64::new(1),
        }
    }
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    // ---- seeding ----

    /// Inserts or replaces a period.
    pub async fn insert_period(&self, period: Period) {
        self.ledger.write().await.periods.insert(period.id, period);
    }

    /// Inserts or replaces an employee.
    pub async fn insert_employee(&self, employee: Employee) {
        self.facts
            .write()
            .await
            .employees
            .insert(employee.id, employee);
    }

    /// Records a check-in.
    pub async fn insert_attendance(&self, fact: AttendanceFact) {
        self.facts.write().await.attendance.push(fact);
    }

    /// Records overtime.
    pub async fn insert_overtime(&self, fact: OvertimeFact) {
        self.facts.write().await.overtime.push(fact);
    }

    /// Records a reimbursement claim.
    pub async fn insert_reimbursement(&self, fact: ReimbursementFact) {
        self.facts.write().await.reimbursements.push(fact);
    }

    /// Writes lines directly into committed state.
    pub async fn insert_lines(&self, lines: Vec<PayrollLine>) {
        let mut ledger = self.ledger.write().await;
        for line in lines {
            ledger.lines.entry(line.period_id).or_default().push(line);
        }
    }

    /// Overwrites a period's committed status, as an operator reset would.
    pub async fn set_period_status(&self, period_id: u64, status: PeriodStatus) -> bool {
        match self.ledger.write().await.periods.get_mut(&period_id) {
            Some(period) => {
                period.status = status;
                true
            }
            None => false,
        }
    }

    // ---- committed-state inspection ----

    /// The committed state of a period.
    pub async fn period(&self, period_id: u64) -> Option<Period> {
        self.ledger.read().await.periods.get(&period_id).cloned()
    }

    /// The committed lines of a period.
    pub async fn lines(&self, period_id: u64) -> Vec<PayrollLine> {
        self.ledger
            .read()
            .await
            .lines
            .get(&period_id)
            .cloned()
            .unwrap_or_default()
    }

    // ---- fault injection ----

    /// Fails the `call`-th employee page read from now on (1 = the next one).
    pub async fn fail_page_read_on_call(&self, call: usize) {
        self.faults.write().await.page_read_failure = Some(call);
    }

    /// Fails the `call`-th bulk insert from now on.
    pub async fn fail_bulk_insert_on_call(&self, call: usize) {
        self.faults.write().await.bulk_insert_failure = Some(call);
    }

    /// Fails the `call`-th commit from now on.
    pub async fn fail_commit_on_call(&self, call: usize) {
        self.faults.write().await.commit_failure = Some(call);
    }

    /// Makes every fact read for the employee fail.
    pub async fn fail_facts_for(&self, employee_id: u64) {
        self.faults
            .write()
            .await
            .failing_employees
            .insert(employee_id);
    }

    /// Makes every fact read for the employee panic.
    pub async fn panic_on_facts_for(&self, employee_id: u64) {
        self.faults
            .write()
            .await
            .panicking_employees
            .insert(employee_id);
    }

    /// Blocks employee page reads until [`MemoryBackend::release_page_reads`].
    pub fn hold_page_reads(&self) {
        self.page_gate.send_replace(false);
    }

    /// Unblocks employee page reads.
    pub fn release_page_reads(&self) {
        self.page_gate.send_replace(true);
    }

    /// Waits until at least `count` page reads are blocked by
    /// [`MemoryBackend::hold_page_reads`].
    pub async fn wait_for_held_page_reads(&self, count: usize) {
        let mut held = self.held_page_reads.subscribe();
        // The sender lives as long as self.
        let _ = held.wait_for(|held| *held >= count).await;
    }

    async fn check_fact_faults(&self, employee_id: u64) -> StoreResult<()> {
        let faults = self.faults.read().await;
        if faults.panicking_employees.contains(&employee_id) {
            panic!("injected panic reading facts for employee {employee_id}");
        }
        if faults.failing_employees.contains(&employee_id) {
            return Err(StoreError::Injected {
                message: format!("fact read for employee {employee_id}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    type Tx = MemoryTx;

    async fn begin(&self) -> StoreResult<MemoryTx> {
        let id = self.next_tx.fetch_add(1, Ordering::Relaxed);
        debug!(tx_id = id, "memory transaction opened");
        Ok(MemoryTx {
            id,
            writes: Vec::new(),
        })
    }

    async fn commit(&self, tx: MemoryTx) -> StoreResult<()> {
        if trip(&mut self.faults.write().await.commit_failure) {
            return Err(StoreError::Injected {
                message: format!("commit of transaction {}", tx.id),
            });
        }

        let mut ledger = self.ledger.write().await;
        let mut next = ledger.clone();
        for write in tx.writes {
            match write {
                PendingWrite::Transition {
                    period_id,
                    transition,
                } => {
                    let found = next
                        .periods
                        .get(&period_id)
                        .map(|period| period.status)
                        .unwrap_or(PeriodStatus::Deleted);
                    let applied = next
                        .periods
                        .get_mut(&period_id)
                        .is_some_and(|period| transition.apply(period));
                    if !applied {
                        return Err(StoreError::Conflict {
                            period_id,
                            expected: transition.expected_status(),
                            found,
                        });
                    }
                }
                PendingWrite::DeleteLines { period_id } => {
                    next.lines.remove(&period_id);
                }
                PendingWrite::InsertLines(lines) => {
                    for line in lines {
                        next.lines.entry(line.period_id).or_default().push(line);
                    }
                }
            }
        }
        *ledger = next;
        debug!(tx_id = tx.id, "memory transaction committed");
        Ok(())
    }

    async fn rollback(&self, tx: MemoryTx) -> StoreResult<()> {
        debug!(
            tx_id = tx.id,
            discarded = tx.writes.len(),
            "memory transaction rolled back"
        );
        Ok(())
    }

    fn periods(&self) -> &dyn PeriodStore<MemoryTx> {
        self
    }

    fn employees(&self) -> &dyn EmployeeStore<MemoryTx> {
        self
    }

    fn attendance(&self) -> &dyn AttendanceStore<MemoryTx> {
        self
    }

    fn overtime(&self) -> &dyn OvertimeStore<MemoryTx> {
        self
    }

    fn reimbursements(&self) -> &dyn ReimbursementStore<MemoryTx> {
        self
    }

    fn payroll_lines(&self) -> &dyn PayrollLineStore<MemoryTx> {
        self
    }
}

#[async_trait]
impl PeriodStore<MemoryTx> for MemoryBackend {
    async fn get_by_id(&self, tx: &mut MemoryTx, period_id: u64) -> StoreResult<Option<Period>> {
        let committed = self.ledger.read().await.periods.get(&period_id).cloned();
        Ok(committed.map(|period| tx.overlay_period(period)))
    }

    async fn transition(
        &self,
        tx: &mut MemoryTx,
        period_id: u64,
        transition: PeriodTransition,
    ) -> StoreResult<bool> {
        let Some(mut period) = PeriodStore::get_by_id(self, tx, period_id).await? else {
            return Ok(false);
        };
        if !transition.apply(&mut period) {
            return Ok(false);
        }
        tx.writes.push(PendingWrite::Transition {
            period_id,
            transition,
        });
        Ok(true)
    }
}

#[async_trait]
impl EmployeeStore<MemoryTx> for MemoryBackend {
    async fn get_by_id(&self, _tx: &mut MemoryTx, employee_id: u64) -> StoreResult<Option<Employee>> {
        Ok(self.facts.read().await.employees.get(&employee_id).cloned())
    }
}

#[async_trait]
impl AttendanceStore<MemoryTx> for MemoryBackend {
    async fn get_by_employee_and_date(
        &self,
        _tx: &mut MemoryTx,
        employee_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceFact>> {
        self.check_fact_faults(employee_id).await?;
        Ok(self
            .facts
            .read()
            .await
            .attendance
            .iter()
            .find(|fact| fact.employee_id == employee_id && fact.work_date() == date)
            .cloned())
    }
}

#[async_trait]
impl OvertimeStore<MemoryTx> for MemoryBackend {
    async fn get_by_employee_and_date_range(
        &self,
        _tx: &mut MemoryTx,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<OvertimeFact>> {
        self.check_fact_faults(employee_id).await?;
        Ok(self
            .facts
            .read()
            .await
            .overtime
            .iter()
            .filter(|fact| fact.employee_id == employee_id && fact.date >= start && fact.date <= end)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReimbursementStore<MemoryTx> for MemoryBackend {
    async fn get_by_employee_and_date_range(
        &self,
        _tx: &mut MemoryTx,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<ReimbursementFact>> {
        self.check_fact_faults(employee_id).await?;
        Ok(self
            .facts
            .read()
            .await
            .reimbursements
            .iter()
            .filter(|fact| fact.employee_id == employee_id && fact.date >= start && fact.date <= end)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PayrollLineStore<MemoryTx> for MemoryBackend {
    async fn delete_by_period(&self, tx: &mut MemoryTx, period_id: u64) -> StoreResult<usize> {
        let visible = self.list_by_period(tx, period_id).await?.len();
        tx.writes.push(PendingWrite::DeleteLines { period_id });
        Ok(visible)
    }

    async fn bulk_insert(&self, tx: &mut MemoryTx, lines: Vec<PayrollLine>) -> StoreResult<()> {
        if trip(&mut self.faults.write().await.bulk_insert_failure) {
            return Err(StoreError::Injected {
                message: format!("bulk insert of {} lines", lines.len()),
            });
        }
        tx.writes.push(PendingWrite::InsertLines(lines));
        Ok(())
    }

    async fn get_employee_ids_page(
        &self,
        _tx: &mut MemoryTx,
        last_id: u64,
        page_size: usize,
    ) -> StoreResult<Vec<u64>> {
        let mut gate = self.page_gate.subscribe();
        let held = !*gate.borrow();
        if held {
            self.held_page_reads.send_modify(|count| *count += 1);
            // The sender lives as long as self, so this only returns once open.
            let _ = gate.wait_for(|open| *open).await;
            self.held_page_reads.send_modify(|count| *count -= 1);
        }

        if trip(&mut self.faults.write().await.page_read_failure) {
            return Err(StoreError::Injected {
                message: format!("employee page after id {last_id}"),
            });
        }

        Ok(self
            .facts
            .read()
            .await
            .employees
            .range(last_id.saturating_add(1)..)
            .filter(|(_, employee)| employee.is_payroll_eligible())
            .map(|(id, _)| *id)
            .take(page_size)
            .collect())
    }

    async fn list_by_period(&self, tx: &mut MemoryTx, period_id: u64) -> StoreResult<Vec<PayrollLine>> {
        let committed = self
            .ledger
            .read()
            .await
            .lines
            .get(&period_id)
            .cloned()
            .unwrap_or_default();
        Ok(tx.overlay_lines(period_id, committed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MarkCompleted, MarkProcessing, PayrollComputation, Role};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn create_period(id: u64, status: PeriodStatus) -> Period {
        Period {
            id,
            code: format!("PRD-{id}"),
            name: format!("Period {id}"),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            status,
            executed_by: None,
            executed_at: None,
        }
    }

    fn create_employee(id: u64, role: Role) -> Employee {
        Employee {
            id,
            username: format!("user{id}"),
            salary: Decimal::from(2_200_000),
            role,
        }
    }

    fn create_line(period_id: u64, employee_id: u64) -> PayrollLine {
        let computation = PayrollComputation {
            employee_id,
            pay_day_count: 22,
            daily_rate: Decimal::from(100_000),
            total_working_days: 22,
            base_amount: Decimal::from(2_200_000),
            overtime_breakdown: vec![],
            overtime_amount: Decimal::ZERO,
            reimbursement_breakdown: vec![],
            reimbursement_amount: Decimal::ZERO,
            take_home_pay: Decimal::from(2_200_000),
        };
        PayrollLine::from_computation(Uuid::new_v4(), period_id, computation, 1, Utc::now())
    }

    fn processing() -> PeriodTransition {
        MarkProcessing {
            executed_by: 9,
            executed_at: Utc::now(),
        }
        .into()
    }

    #[tokio::test]
    async fn test_writes_are_invisible_until_commit() {
        let backend = MemoryBackend::new();
        backend.insert_period(create_period(1, PeriodStatus::Active)).await;

        let mut tx = backend.begin().await.unwrap();
        assert!(backend.periods().transition(&mut tx, 1, processing()).await.unwrap());
        backend
            .payroll_lines()
            .bulk_insert(&mut tx, vec![create_line(1, 5)])
            .await
            .unwrap();

        // visible inside the transaction
        let seen = backend.periods().get_by_id(&mut tx, 1).await.unwrap().unwrap();
        assert_eq!(seen.status, PeriodStatus::Processing);
        assert_eq!(seen.executed_by, Some(9));
        assert_eq!(backend.payroll_lines().list_by_period(&mut tx, 1).await.unwrap().len(), 1);

        // not outside it
        assert_eq!(backend.period(1).await.unwrap().status, PeriodStatus::Active);
        assert!(backend.lines(1).await.is_empty());

        backend.commit(tx).await.unwrap();
        assert_eq!(backend.period(1).await.unwrap().status, PeriodStatus::Processing);
        assert_eq!(backend.lines(1).await.len(), 1);
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let backend = MemoryBackend::new();
        backend.insert_period(create_period(1, PeriodStatus::Processing)).await;
        backend.insert_lines(vec![create_line(1, 5)]).await;

        let mut tx = backend.begin().await.unwrap();
        let deleted = backend.payroll_lines().delete_by_period(&mut tx, 1).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(backend.payroll_lines().list_by_period(&mut tx, 1).await.unwrap().is_empty());
        assert_eq!(tx.pending_writes(), 1);
        backend.rollback(tx).await.unwrap();

        assert_eq!(backend.lines(1).await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_then_insert_replaces_lines() {
        let backend = MemoryBackend::new();
        backend
            .insert_lines(vec![create_line(1, 5), create_line(1, 6), create_line(2, 5)])
            .await;

        let mut tx = backend.begin().await.unwrap();
        backend.payroll_lines().delete_by_period(&mut tx, 1).await.unwrap();
        backend
            .payroll_lines()
            .bulk_insert(&mut tx, vec![create_line(1, 7)])
            .await
            .unwrap();
        backend.commit(tx).await.unwrap();

        let ids: Vec<u64> = backend.lines(1).await.iter().map(|l| l.employee_id).collect();
        assert_eq!(ids, vec![7]);
        assert_eq!(backend.lines(2).await.len(), 1);
    }

    #[tokio::test]
    async fn test_transition_from_wrong_status_writes_nothing() {
        let backend = MemoryBackend::new();
        backend.insert_period(create_period(1, PeriodStatus::Completed)).await;

        let mut tx = backend.begin().await.unwrap();
        assert!(!backend.periods().transition(&mut tx, 1, processing()).await.unwrap());
        assert!(!backend.periods().transition(&mut tx, 99, processing()).await.unwrap());
        assert_eq!(tx.pending_writes(), 0);
    }

    #[tokio::test]
    async fn test_commit_detects_lost_race() {
        let backend = MemoryBackend::new();
        backend.insert_period(create_period(1, PeriodStatus::Active)).await;

        let mut first = backend.begin().await.unwrap();
        let mut second = backend.begin().await.unwrap();
        assert!(backend.periods().transition(&mut first, 1, processing()).await.unwrap());
        assert!(backend.periods().transition(&mut second, 1, processing()).await.unwrap());

        backend.commit(first).await.unwrap();
        match backend.commit(second).await {
            Err(StoreError::Conflict {
                period_id,
                expected,
                found,
            }) => {
                assert_eq!(period_id, 1);
                assert_eq!(expected, PeriodStatus::Active);
                assert_eq!(found, PeriodStatus::Processing);
            }
            other => panic!("Expected Conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_commit_fails_after_external_status_change() {
        let backend = MemoryBackend::new();
        backend.insert_period(create_period(1, PeriodStatus::Active)).await;

        let mut tx = backend.begin().await.unwrap();
        backend.periods().transition(&mut tx, 1, processing()).await.unwrap();
        backend
            .payroll_lines()
            .bulk_insert(&mut tx, vec![create_line(1, 5)])
            .await
            .unwrap();
        backend.set_period_status(1, PeriodStatus::Failed).await;

        assert!(backend.commit(tx).await.is_err());
        assert_eq!(backend.period(1).await.unwrap().status, PeriodStatus::Failed);
        assert!(backend.lines(1).await.is_empty());
    }

    #[tokio::test]
    async fn test_completed_requires_processing() {
        let backend = MemoryBackend::new();
        backend.insert_period(create_period(1, PeriodStatus::Active)).await;

        let mut tx = backend.begin().await.unwrap();
        let completed = backend
            .periods()
            .transition(&mut tx, 1, MarkCompleted {}.into())
            .await
            .unwrap();
        assert!(!completed);
        assert_eq!(tx.pending_writes(), 0);
    }

    #[tokio::test]
    async fn test_page_returns_only_eligible_ids_in_order() {
        let backend = MemoryBackend::new();
        for id in [9, 3, 5, 1, 7] {
            backend.insert_employee(create_employee(id, Role::Employee)).await;
        }
        backend.insert_employee(create_employee(4, Role::Admin)).await;

        let mut tx = backend.begin().await.unwrap();
        let store = backend.payroll_lines();
        assert_eq!(store.get_employee_ids_page(&mut tx, 0, 3).await.unwrap(), vec![1, 3, 5]);
        assert_eq!(store.get_employee_ids_page(&mut tx, 5, 3).await.unwrap(), vec![7, 9]);
        assert!(store.get_employee_ids_page(&mut tx, 9, 3).await.unwrap().is_empty());
        assert!(store.get_employee_ids_page(&mut tx, u64::MAX, 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fact_reads_filter_by_employee_and_range() {
        let backend = MemoryBackend::new();
        let day = NaiveDate::from_ymd_opt(2026, 1, 13).unwrap();
        backend
            .insert_attendance(AttendanceFact {
                id: 1,
                employee_id: 5,
                check_in_date: day.and_hms_opt(8, 0, 0).unwrap(),
                check_out_date: None,
            })
            .await;
        backend
            .insert_overtime(OvertimeFact {
                id: 1,
                employee_id: 5,
                date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
                hours: Decimal::from(2),
            })
            .await;

        let mut tx = backend.begin().await.unwrap();
        assert!(backend
            .attendance()
            .get_by_employee_and_date(&mut tx, 5, day)
            .await
            .unwrap()
            .is_some());
        assert!(backend
            .attendance()
            .get_by_employee_and_date(&mut tx, 6, day)
            .await
            .unwrap()
            .is_none());
        let january = backend
            .overtime()
            .get_by_employee_and_date_range(
                &mut tx,
                5,
                NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            )
            .await
            .unwrap();
        assert!(january.is_empty());
    }

    #[tokio::test]
    async fn test_countdown_faults_fire_once() {
        let backend = MemoryBackend::new();
        backend.fail_bulk_insert_on_call(2).await;

        let mut tx = backend.begin().await.unwrap();
        let store = backend.payroll_lines();
        assert!(store.bulk_insert(&mut tx, vec![]).await.is_ok());
        assert!(matches!(
            store.bulk_insert(&mut tx, vec![]).await,
            Err(StoreError::Injected { .. })
        ));
        assert!(store.bulk_insert(&mut tx, vec![]).await.is_ok());
    }

    #[tokio::test]
    async fn test_failing_employee_facts() {
        let backend = MemoryBackend::new();
        backend.fail_facts_for(5).await;

        let mut tx = backend.begin().await.unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 1, 13).unwrap();
        assert!(backend
            .attendance()
            .get_by_employee_and_date(&mut tx, 5, day)
            .await
            .is_err());
        assert!(backend
            .attendance()
            .get_by_employee_and_date(&mut tx, 6, day)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_commit_fault() {
        let backend = MemoryBackend::new();
        backend.fail_commit_on_call(1).await;
        let tx = backend.begin().await.unwrap();
        assert!(backend.commit(tx).await.is_err());
        let tx = backend.begin().await.unwrap();
        assert!(backend.commit(tx).await.is_ok());
    }

    #[tokio::test]
    async fn test_held_page_reads_wait_for_release() {
        let backend = std::sync::Arc::new(MemoryBackend::new());
        backend.insert_employee(create_employee(1, Role::Employee)).await;
        backend.hold_page_reads();

        let reader = {
            let backend = backend.clone();
            tokio::spawn(async move {
                let mut tx = backend.begin().await.unwrap();
                backend
                    .payroll_lines()
                    .get_employee_ids_page(&mut tx, 0, 10)
                    .await
                    .unwrap()
            })
        };

        backend.wait_for_held_page_reads(1).await;
        assert!(!reader.is_finished());

        backend.release_page_reads();
        assert_eq!(reader.await.unwrap(), vec![1]);
    }
}
