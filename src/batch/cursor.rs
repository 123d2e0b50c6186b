//! Keyset cursor over payroll-eligible employee ids.

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::store::PayrollLineStore;

/// Employees fetched per page when no size is configured.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Walks eligible employee ids in ascending pages of bounded size.
///
/// The cursor remembers the highest id it has handed out and asks the store
/// only for ids above it, so memory stays bounded by one page however large
/// the population is. Every page is checked before it is accepted: an id at
/// or below the cursor position would revisit an employee and fails with
/// [`EngineError::CursorRegression`].
///
/// # Example
///
/// ```
/// use payroll_engine::batch::BatchCursor;
/// use payroll_engine::models::{Employee, Role};
/// use payroll_engine::store::{Backend, MemoryBackend};
/// use rust_decimal::Decimal;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let backend = MemoryBackend::new();
/// for id in 1..=5 {
///     backend
///         .insert_employee(Employee {
///             id,
///             username: format!("user{id}"),
///             salary: Decimal::from(1_000_000),
///             role: Role::Employee,
///         })
///         .await;
/// }
///
/// let mut tx = backend.begin().await?;
/// let mut cursor = BatchCursor::new(2);
/// let mut seen = Vec::new();
/// loop {
///     let page = cursor.next_page(backend.payroll_lines(), &mut tx).await?;
///     if page.is_empty() {
///         break;
///     }
///     seen.extend(page);
/// }
/// assert_eq!(seen, vec![1, 2, 3, 4, 5]);
/// assert_eq!(cursor.pages_read(), 3);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// # }).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct BatchCursor {
    page_size: usize,
    last_seen: u64,
    pages_read: usize,
    exhausted: bool,
}

impl BatchCursor {
    /// Creates a cursor positioned before the first employee.
    pub fn new(page_size: usize) -> Self {
        Self::resume(page_size, 0)
    }

    /// Creates a cursor positioned after `last_seen`.
    pub fn resume(page_size: usize, last_seen: u64) -> Self {
        Self {
            page_size: page_size.max(1),
            last_seen,
            pages_read: 0,
            exhausted: false,
        }
    }

    /// Fetches the next page of ids.
    ///
    /// An empty page means the scan is complete; later calls return an empty
    /// page again without touching the store.
    pub async fn next_page<Tx: Send + 'static>(
        &mut self,
        store: &dyn PayrollLineStore<Tx>,
        tx: &mut Tx,
    ) -> EngineResult<Vec<u64>> {
        if self.exhausted {
            return Ok(Vec::new());
        }

        let page = store
            .get_employee_ids_page(tx, self.last_seen, self.page_size)
            .await?;

        let mut position = self.last_seen;
        for &id in &page {
            if id <= position {
                return Err(EngineError::CursorRegression {
                    id,
                    last_seen: position,
                });
            }
            position = id;
        }

        if page.is_empty() {
            self.exhausted = true;
            debug!(last_id = self.last_seen, pages = self.pages_read, "employee scan exhausted");
            return Ok(page);
        }

        self.last_seen = position;
        self.pages_read += 1;
        debug!(
            last_id = self.last_seen,
            batch_size = page.len(),
            "fetched employee page"
        );
        Ok(page)
    }

    /// The highest id handed out so far (0 before the first page).
    pub fn last_seen(&self) -> u64 {
        self.last_seen
    }

    /// Number of non-empty pages handed out.
    pub fn pages_read(&self) -> usize {
        self.pages_read
    }

    /// Whether the store has reported the end of the scan.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// The configured page size.
    pub fn page_size(&self) -> usize {
        self.page_size
    }
}
