//! Paged enumeration of the employees a run pays.

mod cursor;

pub use cursor::{BatchCursor, DEFAULT_PAGE_SIZE};
