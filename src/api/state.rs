//! Application state for the payroll engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::run::RunCoordinator;
use crate::store::Backend;

/// Shared application state.
///
/// Holds the run coordinator every handler submits to and reads through.
pub struct AppState<B: Backend> {
    coordinator: Arc<RunCoordinator<B>>,
}

// Manual impl: a derive would require `B: Clone`.
impl<B: Backend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
        }
    }
}

impl<B: Backend> AppState<B> {
    /// Creates a new application state around a coordinator.
    pub fn new(coordinator: RunCoordinator<B>) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
        }
    }

    /// Returns the run coordinator.
    pub fn coordinator(&self) -> &RunCoordinator<B> {
        &self.coordinator
    }
}
