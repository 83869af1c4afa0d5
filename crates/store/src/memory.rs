//! Mutex-serialized, snapshot-committing in-memory store.

use std::sync::Mutex;

use stockbook_core::DomainResult;

use crate::state::{Store, StoreState};

/// In-memory [`Store`]. One mutex serializes all transactions; each
/// transaction works on a clone of the state and commits by swapping it back,
/// so a failed closure leaves no trace.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        // A panicked holder never committed its working copy, so the state
        // behind a poisoned lock is still the last committed snapshot.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Store for InMemoryStore {
    fn transaction<T>(
        &self,
        f: impl FnOnce(&mut StoreState) -> DomainResult<T>,
    ) -> DomainResult<T> {
        let mut committed = self.lock();
        let mut working = committed.clone();
        match f(&mut working) {
            Ok(value) => {
                *committed = working;
                tracing::trace!("transaction committed");
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(error = %err, "transaction aborted");
                Err(err)
            }
        }
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> DomainResult<T>) -> DomainResult<T> {
        let committed = self.lock();
        f(&committed)
    }
}
