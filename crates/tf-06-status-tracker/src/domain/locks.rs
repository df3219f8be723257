//! # Per-Declaration Locks
//!
//! One writer per declaration. Caller actions wait a bounded time for the
//! lock; the sweep never waits and skips declarations that are busy.

use crate::domain::errors::TrackerError;
use parking_lot::Mutex;
use shared_types::DeclarationId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Held for the duration of one status transition.
pub type DeclarationGuard = OwnedMutexGuard<()>;

#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<DeclarationId, Arc<AsyncMutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, id: DeclarationId) -> Arc<AsyncMutex<()>> {
        self.locks.lock().entry(id).or_default().clone()
    }

    /// Wait up to `wait` for the lock.
    pub async fn acquire(
        &self,
        id: DeclarationId,
        wait: Duration,
    ) -> Result<DeclarationGuard, TrackerError> {
        let lock = self.lock_for(id);
        tokio::time::timeout(wait, lock.lock_owned())
            .await
            .map_err(|_| TrackerError::AlreadyInProgress(id))
    }

    /// The lock, if nobody holds it right now.
    pub fn try_acquire(&self, id: DeclarationId) -> Option<DeclarationGuard> {
        self.lock_for(id).try_lock_owned().ok()
    }

    /// Drop entries nobody is holding or waiting on.
    pub fn prune(&self) {
        self.locks.lock().retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
