//! Cooperative mutual exclusion for check-then-write sequences.
//!
//! Registration checks for a duplicate identifier and then appends two rows;
//! two concurrent registrations of the same identifier must not both pass the
//! check. Writes that address a row by its position (session tokens, profile
//! edits, password resets) and every row delete take the same lock, so a
//! position read under the lock is still valid when it is written.
//! Callers hold a [`LockGuard`] for the whole sequence. Waiting is bounded,
//! and the guard releases on drop so every exit path unlocks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::LockError;

#[derive(Clone, Debug, Default)]
pub struct ScriptLock {
    inner: Arc<Mutex<()>>,
}

/// Held while the lock is taken.
#[derive(Debug)]
pub struct LockGuard {
    _guard: OwnedMutexGuard<()>,
}

impl ScriptLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, timeout: Duration) -> Result<LockGuard, LockError> {
        match tokio::time::timeout(timeout, self.inner.clone().lock_owned()).await {
            Ok(guard) => Ok(LockGuard { _guard: guard }),
            Err(_) => {
                tracing::warn!(timeout_ms = timeout.as_millis() as u64, "Lock wait timed out");
                Err(LockError::Timeout(timeout))
            }
        }
    }
}
