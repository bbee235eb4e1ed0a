// crates/lockstake-ledger/src/shared.rs
//
// SharedLedger: a cloneable handle that serializes access to one ledger.
//
// Mutating calls take the write lock, so no two of them ever interleave and
// each one observes the effects of the previous one in full. Queries take the
// read lock and may run concurrently with each other.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::staking::StakingLedger;

/// Shared handle to a staking ledger, wrapped in Arc<RwLock<>> for safe
/// concurrent access from multiple tokio tasks.
pub struct SharedLedger<T, C> {
    inner: Arc<RwLock<StakingLedger<T, C>>>,
}

impl<T, C> Clone for SharedLedger<T, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, C> SharedLedger<T, C> {
    /// Take ownership of `ledger` and share it.
    pub fn new(ledger: StakingLedger<T, C>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    /// Shared access for queries.
    pub async fn read(&self) -> RwLockReadGuard<'_, StakingLedger<T, C>> {
        self.inner.read().await
    }

    /// Exclusive access for a mutating call.
    pub async fn write(&self) -> RwLockWriteGuard<'_, StakingLedger<T, C>> {
        self.inner.write().await
    }

    /// Run `f` with exclusive access and return its result.
    pub async fn execute<R>(&self, f: impl FnOnce(&mut StakingLedger<T, C>) -> R) -> R {
        let mut guard = self.inner.write().await;
        f(&mut guard)
    }
}
