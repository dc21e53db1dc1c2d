use crate::domain::account::AccountId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-account mutexes shared by a store's units of work.
///
/// Acquisition is strictly ascending by account id, independent of
/// sender/recipient role, so two units touching the same pair of accounts
/// from opposite directions serialize instead of deadlocking.
#[derive(Default, Clone)]
pub(crate) struct AccountLockTable {
    table: Arc<StdMutex<HashMap<AccountId, Arc<Mutex<()>>>>>,
}

impl AccountLockTable {
    /// Locks the given accounts, deduplicated, in ascending id order. The
    /// returned guards hold exclusivity until dropped.
    pub(crate) async fn lock_in_order(&self, ids: &[AccountId]) -> Vec<OwnedMutexGuard<()>> {
        let mut ordered: Vec<AccountId> = ids.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let handles: Vec<Arc<Mutex<()>>> = {
            let mut table = self.table.lock().expect("account lock table poisoned");
            ordered
                .iter()
                .map(|id| Arc::clone(table.entry(*id).or_default()))
                .collect()
        };

        let mut guards = Vec::with_capacity(handles.len());
        for handle in handles {
            guards.push(handle.lock_owned().await);
        }
        guards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_ids_lock_once() {
        let table = AccountLockTable::default();
        let guards = table
            .lock_in_order(&[AccountId(2), AccountId(1), AccountId(2)])
            .await;
        assert_eq!(guards.len(), 2);
    }

    #[tokio::test]
    async fn test_relock_after_release() {
        let table = AccountLockTable::default();
        let guards = table.lock_in_order(&[AccountId(1)]).await;
        drop(guards);
        // Must not block once the first unit released its guards.
        let again = table.lock_in_order(&[AccountId(1)]).await;
        assert_eq!(again.len(), 1);
    }
}
