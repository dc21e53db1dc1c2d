use crate::domain::account::{Account, AccountId, Balance};
use crate::domain::entry::{EntryId, IdempotencyKey, LedgerEntry};
use crate::domain::ports::{LedgerStore, TransferTxn, UnitOfWork};
use crate::error::{Result, TransferError};
use crate::infrastructure::locks::AccountLockTable;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct State {
    accounts: HashMap<AccountId, Account>,
    entries: Vec<LedgerEntry>,
    idempotency: HashMap<IdempotencyKey, EntryId>,
}

/// A thread-safe in-memory ledger store.
///
/// All committed state lives behind one `RwLock`, so readers observe a
/// commit either entirely or not at all. Conflicting units of work are
/// serialized by the per-account lock table; the state lock itself is held
/// only for the snapshot read and the final commit write, never while a
/// unit of work executes.
///
/// `Clone` shares the underlying state. Ideal for tests and single-process
/// deployments where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    state: Arc<RwLock<State>>,
    locks: AccountLockTable,
}

impl InMemoryLedger {
    /// Creates a new, empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn open_account(&self, id: AccountId, opening_balance: Balance) -> Result<Account> {
        let mut state = self.state.write().await;
        if state.accounts.contains_key(&id) {
            return Err(TransferError::AccountExists);
        }
        let account = Account::new(id, opening_balance);
        state.accounts.insert(id, account.clone());
        debug!(%id, %opening_balance, "opened account");
        Ok(account)
    }

    async fn with_accounts_locked(
        &self,
        ids: &[AccountId],
        idempotency_key: Option<&IdempotencyKey>,
        work: UnitOfWork,
    ) -> Result<LedgerEntry> {
        let _guards = self.locks.lock_in_order(ids).await;

        let mut txn = {
            let state = self.state.read().await;

            if let Some(key) = idempotency_key
                && let Some(entry_id) = state.idempotency.get(key)
            {
                let prior = state
                    .entries
                    .get((entry_id.0 - 1) as usize)
                    .cloned()
                    .ok_or_else(|| {
                        TransferError::TransferFailed(
                            "idempotency record references a missing entry".to_string(),
                        )
                    })?;
                debug!(entry = %prior.id, "returning prior entry for repeated idempotency key");
                return Ok(prior);
            }

            let staged = ids
                .iter()
                .filter_map(|id| state.accounts.get(id).map(|a| (*id, a.clone())))
                .collect();
            TransferTxn::new(staged)
        };

        let draft = work(&mut txn)?;

        let staged = txn.into_accounts();
        if staged.values().any(|a| a.balance.is_negative()) {
            return Err(TransferError::TransferFailed(
                "commit would leave a negative balance".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        let entry = draft.into_entry(EntryId(state.entries.len() as u64 + 1), Utc::now());
        for (id, account) in staged {
            state.accounts.insert(id, account);
        }
        if let Some(key) = idempotency_key {
            state.idempotency.insert(key.clone(), entry.id);
        }
        state.entries.push(entry.clone());
        Ok(entry)
    }

    async fn account(&self, id: AccountId) -> Result<Option<Account>> {
        let state = self.state.read().await;
        Ok(state.accounts.get(&id).cloned())
    }

    async fn entries_for(&self, account_id: AccountId) -> Result<Vec<LedgerEntry>> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .iter()
            .filter(|e| e.involves(account_id))
            .cloned()
            .collect())
    }
}
