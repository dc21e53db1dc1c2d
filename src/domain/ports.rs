use super::account::{Account, AccountId, Balance};
use super::entry::{EntryDraft, IdempotencyKey, LedgerEntry};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Staged copies of the accounts locked by one unit of work.
///
/// The unit of work mutates these copies only; nothing is observable to
/// other callers until the store commits them. Dropping the context (on any
/// error) discards every staged change.
pub struct TransferTxn {
    accounts: HashMap<AccountId, Account>,
}

impl TransferTxn {
    pub fn new(accounts: HashMap<AccountId, Account>) -> Self {
        Self { accounts }
    }

    /// A locked account's staged state. `None` when no such account exists.
    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    pub fn account_mut(&mut self, id: AccountId) -> Option<&mut Account> {
        self.accounts.get_mut(&id)
    }

    pub fn into_accounts(self) -> HashMap<AccountId, Account> {
        self.accounts
    }
}

/// The body of an atomic unit of work. Returns the entry to append, or an
/// error that aborts the unit with no observable effect.
pub type UnitOfWork = Box<dyn FnOnce(&mut TransferTxn) -> Result<EntryDraft> + Send>;

/// Durable storage for accounts and the append-only ledger.
///
/// The store owns all persisted state. Balances are mutated exclusively
/// through `with_accounts_locked`; the read methods observe committed state
/// only and never see a half-applied transfer.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Registers a new account with an opening balance. Registration-side
    /// operation; fails with `AccountExists` on a duplicate id.
    async fn open_account(&self, id: AccountId, opening_balance: Balance) -> Result<Account>;

    /// Runs `work` with exclusive access to the named accounts and applies
    /// or discards its effects atomically.
    ///
    /// Locks are acquired in ascending id order regardless of the order of
    /// `ids`, so units touching the same accounts serialize instead of
    /// deadlocking. On `Ok` the store stamps the returned draft with an id
    /// and timestamp and commits it together with the staged balances; any
    /// `Err` leaves the store untouched.
    ///
    /// When `idempotency_key` names an already-committed unit, the prior
    /// entry is returned and `work` does not run.
    async fn with_accounts_locked(
        &self,
        ids: &[AccountId],
        idempotency_key: Option<&IdempotencyKey>,
        work: UnitOfWork,
    ) -> Result<LedgerEntry>;

    /// Committed state of an account.
    async fn account(&self, id: AccountId) -> Result<Option<Account>>;

    /// Committed entries where the account is sender or recipient, in
    /// ascending commit order.
    async fn entries_for(&self, account_id: AccountId) -> Result<Vec<LedgerEntry>>;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;
