use crate::domain::account::{AccountId, Balance};
use crate::domain::entry::{EntryStatus, LedgerEntry};
use crate::domain::ports::LedgerStoreBox;
use crate::error::{Result, TransferError};

/// Committed and incoming-but-unsettled funds for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balances {
    pub available: Balance,
    pub pending: Balance,
}

/// Read-side view over committed store state.
pub struct BalanceQuery {
    store: LedgerStoreBox,
}

impl BalanceQuery {
    pub fn new(store: LedgerStoreBox) -> Self {
        Self { store }
    }

    /// `available` is the committed balance. `pending` sums entries where
    /// the account is recipient and settlement has not completed. Always
    /// zero today, since the engine only ever commits completed entries;
    /// the field is reserved for a staged-settlement flow.
    pub async fn balances(&self, account_id: AccountId) -> Result<Balances> {
        let account = self
            .store
            .account(account_id)
            .await?
            .ok_or(TransferError::AccountNotFound)?;
        let entries = self.store.entries_for(account_id).await?;

        Ok(Balances {
            available: account.balance,
            pending: pending_total(account_id, &entries),
        })
    }
}

fn pending_total(recipient: AccountId, entries: &[LedgerEntry]) -> Balance {
    entries
        .iter()
        .filter(|e| e.recipient == recipient && e.status == EntryStatus::Pending)
        .fold(Balance::ZERO, |total, e| total + Balance::from(e.amount))
}
