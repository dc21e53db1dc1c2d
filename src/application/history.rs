use crate::domain::account::{AccountId, Amount};
use crate::domain::entry::{EntryId, EntryStatus, LedgerEntry};
use crate::domain::ports::LedgerStoreBox;
use crate::error::{Result, TransferError};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Direction of a ledger entry relative to the viewing account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Debit,
    Credit,
}

/// One ledger entry as seen from a specific account: outgoing entries are
/// debits against the recipient, incoming entries credits from the sender.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewEntry {
    pub id: EntryId,
    pub direction: Direction,
    pub other_party: AccountId,
    pub amount: Amount,
    pub note: Option<String>,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
}

impl ViewEntry {
    fn for_viewer(viewer: AccountId, entry: LedgerEntry) -> Option<Self> {
        let (direction, other_party) = if entry.sender == viewer {
            (Direction::Debit, entry.recipient)
        } else if entry.recipient == viewer {
            (Direction::Credit, entry.sender)
        } else {
            return None;
        };
        Some(Self {
            id: entry.id,
            direction,
            other_party,
            amount: entry.amount,
            note: entry.note,
            status: entry.status,
            created_at: entry.created_at,
        })
    }
}

/// Lazy iterator over an account's history, newest first.
pub struct HistoryIter {
    viewer: AccountId,
    entries: std::vec::IntoIter<LedgerEntry>,
}

impl Iterator for HistoryIter {
    type Item = ViewEntry;

    fn next(&mut self) -> Option<ViewEntry> {
        loop {
            let entry = self.entries.next()?;
            if let Some(view) = ViewEntry::for_viewer(self.viewer, entry) {
                return Some(view);
            }
        }
    }
}

/// Projects committed ledger entries into caller-perspective views.
/// Purely read-side; no call here has any effect on store state.
pub struct HistoryProjection {
    store: LedgerStoreBox,
}

impl HistoryProjection {
    pub fn new(store: LedgerStoreBox) -> Self {
        Self { store }
    }

    /// The account's entries, newest first by `created_at` (ties broken by
    /// descending id). Each call snapshots committed state and returns a
    /// fresh, finite iterator.
    pub async fn history(&self, account_id: AccountId) -> Result<HistoryIter> {
        if self.store.account(account_id).await?.is_none() {
            return Err(TransferError::AccountNotFound);
        }

        let mut entries = self.store.entries_for(account_id).await?;
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(HistoryIter {
            viewer: account_id,
            entries: entries.into_iter(),
        })
    }
}
