use super::account::{AccountId, Amount};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger entry identifier, assigned by the store at commit.
/// Strictly monotonic in commit order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Settlement state of a ledger entry.
///
/// Every entry this core persists is `Completed`. `Pending` and `Failed`
/// are reserved for a staged-settlement flow that does not exist yet; no
/// code path here may produce them, and a half-applied transfer must never
/// become visible under either state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Pending,
    Completed,
    Failed,
}

/// One committed movement of funds between two accounts.
///
/// Immutable once committed: the store never rewrites an entry and never
/// hands out mutable references to one. Corrections are new transfers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub sender: AccountId,
    pub recipient: AccountId,
    pub amount: Amount,
    pub note: Option<String>,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn involves(&self, account_id: AccountId) -> bool {
        self.sender == account_id || self.recipient == account_id
    }
}

/// The pre-commit shape of a ledger entry. The store assigns the id and
/// timestamp when the unit of work commits.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub sender: AccountId,
    pub recipient: AccountId,
    pub amount: Amount,
    pub note: Option<String>,
    pub status: EntryStatus,
}

impl EntryDraft {
    pub fn completed(
        sender: AccountId,
        recipient: AccountId,
        amount: Amount,
        note: Option<String>,
    ) -> Self {
        Self {
            sender,
            recipient,
            amount,
            note,
            status: EntryStatus::Completed,
        }
    }

    pub fn into_entry(self, id: EntryId, created_at: DateTime<Utc>) -> LedgerEntry {
        LedgerEntry {
            id,
            sender: self.sender,
            recipient: self.recipient,
            amount: self.amount,
            note: self.note,
            status: self.status,
            created_at,
        }
    }
}

/// Caller-chosen key identifying one logical transfer request across
/// retries. A replayed key returns the originally committed entry instead
/// of moving funds again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IdempotencyKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}
