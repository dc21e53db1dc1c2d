use crate::domain::account::{Account, AccountId, Balance};
use crate::domain::entry::{EntryId, IdempotencyKey, LedgerEntry};
use crate::domain::ports::{LedgerStore, TransferTxn, UnitOfWork};
use crate::error::{Result, TransferError};
use crate::infrastructure::locks::AccountLockTable;
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Column family for account states.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column family for the append-only ledger.
pub const CF_ENTRIES: &str = "entries";
/// Column family mapping idempotency keys to committed entry ids.
pub const CF_IDEMPOTENCY: &str = "idempotency";

fn storage_err(e: impl std::fmt::Display) -> TransferError {
    TransferError::TransferFailed(e.to_string())
}

/// A persistent ledger store backed by RocksDB.
///
/// Accounts, entries, and idempotency records live in separate column
/// families; one commit is one `WriteBatch`, so readers never observe a
/// half-applied transfer. Entry keys are big-endian ids, which keeps column
/// family iteration in commit order and lets the id counter recover from
/// the last key at open.
///
/// Account exclusivity is process-local (the lock table lives in memory),
/// matching the embedded single-process deployment RocksDB targets.
///
/// `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDbLedger {
    db: Arc<DB>,
    next_entry_id: Arc<AtomicU64>,
    locks: AccountLockTable,
    // Serializes id assignment with the batch write so entry ids stay
    // monotonic in commit order.
    commit: Arc<Mutex<()>>,
}

impl RocksDbLedger {
    /// Opens or creates a ledger database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = vec![
            ColumnFamilyDescriptor::new(CF_ACCOUNTS, Options::default()),
            ColumnFamilyDescriptor::new(CF_ENTRIES, Options::default()),
            ColumnFamilyDescriptor::new(CF_IDEMPOTENCY, Options::default()),
        ];
        let db = DB::open_cf_descriptors(&opts, path, cfs).map_err(storage_err)?;

        let ledger = Self {
            db: Arc::new(db),
            next_entry_id: Arc::new(AtomicU64::new(1)),
            locks: AccountLockTable::default(),
            commit: Arc::new(Mutex::new(())),
        };
        let last = ledger.last_entry_id()?;
        ledger.next_entry_id.store(last + 1, Ordering::SeqCst);
        info!(next_entry = last + 1, "opened ledger database");
        Ok(ledger)
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| storage_err(format!("column family {name} not found")))
    }

    fn last_entry_id(&self) -> Result<u64> {
        let cf = self.cf(CF_ENTRIES)?;
        let mut iter = self.db.iterator_cf(cf, IteratorMode::End);
        match iter.next() {
            Some(item) => {
                let (key, _value) = item.map_err(storage_err)?;
                let bytes: [u8; 8] = key
                    .as_ref()
                    .try_into()
                    .map_err(|_| storage_err("malformed entry key"))?;
                Ok(u64::from_be_bytes(bytes))
            }
            None => Ok(0),
        }
    }

    fn load_account(&self, id: AccountId) -> Result<Option<Account>> {
        let cf = self.cf(CF_ACCOUNTS)?;
        match self.db.get_cf(cf, id.0.to_be_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes).map_err(storage_err)?)),
            None => Ok(None),
        }
    }

    fn load_entry(&self, id: EntryId) -> Result<Option<LedgerEntry>> {
        let cf = self.cf(CF_ENTRIES)?;
        match self.db.get_cf(cf, id.0.to_be_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes).map_err(storage_err)?)),
            None => Ok(None),
        }
    }

    fn committed_entry_for(&self, key: &IdempotencyKey) -> Result<Option<LedgerEntry>> {
        let cf = self.cf(CF_IDEMPOTENCY)?;
        let Some(bytes) = self
            .db
            .get_cf(cf, key.as_str().as_bytes())
            .map_err(storage_err)?
        else {
            return Ok(None);
        };
        let id: [u8; 8] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| storage_err("malformed idempotency record"))?;
        let entry = self.load_entry(EntryId(u64::from_be_bytes(id)))?.ok_or_else(|| {
            storage_err("idempotency record references a missing entry")
        })?;
        Ok(Some(entry))
    }
}

#[async_trait]
impl LedgerStore for RocksDbLedger {
    async fn open_account(&self, id: AccountId, opening_balance: Balance) -> Result<Account> {
        let _guards = self.locks.lock_in_order(&[id]).await;
        if self.load_account(id)?.is_some() {
            return Err(TransferError::AccountExists);
        }
        let account = Account::new(id, opening_balance);
        let cf = self.cf(CF_ACCOUNTS)?;
        let value = serde_json::to_vec(&account).map_err(storage_err)?;
        self.db
            .put_cf(cf, id.0.to_be_bytes(), value)
            .map_err(storage_err)?;
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

        if let Some(key) = idempotency_key
            && let Some(prior) = self.committed_entry_for(key)?
        {
            debug!(entry = %prior.id, "returning prior entry for repeated idempotency key");
            return Ok(prior);
        }

        let mut staged = std::collections::HashMap::new();
        for id in ids {
            if let Some(account) = self.load_account(*id)? {
                staged.insert(*id, account);
            }
        }
        let mut txn = TransferTxn::new(staged);

        let draft = work(&mut txn)?;

        let staged = txn.into_accounts();
        if staged.values().any(|a| a.balance.is_negative()) {
            return Err(TransferError::TransferFailed(
                "commit would leave a negative balance".to_string(),
            ));
        }

        let _commit = self.commit.lock().await;
        let entry = draft.into_entry(
            EntryId(self.next_entry_id.fetch_add(1, Ordering::SeqCst)),
            Utc::now(),
        );

        let mut batch = WriteBatch::default();
        let accounts_cf = self.cf(CF_ACCOUNTS)?;
        for (id, account) in &staged {
            let value = serde_json::to_vec(account).map_err(storage_err)?;
            batch.put_cf(accounts_cf, id.0.to_be_bytes(), value);
        }
        let entries_cf = self.cf(CF_ENTRIES)?;
        let value = serde_json::to_vec(&entry).map_err(storage_err)?;
        batch.put_cf(entries_cf, entry.id.0.to_be_bytes(), value);
        if let Some(key) = idempotency_key {
            let idem_cf = self.cf(CF_IDEMPOTENCY)?;
            batch.put_cf(idem_cf, key.as_str().as_bytes(), entry.id.0.to_be_bytes());
        }
        self.db.write(batch).map_err(storage_err)?;
        Ok(entry)
    }

    async fn account(&self, id: AccountId) -> Result<Option<Account>> {
        self.load_account(id)
    }

    async fn entries_for(&self, account_id: AccountId) -> Result<Vec<LedgerEntry>> {
        let cf = self.cf(CF_ENTRIES)?;
        let mut entries = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item.map_err(storage_err)?;
            let entry: LedgerEntry = serde_json::from_slice(&value).map_err(storage_err)?;
            if entry.involves(account_id) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}
