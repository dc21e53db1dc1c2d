use crate::domain::ports::LedgerStoreBox;
use crate::error::Result;
use crate::infrastructure::in_memory::InMemoryLedger;
#[cfg(feature = "storage-rocksdb")]
use crate::infrastructure::rocksdb::RocksDbLedger;
use serde::Deserialize;
use std::path::PathBuf;

/// Store selection for the composition root.
///
/// The root builds the store once at process start and injects boxed
/// handles into the services; shutdown drops the last handle. The engine
/// itself never constructs or owns a backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Filesystem path for the persistent store. In-memory when unset.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self { db_path: None }
    }

    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Some(path.into()),
        }
    }

    pub fn build(&self) -> Result<LedgerStoreBox> {
        match &self.db_path {
            None => Ok(Box::new(InMemoryLedger::new())),
            #[cfg(feature = "storage-rocksdb")]
            Some(path) => Ok(Box::new(RocksDbLedger::open(path)?)),
            #[cfg(not(feature = "storage-rocksdb"))]
            Some(path) => Err(crate::error::TransferError::TransferFailed(format!(
                "persistent store at {} requires the storage-rocksdb feature",
                path.display()
            ))),
        }
    }
}
