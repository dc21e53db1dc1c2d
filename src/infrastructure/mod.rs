//! Storage backends implementing the `LedgerStore` port.

pub mod config;
pub mod in_memory;
mod locks;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
