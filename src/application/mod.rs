//! Application services orchestrating the ledger store.
//!
//! `TransferEngine` is the single write path; `BalanceQuery` and
//! `HistoryProjection` are read-side transforms over committed state.

pub mod balance;
pub mod engine;
pub mod history;
