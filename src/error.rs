use thiserror::Error;

/// Errors surfaced by the transfer core.
///
/// The first four variants are validation failures detected before any
/// mutation; reporting them to the caller is always safe and never requires
/// a retry. `TransferFailed` wraps storage and commit faults: the unit of
/// work is guaranteed discarded, but the engine never retries on its own.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("amount must be a positive whole number of minor units")]
    InvalidAmount,
    #[error("sender and recipient must be different accounts")]
    InvalidRecipient,
    #[error("recipient account not found")]
    RecipientNotFound,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("account not found")]
    AccountNotFound,
    #[error("account already exists")]
    AccountExists,
    #[error("transfer failed: {0}")]
    TransferFailed(String),
}

pub type Result<T> = std::result::Result<T, TransferError>;
