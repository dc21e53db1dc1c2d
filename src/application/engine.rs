use crate::domain::account::{AccountId, Amount};
use crate::domain::entry::{EntryDraft, IdempotencyKey, LedgerEntry};
use crate::domain::ports::{LedgerStoreBox, UnitOfWork};
use crate::error::{Result, TransferError};
use tracing::{debug, info};

/// One transfer as presented by the request boundary.
///
/// `sender` is the authenticated caller's account id; the boundary
/// establishes that identity and the engine does not re-derive it. `amount`
/// is already validated by construction. The optional `idempotency_key`
/// makes the request safe to resubmit after a timeout.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub sender: AccountId,
    pub recipient: AccountId,
    pub amount: Amount,
    pub note: Option<String>,
    pub idempotency_key: Option<IdempotencyKey>,
}

/// Orchestrates a transfer as one atomic unit: validation, both balance
/// mutations, and the ledger entry commit together or not at all.
///
/// The store handle is injected at construction; its lifecycle belongs to
/// the composition root.
pub struct TransferEngine {
    store: LedgerStoreBox,
}

impl TransferEngine {
    pub fn new(store: LedgerStoreBox) -> Self {
        Self { store }
    }

    /// Moves `amount` from sender to recipient, recording the movement
    /// exactly once.
    ///
    /// On any failure nothing is persisted: no partial balance change, no
    /// orphan entry. Storage faults surface as `TransferFailed` without
    /// retry; resubmission is the caller's decision and is safe when the
    /// request carries an idempotency key.
    pub async fn transfer(&self, request: TransferRequest) -> Result<LedgerEntry> {
        let TransferRequest {
            sender,
            recipient,
            amount,
            note,
            idempotency_key,
        } = request;

        if sender == recipient {
            debug!(%sender, "rejected self-transfer");
            return Err(TransferError::InvalidRecipient);
        }

        let work: UnitOfWork = Box::new(move |txn| {
            // The balance check precedes the recipient lookup; an
            // underfunded transfer fails the same way whether or not the
            // recipient exists.
            let src = txn.account_mut(sender).ok_or_else(|| {
                TransferError::TransferFailed(format!("sender account {sender} is missing"))
            })?;
            src.debit(amount)?;

            let dst = txn
                .account_mut(recipient)
                .ok_or(TransferError::RecipientNotFound)?;
            dst.credit(amount)?;

            Ok(EntryDraft::completed(sender, recipient, amount, note))
        });

        let result = self
            .store
            .with_accounts_locked(&[sender, recipient], idempotency_key.as_ref(), work)
            .await;

        match &result {
            Ok(entry) => {
                info!(entry = %entry.id, %sender, %recipient, %amount, "transfer committed");
            }
            Err(err) => {
                debug!(%sender, %recipient, %amount, error = %err, "transfer aborted");
            }
        }
        result
    }
}
