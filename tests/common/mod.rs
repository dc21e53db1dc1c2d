use payrail::application::engine::{TransferEngine, TransferRequest};
use payrail::domain::account::{AccountId, Amount, Balance};
use payrail::domain::ports::LedgerStore;
use payrail::infrastructure::in_memory::InMemoryLedger;

pub async fn seeded_ledger(accounts: &[(u64, i64)]) -> InMemoryLedger {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let ledger = InMemoryLedger::new();
    for (id, balance) in accounts {
        ledger
            .open_account(AccountId(*id), Balance::new(*balance))
            .await
            .expect("seed account");
    }
    ledger
}

pub async fn seeded_engine(accounts: &[(u64, i64)]) -> (TransferEngine, InMemoryLedger) {
    let ledger = seeded_ledger(accounts).await;
    (TransferEngine::new(Box::new(ledger.clone())), ledger)
}

pub fn amount(minor_units: i64) -> Amount {
    Amount::from_minor_units(minor_units).expect("test amount")
}

pub fn request(sender: u64, recipient: u64, minor_units: i64) -> TransferRequest {
    TransferRequest {
        sender: AccountId(sender),
        recipient: AccountId(recipient),
        amount: amount(minor_units),
        note: None,
        idempotency_key: None,
    }
}

pub async fn balance_of(ledger: &InMemoryLedger, id: u64) -> i64 {
    ledger
        .account(AccountId(id))
        .await
        .expect("read account")
        .expect("account exists")
        .balance
        .minor_units()
}
