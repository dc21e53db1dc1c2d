mod common;

use common::{request, seeded_engine};
use payrail::TransferError;
use payrail::application::balance::BalanceQuery;
use payrail::application::history::{Direction, HistoryProjection};
use payrail::domain::account::{AccountId, Balance};
use payrail::domain::entry::EntryId;

#[tokio::test]
async fn test_one_entry_appears_as_debit_and_credit() {
    let (engine, ledger) = seeded_engine(&[(1, 10_000), (2, 0)]).await;
    let history = HistoryProjection::new(Box::new(ledger.clone()));

    let mut req = request(1, 2, 500);
    req.note = Some("lunch".to_string());
    engine.transfer(req).await.unwrap();

    let sender_view: Vec<_> = history.history(AccountId(1)).await.unwrap().collect();
    let recipient_view: Vec<_> = history.history(AccountId(2)).await.unwrap().collect();
    assert_eq!(sender_view.len(), 1);
    assert_eq!(recipient_view.len(), 1);

    let debit = &sender_view[0];
    let credit = &recipient_view[0];
    assert_eq!(debit.direction, Direction::Debit);
    assert_eq!(debit.other_party, AccountId(2));
    assert_eq!(credit.direction, Direction::Credit);
    assert_eq!(credit.other_party, AccountId(1));

    // Both views project the same committed record.
    assert_eq!(debit.id, credit.id);
    assert_eq!(debit.amount, credit.amount);
    assert_eq!(debit.note, credit.note);
    assert_eq!(debit.created_at, credit.created_at);
    assert_eq!(debit.note.as_deref(), Some("lunch"));
}

#[tokio::test]
async fn test_history_is_newest_first() {
    let (engine, ledger) = seeded_engine(&[(1, 10_000), (2, 10_000)]).await;
    let history = HistoryProjection::new(Box::new(ledger.clone()));

    engine.transfer(request(1, 2, 100)).await.unwrap();
    engine.transfer(request(2, 1, 200)).await.unwrap();
    engine.transfer(request(1, 2, 300)).await.unwrap();

    let ids: Vec<EntryId> = history
        .history(AccountId(1))
        .await
        .unwrap()
        .map(|view| view.id)
        .collect();
    assert_eq!(ids, vec![EntryId(3), EntryId(2), EntryId(1)]);
}

#[tokio::test]
async fn test_uninvolved_account_sees_nothing() {
    let (engine, ledger) = seeded_engine(&[(1, 1_000), (2, 0), (3, 0)]).await;
    let history = HistoryProjection::new(Box::new(ledger.clone()));

    engine.transfer(request(1, 2, 400)).await.unwrap();

    assert_eq!(history.history(AccountId(3)).await.unwrap().count(), 0);
}

#[tokio::test]
async fn test_history_is_restartable() {
    let (engine, ledger) = seeded_engine(&[(1, 1_000), (2, 0)]).await;
    let history = HistoryProjection::new(Box::new(ledger.clone()));

    engine.transfer(request(1, 2, 400)).await.unwrap();

    let first: Vec<_> = history.history(AccountId(1)).await.unwrap().collect();
    let second: Vec<_> = history.history(AccountId(1)).await.unwrap().collect();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_history_of_unknown_account_fails() {
    let (_engine, ledger) = seeded_engine(&[(1, 1_000)]).await;
    let history = HistoryProjection::new(Box::new(ledger.clone()));

    let result = history.history(AccountId(42)).await;
    assert!(matches!(result, Err(TransferError::AccountNotFound)));
}

#[tokio::test]
async fn test_balances_reflect_committed_state_with_zero_pending() {
    let (engine, ledger) = seeded_engine(&[(1, 10_000), (2, 0)]).await;
    let query = BalanceQuery::new(Box::new(ledger.clone()));

    engine.transfer(request(1, 2, 2_500)).await.unwrap();

    let sender = query.balances(AccountId(1)).await.unwrap();
    let recipient = query.balances(AccountId(2)).await.unwrap();
    assert_eq!(sender.available, Balance::new(7_500));
    assert_eq!(recipient.available, Balance::new(2_500));
    // Entries commit as completed, so nothing is ever pending here.
    assert_eq!(sender.pending, Balance::ZERO);
    assert_eq!(recipient.pending, Balance::ZERO);
}

#[tokio::test]
async fn test_balances_of_unknown_account_fails() {
    let (_engine, ledger) = seeded_engine(&[(1, 1_000)]).await;
    let query = BalanceQuery::new(Box::new(ledger));

    let result = query.balances(AccountId(42)).await;
    assert!(matches!(result, Err(TransferError::AccountNotFound)));
}
