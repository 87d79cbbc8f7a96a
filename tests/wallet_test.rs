mod common;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use dispatch_core::domain::{TransactionCategory, TransactionType};
use dispatch_core::error::CoreError;

#[tokio::test]
async fn concurrent_debits_cannot_overdraw() {
    let state = common::test_state();
    let user = Uuid::new_v4();
    state
        .ledger
        .credit(user, &BigDecimal::from(100), TransactionCategory::Topup, None)
        .await
        .unwrap();

    let first = {
        let ledger = state.ledger.clone();
        tokio::spawn(async move {
            ledger
                .debit(user, &BigDecimal::from(60), TransactionCategory::Ride, None)
                .await
        })
    };
    let second = {
        let ledger = state.ledger.clone();
        tokio::spawn(async move {
            ledger
                .debit(user, &BigDecimal::from(60), TransactionCategory::Ride, None)
                .await
        })
    };

    let first = first.await.unwrap();
    let second = second.await.unwrap();
    assert!(
        first.is_ok() != second.is_ok(),
        "exactly one of two racing debits must win"
    );
    let loser = if first.is_ok() { second } else { first };
    assert!(matches!(
        loser,
        Err(CoreError::InsufficientBalance { .. })
    ));

    let wallet = state.ledger.get_or_create_wallet(user).await.unwrap();
    assert_eq!(wallet.balance, BigDecimal::from(40));
    assert_eq!(wallet.total_spent, BigDecimal::from(60));
}

#[tokio::test]
async fn history_records_both_sides_of_the_ledger() {
    let state = common::test_state();
    let user = Uuid::new_v4();

    state
        .ledger
        .credit(user, &BigDecimal::from(300), TransactionCategory::Topup, None)
        .await
        .unwrap();
    state
        .ledger
        .debit(user, &BigDecimal::from(120), TransactionCategory::Ride, None)
        .await
        .unwrap();

    let history = state.ledger.transactions(user, None, None).await.unwrap();
    assert_eq!(history.len(), 2);
    // Newest first.
    assert_eq!(history[0].txn_type, TransactionType::Debit);
    assert_eq!(history[0].balance_after, BigDecimal::from(180));
    assert_eq!(history[1].txn_type, TransactionType::Credit);
    assert_eq!(history[1].balance_after, BigDecimal::from(300));
}

#[tokio::test]
async fn balance_is_never_driven_negative_by_many_small_debits() {
    let state = common::test_state();
    let user = Uuid::new_v4();
    state
        .ledger
        .credit(user, &BigDecimal::from(50), TransactionCategory::Topup, None)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let ledger = state.ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger
                .debit(user, &BigDecimal::from(15), TransactionCategory::Ride, None)
                .await
                .is_ok()
        }));
    }
    let mut wins = 0;
    for handle in handles {
        if handle.await.unwrap() {
            wins += 1;
        }
    }
    assert_eq!(wins, 3, "only three debits of 15 fit in a balance of 50");

    let wallet = state.ledger.get_or_create_wallet(user).await.unwrap();
    assert_eq!(wallet.balance, BigDecimal::from(5));
}
