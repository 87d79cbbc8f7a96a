mod common;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use dispatch_core::domain::{
    Booking, BookingStatus, PaymentStatus, TransactionCategory,
};

/// Drive a request through accept so the store holds a real trip and booking.
async fn accepted_trip(state: &dispatch_core::AppState, passenger: Uuid) -> (Uuid, Booking) {
    let driver = common::nearby_driver();
    state.store.upsert_driver(&driver).await.unwrap();
    let request = state
        .matcher
        .create_ride_request(common::ride_input(passenger))
        .await
        .unwrap();
    let (_, trip, booking) = state
        .matcher
        .accept_request(request.id, driver.id)
        .await
        .unwrap();
    (trip.id, booking)
}

#[tokio::test]
async fn settlement_debits_funded_passengers_and_skips_broke_ones() {
    let state = common::test_state();
    let funded = Uuid::new_v4();
    let broke = Uuid::new_v4();
    let (trip_id, funded_booking) = accepted_trip(&state, funded).await;

    // A second passenger shares the trip with a fixed-price seat.
    let broke_booking = Booking::confirmed(trip_id, broke, 1, BigDecimal::from(150));
    state.store.upsert_booking(&broke_booking).await.unwrap();

    state
        .ledger
        .credit(funded, &BigDecimal::from(10_000), TransactionCategory::Topup, None)
        .await
        .unwrap();
    state
        .ledger
        .credit(broke, &BigDecimal::from(50), TransactionCategory::Topup, None)
        .await
        .unwrap();

    let report = state.settlement.settle_trip(trip_id).await.unwrap();
    assert_eq!(report.settled, vec![funded_booking.id]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].booking_id, broke_booking.id);

    let paid = state
        .store
        .get_booking(funded_booking.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(paid.status, BookingStatus::Completed);
    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    assert!(paid.wallet_transaction_id.is_some());

    let unpaid = state
        .store
        .get_booking(broke_booking.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unpaid.status, BookingStatus::Confirmed);
    assert_eq!(unpaid.payment_status, PaymentStatus::Unpaid);

    // The broke passenger's balance is untouched.
    let wallet = state.ledger.get_or_create_wallet(broke).await.unwrap();
    assert_eq!(wallet.balance, BigDecimal::from(50));

    let wallet = state.ledger.get_or_create_wallet(funded).await.unwrap();
    assert_eq!(
        wallet.balance,
        (BigDecimal::from(10_000) - funded_booking.total_amount).round(2)
    );
}

#[tokio::test]
async fn resettling_never_charges_twice() {
    let state = common::test_state();
    let passenger = Uuid::new_v4();
    let (trip_id, booking) = accepted_trip(&state, passenger).await;
    state
        .ledger
        .credit(passenger, &BigDecimal::from(10_000), TransactionCategory::Topup, None)
        .await
        .unwrap();

    let first = state.settlement.settle_trip(trip_id).await.unwrap();
    assert_eq!(first.settled, vec![booking.id]);
    let balance_after_first = state
        .ledger
        .get_or_create_wallet(passenger)
        .await
        .unwrap()
        .balance;

    let second = state.settlement.settle_trip(trip_id).await.unwrap();
    assert!(second.settled.is_empty());
    assert!(second.skipped.is_empty());
    let balance_after_second = state
        .ledger
        .get_or_create_wallet(passenger)
        .await
        .unwrap()
        .balance;
    assert_eq!(balance_after_first, balance_after_second);
}

#[tokio::test]
async fn skipped_booking_settles_after_topup() {
    let state = common::test_state();
    let passenger = Uuid::new_v4();
    let (trip_id, booking) = accepted_trip(&state, passenger).await;

    let report = state.settlement.settle_trip(trip_id).await.unwrap();
    assert!(report.settled.is_empty());
    assert_eq!(report.skipped.len(), 1);

    state
        .ledger
        .credit(passenger, &BigDecimal::from(10_000), TransactionCategory::Topup, None)
        .await
        .unwrap();
    let retry = state.settlement.settle_trip(trip_id).await.unwrap();
    assert_eq!(retry.settled, vec![booking.id]);
}
