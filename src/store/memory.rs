//! In-memory record store for tests and single-node development.
//!
//! A single async mutex over all tables makes every trait operation, in
//! particular the conditional ones, trivially atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    Booking, BookingStatus, Driver, PromoCode, RideRequest, RideRequestStatus, Trip, TripStatus,
    TransactionCategory, TransactionStatus, TransactionType, Wallet, WalletTransaction,
    VehicleClass,
};

use super::{DebitOutcome, RecordStore, StoreError};

#[derive(Default)]
struct Tables {
    ride_requests: HashMap<Uuid, RideRequest>,
    trips: HashMap<Uuid, Trip>,
    bookings: HashMap<Uuid, Booking>,
    wallets: HashMap<Uuid, Wallet>,
    transactions: Vec<WalletTransaction>,
    promos: HashMap<String, PromoCode>,
    drivers: HashMap<Uuid, Driver>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply_credit(wallet: &mut Wallet, amount: &BigDecimal) {
    wallet.balance = (&wallet.balance + amount).round(2);
    wallet.total_added = (&wallet.total_added + amount).round(2);
    wallet.updated_at = Utc::now();
}

fn apply_debit(wallet: &mut Wallet, amount: &BigDecimal) {
    wallet.balance = (&wallet.balance - amount).round(2);
    wallet.total_spent = (&wallet.total_spent + amount).round(2);
    wallet.updated_at = Utc::now();
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_ride_request(&self, request: &RideRequest) -> Result<(), StoreError> {
        let mut tables = self.inner.lock().await;
        tables.ride_requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn get_ride_request(&self, id: Uuid) -> Result<Option<RideRequest>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables.ride_requests.get(&id).cloned())
    }

    async fn update_ride_request_if_status(
        &self,
        request: &RideRequest,
        expected: &[RideRequestStatus],
    ) -> Result<bool, StoreError> {
        let mut tables = self.inner.lock().await;
        match tables.ride_requests.get_mut(&request.id) {
            Some(current) if expected.contains(&current.status) => {
                *current = request.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn accept_ride_request(
        &self,
        request: &RideRequest,
        trip: &Trip,
        booking: &Booking,
        expected: &[RideRequestStatus],
    ) -> Result<bool, StoreError> {
        let mut tables = self.inner.lock().await;
        let accepted = match tables.ride_requests.get(&request.id) {
            Some(current) if expected.contains(&current.status) => true,
            _ => false,
        };
        if !accepted {
            return Ok(false);
        }
        tables.ride_requests.insert(request.id, request.clone());
        tables.trips.insert(trip.id, trip.clone());
        tables.bookings.insert(booking.id, booking.clone());
        Ok(true)
    }

    async fn get_trip(&self, id: Uuid) -> Result<Option<Trip>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables.trips.get(&id).cloned())
    }

    async fn update_trip_if_status(
        &self,
        trip: &Trip,
        expected: &[TripStatus],
    ) -> Result<bool, StoreError> {
        let mut tables = self.inner.lock().await;
        match tables.trips.get_mut(&trip.id) {
            Some(current) if expected.contains(&current.status) => {
                *current = trip.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables.bookings.get(&id).cloned())
    }

    async fn upsert_booking(&self, booking: &Booking) -> Result<(), StoreError> {
        let mut tables = self.inner.lock().await;
        tables.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn list_bookings_for_trip(
        &self,
        trip_id: Uuid,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, StoreError> {
        let tables = self.inner.lock().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|b| b.trip_id == trip_id)
            .filter(|b| status.map_or(true, |s| b.status == s))
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.created_at);
        Ok(bookings)
    }

    async fn get_wallet(&self, user_id: Uuid) -> Result<Option<Wallet>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables.wallets.get(&user_id).cloned())
    }

    async fn create_wallet_if_absent(&self, user_id: Uuid) -> Result<Wallet, StoreError> {
        let mut tables = self.inner.lock().await;
        let wallet = tables
            .wallets
            .entry(user_id)
            .or_insert_with(|| Wallet::new(user_id));
        Ok(wallet.clone())
    }

    async fn credit_wallet(
        &self,
        user_id: Uuid,
        amount: &BigDecimal,
        category: TransactionCategory,
        reference_id: Option<Uuid>,
    ) -> Result<(Wallet, WalletTransaction), StoreError> {
        let mut tables = self.inner.lock().await;
        let wallet = tables
            .wallets
            .entry(user_id)
            .or_insert_with(|| Wallet::new(user_id));
        apply_credit(wallet, amount);
        let snapshot = wallet.clone();
        let transaction = WalletTransaction::completed(
            user_id,
            TransactionType::Credit,
            amount.clone(),
            snapshot.balance.clone(),
            category,
            reference_id,
        );
        tables.transactions.push(transaction.clone());
        Ok((snapshot, transaction))
    }

    async fn debit_wallet(
        &self,
        user_id: Uuid,
        amount: &BigDecimal,
        category: TransactionCategory,
        reference_id: Option<Uuid>,
    ) -> Result<DebitOutcome, StoreError> {
        let mut tables = self.inner.lock().await;
        let Some(wallet) = tables.wallets.get_mut(&user_id) else {
            return Ok(DebitOutcome::InsufficientBalance {
                available: BigDecimal::from(0),
            });
        };
        if wallet.balance < *amount {
            return Ok(DebitOutcome::InsufficientBalance {
                available: wallet.balance.clone(),
            });
        }
        apply_debit(wallet, amount);
        let snapshot = wallet.clone();
        let transaction = WalletTransaction::completed(
            user_id,
            TransactionType::Debit,
            amount.clone(),
            snapshot.balance.clone(),
            category,
            reference_id,
        );
        tables.transactions.push(transaction.clone());
        Ok(DebitOutcome::Applied {
            wallet: snapshot,
            transaction,
        })
    }

    async fn list_wallet_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WalletTransaction>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables
            .transactions
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn sum_debits_since(
        &self,
        user_id: Uuid,
        category: TransactionCategory,
        since: DateTime<Utc>,
    ) -> Result<BigDecimal, StoreError> {
        let tables = self.inner.lock().await;
        let mut total = BigDecimal::from(0);
        for t in tables.transactions.iter().filter(|t| {
            t.user_id == user_id
                && t.txn_type == TransactionType::Debit
                && t.category == category
                && t.status == TransactionStatus::Completed
                && t.created_at >= since
        }) {
            total += &t.amount;
        }
        Ok(total)
    }

    async fn get_promo(&self, code: &str) -> Result<Option<PromoCode>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables.promos.get(code).cloned())
    }

    async fn upsert_promo(&self, promo: &PromoCode) -> Result<(), StoreError> {
        let mut tables = self.inner.lock().await;
        tables.promos.insert(promo.code.clone(), promo.clone());
        Ok(())
    }

    async fn increment_promo_usage(&self, code: &str) -> Result<(), StoreError> {
        let mut tables = self.inner.lock().await;
        if let Some(promo) = tables.promos.get_mut(code) {
            promo.used_count += 1;
        }
        Ok(())
    }

    async fn upsert_driver(&self, driver: &Driver) -> Result<(), StoreError> {
        let mut tables = self.inner.lock().await;
        tables.drivers.insert(driver.id, driver.clone());
        Ok(())
    }

    async fn get_driver(&self, id: Uuid) -> Result<Option<Driver>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables.drivers.get(&id).cloned())
    }

    async fn list_available_drivers(
        &self,
        vehicle_class: VehicleClass,
    ) -> Result<Vec<Driver>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables
            .drivers
            .values()
            .filter(|d| d.available && d.vehicle_class == vehicle_class)
            .cloned()
            .collect())
    }
}
