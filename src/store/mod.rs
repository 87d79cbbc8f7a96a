//! Record store contracts.
//!
//! The core talks to durable storage only through [`RecordStore`]. Two
//! implementations are provided: [`MemoryStore`] for tests and single-node
//! development, and [`PgStore`] backed by Postgres. The conditional
//! operations (`update_*_if_status`, `accept_ride_request`, `debit_wallet`)
//! are the compare-and-set primitives the matcher and ledger rely on.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Booking, BookingStatus, Driver, PromoCode, RideRequest, RideRequestStatus, Trip, TripStatus,
    TransactionCategory, Wallet, WalletTransaction, VehicleClass,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

/// Result of a conditional wallet debit.
#[derive(Debug)]
pub enum DebitOutcome {
    Applied {
        wallet: Wallet,
        transaction: WalletTransaction,
    },
    InsufficientBalance {
        available: BigDecimal,
    },
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    // Ride requests
    async fn insert_ride_request(&self, request: &RideRequest) -> Result<(), StoreError>;
    async fn get_ride_request(&self, id: Uuid) -> Result<Option<RideRequest>, StoreError>;
    /// Replace the stored request only if its current status is one of
    /// `expected`. Returns whether the update was applied.
    async fn update_ride_request_if_status(
        &self,
        request: &RideRequest,
        expected: &[RideRequestStatus],
    ) -> Result<bool, StoreError>;
    /// Compound conditional acceptance: persist the trip and booking and move
    /// the request to ACCEPTED as one atomic unit, only if the request status
    /// is still one of `expected`. Exactly one of two racing acceptances can
    /// observe `true`.
    async fn accept_ride_request(
        &self,
        request: &RideRequest,
        trip: &Trip,
        booking: &Booking,
        expected: &[RideRequestStatus],
    ) -> Result<bool, StoreError>;

    // Trips
    async fn get_trip(&self, id: Uuid) -> Result<Option<Trip>, StoreError>;
    async fn update_trip_if_status(
        &self,
        trip: &Trip,
        expected: &[TripStatus],
    ) -> Result<bool, StoreError>;

    // Bookings
    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;
    async fn upsert_booking(&self, booking: &Booking) -> Result<(), StoreError>;
    async fn list_bookings_for_trip(
        &self,
        trip_id: Uuid,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, StoreError>;

    // Wallets
    async fn get_wallet(&self, user_id: Uuid) -> Result<Option<Wallet>, StoreError>;
    async fn create_wallet_if_absent(&self, user_id: Uuid) -> Result<Wallet, StoreError>;
    /// Increase the balance and append the completed credit transaction
    /// atomically, creating the wallet if needed.
    async fn credit_wallet(
        &self,
        user_id: Uuid,
        amount: &BigDecimal,
        category: TransactionCategory,
        reference_id: Option<Uuid>,
    ) -> Result<(Wallet, WalletTransaction), StoreError>;
    /// Decrease the balance and append the completed debit transaction
    /// atomically, only if the balance covers the amount. Two concurrent
    /// debits never both succeed when their sum exceeds the balance.
    async fn debit_wallet(
        &self,
        user_id: Uuid,
        amount: &BigDecimal,
        category: TransactionCategory,
        reference_id: Option<Uuid>,
    ) -> Result<DebitOutcome, StoreError>;
    /// Newest first.
    async fn list_wallet_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WalletTransaction>, StoreError>;
    /// Total of completed debits in a category since `since`, for spend-limit
    /// checks.
    async fn sum_debits_since(
        &self,
        user_id: Uuid,
        category: TransactionCategory,
        since: DateTime<Utc>,
    ) -> Result<BigDecimal, StoreError>;

    // Promo codes
    async fn get_promo(&self, code: &str) -> Result<Option<PromoCode>, StoreError>;
    async fn upsert_promo(&self, promo: &PromoCode) -> Result<(), StoreError>;
    async fn increment_promo_usage(&self, code: &str) -> Result<(), StoreError>;

    // Drivers
    async fn upsert_driver(&self, driver: &Driver) -> Result<(), StoreError>;
    async fn get_driver(&self, id: Uuid) -> Result<Option<Driver>, StoreError>;
    async fn list_available_drivers(
        &self,
        vehicle_class: VehicleClass,
    ) -> Result<Vec<Driver>, StoreError>;
}
