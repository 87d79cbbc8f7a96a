//! Trip settlement: auto-debit every confirmed booking of a completed trip.
//!
//! Settlement is best-effort per booking. A booking whose debit is refused
//! (auto-pay gate, spend limit, insufficient balance) stays CONFIRMED and
//! UNPAID and is reported as skipped; it never blocks the other bookings.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::{AutoPayConfig, SpendDomain};
use crate::domain::{Booking, BookingStatus, PaymentStatus, TransactionCategory};
use crate::error::CoreError;
use crate::store::RecordStore;

use super::ledger::WalletLedger;
use super::notify::Notifier;

#[derive(Debug, Clone, Serialize)]
pub struct SkippedBooking {
    pub booking_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettlementReport {
    pub trip_id: Uuid,
    pub settled: Vec<Uuid>,
    pub skipped: Vec<SkippedBooking>,
}

pub struct SettlementEngine {
    store: Arc<dyn RecordStore>,
    ledger: Arc<WalletLedger>,
    autopay: AutoPayConfig,
    notifier: Arc<dyn Notifier>,
}

impl SettlementEngine {
    pub fn new(
        store: Arc<dyn RecordStore>,
        ledger: Arc<WalletLedger>,
        autopay: AutoPayConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            ledger,
            autopay,
            notifier,
        }
    }

    /// Settle every confirmed booking on the trip. Idempotent: bookings
    /// already COMPLETED are not listed and are never charged twice.
    pub async fn settle_trip(&self, trip_id: Uuid) -> Result<SettlementReport, CoreError> {
        let trip = self
            .store
            .get_trip(trip_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("trip {}", trip_id)))?;

        let bookings = self
            .store
            .list_bookings_for_trip(trip.id, Some(BookingStatus::Confirmed))
            .await?;

        let mut report = SettlementReport {
            trip_id: trip.id,
            settled: Vec::new(),
            skipped: Vec::new(),
        };

        for booking in bookings {
            match self.settle_booking(&booking).await {
                Ok(()) => report.settled.push(booking.id),
                Err(e @ (CoreError::InsufficientBalance { .. } | CoreError::AutoPayDisabled(_))) => {
                    warn!(
                        booking_id = %booking.id,
                        passenger_id = %booking.passenger_id,
                        reason = %e,
                        "booking left unsettled"
                    );
                    report.skipped.push(SkippedBooking {
                        booking_id: booking.id,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    error!(booking_id = %booking.id, error = %e, "settlement failed for booking");
                    report.skipped.push(SkippedBooking {
                        booking_id: booking.id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            %trip_id,
            settled = report.settled.len(),
            skipped = report.skipped.len(),
            "trip settlement finished"
        );
        Ok(report)
    }

    async fn settle_booking(&self, booking: &Booking) -> Result<(), CoreError> {
        self.check_autopay(booking).await?;

        let (_, transaction) = self
            .ledger
            .debit(
                booking.passenger_id,
                &booking.total_amount,
                TransactionCategory::Ride,
                Some(booking.id),
            )
            .await?;

        let mut settled = booking.clone();
        settled.status = BookingStatus::Completed;
        settled.payment_status = PaymentStatus::Paid;
        settled.wallet_transaction_id = Some(transaction.id);
        settled.updated_at = Utc::now();
        self.store.upsert_booking(&settled).await?;

        self.notifier
            .notify(
                booking.passenger_id,
                "Ride payment complete",
                &format!("₹{} was debited from your wallet", booking.total_amount),
                json!({
                    "booking_id": booking.id,
                    "transaction_id": transaction.id,
                    "amount": booking.total_amount,
                }),
            )
            .await;

        Ok(())
    }

    /// The auto-pay gates, checked in order: global switch, ride-category
    /// switch, then the rolling daily/weekly/monthly spend limits.
    async fn check_autopay(&self, booking: &Booking) -> Result<(), CoreError> {
        if !self.autopay.allows(SpendDomain::Ride) {
            return Err(CoreError::AutoPayDisabled(
                "auto-pay is switched off for rides".to_string(),
            ));
        }

        let windows = [
            ("daily", &self.autopay.daily_limit, Duration::days(1)),
            ("weekly", &self.autopay.weekly_limit, Duration::days(7)),
            ("monthly", &self.autopay.monthly_limit, Duration::days(30)),
        ];
        let now = Utc::now();
        for (name, limit, window) in windows {
            let Some(limit) = limit else { continue };
            let spent = self
                .store
                .sum_debits_since(booking.passenger_id, TransactionCategory::Ride, now - window)
                .await?;
            if &spent + &booking.total_amount > *limit {
                return Err(CoreError::AutoPayDisabled(format!(
                    "{} ride spend limit of {} would be exceeded",
                    name, limit
                )));
            }
        }

        Ok(())
    }
}
