use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    PaymentPending,
    Confirmed,
    Completed,
    Cancelled,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::PaymentPending => "PAYMENT_PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(BookingStatus::Pending),
            "PAYMENT_PENDING" => Some(BookingStatus::PaymentPending),
            "CONFIRMED" => Some(BookingStatus::Confirmed),
            "COMPLETED" => Some(BookingStatus::Completed),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            "REJECTED" => Some(BookingStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "UNPAID",
            PaymentStatus::Paid => "PAID",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UNPAID" => Some(PaymentStatus::Unpaid),
            "PAID" => Some(PaymentStatus::Paid),
            _ => None,
        }
    }
}

/// A passenger's seat reservation on a trip.
///
/// `total_amount` is the settled fare inclusive of surge, promo discount and
/// tax. It is immutable after creation; refunds and adjustments go through a
/// separate path, not by rewriting the booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub passenger_id: Uuid,
    pub seats: i32,
    pub total_amount: BigDecimal,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub wallet_transaction_id: Option<Uuid>,
    pub pickup_note: Option<String>,
    pub drop_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn confirmed(
        trip_id: Uuid,
        passenger_id: Uuid,
        seats: i32,
        total_amount: BigDecimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            trip_id,
            passenger_id,
            seats,
            total_amount,
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Unpaid,
            wallet_transaction_id: None,
            pickup_note: None,
            drop_note: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmed_booking_starts_unpaid() {
        let booking = Booking::confirmed(Uuid::new_v4(), Uuid::new_v4(), 1, BigDecimal::from(200));
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.payment_status, PaymentStatus::Unpaid);
        assert!(booking.wallet_transaction_id.is_none());
    }

    #[test]
    fn payment_pending_wire_string_uses_underscore() {
        assert_eq!(BookingStatus::PaymentPending.as_str(), "PAYMENT_PENDING");
        assert_eq!(
            BookingStatus::parse("PAYMENT_PENDING"),
            Some(BookingStatus::PaymentPending)
        );
    }
}
