use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Upcoming => "UPCOMING",
            TripStatus::Ongoing => "ONGOING",
            TripStatus::Completed => "COMPLETED",
            TripStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UPCOMING" => Some(TripStatus::Upcoming),
            "ONGOING" => Some(TripStatus::Ongoing),
            "COMPLETED" => Some(TripStatus::Completed),
            "CANCELLED" => Some(TripStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TripStatus::Completed | TripStatus::Cancelled)
    }
}

/// A driver-owned journey, created when a ride request is accepted.
/// Terminal once COMPLETED or CANCELLED.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub pickup: Coordinates,
    pub drop: Coordinates,
    pub distance_km: f64,
    pub duration_min: f64,
    pub price_per_seat: BigDecimal,
    pub total_seats: i32,
    pub seats_available: i32,
    pub status: TripStatus,
    pub route_polyline: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        driver_id: Uuid,
        pickup: Coordinates,
        drop: Coordinates,
        distance_km: f64,
        duration_min: f64,
        price_per_seat: BigDecimal,
        total_seats: i32,
        seats_booked: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            driver_id,
            pickup,
            drop,
            distance_km,
            duration_min,
            price_per_seat,
            total_seats,
            seats_available: (total_seats - seats_booked).max(0),
            status: TripStatus::Upcoming,
            route_polyline: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trip_is_upcoming_with_remaining_seats() {
        let trip = Trip::new(
            Uuid::new_v4(),
            Coordinates::new(12.97, 77.59),
            Coordinates::new(12.92, 77.61),
            6.5,
            18.0,
            BigDecimal::from(180),
            4,
            1,
        );
        assert_eq!(trip.status, TripStatus::Upcoming);
        assert_eq!(trip.seats_available, 3);
        assert!(!trip.status.is_terminal());
    }
}
