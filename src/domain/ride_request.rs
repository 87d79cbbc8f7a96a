//! Ride request entity and its matching state machine states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::fare::FareBreakdown;
use crate::geo::Coordinates;

/// Vehicle classes a passenger can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    Bike,
    Auto,
    Car,
    Suv,
}

impl VehicleClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleClass::Bike => "bike",
            VehicleClass::Auto => "auto",
            VehicleClass::Car => "car",
            VehicleClass::Suv => "suv",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bike" => Some(VehicleClass::Bike),
            "auto" => Some(VehicleClass::Auto),
            "car" => Some(VehicleClass::Car),
            "suv" => Some(VehicleClass::Suv),
            _ => None,
        }
    }

    /// Passenger seats offered by a vehicle of this class.
    pub fn seat_capacity(&self) -> i32 {
        match self {
            VehicleClass::Bike => 1,
            VehicleClass::Auto => 3,
            VehicleClass::Car => 4,
            VehicleClass::Suv => 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideRequestStatus {
    Pending,
    Searching,
    Matched,
    Accepted,
    Completed,
    Expired,
    Cancelled,
}

impl RideRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideRequestStatus::Pending => "PENDING",
            RideRequestStatus::Searching => "SEARCHING",
            RideRequestStatus::Matched => "MATCHED",
            RideRequestStatus::Accepted => "ACCEPTED",
            RideRequestStatus::Completed => "COMPLETED",
            RideRequestStatus::Expired => "EXPIRED",
            RideRequestStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(RideRequestStatus::Pending),
            "SEARCHING" => Some(RideRequestStatus::Searching),
            "MATCHED" => Some(RideRequestStatus::Matched),
            "ACCEPTED" => Some(RideRequestStatus::Accepted),
            "COMPLETED" => Some(RideRequestStatus::Completed),
            "EXPIRED" => Some(RideRequestStatus::Expired),
            "CANCELLED" => Some(RideRequestStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RideRequestStatus::Completed
                | RideRequestStatus::Expired
                | RideRequestStatus::Cancelled
        )
    }
}

/// A passenger's solicitation for a driver match, prior to trip creation.
///
/// Invariant: `driver_id` is set iff status is MATCHED or ACCEPTED;
/// `trip_id` is set iff status is ACCEPTED (or later COMPLETED).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideRequest {
    pub id: Uuid,
    pub passenger_id: Uuid,
    pub pickup: Coordinates,
    pub pickup_label: String,
    pub drop: Coordinates,
    pub drop_label: String,
    pub vehicle_class: VehicleClass,
    pub quoted_fare: FareBreakdown,
    pub distance_km: f64,
    pub duration_min: f64,
    pub status: RideRequestStatus,
    pub driver_id: Option<Uuid>,
    pub trip_id: Option<Uuid>,
    pub promo_code: Option<String>,
    pub surge_multiplier: f64,
    pub org_restricted: bool,
    pub organization_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub matched_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}
