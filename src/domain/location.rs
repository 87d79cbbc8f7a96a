use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinates;

/// A single driver position report on a trip's live stream. Transient: only
/// the most recent sample per trip matters for proximity checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveLocationSample {
    pub trip_id: Uuid,
    pub driver_id: Uuid,
    pub position: Coordinates,
    pub heading: f64,
    pub speed_kmh: f64,
    pub recorded_at: DateTime<Utc>,
}

impl LiveLocationSample {
    /// Position in range and speed/heading finite. Malformed samples are
    /// dropped by the geofence monitor rather than crashing tracking.
    pub fn is_well_formed(&self) -> bool {
        self.position.is_valid() && self.speed_kmh.is_finite() && self.heading.is_finite()
    }
}
