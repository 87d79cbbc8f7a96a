use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ride_request::VehicleClass;
use crate::geo::Coordinates;

/// A driver known to the matcher: availability, vehicle class and the last
/// reported position used for radius search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub vehicle_class: VehicleClass,
    pub available: bool,
    pub organization_id: Option<Uuid>,
    pub location: Coordinates,
    pub updated_at: DateTime<Utc>,
}

impl Driver {
    pub fn new(
        name: String,
        vehicle_class: VehicleClass,
        location: Coordinates,
        organization_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            vehicle_class,
            available: true,
            organization_id,
            location,
            updated_at: Utc::now(),
        }
    }
}
