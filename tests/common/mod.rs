#![allow(dead_code)]

use std::sync::Arc;

use uuid::Uuid;

use dispatch_core::config::{AutoPayConfig, Config};
use dispatch_core::domain::{Driver, VehicleClass};
use dispatch_core::geo::Coordinates;
use dispatch_core::services::{LogNotifier, RideRequestInput};
use dispatch_core::store::{MemoryStore, RecordStore};
use dispatch_core::AppState;

pub fn test_config() -> Config {
    Config {
        server_port: 0,
        database_url: None,
        notify_webhook_url: None,
        arrival_threshold_km: 0.1,
        fallback_speed_kmh: 20.0,
        avg_speed_kmh: 30.0,
        search_radius_km: 5.0,
        match_timeout_secs: 300,
        autopay: AutoPayConfig::default(),
    }
}

pub fn test_state() -> AppState {
    test_state_with(test_config())
}

pub fn test_state_with(config: Config) -> AppState {
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    AppState::build(store, Arc::new(LogNotifier), &config)
}

pub fn ride_input(passenger_id: Uuid) -> RideRequestInput {
    RideRequestInput {
        passenger_id,
        pickup: Coordinates::new(12.9716, 77.5946),
        pickup_label: "MG Road".into(),
        drop: Coordinates::new(12.9352, 77.6245),
        drop_label: "Koramangala".into(),
        vehicle_class: VehicleClass::Car,
        distance_km: Some(8.0),
        duration_min: Some(25.0),
        promo_code: None,
        org_restricted: false,
        organization_id: None,
    }
}

pub fn nearby_driver() -> Driver {
    Driver::new(
        "Ravi".into(),
        VehicleClass::Car,
        Coordinates::new(12.9750, 77.5990),
        None,
    )
}
