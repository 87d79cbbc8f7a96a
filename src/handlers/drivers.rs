//! Driver registry endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{Driver, VehicleClass};
use crate::error::CoreError;
use crate::geo::Coordinates;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub name: String,
    pub vehicle_class: VehicleClass,
    pub location: Coordinates,
    pub organization_id: Option<Uuid>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<Driver>), CoreError> {
    if body.name.trim().is_empty() {
        return Err(CoreError::Validation("driver name must not be empty".into()));
    }
    if !body.location.is_valid() {
        return Err(CoreError::Validation(
            "driver location out of range".into(),
        ));
    }
    let driver = Driver::new(
        body.name,
        body.vehicle_class,
        body.location,
        body.organization_id,
    );
    state.store.upsert_driver(&driver).await?;
    Ok((StatusCode::CREATED, Json(driver)))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityBody {
    pub available: bool,
    pub location: Option<Coordinates>,
}

pub async fn set_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AvailabilityBody>,
) -> Result<Json<Driver>, CoreError> {
    let mut driver = state
        .store
        .get_driver(id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("driver {}", id)))?;
    if let Some(location) = body.location {
        if !location.is_valid() {
            return Err(CoreError::Validation(
                "driver location out of range".into(),
            ));
        }
        driver.location = location;
    }
    driver.available = body.available;
    driver.updated_at = Utc::now();
    state.store.upsert_driver(&driver).await?;
    Ok(Json(driver))
}
