//! Trip endpoints: live location ingress, settlement, inspection.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{LiveLocationSample, Trip};
use crate::error::CoreError;
use crate::geo::Coordinates;
use crate::services::{SettlementReport, TripProgress};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TripView {
    #[serde(flatten)]
    pub trip: Trip,
    pub progress: Option<TripProgress>,
}

pub async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TripView>, CoreError> {
    let trip = state
        .store
        .get_trip(id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("trip {}", id)))?;
    let progress = state.geofence.progress(id).await;
    Ok(Json(TripView { trip, progress }))
}

#[derive(Debug, Deserialize)]
pub struct LocationBody {
    pub driver_id: Uuid,
    pub position: Coordinates,
    #[serde(default)]
    pub heading: f64,
    #[serde(default)]
    pub speed_kmh: f64,
}

/// Ingest one driver position report. Tracking is started lazily so a
/// restarted server picks trips back up on the next sample.
pub async fn post_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<LocationBody>,
) -> Result<StatusCode, CoreError> {
    state.geofence.start_tracking(id).await?;

    let sample = LiveLocationSample {
        trip_id: id,
        driver_id: body.driver_id,
        position: body.position,
        heading: body.heading,
        speed_kmh: body.speed_kmh,
        recorded_at: Utc::now(),
    };
    if !sample.is_well_formed() {
        return Err(CoreError::Validation(
            "location sample has out-of-range or non-finite fields".into(),
        ));
    }
    state.feed.publish(sample).await;
    Ok(StatusCode::ACCEPTED)
}

/// Manual settlement trigger, also the recovery path when the automatic
/// post-completion settlement was skipped or partially failed.
pub async fn settle_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SettlementReport>, CoreError> {
    Ok(Json(state.settlement.settle_trip(id).await?))
}
