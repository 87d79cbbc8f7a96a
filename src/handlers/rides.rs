//! Ride request endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Booking, RideRequest, Trip};
use crate::error::CoreError;
use crate::services::RideRequestInput;
use crate::AppState;

pub async fn create_ride(
    State(state): State<AppState>,
    Json(input): Json<RideRequestInput>,
) -> Result<(StatusCode, Json<RideRequest>), CoreError> {
    let request = state.matcher.create_ride_request(input).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn get_ride(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RideRequest>, CoreError> {
    Ok(Json(state.matcher.get_ride_request(id).await?))
}

/// Run one matching pass for the request.
pub async fn match_ride(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RideRequest>, CoreError> {
    Ok(Json(state.matcher.auto_match(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct AcceptBody {
    pub driver_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct AcceptResponse {
    pub request: RideRequest,
    pub trip: Trip,
    pub booking: Booking,
}

pub async fn accept_ride(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AcceptBody>,
) -> Result<Json<AcceptResponse>, CoreError> {
    let (request, trip, booking) = state.matcher.accept_request(id, body.driver_id).await?;
    // Start following the new trip right away so location ingress has a
    // channel to land on.
    if let Err(e) = state.geofence.start_tracking(trip.id).await {
        tracing::warn!(trip_id = %trip.id, error = %e, "could not start tracking");
    }
    Ok(Json(AcceptResponse {
        request,
        trip,
        booking,
    }))
}

pub async fn cancel_ride(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RideRequest>, CoreError> {
    Ok(Json(state.matcher.cancel_ride_request(id).await?))
}
