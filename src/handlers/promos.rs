//! Promo code endpoints.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{PromoCode, RideRequest, RideRequestStatus};
use crate::error::CoreError;
use crate::pricing::apply_promo;
use crate::AppState;

/// Register or replace a promo code.
pub async fn upsert_promo(
    State(state): State<AppState>,
    Json(promo): Json<PromoCode>,
) -> Result<(StatusCode, Json<PromoCode>), CoreError> {
    if promo.code.trim().is_empty() {
        return Err(CoreError::Validation("promo code must not be empty".into()));
    }
    state.store.upsert_promo(&promo).await?;
    Ok((StatusCode::CREATED, Json(promo)))
}

#[derive(Debug, Deserialize)]
pub struct ApplyBody {
    pub request_id: Uuid,
    pub code: String,
}

/// Apply a promo to a pending request's quote. Rejected once a driver is
/// involved; the quote is frozen from MATCHED onwards.
pub async fn apply(
    State(state): State<AppState>,
    Json(body): Json<ApplyBody>,
) -> Result<Json<RideRequest>, CoreError> {
    let mut request = state.matcher.get_ride_request(body.request_id).await?;
    if !matches!(
        request.status,
        RideRequestStatus::Pending | RideRequestStatus::Searching
    ) {
        return Err(CoreError::Validation(format!(
            "promo cannot be applied to a request in status {}",
            request.status.as_str()
        )));
    }
    if request.promo_code.is_some() {
        return Err(CoreError::Validation(
            "request already has a promo applied".into(),
        ));
    }

    let promo = state
        .store
        .get_promo(&body.code)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("promo code {}", body.code)))?;

    let expected = [request.status];
    request.quoted_fare = apply_promo(&request.quoted_fare, &promo, Utc::now())?;
    request.promo_code = Some(promo.code.clone());
    if !state
        .store
        .update_ride_request_if_status(&request, &expected)
        .await?
    {
        return Err(CoreError::AlreadyMatched);
    }
    state.store.increment_promo_usage(&promo.code).await?;
    Ok(Json(request))
}
